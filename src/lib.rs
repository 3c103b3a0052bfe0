//! One-pass approximate quantiles over long numeric sequences, using a fixed
//! pool of `b` buffers of `k` elements (Munro-Raghavan-Lindell summaries).
//!
//! ```
//! use mrl_quantiles::{Summary, SummaryMode};
//!
//! let s = Summary::new(64, 4, SummaryMode::Exact)?
//!     .consume((1..=1000).map(f64::from))?;
//! let p95 = s.estimate_quantile(0.95)?;
//! assert!((900.0..=1000.0).contains(&p95));
//! # Ok::<(), mrl_quantiles::MrlError>(())
//! ```

pub mod error;
pub mod mrl;
pub mod quality;

pub use error::{MrlError, MrlResult};
pub use mrl::{
    geometry_covering, geometry_for, new_summary, Geometry, SamplingPolicy, Summary,
    SummaryBuilder, SummaryMode, SummaryOptions,
};
pub use quality::QualityReport;
