pub mod buffer;
pub mod engine;
pub mod frontends;
pub mod options;
pub mod output;
pub mod presets;
pub mod sampling;
pub mod scheduler;
pub mod stream;
pub mod test_helpers;

// Internal building blocks
mod collapse;
mod merges;
mod summary;

// Public surface
pub use buffer::{Buffer, Fullness};
pub use collapse::collapse;
pub use engine::{Engine, EngineStats, FillMode};
pub use options::{SummaryMode, SummaryOptions};
pub use output::output;
pub use presets::{geometry_covering, geometry_for, Geometry};
pub use sampling::SamplingPolicy;
pub use scheduler::{Scheduler, Step};
pub use stream::InputStream;
pub use summary::{new_summary, Summary, SummaryBuilder};
