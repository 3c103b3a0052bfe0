// src/mrl/frontends.rs
//! Small, shared parsing & normalization helpers for the front-ends (CLI,
//! experiment runner). Dependency-light: strings in, library types out.

use std::fmt::{Display, Formatter};

use testdata::{poisson_lambda_ok, DistKind};

use crate::mrl::options::SummaryMode;
use crate::mrl::sampling::SamplingPolicy;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    InvalidMode(String),
    InvalidRate(u64),   // initial rate or growth < 1
    RateCeiling { initial: u64, max: u64 },
    InvalidDist(String),
    InvalidLambda(f64),
    InvalidNumber(String),
    NonFinite(String),
    InvalidProbe(f64),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidMode(s) => {
                write!(f, "invalid mode: {s} (expected 'exact' or 'sampled')")
            }
            ParseError::InvalidRate(r) => {
                write!(f, "sampling rate and growth must be >= 1 (got {r})")
            }
            ParseError::RateCeiling { initial, max } => {
                write!(f, "max sampling rate {max} is below the initial rate {initial}")
            }
            ParseError::InvalidDist(s) => write!(
                f,
                "invalid distribution: {s} (expected 'uniform', 'normal', 'bimodal', 'poisson' or 'random')"
            ),
            ParseError::InvalidLambda(l) => {
                write!(f, "invalid poisson lambda: {l} (expected a finite value > 0)")
            }
            ParseError::InvalidNumber(tok) => write!(f, "not a number: {tok:?}"),
            ParseError::NonFinite(tok) => {
                write!(f, "non-finite input value {tok:?}; drop NaN/±inf first")
            }
            ParseError::InvalidProbe(q) => write!(f, "phi must be in [0,1] (got {q})"),
        }
    }
}
impl std::error::Error for ParseError {}

/// Lowercase/normalize a free-form string by removing `_`, `-` and spaces.
#[inline]
fn norm(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['_', '-', ' '], "")
}

/* ----------------------- input helpers ----------------------- */

/// Numbers separated by whitespace, `,` or `;`. Rejects NaN and infinities.
pub fn parse_numbers(s: &str) -> Result<Vec<f64>, ParseError> {
    let mut out = Vec::new();
    for tok in s
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|t| !t.is_empty())
    {
        let v: f64 = tok
            .parse()
            .map_err(|_| ParseError::InvalidNumber(tok.to_string()))?;
        if !v.is_finite() {
            return Err(ParseError::NonFinite(tok.to_string()));
        }
        out.push(v);
    }
    Ok(out)
}

/// Strict φ validation for probes coming from the command line.
#[inline]
pub fn validate_probe(phi: f64) -> Result<f64, ParseError> {
    if phi.is_finite() && (0.0..=1.0).contains(&phi) {
        Ok(phi)
    } else {
        Err(ParseError::InvalidProbe(phi))
    }
}

/* ----------------------- mode helpers ----------------------- */

/// Accepts: exact | sampled (alias: sampling). Rate, growth and ceiling only
/// apply to `sampled` and default to [`SamplingPolicy::default`].
pub fn parse_mode_str(
    kind: Option<&str>,
    initial_rate: Option<u64>,
    growth: Option<u64>,
    max_rate: Option<u64>,
) -> Result<SummaryMode, ParseError> {
    match kind.map(norm) {
        None => Ok(SummaryMode::Exact),
        Some(ref v) if v == "exact" => Ok(SummaryMode::Exact),
        Some(ref v) if v == "sampled" || v == "sampling" => {
            let defaults = SamplingPolicy::default();
            let mut policy = SamplingPolicy::new(
                initial_rate.unwrap_or(defaults.initial_rate),
                growth.unwrap_or(defaults.growth),
            );
            if let Some(max) = max_rate {
                policy = policy.with_max_rate(max);
            }
            if policy.initial_rate < 1 {
                return Err(ParseError::InvalidRate(policy.initial_rate));
            }
            if policy.growth < 1 {
                return Err(ParseError::InvalidRate(policy.growth));
            }
            if policy.max_rate < policy.initial_rate {
                return Err(ParseError::RateCeiling {
                    initial: policy.initial_rate,
                    max: policy.max_rate,
                });
            }
            Ok(SummaryMode::Sampled(policy))
        }
        Some(v) => Err(ParseError::InvalidMode(v)),
    }
}

pub fn mode_to_str(mode: SummaryMode) -> &'static str {
    match mode {
        SummaryMode::Exact => "exact",
        SummaryMode::Sampled(_) => "sampled",
    }
}

/* -------------------- distribution helpers -------------------- */

/// Accepts: uniform | normal | bimodal | poisson | random (alias: shuffled).
pub fn parse_dist_str(
    name: &str,
    lambda: f64,
    start: f64,
    end: f64,
) -> Result<DistKind, ParseError> {
    match norm(name).as_str() {
        "uniform" => Ok(DistKind::Uniform),
        "normal" => Ok(DistKind::Normal),
        "bimodal" => Ok(DistKind::Bimodal),
        "poisson" if poisson_lambda_ok(lambda) => Ok(DistKind::Poisson { lambda }),
        "poisson" => Err(ParseError::InvalidLambda(lambda)),
        "random" | "shuffled" => Ok(DistKind::Shuffled { start, end }),
        other => Err(ParseError::InvalidDist(other.to_string())),
    }
}
