// src/error.rs
use core::fmt;

/// Library-wide error for mrl-quantiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MrlError {
    /// An operation ran against buffers in the wrong state: wrong fullness,
    /// too few buffers, a buffer below capacity, or a summary used out of order.
    PreconditionViolation { what: &'static str },

    /// A caller-supplied parameter is out of range (phi, capacity, buffer count,
    /// sampling rate, preset lookup).
    InvalidParameter { what: &'static str },

    /// NEW was invoked with nothing left to consume.
    ExhaustedInput,

    /// User tried to feed NaN/±inf; infinities are reserved for padding sentinels.
    /// `context` pinpoints where it came from (e.g., "input value").
    NonFiniteInput { context: &'static str },
}

impl fmt::Display for MrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MrlError::PreconditionViolation { what } => {
                write!(f, "mrl: precondition violated: {}", what)
            }
            MrlError::InvalidParameter { what } => {
                write!(f, "mrl: invalid parameter: {}", what)
            }
            MrlError::ExhaustedInput => write!(
                f,
                "mrl: input exhausted. hint: NEW needs at least one unconsumed element"
            ),
            MrlError::NonFiniteInput { context } => write!(
                f,
                "mrl: non-finite values are not allowed ({}). \
hint: clean your data or drop NaN/±inf before building the summary",
                context
            ),
        }
    }
}

impl std::error::Error for MrlError {}

pub type MrlResult<T> = Result<T, MrlError>;
