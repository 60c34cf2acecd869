//! Error types for the fire-direction calculator.

use thiserror::Error;

/// Result type for calculator operations.
pub type FdcResult<T> = Result<T, FdcError>;

/// Errors that can occur while computing a firing solution.
///
/// Every failure is local and descriptive; callers decide whether to retry
/// with different inputs or surface the message to an operator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FdcError {
    /// Malformed grid coordinate string.
    #[error("malformed grid coordinate '{raw}': {reason}")]
    Format { raw: String, reason: String },

    /// Unrecognized weapon system or ammunition id.
    #[error("unknown {kind} id '{id}'")]
    UnknownReference { kind: &'static str, id: String },

    /// Target range outside every viable charge group's bounds.
    #[error("range {range_m:.0} m outside charted bounds {min_m:.0}-{max_m:.0} m")]
    OutOfRange {
        range_m: f64,
        min_m: f64,
        max_m: f64,
    },

    /// Range correction would drive the observer-target distance negative.
    #[error("range correction {correction_m:+.0} m drives distance {distance_m:.0} m negative")]
    InvalidAdjustment {
        distance_m: f64,
        correction_m: f64,
    },

    /// Formation failed validation; all violated rules are listed.
    #[error("invalid formation: {}", violations.join("; "))]
    InvalidFormation { violations: Vec<String> },
}
