//! Stepper error types.

use thiserror::Error;

/// Errors surfaced by the stepper and its tree adapter.
///
/// A stuck term (e.g. `5 / 0`) is not an error: it is a normal form and is
/// reported through the run outcome instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepperError {
    /// `contract` or `one_step` was called on a term that does not satisfy
    /// the corresponding predicate. Always a caller bug.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A node kind or operator outside the supported subset.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Input tree is not well-formed (missing or ill-typed fields).
    #[error("malformed tree: {0}")]
    Malformed(String),
}

impl StepperError {
    /// Short machine-readable kind, used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvariantViolation(_) => "invariant_violation",
            Self::Unsupported(_) => "unsupported",
            Self::Malformed(_) => "malformed",
        }
    }
}
