//! Shared types for the smallstep stepper.
//!
//! This crate defines the term model, source spans, error types, and the
//! source generator used to display (and highlight) each step.

mod error;
mod span;
pub mod codify;
pub mod term;

pub use codify::{codify, codify_with_marker, Marker, MarkerClass, Rendered, Segment};
pub use error::StepperError;
pub use span::Span;
pub use term::{BinaryOp, DeclarationKind, LogicalOp, Term, UnaryOp, Value};

/// Result type used throughout the stepper.
pub type Result<T> = std::result::Result<T, StepperError>;
