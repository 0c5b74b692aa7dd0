//! smallstep ESTree adapter: converts parser output into stepper terms.
//!
//! The host's parser produces ESTree JSON. Only the node kinds the stepper
//! understands are accepted; anything else is rejected up front with
//! [`StepperError::Unsupported`](smallstep_types::StepperError::Unsupported)
//! rather than being passed through.

mod convert;

pub use convert::{convert, from_str};
