//! smallstep evaluator: small-step reduction, one redex at a time.
//!
//! Given a term, the stepper repeatedly rewrites exactly one reducible
//! subterm until none remain, recording every intermediate tree. The
//! pieces are layered:
//!
//! - [`contract`]: the contractibility oracle and the contraction rules.
//! - [`one_step`]: reachability and the transition function, including
//!   program sequencing.
//! - [`substitute`]: naive substitution for declared names.
//! - [`stepper`]: the bounded stepping loop and its [`Trace`].
//!
//! Terms are immutable; each step shares every untouched subtree with the
//! previous state, so the whole history stays inspectable.

pub mod contract;
pub mod one_step;
pub mod redex;
pub mod stepper;
pub mod substitute;
mod view;

pub use contract::{contract, is_contractible};
pub use one_step::{is_one_step_possible, one_step, Reduction};
pub use redex::{Redex, Rule};
pub use stepper::{
    completion_value, run, Outcome, Step, Stepper, StepperOptions, Trace, DEFAULT_STEP_LIMIT,
};
pub use substitute::substitute;
pub use view::StepView;
