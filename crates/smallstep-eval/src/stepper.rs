//! The stepping loop: repeated single reductions under a step budget.

use crate::one_step::{is_one_step_possible, one_step};
use crate::redex::Redex;
use serde::{Deserialize, Serialize};
use smallstep_types::{Result, Term, Value};
use std::sync::Arc;
use tracing::debug;

/// Step budget used when none is configured.
pub const DEFAULT_STEP_LIMIT: usize = 1000;

/// Options accepted by [`Stepper`]. Missing JSON fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepperOptions {
    /// Maximum number of reductions per run.
    pub step_limit: usize,
}

impl Default for StepperOptions {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

/// One entry of a trace: a tree and the redex that produced it.
///
/// The initial tree has no redex.
#[derive(Debug, Clone)]
pub struct Step {
    pub term: Arc<Term>,
    pub redex: Option<Redex>,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Outcome {
    /// Normal form with a completion value.
    Value(Value),
    /// Normal form with no applicable rule, e.g. `5 / 0;`.
    Stuck,
    /// The step budget ran out while a reduction was still possible.
    Truncated,
}

/// The ordered states of one run.
#[derive(Debug, Clone)]
pub struct Trace {
    pub steps: Vec<Step>,
    pub outcome: Outcome,
}

impl Trace {
    /// Number of reductions performed (the initial state is not counted).
    pub fn reductions(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// The last tree reached.
    pub fn final_term(&self) -> Option<&Arc<Term>> {
        self.steps.last().map(|s| &s.term)
    }

    /// Source text of every state, in order.
    pub fn codes(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.term.to_string()).collect()
    }
}

/// Runs terms to normal form (or to the step budget).
#[derive(Debug, Clone, Default)]
pub struct Stepper {
    options: StepperOptions,
}

impl Stepper {
    /// A stepper with the default budget.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: StepperOptions) -> Self {
        Self { options }
    }

    pub fn with_step_limit(step_limit: usize) -> Self {
        Self::with_options(StepperOptions { step_limit })
    }

    /// Step `initial` until no reduction is possible or the budget is spent.
    pub fn run(&self, initial: Arc<Term>) -> Result<Trace> {
        let limit = self.options.step_limit;
        let mut steps = vec![Step {
            term: initial,
            redex: None,
        }];
        let mut current = steps[0].term.clone();

        while is_one_step_possible(&current) {
            if steps.len() > limit {
                debug!(limit, "step limit reached");
                return Ok(Trace {
                    steps,
                    outcome: Outcome::Truncated,
                });
            }
            let reduction = one_step(&current)?;
            debug!(step = steps.len(), rule = %reduction.redex.rule, "reduced");
            current = reduction.term.clone();
            steps.push(Step {
                term: reduction.term,
                redex: Some(reduction.redex),
            });
        }

        let outcome = match completion_value(&current) {
            Some(value) => Outcome::Value(value),
            None => Outcome::Stuck,
        };
        debug!(?outcome, steps = steps.len() - 1, "normal form reached");
        Ok(Trace { steps, outcome })
    }
}

/// Run `initial` with an explicit budget.
pub fn run(initial: Arc<Term>, step_limit: usize) -> Result<Trace> {
    Stepper::with_step_limit(step_limit).run(initial)
}

/// The value a normal-form term evaluates to, if it has one.
///
/// Programs complete with their last expression statement's literal; an
/// empty program or a finished declaration completes with `undefined`.
pub fn completion_value(term: &Term) -> Option<Value> {
    match term {
        Term::Literal(value) => Some(value.clone()),
        Term::ExpressionStatement(expr) => expr.as_literal().cloned(),
        Term::VariableDeclaration { declarations, .. } => {
            let finished = declarations.iter().all(|d| match d.as_ref() {
                Term::VariableDeclarator { init, .. } => {
                    init.as_deref().map_or(true, |i| i.as_literal().is_some())
                }
                _ => false,
            });
            finished.then_some(Value::Undefined)
        }
        Term::Program(body) => match body.last() {
            None => Some(Value::Undefined),
            Some(last) => completion_value(last),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallstep_types::{BinaryOp, DeclarationKind};

    fn n(v: f64) -> Arc<Term> {
        Term::number(v)
    }

    #[test]
    fn options_default_from_empty_json() {
        let options: StepperOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.step_limit, DEFAULT_STEP_LIMIT);
        let options: StepperOptions = serde_json::from_str(r#"{"step_limit": 3}"#).unwrap();
        assert_eq!(options.step_limit, 3);
    }

    #[test]
    fn literal_is_already_normal() {
        let trace = Stepper::new().run(n(4.0)).unwrap();
        assert_eq!(trace.reductions(), 0);
        assert_eq!(trace.outcome, Outcome::Value(Value::Number(4.0)));
        assert!(trace.steps[0].redex.is_none());
    }

    #[test]
    fn zero_budget_truncates_reducible_term() {
        let trace = run(Term::binary(BinaryOp::Add, n(1.0), n(2.0)), 0).unwrap();
        assert_eq!(trace.reductions(), 0);
        assert_eq!(trace.outcome, Outcome::Truncated);
    }

    #[test]
    fn completion_values() {
        assert_eq!(completion_value(&Term::program(vec![])), Some(Value::Undefined));
        let decl = Term::program(vec![Term::declaration(
            DeclarationKind::Let,
            vec![Term::declarator("x", None)],
        )]);
        assert_eq!(completion_value(&decl), Some(Value::Undefined));
        let pending = Term::program(vec![Term::constant("x", Term::identifier("y"))]);
        assert_eq!(completion_value(&pending), None);
        let decl = Term::program(vec![Term::constant("x", n(1.0))]);
        assert_eq!(completion_value(&decl), Some(Value::Undefined));
        let stuck = Term::program(vec![Term::expression_statement(Term::binary(
            BinaryOp::Div,
            n(1.0),
            n(0.0),
        ))]);
        assert_eq!(completion_value(&stuck), None);
    }

    #[test]
    fn outcome_json_shape() {
        let json = serde_json::to_string(&Outcome::Value(Value::Number(14.0))).unwrap();
        assert_eq!(json, r#"{"kind":"value","value":{"type":"number","value":14.0}}"#);
        let json = serde_json::to_string(&Outcome::Stuck).unwrap();
        assert_eq!(json, r#"{"kind":"stuck"}"#);
    }
}
