//! Reachability ("is one step possible") and the transition function.
//!
//! Both walk the tree in the same order, so whenever reachability holds the
//! transition finds the same redex:
//!
//! ```text
//! node contractible            → contract it
//! Unary(op, e)                 → e
//! Binary/Logical(e1, e2)       → e1 until it is normal, then e2
//! Conditional(e1, e2, e3)      → e1 only
//! Program[s1]                  → s1
//! Program[s1, s2, ...]         → s1, else s2, else drop s1
//! ```

use crate::contract::{contract, is_contractible};
use crate::redex::{Redex, Rule};
use crate::substitute::substitute;
use smallstep_types::{Result, StepperError, Term};
use std::sync::Arc;
use tracing::trace;

/// The result of one transition: the successor tree and what was rewritten.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub term: Arc<Term>,
    pub redex: Redex,
}

impl Reduction {
    /// Rebuild the parent around a stepped child.
    fn map(self, rebuild: impl FnOnce(Arc<Term>) -> Arc<Term>) -> Self {
        Self {
            term: rebuild(self.term),
            redex: self.redex,
        }
    }
}

/// Does `term` contain any redex, under the stepper's evaluation order?
pub fn is_one_step_possible(term: &Term) -> bool {
    if is_contractible(term) {
        return true;
    }
    match term {
        Term::Unary { argument, .. } => is_one_step_possible(argument),
        Term::Binary { left, right, .. } | Term::Logical { left, right, .. } => {
            is_one_step_possible(left) || is_one_step_possible(right)
        }
        // Branches are never inspected before the test collapses.
        Term::Conditional { test, .. } => is_one_step_possible(test),
        Term::ExpressionStatement(expr) => is_one_step_possible(expr),
        Term::VariableDeclaration { declarations, .. } => {
            declarations.iter().any(|d| is_one_step_possible(d))
        }
        Term::VariableDeclarator { init, .. } => {
            init.as_deref().is_some_and(is_one_step_possible)
        }
        Term::Program(body) => match body.as_slice() {
            [] => false,
            [only] => is_one_step_possible(only),
            // Either a statement reduces or a finished one gets dropped.
            _ => true,
        },
        Term::Literal(_) | Term::Identifier(_) => false,
    }
}

/// Perform exactly one reduction.
///
/// Fails with [`StepperError::InvariantViolation`] if no step is possible.
/// The input tree is left untouched; untouched subtrees are shared with the
/// result.
pub fn one_step(term: &Arc<Term>) -> Result<Reduction> {
    if !is_one_step_possible(term) {
        return Err(no_reduction(term));
    }
    step(term)
}

fn step(term: &Arc<Term>) -> Result<Reduction> {
    if is_contractible(term) {
        let post = contract(term)?;
        let redex = Redex::contraction(term.clone(), post.clone()).ok_or_else(|| {
            StepperError::InvariantViolation(format!("{} has no contraction rule", term.kind_name()))
        })?;
        return Ok(Reduction { term: post, redex });
    }

    match term.as_ref() {
        Term::Unary { op, argument } => Ok(step(argument)?.map(|a| Term::unary(*op, a))),
        Term::Binary { op, left, right } => {
            if is_one_step_possible(left) {
                Ok(step(left)?.map(|l| Term::binary(*op, l, right.clone())))
            } else {
                trace!(op = op.as_str(), "left operand normal, stepping right");
                Ok(step(right)?.map(|r| Term::binary(*op, left.clone(), r)))
            }
        }
        Term::Logical { op, left, right } => {
            if is_one_step_possible(left) {
                Ok(step(left)?.map(|l| Term::logical(*op, l, right.clone())))
            } else {
                trace!(op = op.as_str(), "left operand normal, stepping right");
                Ok(step(right)?.map(|r| Term::logical(*op, left.clone(), r)))
            }
        }
        Term::Conditional {
            test,
            consequent,
            alternate,
        } => Ok(step(test)?
            .map(|t| Term::conditional(t, consequent.clone(), alternate.clone()))),
        Term::ExpressionStatement(expr) => Ok(step(expr)?.map(Term::expression_statement)),
        Term::VariableDeclaration { kind, declarations } => {
            let index = declarations
                .iter()
                .position(|d| is_one_step_possible(d))
                .ok_or_else(|| no_reduction(term))?;
            Ok(step(&declarations[index])?.map(|d| {
                let mut declarations = declarations.clone();
                declarations[index] = d;
                Term::declaration(*kind, declarations)
            }))
        }
        Term::VariableDeclarator { name, init } => {
            let init = init.as_ref().ok_or_else(|| no_reduction(term))?;
            Ok(step(init)?.map(|i| Term::declarator(name.clone(), Some(i))))
        }
        Term::Program(body) => step_program(term, body),
        Term::Literal(_) | Term::Identifier(_) => Err(no_reduction(term)),
    }
}

/// Program sequencing: reduce one of the first two statements, or drop the
/// first once neither can move.
fn step_program(program: &Arc<Term>, body: &[Arc<Term>]) -> Result<Reduction> {
    match body {
        [] => Err(no_reduction(program)),
        [only] => Ok(step(only)?.map(|s| Term::program(vec![s]))),
        [first, second, rest @ ..] => {
            for (index, statement) in [first, second].into_iter().enumerate() {
                if is_one_step_possible(statement) {
                    trace!(index, "stepping statement");
                    return Ok(step(statement)?.map(|s| {
                        let mut body = body.to_vec();
                        body[index] = s;
                        Term::program(body)
                    }));
                }
            }

            let mut remaining: Vec<Arc<Term>> = std::iter::once(second.clone())
                .chain(rest.iter().cloned())
                .collect();

            let rule = match first.as_ref() {
                Term::VariableDeclaration { kind, declarations } => {
                    let names = substitute_declarations(declarations, &mut remaining);
                    trace!(?names, "declaration substituted");
                    Rule::DeclarationSubstituted { kind: *kind, names }
                }
                _ => {
                    trace!("statement removed");
                    Rule::StatementRemoved
                }
            };

            Ok(Reduction {
                term: Term::program(remaining),
                redex: Redex::removal(first.clone(), rule),
            })
        }
    }
}

/// Substitute each declarator's value into the later declarators and the
/// remaining statements. Returns the bound names, in declaration order.
fn substitute_declarations(declarations: &[Arc<Term>], remaining: &mut Vec<Arc<Term>>) -> Vec<String> {
    let mut pending = declarations.to_vec();
    let mut names = Vec::with_capacity(pending.len());

    for index in 0..pending.len() {
        let Term::VariableDeclarator { name, init } = pending[index].as_ref() else {
            continue;
        };
        let name = name.clone();
        let value = init.clone().unwrap_or_else(Term::undefined);

        for later in pending.iter_mut().skip(index + 1) {
            *later = substitute(&name, &value, later);
        }
        for statement in remaining.iter_mut() {
            *statement = substitute(&name, &value, statement);
        }
        names.push(name);
    }
    names
}

fn no_reduction(term: &Term) -> StepperError {
    StepperError::InvariantViolation(format!(
        "no reduction possible for {} `{term}`",
        term.kind_name()
    ))
}
