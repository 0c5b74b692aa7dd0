//! Contractibility oracle and contraction rules.
//!
//! A node is contractible when it is itself a redex: every operand the rule
//! inspects is already a literal of the right type. Contraction replaces
//! such a node by its result in one rewrite.

use smallstep_types::{BinaryOp, LogicalOp, Result, StepperError, Term, UnaryOp, Value};
use std::sync::Arc;

/// Is `term` itself directly rewritable?
///
/// Pure: answers only about the node, never about its descendants.
pub fn is_contractible(term: &Term) -> bool {
    match term {
        Term::Unary {
            op: UnaryOp::Not,
            argument,
        } => argument.as_bool().is_some(),
        Term::Unary {
            op: UnaryOp::Minus,
            argument,
        } => argument.as_number().is_some(),
        Term::Binary { op, left, right } => match (left.as_literal(), right.as_literal()) {
            (Some(l), Some(r)) => evaluate_binary(*op, l, r).is_some(),
            _ => false,
        },
        // Both sides must already be booleans: no short-circuit savings.
        Term::Logical { left, right, .. } => {
            left.as_bool().is_some() && right.as_bool().is_some()
        }
        Term::Conditional { test, .. } => test.as_bool().is_some(),
        Term::Literal(_)
        | Term::Identifier(_)
        | Term::ExpressionStatement(_)
        | Term::VariableDeclaration { .. }
        | Term::VariableDeclarator { .. }
        | Term::Program(_) => false,
    }
}

/// Rewrite a contractible node into its result.
///
/// Fails with [`StepperError::InvariantViolation`] if `term` is not
/// contractible. Subterms that survive (the chosen branch of a conditional,
/// the right operand of `true && b`) are returned as the same instance.
pub fn contract(term: &Arc<Term>) -> Result<Arc<Term>> {
    let not_contractible = || {
        StepperError::InvariantViolation(format!(
            "{} `{term}` is not contractible",
            term.kind_name()
        ))
    };

    match term.as_ref() {
        Term::Unary { op, argument } => match (op, argument.as_literal()) {
            (UnaryOp::Not, Some(Value::Bool(b))) => Ok(Term::boolean(!b)),
            (UnaryOp::Minus, Some(Value::Number(n))) => Ok(Term::number(-n)),
            _ => Err(not_contractible()),
        },
        Term::Binary { op, left, right } => {
            let (Some(l), Some(r)) = (left.as_literal(), right.as_literal()) else {
                return Err(not_contractible());
            };
            evaluate_binary(*op, l, r)
                .map(Term::literal)
                .ok_or_else(not_contractible)
        }
        Term::Logical { op, left, right } => {
            let (Some(l), Some(_)) = (left.as_bool(), right.as_bool()) else {
                return Err(not_contractible());
            };
            Ok(match (op, l) {
                (LogicalOp::And, true) => right.clone(),
                (LogicalOp::And, false) => Term::boolean(false),
                (LogicalOp::Or, true) => Term::boolean(true),
                (LogicalOp::Or, false) => right.clone(),
            })
        }
        Term::Conditional {
            test,
            consequent,
            alternate,
        } => match test.as_bool() {
            Some(true) => Ok(consequent.clone()),
            Some(false) => Ok(alternate.clone()),
            None => Err(not_contractible()),
        },
        _ => Err(not_contractible()),
    }
}

/// Apply a binary operator to two literal operands.
///
/// `None` means the operator has no rule for these operands; a zero
/// divisor is one such case (the term is stuck rather than `Infinity`).
pub(crate) fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> Option<Value> {
    use Value::{Bool, Number, String as Str};

    Some(match (op, left, right) {
        (BinaryOp::Add, Number(a), Number(b)) => Number(a + b),
        (BinaryOp::Add, Str(a), Str(b)) => Str(format!("{a}{b}")),
        (BinaryOp::Sub, Number(a), Number(b)) => Number(a - b),
        (BinaryOp::Mul, Number(a), Number(b)) => Number(a * b),
        (BinaryOp::Div, Number(_), Number(b)) if *b == 0.0 => return None,
        (BinaryOp::Div, Number(a), Number(b)) => Number(a / b),
        (BinaryOp::Less, Number(a), Number(b)) => Bool(a < b),
        (BinaryOp::Less, Str(a), Str(b)) => Bool(a < b),
        (BinaryOp::Greater, Number(a), Number(b)) => Bool(a > b),
        (BinaryOp::Greater, Str(a), Str(b)) => Bool(a > b),
        (BinaryOp::StrictEq, a, b) => Bool(a.strict_eq(b)),
        _ => return None,
    })
}
