//! Redex records: which subterm a step rewrote, and how.
//!
//! A record is returned with every reduction instead of living in shared
//! state, so independent runs never observe each other's redexes.

use serde::Serialize;
use smallstep_types::{BinaryOp, DeclarationKind, LogicalOp, Term, UnaryOp};
use std::fmt;
use std::sync::Arc;

/// The rule a single step applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    Unary { op: UnaryOp },
    Binary { op: BinaryOp },
    Logical { op: LogicalOp, left: bool },
    Conditional { test: bool },
    /// A finished statement was dropped from the program.
    StatementRemoved,
    /// A finished declaration was substituted into the rest of the program, then dropped.
    DeclarationSubstituted {
        kind: DeclarationKind,
        names: Vec<String>,
    },
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Unary { op } => write!(f, "unary {}", op.as_str()),
            Rule::Binary { op } => write!(f, "binary {}", op.as_str()),
            Rule::Logical { op, .. } => write!(f, "logical {}", op.as_str()),
            Rule::Conditional { .. } => write!(f, "conditional"),
            Rule::StatementRemoved => write!(f, "statement removed"),
            Rule::DeclarationSubstituted { .. } => write!(f, "declaration substituted"),
        }
    }
}

/// The subterm rewritten by one step.
///
/// `pre` is the exact instance in the tree before the step, `post` the
/// exact instance in the tree after it. Sequencing steps that drop a
/// statement have no `post`.
#[derive(Debug, Clone)]
pub struct Redex {
    pub pre: Arc<Term>,
    pub post: Option<Arc<Term>>,
    pub rule: Rule,
}

impl Redex {
    /// Record a contraction of `pre` into `post`.
    ///
    /// Returns `None` if `pre` is not a kind that contracts.
    pub(crate) fn contraction(pre: Arc<Term>, post: Arc<Term>) -> Option<Self> {
        let rule = match pre.as_ref() {
            Term::Unary { op, .. } => Rule::Unary { op: *op },
            Term::Binary { op, .. } => Rule::Binary { op: *op },
            Term::Logical { op, left, .. } => Rule::Logical {
                op: *op,
                left: left.as_bool()?,
            },
            Term::Conditional { test, .. } => Rule::Conditional {
                test: test.as_bool()?,
            },
            _ => return None,
        };
        Some(Self {
            pre,
            post: Some(post),
            rule,
        })
    }

    pub(crate) fn removal(statement: Arc<Term>, rule: Rule) -> Self {
        Self {
            pre: statement,
            post: None,
            rule,
        }
    }

    /// Human-readable description of the step, for learners.
    pub fn explain(&self) -> String {
        let pre = &self.pre;
        match &self.rule {
            Rule::Unary { .. } => format!("Unary expression {pre} evaluated"),
            Rule::Binary { .. } => format!("Binary expression {pre} evaluated"),
            Rule::Logical { op, left } => {
                let name = match op {
                    LogicalOp::And => "AND",
                    LogicalOp::Or => "OR",
                };
                let short_circuits = matches!(
                    (op, left),
                    (LogicalOp::And, false) | (LogicalOp::Or, true)
                );
                let rest = if short_circuits {
                    "stop evaluation"
                } else {
                    "continue evaluating right of operator"
                };
                format!("{name} operation evaluated, left of operator is {left}, {rest}")
            }
            Rule::Conditional { test } => {
                let branch = if *test { "consequent" } else { "alternate" };
                format!("Conditional expression evaluated, condition is {test}, {branch} evaluated")
            }
            Rule::StatementRemoved => format!("{pre} finished evaluating"),
            Rule::DeclarationSubstituted { kind, names } => {
                let noun = match kind {
                    DeclarationKind::Const => "Constant",
                    DeclarationKind::Let | DeclarationKind::Var => "Variable",
                };
                let plural = if names.len() > 1 { "s" } else { "" };
                format!(
                    "{noun}{plural} {} declared and substituted into rest of program",
                    names.join(", ")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contraction_rule_from_pre() {
        let pre = Term::binary(BinaryOp::Mul, Term::number(1.0), Term::number(2.0));
        let redex = Redex::contraction(pre, Term::number(2.0)).unwrap();
        assert_eq!(redex.rule, Rule::Binary { op: BinaryOp::Mul });
        assert_eq!(redex.explain(), "Binary expression 1 * 2 evaluated");
    }

    #[test]
    fn contraction_rejects_statements() {
        let pre = Term::expression_statement(Term::number(1.0));
        assert!(Redex::contraction(pre, Term::number(1.0)).is_none());
    }

    #[test]
    fn explain_logical() {
        let pre = Term::logical(LogicalOp::And, Term::boolean(false), Term::boolean(true));
        let redex = Redex::contraction(pre, Term::boolean(false)).unwrap();
        assert_eq!(
            redex.explain(),
            "AND operation evaluated, left of operator is false, stop evaluation"
        );
        let pre = Term::logical(LogicalOp::Or, Term::boolean(false), Term::boolean(true));
        let redex = Redex::contraction(pre, Term::boolean(true)).unwrap();
        assert_eq!(
            redex.explain(),
            "OR operation evaluated, left of operator is false, continue evaluating right of operator"
        );
    }

    #[test]
    fn explain_conditional() {
        let pre = Term::conditional(Term::boolean(true), Term::number(1.0), Term::number(2.0));
        let redex = Redex::contraction(pre, Term::number(1.0)).unwrap();
        assert_eq!(
            redex.explain(),
            "Conditional expression evaluated, condition is true, consequent evaluated"
        );
    }

    #[test]
    fn explain_sequencing() {
        let stmt = Term::expression_statement(Term::number(11.0));
        let redex = Redex::removal(stmt, Rule::StatementRemoved);
        assert_eq!(redex.explain(), "11; finished evaluating");

        let decl = Term::constant("x", Term::number(2.0));
        let redex = Redex::removal(
            decl,
            Rule::DeclarationSubstituted {
                kind: DeclarationKind::Const,
                names: vec!["x".into()],
            },
        );
        assert_eq!(
            redex.explain(),
            "Constant x declared and substituted into rest of program"
        );
    }

    #[test]
    fn rule_json_shape() {
        let json = serde_json::to_string(&Rule::Conditional { test: true }).unwrap();
        assert_eq!(json, r#"{"rule":"conditional","test":true}"#);
    }
}
