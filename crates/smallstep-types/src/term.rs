//! Term model for the stepper.
//!
//! A [`Term`] is an immutable tree. Children are held in [`Arc`] so that a
//! reduction step can rebuild only the path to the redex and share every
//! untouched subtree with the previous step. Node identity (`Arc::ptr_eq`)
//! is what the source generator uses to locate the redex in a step.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ══════════════════════════════════════════════════════════════════════════════
// Values
// ══════════════════════════════════════════════════════════════════════════════

/// A primitive value carried by a [`Term::Literal`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Number(f64),
    Bool(bool),
    String(String),
    Null,
    /// Completion value of an empty program or an uninitialised binding.
    Undefined,
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// JavaScript strict equality (`===`) between two primitives.
    ///
    /// Values of different types are never equal; `NaN` is not equal to itself.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Undefined, Value::Undefined) => true,
            _ => false,
        }
    }
}

/// Formats a number the way JavaScript's `String(n)` does.
///
/// Starts from the shortest round-trip digits and picks plain or exponent
/// notation by the decimal exponent: plain below `1e21` and from `1e-6` up.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // -0 prints as 0
        return "0".to_string();
    }

    let sci = format!("{:e}", n.abs());
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return format!("{n}");
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return format!("{n}");
    };
    let digits = mantissa.replace('.', "");
    let k = digits.len() as i32;
    // Position of the decimal point relative to the first digit.
    let point = exponent + 1;
    let sign = if n < 0.0 { "-" } else { "" };

    let body = if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat((-point) as usize))
    } else {
        let e = point - 1;
        let e_sign = if e >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{e_sign}{}", e.abs())
        } else {
            format!("{first}.{rest}e{e_sign}{}", e.abs())
        }
    };
    format!("{sign}{body}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => {
                let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
                write!(f, "{quoted}")
            }
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════════

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!x`
    Not,
    /// `-x`
    Minus,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Minus => "-",
        }
    }
}

/// Arithmetic, comparison and concatenation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    Greater,
    StrictEq,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::StrictEq => "===",
        }
    }

    /// Parses an ESTree operator string.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "<" => BinaryOp::Less,
            ">" => BinaryOp::Greater,
            "===" => BinaryOp::StrictEq,
            _ => return None,
        })
    }

    /// Binding power, higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::StrictEq => 10,
            BinaryOp::Less | BinaryOp::Greater => 11,
            BinaryOp::Add | BinaryOp::Sub => 13,
            BinaryOp::Mul | BinaryOp::Div => 14,
        }
    }
}

/// `&&` and `||`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            LogicalOp::Or => 6,
            LogicalOp::And => 7,
        }
    }
}

/// `const`, `let` or `var`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Const,
    Let,
    Var,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Const => "const",
            DeclarationKind::Let => "let",
            DeclarationKind::Var => "var",
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Terms
// ══════════════════════════════════════════════════════════════════════════════

/// A node of the stepped tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    // ── Expressions ──
    /// `42`, `"hi"`, `true`, `null`
    Literal(Value),
    /// `x`
    Identifier(String),
    /// `!e`, `-e`
    Unary { op: UnaryOp, argument: Arc<Term> },
    /// `a + b`, `a === b`, ...
    Binary {
        op: BinaryOp,
        left: Arc<Term>,
        right: Arc<Term>,
    },
    /// `a && b`, `a || b`
    Logical {
        op: LogicalOp,
        left: Arc<Term>,
        right: Arc<Term>,
    },
    /// `test ? consequent : alternate`
    Conditional {
        test: Arc<Term>,
        consequent: Arc<Term>,
        alternate: Arc<Term>,
    },

    // ── Statements ──
    /// `e;`
    ExpressionStatement(Arc<Term>),
    /// `const x = 1, y = 2;`. Every declaration is a [`Term::VariableDeclarator`].
    VariableDeclaration {
        kind: DeclarationKind,
        declarations: Vec<Arc<Term>>,
    },
    /// `x = init` inside a declaration.
    VariableDeclarator { name: String, init: Option<Arc<Term>> },
    /// Top-level statement sequence.
    Program(Vec<Arc<Term>>),
}

impl Term {
    // ── Constructors ──────────────────────────────────────────────────────

    pub fn literal(value: Value) -> Arc<Term> {
        Arc::new(Term::Literal(value))
    }

    pub fn number(n: f64) -> Arc<Term> {
        Term::literal(Value::Number(n))
    }

    pub fn boolean(b: bool) -> Arc<Term> {
        Term::literal(Value::Bool(b))
    }

    pub fn string(s: impl Into<String>) -> Arc<Term> {
        Term::literal(Value::String(s.into()))
    }

    pub fn null() -> Arc<Term> {
        Term::literal(Value::Null)
    }

    pub fn undefined() -> Arc<Term> {
        Term::literal(Value::Undefined)
    }

    pub fn identifier(name: impl Into<String>) -> Arc<Term> {
        Arc::new(Term::Identifier(name.into()))
    }

    pub fn unary(op: UnaryOp, argument: Arc<Term>) -> Arc<Term> {
        Arc::new(Term::Unary { op, argument })
    }

    pub fn binary(op: BinaryOp, left: Arc<Term>, right: Arc<Term>) -> Arc<Term> {
        Arc::new(Term::Binary { op, left, right })
    }

    pub fn logical(op: LogicalOp, left: Arc<Term>, right: Arc<Term>) -> Arc<Term> {
        Arc::new(Term::Logical { op, left, right })
    }

    pub fn conditional(test: Arc<Term>, consequent: Arc<Term>, alternate: Arc<Term>) -> Arc<Term> {
        Arc::new(Term::Conditional {
            test,
            consequent,
            alternate,
        })
    }

    pub fn expression_statement(expr: Arc<Term>) -> Arc<Term> {
        Arc::new(Term::ExpressionStatement(expr))
    }

    pub fn declaration(kind: DeclarationKind, declarations: Vec<Arc<Term>>) -> Arc<Term> {
        Arc::new(Term::VariableDeclaration { kind, declarations })
    }

    pub fn declarator(name: impl Into<String>, init: Option<Arc<Term>>) -> Arc<Term> {
        Arc::new(Term::VariableDeclarator {
            name: name.into(),
            init,
        })
    }

    /// `const name = init;`
    pub fn constant(name: impl Into<String>, init: Arc<Term>) -> Arc<Term> {
        Term::declaration(
            DeclarationKind::Const,
            vec![Term::declarator(name, Some(init))],
        )
    }

    pub fn program(body: Vec<Arc<Term>>) -> Arc<Term> {
        Arc::new(Term::Program(body))
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Node kind name, ESTree spelling.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Term::Literal(_) => "Literal",
            Term::Identifier(_) => "Identifier",
            Term::Unary { .. } => "UnaryExpression",
            Term::Binary { .. } => "BinaryExpression",
            Term::Logical { .. } => "LogicalExpression",
            Term::Conditional { .. } => "ConditionalExpression",
            Term::ExpressionStatement(_) => "ExpressionStatement",
            Term::VariableDeclaration { .. } => "VariableDeclaration",
            Term::VariableDeclarator { .. } => "VariableDeclarator",
            Term::Program(_) => "Program",
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Term::Literal(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_literal().and_then(Value::as_bool)
    }

    pub fn as_number(&self) -> Option<f64> {
        self.as_literal().and_then(Value::as_number)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::codify::codify_node(self))
    }
}
