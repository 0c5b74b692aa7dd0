//! Source generation for stepped trees.
//!
//! Turns a [`Term`] back into JavaScript source text. The marker-aware
//! variant additionally reports the byte [`Span`] of one target subterm,
//! located by node identity, so a presenter can highlight the redex of a
//! step. Parentheses are emitted only where precedence requires them.

use crate::term::{Term, UnaryOp, Value};
use crate::Span;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Highlight class attached to a marked span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerClass {
    /// The redex, rendered in the tree before contraction.
    #[serde(rename = "beforeMarker")]
    Before,
    /// The contraction result, rendered in the tree after contraction.
    #[serde(rename = "afterMarker")]
    After,
}

/// A highlighted region of generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    #[serde(flatten)]
    pub span: Span,
    pub class: MarkerClass,
}

/// One run of text with an optional highlight class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<MarkerClass>,
}

/// Generated text plus the marker found for the target, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    pub text: String,
    pub marker: Option<Marker>,
}

impl Rendered {
    /// Split the text into unmarked / marked / unmarked runs.
    ///
    /// Empty runs are omitted. Without a marker, or with a span that does not
    /// fit the text, the whole text is one unmarked segment.
    pub fn segments(&self) -> Vec<Segment> {
        let whole = || {
            vec![Segment {
                text: self.text.clone(),
                class: None,
            }]
        };
        let Some(marker) = self.marker else {
            return whole();
        };
        let (start, end) = (marker.span.start, marker.span.end);
        let (Some(before), Some(marked), Some(after)) = (
            self.text.get(..start),
            self.text.get(start..end),
            self.text.get(end..),
        ) else {
            return whole();
        };
        [(before, None), (marked, Some(marker.class)), (after, None)]
            .into_iter()
            .filter(|(text, _)| !text.is_empty())
            .map(|(text, class)| Segment {
                text: text.to_string(),
                class,
            })
            .collect()
    }

    /// The highlighted text, if a marker was found.
    pub fn marked_text(&self) -> Option<&str> {
        self.marker.and_then(|m| m.span.slice(&self.text))
    }
}

/// Generate source text for `term`.
pub fn codify(term: &Arc<Term>) -> String {
    codify_node(term)
}

/// Generate source text for `term`, marking the first occurrence of `target`
/// (compared by pointer identity, not structure).
pub fn codify_with_marker(term: &Arc<Term>, target: &Arc<Term>, class: MarkerClass) -> Rendered {
    let mut gen = Generator::new(Some(target));
    gen.node(term);
    Rendered {
        text: gen.out,
        marker: gen.found.map(|span| Marker { span, class }),
    }
}

pub(crate) fn codify_node(term: &Term) -> String {
    let mut gen = Generator::new(None);
    gen.term(term);
    gen.out
}

// ══════════════════════════════════════════════════════════════════════════════
// Generator
// ══════════════════════════════════════════════════════════════════════════════

const PREC_CONDITIONAL: u8 = 4;
const PREC_UNARY: u8 = 15;
const PREC_ATOM: u8 = 20;

struct Generator<'t> {
    out: String,
    target: Option<&'t Arc<Term>>,
    found: Option<Span>,
}

impl<'t> Generator<'t> {
    fn new(target: Option<&'t Arc<Term>>) -> Self {
        Self {
            out: String::new(),
            target,
            found: None,
        }
    }

    /// Emit a shared child, recording its span if it is the target.
    fn node(&mut self, node: &Arc<Term>) {
        let start = self.out.len();
        self.term(node);
        if self.found.is_none() && self.target.is_some_and(|t| Arc::ptr_eq(t, node)) {
            self.found = Some(Span::new(start, self.out.len()));
        }
    }

    fn parenthesized(&mut self, node: &Arc<Term>, wrap: bool) {
        if wrap {
            self.out.push('(');
            self.node(node);
            self.out.push(')');
        } else {
            self.node(node);
        }
    }

    fn term(&mut self, term: &Term) {
        match term {
            Term::Literal(value) => self.out.push_str(&value.to_string()),
            Term::Identifier(name) => self.out.push_str(name),
            Term::Unary { op, argument } => {
                self.out.push_str(op.as_str());
                let wrap = precedence(argument) < PREC_UNARY
                    || (*op == UnaryOp::Minus && starts_with_minus(argument));
                self.parenthesized(argument, wrap);
            }
            Term::Binary { op, left, right } => {
                self.infix(op.precedence(), op.as_str(), left, right);
            }
            Term::Logical { op, left, right } => {
                self.infix(op.precedence(), op.as_str(), left, right);
            }
            Term::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.parenthesized(test, precedence(test) <= PREC_CONDITIONAL);
                self.out.push_str(" ? ");
                self.node(consequent);
                self.out.push_str(" : ");
                self.node(alternate);
            }
            Term::ExpressionStatement(expr) => {
                self.node(expr);
                self.out.push(';');
            }
            Term::VariableDeclaration { kind, declarations } => {
                self.out.push_str(kind.as_str());
                self.out.push(' ');
                for (i, declarator) in declarations.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.node(declarator);
                }
                self.out.push(';');
            }
            Term::VariableDeclarator { name, init } => {
                self.out.push_str(name);
                if let Some(init) = init {
                    self.out.push_str(" = ");
                    self.node(init);
                }
            }
            Term::Program(body) => {
                for (i, statement) in body.iter().enumerate() {
                    if i > 0 {
                        self.out.push('\n');
                    }
                    self.node(statement);
                }
            }
        }
    }

    /// Left-associative infix: the right operand needs parentheses at equal precedence.
    fn infix(&mut self, prec: u8, symbol: &str, left: &Arc<Term>, right: &Arc<Term>) {
        self.parenthesized(left, precedence(left) < prec);
        self.out.push(' ');
        self.out.push_str(symbol);
        self.out.push(' ');
        self.parenthesized(right, precedence(right) <= prec);
    }
}

fn precedence(term: &Term) -> u8 {
    match term {
        Term::Conditional { .. } => PREC_CONDITIONAL,
        Term::Logical { op, .. } => op.precedence(),
        Term::Binary { op, .. } => op.precedence(),
        Term::Unary { .. } => PREC_UNARY,
        Term::Literal(Value::Number(n)) if *n < 0.0 => PREC_UNARY,
        _ => PREC_ATOM,
    }
}

fn starts_with_minus(term: &Term) -> bool {
    match term {
        Term::Unary { op, .. } => *op == UnaryOp::Minus,
        Term::Literal(Value::Number(n)) => *n < 0.0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{BinaryOp, DeclarationKind, LogicalOp};

    fn add(l: Arc<Term>, r: Arc<Term>) -> Arc<Term> {
        Term::binary(BinaryOp::Add, l, r)
    }

    fn mul(l: Arc<Term>, r: Arc<Term>) -> Arc<Term> {
        Term::binary(BinaryOp::Mul, l, r)
    }

    fn n(v: f64) -> Arc<Term> {
        Term::number(v)
    }

    #[test]
    fn test_codify_precedence_without_parens() {
        let e = add(mul(n(1.0), n(2.0)), mul(n(3.0), n(4.0)));
        assert_eq!(codify(&e), "1 * 2 + 3 * 4");
    }

    #[test]
    fn test_codify_precedence_with_parens() {
        let e = mul(add(n(1.0), n(2.0)), add(n(3.0), n(4.0)));
        assert_eq!(codify(&e), "(1 + 2) * (3 + 4)");
    }

    #[test]
    fn test_codify_right_associativity_parens() {
        let e = Term::binary(BinaryOp::Sub, n(1.0), Term::binary(BinaryOp::Sub, n(2.0), n(3.0)));
        assert_eq!(codify(&e), "1 - (2 - 3)");
        let e = Term::binary(BinaryOp::Sub, Term::binary(BinaryOp::Sub, n(1.0), n(2.0)), n(3.0));
        assert_eq!(codify(&e), "1 - 2 - 3");
    }

    #[test]
    fn test_codify_unary() {
        assert_eq!(codify(&Term::unary(UnaryOp::Not, Term::boolean(true))), "!true");
        assert_eq!(codify(&Term::unary(UnaryOp::Minus, n(-5.0))), "-(-5)");
        assert_eq!(
            codify(&Term::unary(UnaryOp::Minus, add(n(1.0), n(2.0)))),
            "-(1 + 2)"
        );
    }

    #[test]
    fn test_codify_conditional() {
        let test = Term::binary(BinaryOp::StrictEq, add(n(1.0), n(1.0)), n(2.0));
        let e = Term::conditional(test, add(n(5.0), n(6.0)), n(7.0));
        assert_eq!(codify(&e), "1 + 1 === 2 ? 5 + 6 : 7");

        let nested = Term::conditional(Term::boolean(true), n(1.0), n(2.0));
        let e = Term::conditional(nested, n(3.0), n(4.0));
        assert_eq!(codify(&e), "(true ? 1 : 2) ? 3 : 4");
    }

    #[test]
    fn test_codify_logical_mix() {
        let e = Term::logical(
            LogicalOp::And,
            Term::logical(LogicalOp::Or, Term::boolean(true), Term::boolean(false)),
            Term::boolean(true),
        );
        assert_eq!(codify(&e), "(true || false) && true");
    }

    #[test]
    fn test_codify_program() {
        let p = Term::program(vec![
            Term::constant("x", n(2.0)),
            Term::declaration(DeclarationKind::Let, vec![Term::declarator("y", None)]),
            Term::expression_statement(add(Term::identifier("x"), Term::string("a"))),
        ]);
        assert_eq!(codify(&p), "const x = 2;\nlet y;\nx + \"a\";");
        assert_eq!(codify(&Term::program(vec![])), "");
    }

    #[test]
    fn test_marker_by_identity() {
        let left = mul(n(1.0), n(2.0));
        let right = mul(n(1.0), n(2.0));
        let e = Term::expression_statement(add(left, right.clone()));
        let rendered = codify_with_marker(&e, &right, MarkerClass::Before);
        assert_eq!(rendered.text, "1 * 2 + 1 * 2;");
        // Structurally equal left operand must not be marked.
        assert_eq!(rendered.marker.unwrap().span, Span::new(8, 13));
        assert_eq!(rendered.marked_text(), Some("1 * 2"));
    }

    #[test]
    fn test_marker_excludes_parens() {
        let inner = add(n(1.0), n(2.0));
        let e = mul(inner.clone(), n(3.0));
        let rendered = codify_with_marker(&e, &inner, MarkerClass::After);
        assert_eq!(rendered.text, "(1 + 2) * 3");
        assert_eq!(rendered.marked_text(), Some("1 + 2"));
    }

    #[test]
    fn test_marker_missing_target() {
        let e = add(n(1.0), n(2.0));
        let stranger = n(1.0);
        let rendered = codify_with_marker(&e, &stranger, MarkerClass::Before);
        assert!(rendered.marker.is_none());
        assert_eq!(
            rendered.segments(),
            vec![Segment {
                text: "1 + 2".into(),
                class: None
            }]
        );
    }

    #[test]
    fn test_segments() {
        let target = mul(n(3.0), n(4.0));
        let e = Term::expression_statement(add(n(2.0), target.clone()));
        let rendered = codify_with_marker(&e, &target, MarkerClass::After);
        let segments = rendered.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].text, "2 + ");
        assert_eq!(segments[1].text, "3 * 4");
        assert_eq!(segments[1].class, Some(MarkerClass::After));
        assert_eq!(segments[2].text, ";");
    }

    #[test]
    fn test_segments_with_unfit_span_degrade_to_whole_text() {
        let whole = |text: &str| {
            vec![Segment {
                text: text.to_string(),
                class: None,
            }]
        };

        // Deserialised from a host with a span past the end of the text.
        let rendered: Rendered = serde_json::from_str(
            r#"{"text":"1 + 2;","marker":{"start":4,"end":40,"class":"beforeMarker"}}"#,
        )
        .unwrap();
        assert_eq!(rendered.segments(), whole("1 + 2;"));
        assert_eq!(rendered.marked_text(), None);

        // Offset 2 splits the two-byte 'é'.
        let rendered = Rendered {
            text: "\"é\";".to_string(),
            marker: Some(Marker {
                span: Span::new(0, 2),
                class: MarkerClass::After,
            }),
        };
        assert_eq!(rendered.segments(), whole("\"é\";"));

        let rendered = Rendered {
            text: "abc;".to_string(),
            marker: Some(Marker {
                span: Span::new(3, 1),
                class: MarkerClass::Before,
            }),
        };
        assert_eq!(rendered.segments(), whole("abc;"));
    }

    #[test]
    fn test_marker_json_shape() {
        let marker = Marker {
            span: Span::new(0, 5),
            class: MarkerClass::Before,
        };
        let json = serde_json::to_string(&marker).unwrap();
        assert_eq!(json, r#"{"start":0,"end":5,"class":"beforeMarker"}"#);
    }
}
