//! Naive substitution of a bound name by a value.
//!
//! This is NOT capture-avoiding: there is no alpha-renaming and no tracking
//! of shadowing. It is sound only because the supported language has no
//! nested binding forms (no functions, no blocks). Any extension that adds
//! parameters or nested declarations must add capture avoidance first.

use smallstep_types::Term;
use std::sync::Arc;

/// Replace every `Identifier(name)` in `target` with `value`.
///
/// Declared names are never rewritten, only declarator initialisers.
/// Subtrees without an occurrence are returned as the same instance. Each
/// occurrence gets its own copy of `value`, so redex lookup by identity can
/// tell the copies apart.
pub fn substitute(name: &str, value: &Arc<Term>, target: &Arc<Term>) -> Arc<Term> {
    replace(name, value, target).unwrap_or_else(|| target.clone())
}

/// `None` when `target` contains no occurrence of `name`.
fn replace(name: &str, value: &Arc<Term>, target: &Arc<Term>) -> Option<Arc<Term>> {
    match target.as_ref() {
        Term::Identifier(id) if id == name => Some(Arc::new((**value).clone())),
        Term::Identifier(_) | Term::Literal(_) => None,
        Term::Unary { op, argument } => {
            replace(name, value, argument).map(|argument| Term::unary(*op, argument))
        }
        Term::Binary { op, left, right } => {
            let (left, right) = replace_pair(name, value, left, right)?;
            Some(Term::binary(*op, left, right))
        }
        Term::Logical { op, left, right } => {
            let (left, right) = replace_pair(name, value, left, right)?;
            Some(Term::logical(*op, left, right))
        }
        Term::Conditional {
            test,
            consequent,
            alternate,
        } => {
            let new_test = replace(name, value, test);
            let new_consequent = replace(name, value, consequent);
            let new_alternate = replace(name, value, alternate);
            if new_test.is_none() && new_consequent.is_none() && new_alternate.is_none() {
                return None;
            }
            Some(Term::conditional(
                new_test.unwrap_or_else(|| test.clone()),
                new_consequent.unwrap_or_else(|| consequent.clone()),
                new_alternate.unwrap_or_else(|| alternate.clone()),
            ))
        }
        Term::ExpressionStatement(expr) => {
            replace(name, value, expr).map(Term::expression_statement)
        }
        Term::VariableDeclaration { kind, declarations } => {
            replace_all(name, value, declarations).map(|ds| Term::declaration(*kind, ds))
        }
        Term::VariableDeclarator {
            name: declared,
            init,
        } => {
            let init = replace(name, value, init.as_ref()?)?;
            Some(Term::declarator(declared.clone(), Some(init)))
        }
        Term::Program(body) => replace_all(name, value, body).map(Term::program),
    }
}

fn replace_pair(
    name: &str,
    value: &Arc<Term>,
    left: &Arc<Term>,
    right: &Arc<Term>,
) -> Option<(Arc<Term>, Arc<Term>)> {
    match (replace(name, value, left), replace(name, value, right)) {
        (None, None) => None,
        (l, r) => Some((
            l.unwrap_or_else(|| left.clone()),
            r.unwrap_or_else(|| right.clone()),
        )),
    }
}

fn replace_all(name: &str, value: &Arc<Term>, items: &[Arc<Term>]) -> Option<Vec<Arc<Term>>> {
    let replaced: Vec<Option<Arc<Term>>> =
        items.iter().map(|item| replace(name, value, item)).collect();
    if replaced.iter().all(Option::is_none) {
        return None;
    }
    Some(
        replaced
            .into_iter()
            .zip(items)
            .map(|(new, old)| new.unwrap_or_else(|| old.clone()))
            .collect(),
    )
}
