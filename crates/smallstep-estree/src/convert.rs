//! ESTree JSON → [`Term`] conversion.

use serde_json::Value as Json;
use smallstep_types::{
    BinaryOp, DeclarationKind, LogicalOp, Result, StepperError, Term, UnaryOp, Value,
};
use std::sync::Arc;

/// Parse ESTree JSON text and convert it.
pub fn from_str(json: &str) -> Result<Arc<Term>> {
    let node: Json =
        serde_json::from_str(json).map_err(|e| StepperError::Malformed(e.to_string()))?;
    convert(&node)
}

/// Convert one ESTree node (and its children).
pub fn convert(node: &Json) -> Result<Arc<Term>> {
    let node_type = str_field(node, "type")?;
    match node_type {
        "Program" => {
            let body = array_field(node, "body")?
                .iter()
                .map(convert_statement)
                .collect::<Result<Vec<_>>>()?;
            Ok(Term::program(body))
        }
        "ExpressionStatement" | "VariableDeclaration" => convert_statement(node),
        "VariableDeclarator" => convert_declarator(node),
        _ => convert_expression(node),
    }
}

fn convert_statement(node: &Json) -> Result<Arc<Term>> {
    match str_field(node, "type")? {
        "ExpressionStatement" => Ok(Term::expression_statement(convert_expression(
            field(node, "expression")?,
        )?)),
        "VariableDeclaration" => {
            let kind = match str_field(node, "kind")? {
                "const" => DeclarationKind::Const,
                "let" => DeclarationKind::Let,
                "var" => DeclarationKind::Var,
                other => {
                    return Err(StepperError::Unsupported(format!(
                        "declaration kind '{other}'"
                    )))
                }
            };
            let declarations = array_field(node, "declarations")?
                .iter()
                .map(convert_declarator)
                .collect::<Result<Vec<_>>>()?;
            if declarations.is_empty() {
                return Err(StepperError::Malformed(
                    "VariableDeclaration without declarators".into(),
                ));
            }
            Ok(Term::declaration(kind, declarations))
        }
        other => Err(unsupported(other)),
    }
}

fn convert_declarator(node: &Json) -> Result<Arc<Term>> {
    let node_type = str_field(node, "type")?;
    if node_type != "VariableDeclarator" {
        return Err(StepperError::Malformed(format!(
            "expected VariableDeclarator, found {node_type}"
        )));
    }
    let id = field(node, "id")?;
    let id_type = str_field(id, "type")?;
    if id_type != "Identifier" {
        return Err(StepperError::Unsupported(format!("{id_type} binding")));
    }
    let name = str_field(id, "name")?;
    let init = match node.get("init") {
        None | Some(Json::Null) => None,
        Some(init) => Some(convert_expression(init)?),
    };
    Ok(Term::declarator(name, init))
}

fn convert_expression(node: &Json) -> Result<Arc<Term>> {
    match str_field(node, "type")? {
        "Literal" => convert_literal(node),
        "Identifier" => {
            let name = str_field(node, "name")?;
            if name == "undefined" {
                Ok(Term::undefined())
            } else {
                Ok(Term::identifier(name))
            }
        }
        "UnaryExpression" => {
            let op = match str_field(node, "operator")? {
                "!" => UnaryOp::Not,
                "-" => UnaryOp::Minus,
                other => {
                    return Err(StepperError::Unsupported(format!(
                        "unary operator '{other}'"
                    )))
                }
            };
            Ok(Term::unary(op, convert_expression(field(node, "argument")?)?))
        }
        "BinaryExpression" => {
            let symbol = str_field(node, "operator")?;
            let op = BinaryOp::from_symbol(symbol).ok_or_else(|| {
                StepperError::Unsupported(format!("binary operator '{symbol}'"))
            })?;
            Ok(Term::binary(
                op,
                convert_expression(field(node, "left")?)?,
                convert_expression(field(node, "right")?)?,
            ))
        }
        "LogicalExpression" => {
            let op = match str_field(node, "operator")? {
                "&&" => LogicalOp::And,
                "||" => LogicalOp::Or,
                other => {
                    return Err(StepperError::Unsupported(format!(
                        "logical operator '{other}'"
                    )))
                }
            };
            Ok(Term::logical(
                op,
                convert_expression(field(node, "left")?)?,
                convert_expression(field(node, "right")?)?,
            ))
        }
        "ConditionalExpression" => Ok(Term::conditional(
            convert_expression(field(node, "test")?)?,
            convert_expression(field(node, "consequent")?)?,
            convert_expression(field(node, "alternate")?)?,
        )),
        other => Err(unsupported(other)),
    }
}

fn convert_literal(node: &Json) -> Result<Arc<Term>> {
    if node.get("regex").is_some() {
        return Err(StepperError::Unsupported("regular expression literal".into()));
    }
    if node.get("bigint").is_some() {
        return Err(StepperError::Unsupported("bigint literal".into()));
    }
    let value = match field(node, "value")? {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::String(s) => Value::String(s.clone()),
        Json::Number(n) => Value::Number(n.as_f64().ok_or_else(|| {
            StepperError::Malformed(format!("number literal {n} is not representable"))
        })?),
        other => {
            return Err(StepperError::Malformed(format!(
                "literal value must be a primitive, found {other}"
            )))
        }
    };
    Ok(Term::literal(value))
}

// ── Field helpers ─────────────────────────────────────────────────────────────

fn unsupported(node_type: &str) -> StepperError {
    tracing::debug!(node_type, "rejecting unsupported node");
    StepperError::Unsupported(format!("node type '{node_type}'"))
}

fn field<'a>(node: &'a Json, name: &str) -> Result<&'a Json> {
    node.get(name)
        .ok_or_else(|| StepperError::Malformed(format!("missing field '{name}'")))
}

fn str_field<'a>(node: &'a Json, name: &str) -> Result<&'a str> {
    field(node, name)?
        .as_str()
        .ok_or_else(|| StepperError::Malformed(format!("field '{name}' must be a string")))
}

fn array_field<'a>(node: &'a Json, name: &str) -> Result<&'a Vec<Json>> {
    field(node, name)?
        .as_array()
        .ok_or_else(|| StepperError::Malformed(format!("field '{name}' must be an array")))
}
