//! smallstep stepper as a WASM module for browser environments.
//!
//! This crate exposes the stepping pipeline via `wasm-bindgen`. The host
//! parses source text with its own ESTree parser and hands the tree over as
//! JSON; results come back as JSON strings.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { get_evaluation_steps } from 'smallstep-wasm';
//! import { parse } from 'acorn';
//!
//! await init();
//!
//! const tree = parse("1 * 2 + 3 * 4;", { ecmaVersion: 2020 });
//! const result = JSON.parse(get_evaluation_steps(JSON.stringify(tree), "{}"));
//! // { success: true, steps: [{ code, markers, explanation }, ...],
//! //   outcome: { kind: "value", value: { type: "number", value: 14.0 } }, error: null }
//! ```

use serde::Serialize;
use smallstep_eval::{Outcome, StepView, Stepper, StepperOptions, Trace};
use smallstep_types::StepperError;
use wasm_bindgen::prelude::*;

/// Structured error for the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub kind: &'static str,
    pub message: String,
}

impl From<StepperError> for ErrorInfo {
    fn from(err: StepperError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Everything `get_evaluation_steps` reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub success: bool,
    pub steps: Vec<StepView>,
    pub outcome: Option<Outcome>,
    pub error: Option<ErrorInfo>,
}

impl EvaluationResult {
    fn failure(err: StepperError) -> Self {
        Self {
            success: false,
            steps: Vec::new(),
            outcome: None,
            error: Some(err.into()),
        }
    }
}

/// Parse `options_json`; an empty string means defaults.
fn parse_options(options_json: &str) -> Result<StepperOptions, StepperError> {
    if options_json.trim().is_empty() {
        return Ok(StepperOptions::default());
    }
    serde_json::from_str(options_json)
        .map_err(|e| StepperError::Malformed(format!("options: {e}")))
}

fn trace(estree_json: &str, options_json: &str) -> Result<Trace, StepperError> {
    let options = parse_options(options_json)?;
    let term = smallstep_estree::from_str(estree_json)?;
    Stepper::with_options(options).run(term)
}

impl From<Result<Trace, StepperError>> for EvaluationResult {
    fn from(result: Result<Trace, StepperError>) -> Self {
        match result {
            Ok(trace) => Self {
                success: true,
                steps: trace.views(),
                outcome: Some(trace.outcome),
                error: None,
            },
            Err(err) => Self::failure(err),
        }
    }
}

/// Run the stepper and collect the host-facing result.
pub fn evaluate_to_result(estree_json: &str, options_json: &str) -> EvaluationResult {
    trace(estree_json, options_json).into()
}

/// Step an ESTree program to normal form.
///
/// Returns a JSON string containing an `EvaluationResult`:
/// ```json
/// {
///   "success": true,
///   "steps": [{ "code": "1 + 2;", "markers": [{ "start": 0, "end": 5, "class": "beforeMarker" }],
///               "explanation": "Binary expression 1 + 2 evaluated" }, ...],
///   "outcome": { "kind": "value", "value": { "type": "number", "value": 3.0 } },
///   "error": null
/// }
/// ```
///
/// On failure, `success` is `false`, `steps` is empty, and `error` holds
/// `{ kind, message }`.
#[wasm_bindgen]
pub fn get_evaluation_steps(estree_json: &str, options_json: &str) -> String {
    let result = evaluate_to_result(estree_json, options_json);
    serde_json::to_string(&result).unwrap_or_else(|e| serialization_failure(&e.to_string()))
}

/// Hand-built failure JSON for when the result itself cannot be serialised.
fn serialization_failure(message: &str) -> String {
    let message = serde_json::Value::String(format!("Serialization error: {message}"));
    format!(
        r#"{{"success":false,"steps":[],"outcome":null,"error":{{"kind":"serialization","message":{message}}}}}"#
    )
}

/// Like [`get_evaluation_steps`], but takes the parsed tree and options as
/// JavaScript objects and returns a JavaScript object, skipping the JSON
/// round trip. `options` may be `undefined`.
#[wasm_bindgen]
pub fn evaluation_steps(tree: JsValue, options: JsValue) -> Result<JsValue, JsValue> {
    let options: StepperOptions = if options.is_undefined() || options.is_null() {
        StepperOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)?
    };
    let tree: serde_json::Value = serde_wasm_bindgen::from_value(tree)?;
    let result: EvaluationResult = smallstep_estree::convert(&tree)
        .and_then(|term| Stepper::with_options(options).run(term))
        .into();
    Ok(serde_wasm_bindgen::to_value(&result)?)
}

/// Count the reductions a program takes (bounded by the step limit).
///
/// Returns `-1` if the tree is rejected or a precondition fails.
#[wasm_bindgen]
pub fn step_count(estree_json: &str, options_json: &str) -> i32 {
    match trace(estree_json, options_json) {
        Ok(trace) => i32::try_from(trace.reductions()).unwrap_or(i32::MAX),
        Err(_) => -1,
    }
}

/// Return the stepper version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
