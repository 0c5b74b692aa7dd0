//! Browser-side checks for the JavaScript-object entry point.
//!
//! Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn tree() -> JsValue {
    let json = serde_json::json!({
        "type": "Program",
        "body": [{
            "type": "ExpressionStatement",
            "expression": {
                "type": "BinaryExpression", "operator": "*",
                "left": {"type": "Literal", "value": 6},
                "right": {"type": "Literal", "value": 7}
            }
        }]
    });
    serde_wasm_bindgen::to_value(&json).unwrap()
}

#[wasm_bindgen_test]
fn evaluation_steps_returns_object() {
    let result = smallstep_wasm::evaluation_steps(tree(), JsValue::UNDEFINED).unwrap();
    let result: serde_json::Value = serde_wasm_bindgen::from_value(result).unwrap();
    assert_eq!(result["success"], true);
    assert_eq!(result["steps"][1]["code"], "42;");
}

#[wasm_bindgen_test]
fn version_is_exported() {
    assert!(!smallstep_wasm::version().is_empty());
}
