//! Dynamic code evaluation.
//!
//! Handlers only see the [`Evaluator`] trait: source text in, JSON value or
//! error description out. [`DenoEvaluator`] backs it with a bare V8 isolate
//! (no filesystem, network or process ops), so evaluated code can compute but
//! not reach outside the sandbox.
//!
//! Code runs through a global (indirect) `eval`, so `var` and function
//! declarations land on `globalThis` and stay visible to later calls.
//! Completion values are turned into JSON inside the isolate: anything
//! `JSON.stringify` refuses (functions, symbols, bigints, cyclic objects) is
//! reported by its `String(value)` form instead.

use std::cell::RefCell;

use deno_core::{JsRuntime, RuntimeOptions};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::{PrismError, Result};

const COMPLETION_SLOT: &str = "__prismCompletion";

/// Executes fragments of code
pub trait Evaluator {
    /// Runs `source` for its side effects only.
    ///
    /// # Errors
    ///
    /// Returns [`PrismError::Evaluation`] with the error description when the code throws
    fn execute(&self, source: &str) -> Result<()>;

    /// Runs `source` and reports its completion value.
    ///
    /// # Errors
    ///
    /// Returns [`PrismError::Evaluation`] with the error description when the code throws
    fn evaluate(&self, source: &str) -> Result<Value>;
}

/// Evaluator running code in a persistent V8 isolate.
///
/// Globals defined by one evaluation are visible to the next, like a page-level `eval`.
/// The isolate is created on first use and is bound to the creating thread.
#[derive(Default)]
pub struct DenoEvaluator {
    runtime: RefCell<Option<JsRuntime>>,
}

impl std::fmt::Debug for DenoEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenoEvaluator")
            .field("initialized", &self.runtime.borrow().is_some())
            .finish()
    }
}

impl DenoEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    fn run_script(&self, name: &'static str, script: String) -> Result<String> {
        let mut slot = self.runtime.borrow_mut();
        let runtime = slot.get_or_insert_with(|| {
            debug!("Creating evaluation isolate");
            JsRuntime::new(RuntimeOptions::default())
        });

        let global = runtime
            .execute_script(name, script)
            .map_err(|e| PrismError::Evaluation(e.to_string()))?;

        deno_core::scope!(scope, runtime);
        let local = deno_core::v8::Local::new(scope, global);
        let text = local
            .to_string(scope)
            .ok_or_else(|| PrismError::Evaluation("Completion value has no text form".into()))?;
        Ok(text.to_rust_string_lossy(scope))
    }
}

/// Wraps `source` in a global `eval` call
fn global_eval(source: &str) -> Result<String> {
    let literal = serde_json::to_string(source)
        .map_err(|e| PrismError::Evaluation(format!("Failed to quote source: {e}")))?;
    Ok(format!("(0, eval)({literal})"))
}

/// Reads and clears the completion slot, always producing a JSON document
fn completion_to_json() -> String {
    format!(
        r#"(() => {{
    const value = globalThis.{COMPLETION_SLOT};
    delete globalThis.{COMPLETION_SLOT};
    if (value === undefined) return "null";
    try {{
        const json = JSON.stringify(value);
        if (json !== undefined) return json;
    }} catch {{}}
    try {{
        return JSON.stringify(String(value));
    }} catch {{
        return JSON.stringify(Object.prototype.toString.call(value));
    }}
}})()"#
    )
}

impl Evaluator for DenoEvaluator {
    #[instrument(skip_all, fields(code_length = source.len()))]
    fn execute(&self, source: &str) -> Result<()> {
        self.run_script("<eval>", format!("void {};", global_eval(source)?))?;
        Ok(())
    }

    #[instrument(skip_all, fields(code_length = source.len()))]
    fn evaluate(&self, source: &str) -> Result<Value> {
        self.run_script(
            "<eval>",
            format!("globalThis.{COMPLETION_SLOT} = {}; undefined;", global_eval(source)?),
        )?;
        let json = self.run_script("<completion>", completion_to_json())?;

        Ok(serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!(error = %e, "Completion value is not JSON, keeping its text");
            Value::String(json)
        }))
    }
}

/// Value-returning interpretation: strings holding JSON are parsed, anything else is returned as is
pub fn unwrap_json(value: Value) -> Value {
    match value {
        Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        other => other,
    }
}

/// Predicate interpretation: loose equality with `true`
pub fn loosely_true(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => crate::args::parse_number(s) == Some(1.0),
        Value::Array(items) if items.len() == 1 => match &items[0] {
            Value::Array(_) | Value::Object(_) => false,
            item => crate::args::parse_number(&crate::args::to_text(item)) == Some(1.0),
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_json() {
        assert_eq!(unwrap_json(json!("{\"a\":1}")), json!({ "a": 1 }));
        assert_eq!(unwrap_json(json!("42")), json!(42));
        assert_eq!(unwrap_json(json!("hello")), json!("hello"));
        assert_eq!(unwrap_json(json!(3.5)), json!(3.5));
        assert_eq!(unwrap_json(json!([1, "2"])), json!([1, "2"]));
    }

    #[test]
    fn test_loosely_true() {
        assert!(loosely_true(&json!(true)));
        assert!(loosely_true(&json!(1)));
        assert!(loosely_true(&json!("1")));
        assert!(loosely_true(&json!(" 1.0 ")));
        assert!(loosely_true(&json!([1])));

        assert!(!loosely_true(&json!(false)));
        assert!(!loosely_true(&json!(2)));
        assert!(!loosely_true(&json!("true")));
        assert!(!loosely_true(&json!("")));
        assert!(!loosely_true(&json!(null)));
        assert!(!loosely_true(&json!({ "a": 1 })));
    }
}
