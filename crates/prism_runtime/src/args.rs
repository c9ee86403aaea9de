//! Argument coercion.
//!
//! Hosts hand block arguments over as loosely typed JSON scalars: a NUMBER
//! argument typed into a text field arrives as a string, a reporter dropped
//! into a STRING slot may deliver a number. Every handler reads its arguments
//! through [`BlockArgs`], which applies one rule per kind:
//!
//! - **string**: strings pass through, numbers are formatted the way the
//!   block runtime prints them (`1` not `1.0`), booleans become `"true"` /
//!   `"false"`, a missing argument or `null` becomes `""`.
//! - **number**: numbers pass through, strings are parsed after trimming
//!   (an all-whitespace string is `0`, `Infinity` is accepted, anything else
//!   unparsable is *not a number*), booleans are `1`/`0`, `null` is `0`.
//!   Not-a-number is reported as `None` so each handler picks its documented
//!   default instead of propagating `NaN`.

use serde_json::{Map, Value};

/// The raw argument record of one block invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockArgs(Map<String, Value>);

impl BlockArgs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Argument coerced with the string rule
    pub fn string(&self, name: &str) -> String {
        self.get(name).map(to_text).unwrap_or_default()
    }

    /// Argument coerced with the number rule, `None` when it is not a number
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(to_number)
    }

    /// Argument coerced with the number rule, `default` when it is not a number
    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.number(name).unwrap_or(default)
    }
}

impl From<Map<String, Value>> for BlockArgs {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for BlockArgs {
    type Error = crate::PrismError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(crate::PrismError::InvalidArgument {
                name: "args".into(),
                reason: format!("expected an object, got {other}"),
            }),
        }
    }
}

/// Number rule
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Number rule for text
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }

    // f64::from_str also takes "inf", "nan" and friends, which are not numbers here
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// String rule
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), format_number),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Formats a number without a trailing `.0` for integral values
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n == 0.0 {
        "0".into()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.into()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// JSON value for a number result; non-finite numbers have no JSON form and become `null`
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}
