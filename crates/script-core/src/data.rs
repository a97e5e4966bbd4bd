//! The flat key/value map handed to the template renderer.
//!
//! A key that is *absent* and a key that holds `null` are different states:
//! the renderer falls through to outer contexts for absent keys but stops at a
//! `null`. [`TemplateData::slot`] exposes the three states explicitly and
//! [`TemplateData::unset`] is the only way to produce an absent key.

use crate::error::{Result, ScriptError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// Lookup result that keeps "missing" apart from "present but null".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    Absent,
    Null,
    Present(&'a Value),
}

impl<'a> Slot<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }

    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Slot::Present(v) => Some(v),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TemplateData
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateData(Map<String, Value>);

impl TemplateData {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON value. Only objects are accepted; `null` is treated as an
    /// empty parameter set so tool calls without arguments still render.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(ScriptError::NotAnObject(kind_of(&other).to_string())),
        }
    }

    pub fn slot(&self, key: &str) -> Slot<'_> {
        match self.0.get(key) {
            None => Slot::Absent,
            Some(Value::Null) => Slot::Null,
            Some(v) => Slot::Present(v),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn set_null(&mut self, key: &str) {
        self.0.insert(key.to_string(), Value::Null);
    }

    /// Set `key` to `Some(v)` or to `null`.
    pub fn set_opt(&mut self, key: &str, value: Option<impl Into<Value>>) {
        match value {
            Some(v) => self.set(key, v),
            None => self.set_null(key),
        }
    }

    /// Remove `key` entirely so section tags see it as missing.
    pub fn unset(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Non-blank text for `key`. Numbers are stringified; everything else,
    /// including whitespace-only strings, is `None`.
    pub fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(value_text)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).map(value_flag).unwrap_or(false)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(value_int)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for TemplateData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ---------------------------------------------------------------------------
// Coercions
// ---------------------------------------------------------------------------

/// Form-style boolean: checkbox values arrive as `"on"`, tool calls send JSON
/// booleans, saved entries sometimes hold `"true"`/`"false"` strings.
pub fn value_flag(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            !matches!(s.as_str(), "" | "false" | "0" | "off" | "no")
        }
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Integer with `parseInt` semantics for text: leading whitespace, optional
/// sign, then as many digits as are present (`"12abc"` is 12, `"3.7"` is 3).
pub fn value_int(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

pub fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let n: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -n } else { n })
}

pub fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
