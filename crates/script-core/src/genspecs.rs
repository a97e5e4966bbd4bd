//! Generator-specific `gen_specs` overrides.
//!
//! The lookup table maps `"module.function"` to either literal argument text
//! or a structured object that is pretty-printed into Python keyword
//! arguments. The chosen override may itself contain `{{placeholders}}`; they
//! are resolved against the normalized data in a second render pass.

use crate::assets;
use crate::data::TemplateData;
use crate::error::{Result, ScriptError};
use crate::normalize::CUSTOM_SPEC_KEY;
use crate::template::Template;
use serde_json::{Map, Value};
use std::path::Path;

const ARG_INDENT: &str = "        ";

#[derive(Debug, Clone, Default)]
pub struct GeneratorSpecs {
    entries: Vec<(String, Value)>,
}

impl GeneratorSpecs {
    /// Build from a JSON object. Non-object input yields an empty table.
    pub fn from_value(value: Value) -> Self {
        let entries = match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| (k.trim().to_lowercase(), v))
                .collect(),
            _ => Vec::new(),
        };
        Self { entries }
    }

    /// The built-in table shipped with the binary.
    pub fn embedded() -> Result<Self> {
        let text = assets::text(assets::GENERATOR_SPECS_JSON).ok_or_else(|| {
            ScriptError::AssetMissing(assets::GENERATOR_SPECS_JSON.to_string())
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(Self::from_value(serde_json::from_str(text)?))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Case-insensitive, trimmed key match. The first matching entry wins.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        let key = key.trim().to_lowercase();
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Secondary render pass
// ---------------------------------------------------------------------------

/// Turn the stashed override into `custom_gen_specs`.
///
/// The override is rendered against `data` but never merged into it: the only
/// key written is `custom_gen_specs`, replacing any caller-supplied value.
/// Nothing happens when no override matched.
pub fn resolve_custom_gen_specs(data: &mut TemplateData) -> Result<()> {
    let text = match data.get(CUSTOM_SPEC_KEY) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(obj)) => pretty_print_args(obj),
        _ => return Ok(()),
    };
    if text.trim().is_empty() {
        data.set_null("custom_gen_specs");
        return Ok(());
    }
    let rendered = Template::parse("custom_gen_specs", &text)?.render(data);
    data.set("custom_gen_specs", rendered);
    Ok(())
}

// ---------------------------------------------------------------------------
// Pretty-printer
// ---------------------------------------------------------------------------

/// Render an argument object as Python keyword arguments, one `key=value,`
/// per line in insertion order.
pub fn pretty_print_args(args: &Map<String, Value>) -> String {
    args.iter()
        .map(|(k, v)| format!("{ARG_INDENT}{k}={},", python_literal(v)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => python_string(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", python_string(k), python_literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

fn python_string(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}
