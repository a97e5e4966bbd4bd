//! Generator catalog: the generator functions offered per module.

use crate::assets;
use crate::error::{Result, ScriptError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorModule {
    pub module: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub generators: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratorCatalog {
    modules: Vec<GeneratorModule>,
}

#[derive(Deserialize)]
struct ModuleEntry {
    #[serde(default)]
    description: String,
    #[serde(default)]
    generators: Vec<String>,
}

impl GeneratorCatalog {
    pub fn embedded() -> Result<Self> {
        let text = assets::text(assets::GENERATORS_JSON)
            .ok_or_else(|| ScriptError::AssetMissing(assets::GENERATORS_JSON.to_string()))?;
        Self::from_json(&text)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse `{ module: { description, generators: [...] } }`, keeping file order.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ScriptError::NotAnObject(
                    crate::data::kind_of(&other).to_string(),
                ))
            }
        };
        let mut modules = Vec::with_capacity(map.len());
        for (module, entry) in map {
            let entry: ModuleEntry = serde_json::from_value(entry)?;
            modules.push(GeneratorModule {
                module,
                description: entry.description,
                generators: entry.generators,
            });
        }
        Ok(Self { modules })
    }

    pub fn modules(&self) -> &[GeneratorModule] {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&GeneratorModule> {
        self.modules.iter().find(|m| m.module == name)
    }

    /// Whether `module.function` is a known pairing.
    pub fn contains(&self, module: &str, function: &str) -> bool {
        self.module(module)
            .is_some_and(|m| m.generators.iter().any(|g| g == function))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_lists_default_generators() {
        let catalog = GeneratorCatalog::embedded().unwrap();
        assert_eq!(catalog.modules()[0].module, "persistent_sampling");
        assert!(catalog.contains("persistent_aposmm", "aposmm"));
        assert!(catalog.contains("persistent_gpCAM", "persistent_gpCAM_covar"));
        assert!(!catalog.contains("persistent_aposmm", "persistent_uniform"));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let catalog = GeneratorCatalog::from_json(r#"{"mine": {}}"#).unwrap();
        let m = catalog.module("mine").unwrap();
        assert!(m.description.is_empty());
        assert!(m.generators.is_empty());
    }

    #[test]
    fn non_object_is_rejected() {
        let err = GeneratorCatalog::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, ScriptError::NotAnObject(_)));
    }

    #[test]
    fn serializes_as_module_list() {
        let catalog = GeneratorCatalog::from_json(
            r#"{"persistent_sampling": {"description": "d", "generators": ["persistent_uniform"]}}"#,
        )
        .unwrap();
        let v = serde_json::to_value(&catalog).unwrap();
        assert_eq!(v[0]["module"], "persistent_sampling");
        assert_eq!(v[0]["generators"][0], "persistent_uniform");
    }
}
