use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Project settings from `.script-creator/config.yaml`. Every field is
/// optional; relative paths are taken from the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory whose `*.mustache` files replace the built-in templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,

    /// JSON file of generator-specific `gen_specs` overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_specs: Option<PathBuf>,

    /// JSON generator catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generators: Option<PathBuf>,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_OUTPUT_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: None,
            generator_specs: None,
            generators: None,
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Load the project config. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn output_dir(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.output_dir)
    }

    /// Referenced paths that do not exist on disk.
    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut check = |field: &str, path: &Option<PathBuf>, want_dir: bool| {
            let Some(p) = path else { return };
            let resolved = paths::resolve(root, p);
            let ok = if want_dir {
                resolved.is_dir()
            } else {
                resolved.is_file()
            };
            if !ok {
                let kind = if want_dir { "directory" } else { "file" };
                warnings.push(ConfigWarning {
                    field: field.to_string(),
                    message: format!("{kind} not found: {}", resolved.display()),
                });
            }
        };
        check("templates_dir", &self.templates_dir, true);
        check("generator_specs", &self.generator_specs, false);
        check("generators", &self.generators, false);
        warnings
    }
}
