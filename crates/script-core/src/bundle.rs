//! The full render pipeline and its output.
//!
//! Sectioned text looks like
//!
//! ```text
//! === run_libe.py ===
//! <script>
//!
//! === simf.py ===
//! <script>
//! ```
//!
//! with a third batch-script section when cluster mode is on.

use crate::data::{value_int, TemplateData};
use crate::error::{Result, ScriptError};
use crate::genspecs::{resolve_custom_gen_specs, GeneratorSpecs};
use crate::normalize::{AllocTable, Normalizer, MAX_DIMENSION};
use crate::objective::ensure_objective_code;
use crate::templates::{ScriptKind, TemplateSet};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFile {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptBundle {
    pub files: Vec<ScriptFile>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Render every script for one set of raw parameters.
///
/// Nothing is produced unless every step succeeds.
pub fn render_scripts(
    raw: TemplateData,
    specs: &GeneratorSpecs,
    templates: &TemplateSet,
) -> Result<ScriptBundle> {
    let data = prepare(raw, specs)?;
    Ok(render_prepared(&data, templates))
}

/// Validate, normalize and resolve everything the templates read.
pub fn prepare(mut raw: TemplateData, specs: &GeneratorSpecs) -> Result<TemplateData> {
    validate_resources(&mut raw)?;
    let alloc = AllocTable::default();
    let mut data = Normalizer::new(specs, &alloc).normalize(raw);
    resolve_custom_gen_specs(&mut data)?;
    ensure_objective_code(&mut data);
    Ok(data)
}

fn render_prepared(data: &TemplateData, templates: &TemplateSet) -> ScriptBundle {
    let mut kinds = vec![ScriptKind::Run, ScriptKind::Simf];
    if data.flag("cluster_enabled") {
        let scheduler = data.text("scheduler_type");
        kinds.push(ScriptKind::batch_for(scheduler.as_deref()));
    }
    let files = kinds
        .into_iter()
        .map(|kind| ScriptFile {
            filename: kind.filename().to_string(),
            content: templates.get(kind).render(data),
        })
        .collect();
    ScriptBundle { files }
}

/// Check resource counts and `dimension` before normalization.
///
/// For `nodes`, `procs`, `gpus` and `num_workers`: blank, `0` and
/// unparseable values mean "auto" and are removed. Negative counts are
/// rejected. Anything else is stored as an integer. A `dimension` above
/// [`MAX_DIMENSION`] is rejected.
pub fn validate_resources(data: &mut TemplateData) -> Result<()> {
    if data.int("dimension").is_some_and(|d| d > MAX_DIMENSION) {
        return Err(ScriptError::ResourceTooLarge {
            field: "dimension".to_string(),
            max: MAX_DIMENSION,
        });
    }
    for field in ["nodes", "procs", "gpus", "num_workers"] {
        let parsed = match data.get(field) {
            Some(Value::String(s)) if s.trim().is_empty() || s == "0" => None,
            Some(v) => value_int(v),
            None => None,
        };
        match parsed {
            Some(n) if n < 0 => {
                return Err(ScriptError::InvalidResource {
                    field: field.to_string(),
                })
            }
            Some(n) if n > 0 => data.set(field, n),
            _ => {
                data.unset(field);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ScriptBundle
// ---------------------------------------------------------------------------

static SECTION_RE: OnceLock<Regex> = OnceLock::new();

fn section_re() -> &'static Regex {
    SECTION_RE.get_or_init(|| Regex::new(r"(?m)^=== (.+?) ===$").unwrap())
}

impl ScriptBundle {
    pub fn get(&self, filename: &str) -> Option<&ScriptFile> {
        self.files.iter().find(|f| f.filename == filename)
    }

    pub fn filenames(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.filename.as_str()).collect()
    }

    pub fn to_sectioned_text(&self) -> String {
        self.files
            .iter()
            .map(|f| format!("=== {} ===\n{}", f.filename, f.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Split sectioned text back into files. Text before the first header
    /// is ignored; each section body is trimmed.
    pub fn parse_sections(text: &str) -> Self {
        let re = section_re();
        let headers: Vec<_> = re.captures_iter(text).collect();
        let mut files = Vec::with_capacity(headers.len());
        for (i, caps) in headers.iter().enumerate() {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let end = headers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(text.len());
            files.push(ScriptFile {
                filename: name.as_str().trim().to_string(),
                content: text[whole.end()..end].trim().to_string(),
            });
        }
        Self { files }
    }

    /// Write every file into `dir`, returning the written paths.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        crate::io::ensure_dir(dir)?;
        let mut written = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let name = Path::new(&file.filename)
                .file_name()
                .ok_or_else(|| ScriptError::InvalidFilename(file.filename.clone()))?;
            let path = dir.join(name);
            crate::io::atomic_write(&path, crate::io::script_text(&file.content).as_bytes())?;
            tracing::info!(path = %path.display(), "wrote script");
            written.push(path);
        }
        Ok(written)
    }
}
