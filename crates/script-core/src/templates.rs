//! The fixed set of script templates.
//!
//! Templates are embedded in the binary; a `templates_dir` in the config
//! overrides any of them file-by-file.

use crate::assets;
use crate::error::{Result, ScriptError};
use crate::template::Template;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    Run,
    Simf,
    BatchSlurm,
    BatchPbs,
}

impl ScriptKind {
    pub const ALL: [ScriptKind; 4] = [
        ScriptKind::Run,
        ScriptKind::Simf,
        ScriptKind::BatchSlurm,
        ScriptKind::BatchPbs,
    ];

    /// Name of the generated file.
    pub fn filename(&self) -> &'static str {
        match self {
            ScriptKind::Run => "run_libe.py",
            ScriptKind::Simf => "simf.py",
            ScriptKind::BatchSlurm => "submit_slurm.sh",
            ScriptKind::BatchPbs => "submit_pbs.sh",
        }
    }

    pub fn template_file(&self) -> String {
        format!("{}.mustache", self.filename())
    }

    /// Batch script for a scheduler name. Unset means slurm.
    pub fn batch_for(scheduler: Option<&str>) -> Self {
        match scheduler.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "pbs" => ScriptKind::BatchPbs,
            Some(s) if s.is_empty() || s == "slurm" => ScriptKind::BatchSlurm,
            None => ScriptKind::BatchSlurm,
            Some(_) => ScriptKind::BatchPbs,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TemplateSet {
    run: Template,
    simf: Template,
    batch_slurm: Template,
    batch_pbs: Template,
}

impl TemplateSet {
    pub fn embedded() -> Result<Self> {
        Self::build(|_| Ok(None))
    }

    /// Load templates from `dir`, falling back to the embedded copy for any
    /// file that is not present there.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Self::build(|kind| {
            let path = dir.join(kind.template_file());
            if path.is_file() {
                tracing::debug!(path = %path.display(), "using template override");
                Ok(Some(std::fs::read_to_string(&path)?))
            } else {
                Ok(None)
            }
        })
    }

    fn build(mut source_for: impl FnMut(ScriptKind) -> Result<Option<String>>) -> Result<Self> {
        let mut load = |kind: ScriptKind| -> Result<Template> {
            let file = kind.template_file();
            let source = match source_for(kind)? {
                Some(s) => s,
                None => assets::text(&format!("templates/{file}"))
                    .ok_or_else(|| ScriptError::TemplateNotFound(file.clone()))?,
            };
            Template::parse(&file, &source)
        };
        Ok(Self {
            run: load(ScriptKind::Run)?,
            simf: load(ScriptKind::Simf)?,
            batch_slurm: load(ScriptKind::BatchSlurm)?,
            batch_pbs: load(ScriptKind::BatchPbs)?,
        })
    }

    pub fn get(&self, kind: ScriptKind) -> &Template {
        match kind {
            ScriptKind::Run => &self.run,
            ScriptKind::Simf => &self.simf,
            ScriptKind::BatchSlurm => &self.batch_slurm,
            ScriptKind::BatchPbs => &self.batch_pbs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TemplateData;
    use tempfile::TempDir;

    #[test]
    fn embedded_templates_parse() {
        let set = TemplateSet::embedded().unwrap();
        for kind in ScriptKind::ALL {
            assert_eq!(set.get(kind).name(), kind.template_file());
        }
    }

    #[test]
    fn directory_overrides_single_template() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("simf.py.mustache"), "# sim for {{app_ref}}\n").unwrap();
        let set = TemplateSet::from_dir(dir.path()).unwrap();

        let mut data = TemplateData::new();
        data.set("app_ref", "warpx");
        assert_eq!(set.get(ScriptKind::Simf).render(&data), "# sim for warpx\n");
        assert!(set
            .get(ScriptKind::Run)
            .render(&data)
            .contains("from simf import run_warpx"));
    }

    #[test]
    fn broken_override_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("run_libe.py.mustache"), "{{#open}}\n").unwrap();
        let err = TemplateSet::from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("run_libe.py.mustache"));
    }

    #[test]
    fn batch_kind_follows_scheduler() {
        assert_eq!(ScriptKind::batch_for(Some("slurm")), ScriptKind::BatchSlurm);
        assert_eq!(ScriptKind::batch_for(Some("PBS")), ScriptKind::BatchPbs);
        assert_eq!(ScriptKind::batch_for(None), ScriptKind::BatchSlurm);
    }
}
