//! Everything a render needs, loaded once from a project root.

use crate::bundle::{self, ScriptBundle};
use crate::catalog::GeneratorCatalog;
use crate::config::Config;
use crate::data::TemplateData;
use crate::error::Result;
use crate::genspecs::GeneratorSpecs;
use crate::paths;
use crate::saves::SaveStore;
use crate::templates::TemplateSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: Config,
    pub templates: TemplateSet,
    pub specs: GeneratorSpecs,
    pub catalog: GeneratorCatalog,
}

impl Workspace {
    /// Load config and resources for `root`. Paths named in the config
    /// replace the embedded defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        let templates = match &config.templates_dir {
            Some(dir) => TemplateSet::from_dir(&paths::resolve(root, dir))?,
            None => TemplateSet::embedded()?,
        };
        let specs = match &config.generator_specs {
            Some(p) => GeneratorSpecs::load(&paths::resolve(root, p))?,
            None => GeneratorSpecs::embedded()?,
        };
        let catalog = match &config.generators {
            Some(p) => GeneratorCatalog::load(&paths::resolve(root, p))?,
            None => GeneratorCatalog::embedded()?,
        };
        tracing::debug!(
            root = %root.display(),
            specs = specs.len(),
            modules = catalog.modules().len(),
            "workspace loaded"
        );
        Ok(Self {
            root: root.to_path_buf(),
            config,
            templates,
            specs,
            catalog,
        })
    }

    pub fn render(&self, raw: TemplateData) -> Result<ScriptBundle> {
        bundle::render_scripts(raw, &self.specs, &self.templates)
    }

    /// The fully prepared template data, without rendering.
    pub fn prepare(&self, raw: TemplateData) -> Result<TemplateData> {
        bundle::prepare(raw, &self.specs)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config.output_dir(&self.root)
    }

    pub fn open_saves(&self) -> Result<SaveStore> {
        SaveStore::open(&paths::saves_db_path(&self.root))
    }
}
