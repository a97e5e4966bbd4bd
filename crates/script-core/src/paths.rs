use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const PROJECT_DIR: &str = ".script-creator";
pub const CONFIG_FILE: &str = ".script-creator/config.yaml";
pub const SAVES_DB: &str = ".script-creator/saves.redb";

pub const DEFAULT_OUTPUT_DIR: &str = "generated_scripts";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn project_dir(root: &Path) -> PathBuf {
    root.join(PROJECT_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn saves_db_path(root: &Path) -> PathBuf {
    root.join(SAVES_DB)
}

/// Resolve a config-relative path: absolute paths pass through, relative
/// ones are taken from the project root.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
