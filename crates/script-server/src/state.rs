use script_core::saves::SaveStore;
use script_core::workspace::Workspace;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
///
/// The workspace is loaded once at startup; edits to config or templates
/// take effect on restart.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub workspace: Arc<Workspace>,
    pub saves: Arc<SaveStore>,
}

impl AppState {
    pub fn load(root: PathBuf) -> anyhow::Result<Self> {
        let workspace = Workspace::load(&root)?;
        let saves = workspace.open_saves()?;
        Ok(Self {
            root,
            workspace: Arc::new(workspace),
            saves: Arc::new(saves),
        })
    }
}
