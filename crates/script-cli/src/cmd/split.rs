use super::params::read_input;
use crate::output::print_json;
use anyhow::{bail, Context};
use script_core::bundle::ScriptBundle;
use script_core::workspace::Workspace;
use std::path::Path;

/// Write each `=== name ===` section of `file` to its own file.
pub fn run(root: &Path, file: &Path, out: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let text = read_input(file)?;
    let bundle = ScriptBundle::parse_sections(&text);
    if bundle.files.is_empty() {
        bail!("no '=== filename ===' sections found in {}", file.display());
    }

    let dir = match out {
        Some(p) => p.to_path_buf(),
        None => Workspace::load(root)
            .context("failed to load workspace")?
            .output_dir(),
    };
    let written = bundle.write_to(&dir)?;

    if json {
        print_json(&serde_json::json!({ "files": written }))?;
    } else {
        for path in &written {
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}
