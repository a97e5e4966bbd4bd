use super::params::ParamArgs;
use crate::output::print_json;
use anyhow::Context;
use script_core::workspace::Workspace;
use std::path::Path;

pub fn run(
    root: &Path,
    params: &ParamArgs,
    out: Option<&Path>,
    stdout: bool,
    json: bool,
) -> anyhow::Result<()> {
    let ws = Workspace::load(root).context("failed to load workspace")?;
    let raw = params.load()?;
    let bundle = ws.render(raw)?;

    if stdout {
        if json {
            print_json(&bundle)?;
        } else {
            println!("{}", bundle.to_sectioned_text());
        }
        return Ok(());
    }

    let dir = match out {
        Some(p) => p.to_path_buf(),
        None => ws.output_dir(),
    };
    let written = bundle
        .write_to(&dir)
        .with_context(|| format!("failed to write scripts to {}", dir.display()))?;

    if json {
        print_json(&serde_json::json!({
            "output_dir": dir,
            "files": written,
        }))?;
    } else {
        for path in &written {
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

/// Print the fully prepared template data. Always JSON.
pub fn normalize(root: &Path, params: &ParamArgs) -> anyhow::Result<()> {
    let ws = Workspace::load(root).context("failed to load workspace")?;
    let data = ws.prepare(params.load()?)?;
    print_json(&data)
}
