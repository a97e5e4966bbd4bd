use crate::output::print_json;
use script_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    io::ensure_dir(&paths::project_dir(root))?;
    let config_path = paths::config_path(root);
    let data = serde_yaml::to_string(&Config::default())?;
    let created = io::write_if_missing(&config_path, data.as_bytes())?;

    if json {
        print_json(&serde_json::json!({
            "root": root,
            "config": config_path,
            "created": created,
        }))?;
    } else if created {
        println!("Initialized script-creator in {}", root.display());
    } else {
        println!("Already initialized: {}", config_path.display());
    }
    Ok(())
}
