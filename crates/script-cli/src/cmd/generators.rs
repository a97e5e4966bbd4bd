use crate::output::{print_json, print_table};
use anyhow::Context;
use script_core::workspace::Workspace;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let ws = Workspace::load(root).context("failed to load workspace")?;
    if json {
        return print_json(&ws.catalog);
    }
    let specs = &ws.specs;
    let rows = ws
        .catalog
        .modules()
        .iter()
        .flat_map(|m| {
            m.generators.iter().map(move |g| {
                let key = format!("{}.{}", m.module, g);
                let custom = if specs.lookup(&key).is_some() {
                    "yes"
                } else {
                    ""
                };
                vec![
                    m.module.clone(),
                    g.clone(),
                    custom.to_string(),
                    m.description.clone(),
                ]
            })
        })
        .collect();
    print_table(&["MODULE", "FUNCTION", "CUSTOM SPECS", "DESCRIPTION"], rows);
    Ok(())
}
