use super::params::ParamArgs;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use script_core::{paths, saves::SaveStore};
use std::path::Path;

#[derive(Subcommand)]
pub enum SavesSubcommand {
    /// Save a parameter set under a name (replaces an existing one)
    Put {
        name: String,
        #[command(flatten)]
        params: ParamArgs,
    },

    /// List saved parameter sets
    List,

    /// Print a saved parameter set
    Show { name: String },

    /// Delete a saved parameter set
    Delete { name: String },
}

pub fn run(root: &Path, subcmd: SavesSubcommand, json: bool) -> anyhow::Result<()> {
    let store = SaveStore::open(&paths::saves_db_path(root)).context("failed to open save store")?;
    match subcmd {
        SavesSubcommand::Put { name, params } => {
            let entry = store.put(&name, params.load()?.into_value())?;
            if json {
                print_json(&entry)?;
            } else {
                println!("Saved '{}'", entry.name);
            }
        }
        SavesSubcommand::List => {
            let list = store.list()?;
            if json {
                print_json(&list)?;
            } else if list.is_empty() {
                println!("No saved parameter sets.");
            } else {
                let rows = list
                    .into_iter()
                    .map(|s| vec![s.name, s.saved_at.format("%Y-%m-%d %H:%M:%S").to_string()])
                    .collect();
                print_table(&["NAME", "SAVED"], rows);
            }
        }
        SavesSubcommand::Show { name } => {
            let entry = store.get(&name)?;
            if json {
                print_json(&entry)?;
            } else {
                print_json(&entry.values)?;
            }
        }
        SavesSubcommand::Delete { name } => {
            store.delete(&name)?;
            if json {
                print_json(&serde_json::json!({ "deleted": name }))?;
            } else {
                println!("Deleted '{name}'");
            }
        }
    }
    Ok(())
}
