//! Named snapshots of raw form values, kept in a redb database.
//!
//! One `SAVES` table keyed by the UTF-8 save name; values are the
//! JSON-encoded [`SavedEntry`]. Only the raw values are stored, never the
//! normalized data, so a restored snapshot goes through the normal pipeline.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ScriptError};

const SAVES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("saves");

const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEntry {
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub values: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSummary {
    pub name: String,
    pub saved_at: DateTime<Utc>,
}

/// 1-64 characters, no path separators or NUL, no surrounding whitespace.
pub fn validate_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    let bad_char = name.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
    if len == 0 || len > MAX_NAME_LEN || bad_char || name.trim() != name {
        return Err(ScriptError::InvalidSaveName(name.to_string()));
    }
    Ok(())
}

fn db_err(e: impl std::fmt::Display) -> ScriptError {
    ScriptError::SaveStore(e.to_string())
}

pub struct SaveStore {
    db: Database,
}

impl SaveStore {
    /// Open or create the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(SAVES).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }

    /// Store `values` under `name`, replacing any earlier snapshot.
    pub fn put(&self, name: &str, values: Value) -> Result<SavedEntry> {
        validate_name(name)?;
        let entry = SavedEntry {
            name: name.to_string(),
            saved_at: Utc::now(),
            values,
        };
        let bytes = serde_json::to_vec(&entry)?;
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(SAVES).map_err(db_err)?;
            table
                .insert(name.as_bytes(), bytes.as_slice())
                .map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        tracing::debug!(name, "saved form values");
        Ok(entry)
    }

    pub fn get(&self, name: &str) -> Result<SavedEntry> {
        validate_name(name)?;
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(SAVES).map_err(db_err)?;
        let Some(v) = table.get(name.as_bytes()).map_err(db_err)? else {
            return Err(ScriptError::SaveNotFound(name.to_string()));
        };
        Ok(serde_json::from_slice(v.value())?)
    }

    /// All snapshots, sorted by name.
    pub fn list(&self) -> Result<Vec<SaveSummary>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(SAVES).map_err(db_err)?;
        let mut out = Vec::new();
        for entry in table.iter().map_err(db_err)? {
            let (_, v) = entry.map_err(db_err)?;
            let saved: SavedEntry = serde_json::from_slice(v.value())?;
            out.push(SaveSummary {
                name: saved.name,
                saved_at: saved.saved_at,
            });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let wt = self.db.begin_write().map_err(db_err)?;
        let removed = {
            let mut table = wt.open_table(SAVES).map_err(db_err)?;
            let removed = table.remove(name.as_bytes()).map_err(db_err)?;
            removed.is_some()
        };
        if !removed {
            wt.abort().map_err(db_err)?;
            return Err(ScriptError::SaveNotFound(name.to_string()));
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }
}
