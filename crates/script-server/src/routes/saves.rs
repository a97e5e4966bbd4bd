use axum::extract::{Path, State};
use axum::Json;
use script_core::data::TemplateData;
use script_core::saves::{SaveSummary, SavedEntry};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/saves: saved form snapshots, sorted by name.
pub async fn list_saves(State(app): State<AppState>) -> Result<Json<Vec<SaveSummary>>, AppError> {
    let store = app.saves.clone();
    let list = tokio::task::spawn_blocking(move || store.list())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(list))
}

/// GET /api/saves/{name}
pub async fn get_save(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SavedEntry>, AppError> {
    let store = app.saves.clone();
    let entry = tokio::task::spawn_blocking(move || store.get(&name))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(entry))
}

/// PUT /api/saves/{name}: store the raw form values, replacing any earlier save.
pub async fn put_save(
    State(app): State<AppState>,
    Path(name): Path<String>,
    Json(values): Json<Value>,
) -> Result<Json<SavedEntry>, AppError> {
    let values = TemplateData::from_value(values)?.into_value();
    let store = app.saves.clone();
    let entry = tokio::task::spawn_blocking(move || store.put(&name, values))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    tracing::info!(name = %entry.name, "saved form values");
    Ok(Json(entry))
}

/// DELETE /api/saves/{name}
pub async fn delete_save(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = app.saves.clone();
    let deleted = name.clone();
    tokio::task::spawn_blocking(move || store.delete(&name))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
