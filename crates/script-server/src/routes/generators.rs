use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/generators: the generator catalog, one entry per module.
pub async fn list_generators(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(serde_json::to_value(&app.workspace.catalog)?))
}

/// GET /api/generator-specs: the `module.function` override table.
pub async fn get_generator_specs(State(app): State<AppState>) -> Json<Value> {
    Json(app.workspace.specs.to_value())
}
