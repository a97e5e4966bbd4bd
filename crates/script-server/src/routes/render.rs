use axum::extract::State;
use axum::Json;
use script_core::data::TemplateData;
use script_core::objective::default_objective_code;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/normalize: the template data the scripts would be rendered with.
pub async fn normalize(
    State(app): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<TemplateData>, AppError> {
    let raw = TemplateData::from_value(body)?;
    Ok(Json(app.workspace.prepare(raw)?))
}

/// POST /api/render: every generated script, as files and as sectioned text.
pub async fn render(
    State(app): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let raw = TemplateData::from_value(body)?;
    let bundle = app.workspace.render(raw)?;
    tracing::debug!(files = ?bundle.filenames(), "rendered scripts");
    Ok(Json(serde_json::json!({
        "files": bundle.files,
        "text": bundle.to_sectioned_text(),
    })))
}

#[derive(Deserialize)]
pub struct ObjectiveBody {
    #[serde(default)]
    pub app_ref: Option<String>,
}

/// POST /api/objective-code: default `set_objective_value()` for an app.
///
/// Used to pre-fill the custom objective editor.
pub async fn objective_code(Json(body): Json<ObjectiveBody>) -> Json<Value> {
    let mut data = TemplateData::new();
    data.set_opt("app_ref", body.app_ref);
    Json(serde_json::json!({ "code": default_objective_code(&data) }))
}
