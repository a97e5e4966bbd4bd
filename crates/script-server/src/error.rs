use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use script_core::error::ScriptError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<ScriptError>() {
            Some(e) => match e {
                ScriptError::InvalidResource { .. }
                | ScriptError::ResourceTooLarge { .. }
                | ScriptError::InvalidSaveName(_)
                | ScriptError::InvalidFilename(_)
                | ScriptError::NotAnObject(_) => StatusCode::BAD_REQUEST,
                ScriptError::SaveNotFound(_) => StatusCode::NOT_FOUND,
                ScriptError::TemplateParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ScriptError::TemplateNotFound(_)
                | ScriptError::AssetMissing(_)
                | ScriptError::SaveStore(_)
                | ScriptError::Io(_)
                | ScriptError::Yaml(_)
                | ScriptError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
