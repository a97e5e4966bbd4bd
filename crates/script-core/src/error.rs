use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("template '{name}' line {line}: {message}")]
    TemplateParse {
        name: String,
        line: usize,
        message: String,
    },

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("embedded asset missing: {0}")]
    AssetMissing(String),

    #[error("number of {field} must be greater than 0 (or leave empty/0 for auto)")]
    InvalidResource { field: String },

    #[error("{field} must be at most {max}")]
    ResourceTooLarge { field: String, max: i64 },

    #[error("invalid script filename: {0}")]
    InvalidFilename(String),

    #[error("invalid save name '{0}': must be 1-64 characters without slashes")]
    InvalidSaveName(String),

    #[error("saved entry not found: {0}")]
    SaveNotFound(String),

    #[error("save store error: {0}")]
    SaveStore(String),

    #[error("expected a JSON object of parameters, got {0}")]
    NotAnObject(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScriptError>;
