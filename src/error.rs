use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnippetorError {
    #[error("no snippetor settings found (run `snippetor init` first)")]
    NotInitialized,

    #[error("snippetor settings already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("snippet '{0}' not found")]
    SnippetNotFound(String),

    #[error("snippet name '{0}' matches more than one snippet; use the id instead")]
    AmbiguousName(String),

    #[error("snippet name '{0}' is already in use")]
    NameTaken(String),

    #[error("malformed settings: {0}")]
    MalformedSettings(String),

    #[error("invalid schema version '{0}'")]
    InvalidVersion(String),

    #[error("invalid snippet file name '{0}'")]
    InvalidFileName(String),

    #[error("locked by another process: {0}")]
    Locked(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SnippetorError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::AlreadyInitialized(_) => "already_initialized",
            Self::SnippetNotFound(_) => "snippet_not_found",
            Self::AmbiguousName(_) => "ambiguous_name",
            Self::NameTaken(_) => "name_taken",
            Self::MalformedSettings(_) => "malformed_settings",
            Self::InvalidVersion(_) => "invalid_version",
            Self::InvalidFileName(_) => "invalid_file_name",
            Self::Locked(_) => "locked",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, SnippetorError>;
