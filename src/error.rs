use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Profile source not found: {0}")]
    ProfilesNotFound(String),

    #[error("Malformed profile data: {0}")]
    MalformedProfiles(String),

    #[error("Decision oracle error: {0}")]
    Oracle(String),

    #[error("LLM API error: {0}")]
    OracleApi(String),

    #[error("Action execution failed: {0}")]
    Execution(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Approval prompt failed: {0}")]
    Gate(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error means the profile list could not be obtained at all.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::ProfilesNotFound(_) | AppError::MalformedProfiles(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
