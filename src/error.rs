use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bug report is empty")]
    EmptyReport,

    #[error("{capability} failed: {message}")]
    Capability {
        capability: &'static str,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn capability(capability: &'static str, message: impl Into<String>) -> Self {
        AppError::Capability {
            capability,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
