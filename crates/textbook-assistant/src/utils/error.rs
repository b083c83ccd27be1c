use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Please select at least {min} characters.")]
    SelectionTooShort { min: usize },

    #[error("Selected text is too long (max {max} characters).")]
    SelectionTooLong { max: usize },

    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Human-readable message returned by the auth backend.
    #[error("{0}")]
    Rejected(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<std::io::Error> for AssistantError {
    fn from(err: std::io::Error) -> Self {
        AssistantError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;
