use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenelinkError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Security error: {0}")]
    Security(String),

    #[error("Unsupported service operation: {0}")]
    UnsupportedService(String),

    #[error("Reference table error: {0}")]
    Table(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GenelinkError>;
