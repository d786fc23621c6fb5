use std::sync::Arc;
use thiserror::Error;

/// Cloneable so a failure can be published as session state and still be
/// returned to a caller with its original variant.
#[derive(Error, Debug, Clone)]
pub enum SkyViewError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("JSON serialization error: {0}")]
    Json(Arc<serde_json::Error>),

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),
}

impl From<std::io::Error> for SkyViewError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(Arc::new(e))
    }
}

impl From<serde_json::Error> for SkyViewError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(Arc::new(e))
    }
}

pub type Result<T> = std::result::Result<T, SkyViewError>;
