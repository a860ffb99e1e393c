use thiserror::Error;

use crate::models::ValidationError;
use crate::services::EmbedError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage could not be initialized: {0}")]
    StoreUnavailable(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Embed(#[from] EmbedError),
}

pub type Result<T> = std::result::Result<T, AppError>;
