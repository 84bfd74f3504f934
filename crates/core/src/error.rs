// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint hit on insert (a concurrent session created the row first)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Job façade used before `load()` resolved its process and job
    #[error("Not loaded: {0}")]
    NotLoaded(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String) / AppError::Conflict(String)
