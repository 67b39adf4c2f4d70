// src/error.rs
use thiserror::Error;

/// Errors raised by the query service and its storage backends
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid timestamp for `{field}`: {value:?} ({source})")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("invalid signal record: {0}")]
    InvalidRecord(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    /// Whether the caller sent something we cannot serve, as opposed to a backend failure
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ServiceError::Database(_))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
