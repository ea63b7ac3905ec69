use thiserror::Error;

use crate::clients::LedgerClientError;

/// Application-wide error type.
///
/// Credential failures (`Unauthorized`/`Forbidden`) are kept apart from
/// business-rule failures (`Validation`/`Conflict`) so callers know whether
/// to refresh a token or fix the payload. `LedgerUnavailable` is never
/// surfaced as a hard failure on the invoice-creation path; the orchestrator
/// degrades it to a partial-success response instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("ledger service unavailable: {0}")]
    LedgerUnavailable(#[from] LedgerClientError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// True when retrying the same request without changes cannot succeed.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::Conflict(_)
                | AppError::Unauthorized(_)
                | AppError::Forbidden(_)
                | AppError::NotFound(_)
        )
    }
}
