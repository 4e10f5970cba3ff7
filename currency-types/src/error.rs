//! Error types for the currency service.

/// Domain-level errors (invalid values).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Currency code cannot be empty")]
    EmptyCode,

    #[error("Exchange rate must be greater than zero, got {0}")]
    InvalidRate(f64),

    #[error("Conversion amount must be greater than zero, got {0}")]
    InvalidAmount(f64),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors.
///
/// Persistence failures never show up here for mutations: the store logs them
/// and keeps the in-memory change.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Currency not found: {0}")]
    NotFound(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidAmount(_) => AppError::Unprocessable(err.to_string()),
            e => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(code) => AppError::NotFound(format!("Currency not found: {}", code)),
        }
    }
}
