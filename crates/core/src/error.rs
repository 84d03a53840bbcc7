use thiserror::Error;

/// Shared error type used across the waitlist crates.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Duplicate email or wallet.
    #[error("{0}")]
    Conflict(String),

    /// A store or email provider call failed. The message is caller-facing;
    /// the underlying cause is logged where it happens.
    #[error("{0}")]
    Dependency(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] eyre::Error),
}

impl AppError {
    /// HTTP status code this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::Conflict(_) => 409,
            AppError::Dependency(_) | AppError::Config(_) | AppError::Other(_) => 500,
        }
    }

    /// Message shown to the caller. Configuration and unexpected errors are masked.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(m)
            | AppError::Conflict(m)
            | AppError::Dependency(m) => m.clone(),
            AppError::Config(_) | AppError::Other(_) => "An unexpected error occurred".into(),
        }
    }
}
