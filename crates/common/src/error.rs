//! Error types for vitrine.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Every error is scoped to the operation that produced it; no error is
/// process-fatal, and a failed operation leaves prior state unchanged.
#[derive(Debug, Error)]
pub enum AppError {
    // === Caller Errors ===
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Already authenticated")]
    AlreadyAuthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // === Collaborator Errors ===
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::AuthorizationDenied(_) => "AUTHORIZATION_DENIED",
            Self::AlreadyAuthenticated => "ALREADY_AUTHENTICATED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::TransientNetwork(_) => "TRANSIENT_NETWORK",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether the caller may retry the failed operation as-is.
    ///
    /// This subsystem never retries on its own; the flag is for the
    /// presentation host.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransientNetwork(_))
    }
}

// === From implementations ===

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts and connection failures are caller-retryable; anything
        // else from the transport is not.
        if err.is_timeout() || err.is_connect() || err.is_request() {
            Self::TransientNetwork(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}
