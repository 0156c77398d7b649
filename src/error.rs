use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used by provider operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`FliptProvider`](crate::FliptProvider) operations.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Evaluation was attempted before the provider finished initializing (or after shutdown).
    #[error("provider not yet initialized")]
    ProviderNotReady,

    /// Generic evaluation failure.
    ///
    /// Holds `"unknown error"` when the provider is in the error state, or the verbatim message of
    /// the underlying remote failure.
    #[error("{0}")]
    General(String),

    /// `initialize()` was called more than once on the same provider.
    #[error("already initialized")]
    DoubleInitialization,

    /// The remote client could not be built. The provider stays unusable.
    #[error("provider initialization failed: {0}")]
    ProviderFatal(String),
}

impl Error {
    /// Error code reported to the host for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Error::ProviderNotReady => ErrorCode::ProviderNotReady,
            Error::General(_) | Error::DoubleInitialization => ErrorCode::General,
            Error::ProviderFatal(_) => ErrorCode::ProviderFatal,
        }
    }
}

/// Error codes carried in [`EvaluationResult`](crate::EvaluationResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The provider has not been initialized yet.
    ProviderNotReady,
    /// The provider cannot recover.
    ProviderFatal,
    /// Any other error.
    General,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ErrorCode::ProviderNotReady => "PROVIDER_NOT_READY",
            ErrorCode::ProviderFatal => "PROVIDER_FATAL",
            ErrorCode::General => "GENERAL",
        })
    }
}

/// Failure talking to the remote evaluation service.
///
/// The provider never inspects the variant: every `ServiceError` surfaces as
/// [`Error::General`] carrying its display message.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum ServiceError {
    /// Invalid base URL configuration.
    #[error("invalid base_url configuration")]
    InvalidBaseUrl(#[source] url::ParseError),

    /// Network or protocol error.
    #[error(transparent)]
    // reqwest::Error is not clonable, so we're wrapping it in an Arc.
    Network(Arc<reqwest::Error>),

    /// The service answered with a non-success status.
    #[error("{message} (status {status})")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message reported by the server, or the raw response body.
        message: String,
    },

    /// Failure reported by a custom [`EvaluationService`](crate::EvaluationService).
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(value: reqwest::Error) -> Self {
        ServiceError::Network(Arc::new(value.without_url()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorCode, ServiceError};

    #[test]
    fn error_messages() {
        assert_eq!(
            Error::ProviderNotReady.to_string(),
            "provider not yet initialized"
        );
        assert_eq!(
            Error::General("unknown error".to_owned()).to_string(),
            "unknown error"
        );
        assert_eq!(Error::DoubleInitialization.to_string(), "already initialized");
    }

    #[test]
    fn error_codes() {
        assert_eq!(
            Error::ProviderNotReady.error_code(),
            ErrorCode::ProviderNotReady
        );
        assert_eq!(
            Error::General("boom".to_owned()).error_code(),
            ErrorCode::General
        );
        assert_eq!(
            Error::ProviderFatal("boom".to_owned()).error_code(),
            ErrorCode::ProviderFatal
        );
        assert_eq!(ErrorCode::ProviderNotReady.to_string(), "PROVIDER_NOT_READY");
    }

    #[test]
    fn status_error_keeps_server_message() {
        let err = ServiceError::Status {
            status: 404,
            message: "flag \"missing\" not found".to_owned(),
        };
        assert_eq!(err.to_string(), "flag \"missing\" not found (status 404)");
    }
}
