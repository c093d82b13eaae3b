//! Error types for registry operations
//!
//! Four failure classes surface from this crate: transport failures from the
//! HTTP layer, non-2xx responses with a parsed registry error body, non-2xx
//! responses whose body is not a registry error envelope, and local
//! validation or configuration failures. Nothing is retried or recovered
//! internally; every error propagates to the caller as-is.

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::errors::{ApiError, ErrorCode};

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Connection, DNS or timeout failure before a response was received.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response with a structured registry error body.
    #[error("registry returned {status}: {}", format_api_errors(.errors))]
    Api {
        status: StatusCode,
        errors: Vec<ApiError>,
    },

    /// Non-2xx response whose body is not a registry error envelope.
    #[error("unexpected HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// A response body or header failed model validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid client construction arguments.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl RegistryError {
    /// HTTP status of the response that produced this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RegistryError::Api { status, .. } | RegistryError::Http { status, .. } => Some(*status),
            RegistryError::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Structured registry error codes carried by this error.
    pub fn codes(&self) -> &[ApiError] {
        match self {
            RegistryError::Api { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Whether the registry reported the given error code.
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.codes().iter().any(|e| e.code == code)
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Validation(err.to_string())
    }
}

impl From<url::ParseError> for RegistryError {
    fn from(err: url::ParseError) -> Self {
        RegistryError::Configuration(err.to_string())
    }
}

fn format_api_errors(errors: &[ApiError]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{} ({})", e.code.as_wire_str(), e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_reports_status_and_code() {
        let err = RegistryError::Api {
            status: StatusCode::NOT_FOUND,
            errors: vec![ApiError {
                code: ErrorCode::ManifestUnknown,
                message: "manifest unknown".to_string(),
                detail: None,
            }],
        };
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.has_code(ErrorCode::ManifestUnknown));
        assert!(!err.has_code(ErrorCode::BlobUnknown));
        assert!(err.to_string().contains("MANIFEST_UNKNOWN"));
    }

    #[test]
    fn http_error_keeps_raw_body() {
        let err = RegistryError::Http {
            status: StatusCode::BAD_GATEWAY,
            body: "<html>bad gateway</html>".to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert!(err.codes().is_empty());
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn validation_error_has_no_status() {
        let err = RegistryError::Validation("bad digest".to_string());
        assert_eq!(err.status(), None);
    }
}
