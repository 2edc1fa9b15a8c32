//! Failures answered outside the encrypted envelope
//!
//! Everything here renders through `kernel::error::AppError`, so
//! infrastructure detail is logged and never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::crypto::CipherError;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Credential and policy rejections are not errors: they travel inside the
/// encrypted envelope. Everything here is answered in plain text.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Body is not valid JSON or does not match the expected shape
    #[error("Invalid JSON input")]
    InvalidBody,

    /// Required body fields are missing
    #[error("{0}")]
    MissingField(&'static str),

    /// API access key contains characters other than ASCII alphanumerics
    #[error("Invalid Token provided")]
    InvalidAccessToken,

    /// Missing, malformed or rejected bearer token
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Directory connection or service bind failure
    #[error("Directory error: {0}")]
    Directory(String),

    /// Verified login has no employee profile
    #[error("Employee profile not found")]
    EmployeeNotFound,

    /// Session, OTP, profile or policy store failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Envelope encryption failure
    #[error("Cipher error: {0}")]
    Cipher(#[from] CipherError),

    /// Token signing failure
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Response serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unexpected state, e.g. a stored value this service cannot interpret
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP status this error answers with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidBody | AuthError::MissingField(_) | AuthError::InvalidAccessToken => {
                StatusCode::BAD_REQUEST
            }
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Directory(_)
            | AuthError::EmployeeNotFound
            | AuthError::Database(_)
            | AuthError::Cipher(_)
            | AuthError::Token(_)
            | AuthError::Serialization(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidBody | AuthError::MissingField(_) | AuthError::InvalidAccessToken => {
                ErrorKind::BadRequest
            }
            AuthError::Unauthorized(_) => ErrorKind::Unauthorized,
            _ => ErrorKind::InternalServerError,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Server faults at error, bearer rejections at warn, the rest at debug
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Directory(msg) => {
                tracing::error!(message = %msg, "Directory service error");
            }
            AuthError::EmployeeNotFound => {
                tracing::error!("Verified login has no employee profile");
            }
            AuthError::Cipher(e) => {
                tracing::error!(error = %e, "Response encryption failed");
            }
            AuthError::Token(e) => {
                tracing::error!(error = %e, "Token signing failed");
            }
            AuthError::Serialization(e) => {
                tracing::error!(error = %e, "Response serialization failed");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Unauthorized(reason) => {
                tracing::warn!(reason = %reason, "Bearer token rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_keep_message() {
        let err = AuthError::MissingField("Missing required field: session_id");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_app_error().public_message(),
            "Missing required field: session_id"
        );

        assert_eq!(AuthError::InvalidAccessToken.to_string(), "Invalid Token provided");
        assert_eq!(
            AuthError::Unauthorized("Authorization header missing").status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_infrastructure_errors_are_generic() {
        let err = AuthError::Directory("bind as cn=svc failed".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_app_error().public_message(), "Internal Server Error");

        let err = AuthError::EmployeeNotFound;
        assert_eq!(err.kind(), ErrorKind::InternalServerError);
    }
}
