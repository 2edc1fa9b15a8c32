//! Application Error
//!
//! [`AppError`] is what finally crosses the HTTP boundary when a request
//! cannot be answered with an encrypted envelope.

use std::borrow::Cow;
use std::fmt;

use super::kind::ErrorKind;

/// A classified failure with a caller-facing message.
///
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::bad_request("Invalid JSON input");
/// assert_eq!(err.kind(), ErrorKind::BadRequest);
/// assert_eq!(err.public_message(), "Invalid JSON input");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Full message, for logs.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Text that may be sent to the caller. Server errors collapse to the
    /// reason phrase so store and directory details stay in the logs.
    pub fn public_message(&self) -> &str {
        if self.kind.hides_detail() {
            self.kind.reason()
        } else {
            &self.message
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}
