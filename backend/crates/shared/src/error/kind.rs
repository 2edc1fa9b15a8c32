//! Error Kind
//!
//! Classifies failures by the HTTP status they answer with.

/// Error classification shared by every crate.
///
/// The service only ever answers outside the encrypted envelope for
/// malformed input, bearer rejections and infrastructure failures, so the
/// set is deliberately small.
///
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
/// assert!(ErrorKind::InternalServerError.hides_detail());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed body, bad hex, missing field, access key with bad characters
    BadRequest,
    /// Missing, malformed or expired bearer token
    Unauthorized,
    /// Store, directory, cipher or signing failure
    InternalServerError,
}

impl ErrorKind {
    pub const fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::InternalServerError => 500,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::InternalServerError => "Internal Server Error",
        }
    }

    /// Whether the message must stay server-side.
    pub const fn hides_detail(self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}
