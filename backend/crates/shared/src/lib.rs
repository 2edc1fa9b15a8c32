//! Shared Kernel
//!
//! The small vocabulary every other crate in the workspace agrees on:
//! error classification with the unified `AppError`, and typed session ids.
//!
//! Anything domain specific (directory scopes, OTP rules) lives in `auth`.

pub mod error {
    pub mod app_error;
    pub mod kind;
    #[cfg(feature = "axum")]
    pub mod response;
}
pub mod id;
