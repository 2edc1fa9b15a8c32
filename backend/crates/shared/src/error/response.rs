//! HTTP rendering for [`AppError`] (feature `axum`)
//!
//! These answers are plain text: they happen before any payload exists that
//! would be worth sealing.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::app_error::AppError;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.public_message().to_owned()).into_response()
    }
}
