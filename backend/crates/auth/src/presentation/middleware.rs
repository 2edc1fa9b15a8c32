//! Auth Middleware
//!
//! Bearer guard for the session endpoints.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::directory::DirectoryConnector;
use crate::domain::repository::AuthStore;
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Require `Authorization: Bearer <token>` signed by the token issuer.
///
/// The verified [`Claims`](crate::application::Claims) are stored in the
/// request extensions.
pub async fn require_bearer<R, D>(
    State(state): State<AuthAppState<R, D>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: AuthStore,
    D: DirectoryConnector,
{
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Unauthorized("Authorization header missing"))?;

    let token = header_value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty() && !t.contains(' '))
        .ok_or(AuthError::Unauthorized("Invalid Authorization header format"))?;

    let claims = state.issuer.verify(token)?;

    tracing::debug!(session_id = %claims.user_id, "Bearer token accepted");
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
