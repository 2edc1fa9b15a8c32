//! Gated JSON extractor
//!
//! Parses the request body and runs the gatekeeper before the handler sees
//! it. A policy rejection is answered with the sealed rejection envelope;
//! transport and format errors are answered in plain text.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::{Json, RequestExt};
use axum::extract::{ConnectInfo, FromRequest, Query, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use platform::client::{api_name_from_path, extract_client_ip};

use crate::application::Gatekeeper;
use crate::domain::directory::DirectoryConnector;
use crate::domain::repository::AuthStore;
use crate::domain::value_object::api_access::{ApiAccessRequest, PolicyVerdict, RejectionReason};
use crate::error::AuthError;
use crate::presentation::dto::{AccessKeyBody, RejectionPayload};
use crate::presentation::handlers::AuthAppState;

/// Header carrying the API access key
pub const ACCESS_KEY_HEADER: &str = "token";

#[derive(Deserialize)]
struct AccessKeyQuery {
    token: Option<String>,
}

/// JSON body of a request the gatekeeper admitted
pub struct Gated<T>(pub T);

impl<R, D, T> FromRequest<AuthAppState<R, D>> for Gated<T>
where
    R: AuthStore,
    D: DirectoryConnector,
    T: DeserializeOwned + AccessKeyBody + Send,
{
    type Rejection = Response;

    async fn from_request(
        mut req: Request,
        state: &AuthAppState<R, D>,
    ) -> Result<Self, Self::Rejection> {
        // Falls back to `MockConnectInfo` when no real peer address is set
        let direct_ip = req
            .extract_parts::<ConnectInfo<SocketAddr>>()
            .await
            .ok()
            .map(|ConnectInfo(addr)| addr.ip());
        let client_ip = extract_client_ip(req.headers(), direct_ip)
            .map(|ip| ip.to_string())
            .unwrap_or_default();
        let header_key = req
            .headers()
            .get(ACCESS_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let uri = req.uri().clone();

        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let payload: T = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(error = %e, path = %uri.path(), "Rejected request body");
            AuthError::InvalidBody.into_response()
        })?;

        // Header first, then body, then query string
        let access_key = header_key
            .filter(|k| !k.is_empty())
            .or_else(|| {
                payload
                    .access_key()
                    .filter(|k| !k.is_empty())
                    .map(str::to_owned)
            })
            .or_else(|| {
                Query::<AccessKeyQuery>::try_from_uri(&uri)
                    .ok()
                    .and_then(|Query(q)| q.token)
            })
            .unwrap_or_default();

        let request = ApiAccessRequest {
            api_name: api_name_from_path(uri.path()).to_string(),
            client_ip,
            access_key,
            request_url: uri.to_string(),
        };

        let gatekeeper = Gatekeeper::new(state.repo.clone());
        match gatekeeper.admit(&request).await {
            Ok(PolicyVerdict::Allowed) => Ok(Gated(payload)),
            Ok(PolicyVerdict::Rejected(reason)) => Err(rejection_response(state, &reason)),
            Err(e) => Err(e.into_response()),
        }
    }
}

/// Sealed `{Status, Message, Data: []}` with the reason's HTTP status
fn rejection_response<R, D>(state: &AuthAppState<R, D>, reason: &RejectionReason) -> Response
where
    R: AuthStore,
    D: DirectoryConnector,
{
    let payload = RejectionPayload {
        status: reason.legacy_code(),
        message: reason.to_string(),
        data: Vec::new(),
    };
    let status = StatusCode::from_u16(reason.http_status()).unwrap_or(StatusCode::FORBIDDEN);

    match state.seal(&payload) {
        Ok(envelope) => (status, Json(envelope)).into_response(),
        Err(e) => e.into_response(),
    }
}
