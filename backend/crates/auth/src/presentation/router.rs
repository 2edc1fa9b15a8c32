//! Auth Router

use axum::{Router, middleware, routing::post};

use crate::application::config::AuthConfig;
use crate::domain::directory::DirectoryConnector;
use crate::domain::repository::AuthStore;
use crate::infra::{LdapConnector, PgAuthRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_bearer;

/// Create the Auth router with PostgreSQL and LDAP
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    let directory = LdapConnector::new(std::sync::Arc::new(config.clone()));
    auth_router_generic(repo, directory, config)
}

/// Create a generic Auth router for any store and directory implementation
pub fn auth_router_generic<R, D>(repo: R, directory: D, config: AuthConfig) -> Router
where
    R: AuthStore,
    D: DirectoryConnector,
{
    let state = AuthAppState::new(repo, directory, config);

    let protected = Router::new()
        .route("/SessionTimeout", post(handlers::session_timeout::<R, D>))
        .route("/Sessiondata", post(handlers::session_data::<R, D>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer::<R, D>,
        ));

    Router::new()
        .route("/HRldap", post(handlers::hr_ldap::<R, D>))
        .route("/Loginotp", post(handlers::login_otp::<R, D>))
        .route("/Loginotpresend", post(handlers::login_otp_resend::<R, D>))
        .route("/Loginotpupdate", post(handlers::login_otp_update::<R, D>))
        .merge(protected)
        .with_state(state)
}
