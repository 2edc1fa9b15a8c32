//! HR sign-in middleware server
//!
//! Startup failures are reported through `anyhow`; request-level failures
//! are `auth::AuthError`.

mod settings;

use auth::{PgAuthRepository, auth_router};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    tracing::info!(
        ldap_url = %settings.auth.directory.url,
        scopes = settings.auth.directory.scopes.len(),
        supersede_policy = ?settings.auth.supersede_policy,
        "Configuration loaded"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(&settings.database_url)
        .await?;

    tracing::info!(
        max_connections = settings.database_max_connections,
        "Connected to database"
    );

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations applied");

    let app = Router::new()
        .merge(auth_router(PgAuthRepository::new(pool), settings.auth))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(settings.listen_addr).await?;
    tracing::info!(addr = %settings.listen_addr, "HR middleware listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
