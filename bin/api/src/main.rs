//! Waitlist API server: registration, email confirmation and signup statistics.

mod error;
mod handlers;
mod routes;
mod state;

use eyre::Result;
use std::{net::SocketAddr, sync::Arc};
use waitlist_core::{Settings, telemetry};
use waitlist_mailer::{DisabledNotifier, Notifier, ResendNotifier};
use waitlist_storage::{self as storage, PgStore};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let settings = Settings::from_env()?;

    tracing::info!(production = settings.production, "Starting waitlist API server");

    let pool = storage::connect(&settings.database_url, settings.request_timeout()).await?;

    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Database ready");

    let notifier: Arc<dyn Notifier> = match &settings.resend_api_key {
        Some(key) => Arc::new(ResendNotifier::new(key.clone(), settings.request_timeout())?),
        None => {
            tracing::warn!("RESEND_API_KEY not configured, confirmation emails are disabled");
            Arc::new(DisabledNotifier)
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.api_port));
    let state = Arc::new(AppState {
        settings,
        store: Arc::new(PgStore::new(pool)),
        notifier,
    });
    let app = routes::router(state);

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gracefully…");
}
