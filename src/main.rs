mod domain;
mod clients;
mod events;
mod services;

mod app_system;
mod http;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;

mod actor_framework;
mod catalog_actor;
mod chat_actor;
mod checkout_actor;
mod feedback_actor;
mod payment_actor;
mod ticket_actor;
mod tracking_actor;
mod user_actor;

use std::path::PathBuf;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, Instrument};

use crate::app_system::{load_config, setup_tracing, SeedData, StoreSystem, SystemError};
use crate::http::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref()).context("loading configuration")?;

    info!("Starting storefront");
    let system = StoreSystem::new(&config)?;

    if let Some(seed_file) = config.catalog.seed_file.clone() {
        let span = tracing::info_span!("seeding", file = %seed_file.display());
        async {
            info!("Loading seed data");
            let data = SeedData::load(&seed_file).await?;
            Ok::<_, SystemError>(data.apply(&system).await?)
        }
        .instrument(span)
        .await
        .context("seeding initial data")?;
    }

    let address = config.server.socket_addr()?;
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "Listening");

    let app = router(AppState::new(&system));
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        error!(error = %e, "Server stopped with an error");
    }

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(served?)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
