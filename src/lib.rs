use crate::config::ReviewsConfig;
use crate::database::Repositories;
use crate::services::seed::{Fixtures, seed_database};
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod client;
pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod features;
pub mod services;

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub config: Arc<ReviewsConfig>,
}

/// Composes the api (and the frontend, when a build is configured) into one router.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = features::api_router();

    if let Some(dist_dir) = &state.config.frontend_path {
        info!("Serving frontend from {}", dist_dir.display());
        app = app.merge(features::frontend::frontend_router(dist_dir));
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Connects to the store, seeds it from the fixtures and serves until shutdown.
pub async fn start_server(config: ReviewsConfig) -> Result<()> {
    let config = Arc::new(config);

    info!("Loading fixtures from {}", config.fixtures_dir.display());
    let fixtures = Fixtures::load(&config.fixtures_dir)?;

    let repos = database::connect(&config)
        .await
        .context("Failed to connect to database")?;

    seed_database(&repos, &fixtures).await?;

    let app = build_app(AppState {
        repos,
        config: config.clone(),
    });

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server is running on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
