//! HTTP surface: router, shared state and server lifecycle.

pub mod download;
pub mod error;
pub mod pages;
pub mod upload;


use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use loginwall_core::{Config, Ingestor};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ingestor: Arc<Ingestor>,
}

impl AppState {
    pub fn new(config: Config, ingestor: Ingestor) -> Self {
        Self {
            config: Arc::new(config),
            ingestor: Arc::new(ingestor),
        }
    }
}

/// Build the application router with every route under the configured prefix.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();
    let upload_limit = usize::try_from(config.limits.max_upload_bytes).unwrap_or(usize::MAX);

    let mut router = Router::new()
        .route(
            &config.route("/upload"),
            post(upload::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(&config.route("/download/{name}"), get(download::download))
        .route("/", get(pages::index));

    if !config.server.route_prefix.is_empty() {
        router = router.route(&config.server.route_prefix, get(pages::index));
    }

    router
        .nest_service(&config.route("/css"), ServeDir::new(config.css_dir()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.server.listen_addr.clone();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(
        "Listening on {} (public base {}{})",
        listener.local_addr()?,
        state.config.server.external_url,
        state.config.server.route_prefix
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
