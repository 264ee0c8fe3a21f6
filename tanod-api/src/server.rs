//! API Server setup

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ApiConfig;
use crate::metrics::init_metrics;
use crate::routes::create_router;
use crate::services::ReaperService;
use crate::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Create the router for a state, with middleware applied
pub fn build_router(state: AppState) -> Router {
    let enable_cors = state.config.enable_cors;
    let mut router = create_router(state).layer(TraceLayer::new_for_http());

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }
    router
}

/// Create the API server
pub fn create_server(config: ApiConfig) -> Result<(Router, SocketAddr, AppState), BoxError> {
    let addr = config.socket_addr()?;
    let state = AppState::new(config)?;
    let router = build_router(state.clone());
    Ok((router, addr, state))
}

/// Run the API server until Ctrl+C or SIGTERM
pub async fn run_server(config: ApiConfig) -> Result<(), BoxError> {
    let metrics = init_metrics(config.metrics_enabled)?;
    let reaper_config = config.reaper_config();

    let addr = config.socket_addr()?;
    let state = AppState::new(config)?.with_metrics(metrics);
    let router = build_router(state.clone());

    let reaper = ReaperService::new(state.registry.clone(), reaper_config).start();

    let listener = TcpListener::bind(addr).await?;
    info!("Tanod API server listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.stop().await;
    info!("Tanod API server stopped");
    Ok(())
}

/// Start server in background (for testing)
pub async fn start_background_server(config: ApiConfig) -> Result<SocketAddr, BoxError> {
    let (router, addr, _state) = create_server(config)?;

    // Bind to get actual address (useful when port is 0)
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
