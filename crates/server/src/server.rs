//! Server initialization and routing
//!
//! Builds the axum router and middleware stack, installs JSON logging and runs the server until
//! SIGTERM or Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ServerConfig, API_KEY_ENV};
use crate::middleware::{log_requests, request_id};
use crate::routes::{analyze, health, not_found, root};
use crate::state::ServerState;

/// Build the Axum router with all routes and middleware
///
/// Middleware, outermost first: tracing, request id, request logging, CORS, compression, body
/// limit.
pub fn build_router(state: Arc<ServerState>) -> Router {
    // Browsers get their own origin echoed back, so any frontend can call the API.
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE])
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/analyze", post(analyze::analyze_resume))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Install the JSON tracing subscriber. Does nothing if one is already installed.
pub fn init_tracing(log_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .try_init();
}

/// Start the resume analyzer HTTP server
///
/// Blocks until the server is shut down via SIGTERM or Ctrl+C.
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing(&config.log_level);
    health::mark_started();

    if !config.generation.has_api_key() {
        tracing::warn!("{API_KEY_ENV} is not set; every analysis will fail at the generation step");
    }

    let state = Arc::new(ServerState::new(config.clone())?);
    let app = build_router(state);

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(%addr, "Starting resume analyzer server");
    tracing::info!(
        max_body_mb = config.max_body_size_mb,
        cors = config.enable_cors,
        embedding_mode = %config.semantic.mode,
        embedding_model = %config.semantic.model_name,
        generation_model = %config.generation.model,
        top_k = config.pipeline.top_k,
        "Server configuration"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
