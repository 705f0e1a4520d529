//! ORCID Link auth service
//!
//! Serves token validation behind `/whoami` and cache figures behind `/status`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orcidlink_auth::client::ReqwestTransport;
use orcidlink_auth::{create_router, spawn_cleanup_task, AppState, AuthValidator, Config};

/// Startup sequence:
/// 1. Initialize tracing subscriber
/// 2. Load configuration from environment variables
/// 3. Build the HTTP transport and token validator
/// 4. Start background token cache purge
/// 5. Serve the router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orcidlink_auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ORCID Link auth service");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        auth_url = %config.auth_url,
        token_cache_max_size = config.token_cache_max_size,
        token_cache_lifetime_ms = config.token_cache_lifetime.as_millis() as u64,
        request_timeout_ms = config.request_timeout.as_millis() as u64,
        port = config.server_port,
        "Configuration loaded"
    );

    let transport = ReqwestTransport::new(config.request_timeout)
        .context("failed to build HTTP transport")?;
    let validator = AuthValidator::new(config.validator_params(), Arc::new(transport))
        .context("failed to build token validator")?;

    let cleanup_handle = spawn_cleanup_task(validator.cache().clone(), config.cleanup_interval);

    let app = create_router(AppState::new(validator));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then stops the purge task.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Token cache purge task aborted");
}
