//! astra-web: gateway in front of the analysis engine.
//!   - API traffic under the configured prefix is streamed to the upstream engine
//!   - ingested documents are served read-only under the storage prefix
//!   - everything else is the client bundle, with a single-page-app fallback

pub mod router;
pub mod handlers;
pub mod state;
pub mod proxy;

use astra_config::GatewayConfig;
use tokio::signal;
use tracing::{info, warn};

/// Bind the configured address and serve until Ctrl+C.
pub async fn serve(config: GatewayConfig) -> anyhow::Result<()> {
    if !config.index_file().exists() {
        warn!(path = %config.index_file().display(), "client bundle entry document not found");
    }

    let addr = config.listen_addr();
    let upstream = config.upstream_base.clone();
    let state = state::AppState::new(config)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web app server listening on http://{}", addr);
    info!("Proxying to upstream engine at {}", upstream);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
