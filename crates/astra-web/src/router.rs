//! Route table for the gateway.

use std::sync::Arc;

use axum::{
    handler::Handler,
    routing::{any, get},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::handlers::{health::healthz, spa::entry_document};
use crate::proxy::forward;
use crate::state::AppState;

/// Build the gateway router.
///
/// Matching order: the local health probe, then the API prefix (proxied),
/// then the storage prefix (static), then the client bundle. Anything left,
/// for any method, gets the bundle's entry document.
pub fn build_router(state: AppState) -> Router {
    let api_prefix = state.config.api_prefix.clone();
    let storage_prefix = state.config.storage_prefix.clone();
    let storage_dir = state.config.storage_dir.clone();
    let dist_dir = state.config.dist_dir.clone();
    let state = Arc::new(state);

    let spa = entry_document.with_state(state.clone());
    let storage = ServeDir::new(storage_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(spa.clone());
    let bundle = ServeDir::new(dist_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(spa);

    Router::new()
        .route(&format!("{api_prefix}/healthz"), get(healthz))
        .route(&api_prefix, any(forward))
        // The catch-all below needs at least one character after the slash.
        .route(&format!("{api_prefix}/"), any(forward))
        .route(&format!("{api_prefix}/{{*rest}}"), any(forward))
        .nest_service(&storage_prefix, storage)
        .fallback_service(bundle)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
