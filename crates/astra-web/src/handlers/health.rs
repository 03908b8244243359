//! Liveness probe.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::SharedState;

/// GET {api}/healthz
///
/// Answered locally; never touches the upstream engine.
pub async fn healthz(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "upstream": state.config.upstream_base,
    }))
}
