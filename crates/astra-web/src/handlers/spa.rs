//! Entry document for client-side routes.

use axum::{
    body::Body,
    extract::{Request, State},
    http::Method,
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::state::SharedState;

/// Answer any method with the bundle's `index.html`.
///
/// The browser router owns every path the gateway does not, whatever the
/// method, so the request is served as a read of the entry document.
pub async fn entry_document(State(state): State<SharedState>, request: Request) -> Response {
    let (mut parts, _body) = request.into_parts();
    if parts.method != Method::HEAD {
        parts.method = Method::GET;
    }
    let read = Request::from_parts(parts, Body::empty());

    match ServeFile::new(state.config.index_file()).oneshot(read).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
