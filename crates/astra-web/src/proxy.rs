//! Streaming reverse proxy to the upstream engine.
//!
//! Per request: received → forwarding → upstream responded | upstream errored.
//! Bodies are piped in both directions without buffering, so flow control on
//! either side throttles the other. One upstream attempt, no retry.

use axum::{
    body::{Body, HttpBody},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::TryStreamExt;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::state::SharedState;

/// Connection-scoped headers that never cross the proxy.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Nothing reached the caller yet, so a 502 can still be sent.
    #[error("upstream request to {url} failed: {source}")]
    Forward {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_GATEWAY, Json(json!({ "error": "proxy_failed" }))).into_response()
    }
}

/// Headers sent upstream: everything but `host` (reqwest sets the upstream
/// host) and hop-by-hop headers.
pub fn upstream_request_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers = strip_hop_by_hop(incoming);
    headers.remove(header::HOST);
    headers
}

/// Headers relayed back to the caller.
pub fn relayed_response_headers(upstream: &HeaderMap) -> HeaderMap {
    strip_hop_by_hop(upstream)
}

fn strip_hop_by_hop(source: &HeaderMap) -> HeaderMap {
    let mut headers = source.clone();
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
    headers
}

/// Forward one API request to `<upstream_base><path+query>` and stream the
/// reply back verbatim.
pub async fn forward(
    State(state): State<SharedState>,
    request: Request,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", state.config.upstream_base, path_and_query);
    debug!(method = %parts.method, %url, "forwarding request");

    let mut builder = state
        .upstream
        .request(parts.method.clone(), &url)
        .headers(upstream_request_headers(&parts.headers));
    if !body.is_end_stream() {
        builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    let upstream = match builder.send().await {
        Ok(resp) => resp,
        Err(source) => {
            error!(method = %parts.method, %url, error = %source, "upstream request failed");
            return Err(ProxyError::Forward { url, source });
        }
    };

    let status = upstream.status();
    let headers = relayed_response_headers(upstream.headers());
    debug!(%url, status = status.as_u16(), "upstream responded");

    // Headers are already on their way; a broken stream can only end the connection.
    let stream = upstream.bytes_stream().inspect_err(move |e| {
        warn!(%url, error = %e, "upstream body failed mid-stream");
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
