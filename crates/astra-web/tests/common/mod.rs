//! Shared fixtures for the gateway integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;

use astra_config::GatewayConfig;
use astra_web::{router::build_router, state::AppState};
use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{header, StatusCode},
    response::Response,
    Router,
};
use futures_util::stream;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral local port.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn gateway_config(upstream: &str, dist: &Path, storage: &Path) -> GatewayConfig {
    GatewayConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        upstream_base: upstream.to_string(),
        storage_dir: storage.to_path_buf(),
        dist_dir: dist.to_path_buf(),
        ..GatewayConfig::default()
    }
}

pub fn gateway(config: GatewayConfig) -> Router {
    build_router(AppState::new(config).unwrap())
}

/// Upstream that answers every request with its own body, sent back in
/// fixed-size chunks. `x-echo-status` picks the status code.
pub fn echo_upstream() -> Router {
    Router::new().fallback(echo)
}

async fn echo(request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let status = parts
        .headers
        .get("x-echo-status")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK);
    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let content_type = parts.headers.get(header::CONTENT_TYPE).cloned();

    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let chunks: Vec<Result<Bytes, std::io::Error>> = bytes
        .chunks(16 * 1024)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();

    let mut builder = Response::builder()
        .status(status)
        .header("x-echo-method", parts.method.as_str())
        .header("x-echo-path", parts.uri.to_string())
        .header("x-echo-host", host);
    if let Some(ct) = content_type {
        builder = builder.header("x-echo-content-type", ct);
    }
    builder.body(Body::from_stream(stream::iter(chunks))).unwrap()
}

/// Deterministic payload of `len` bytes.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
