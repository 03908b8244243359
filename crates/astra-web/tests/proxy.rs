//! End-to-end forwarding through a live gateway to a stub upstream.

mod common;

use std::io;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    response::Response,
    routing::get,
    Router,
};
use futures_util::stream::{self, StreamExt};
use serde_json::Value;

use common::{echo_upstream, gateway, gateway_config, payload, spawn};

async fn gateway_for(upstream: Router) -> (String, String, tempfile::TempDir) {
    let upstream_addr = spawn(upstream).await;
    let dist = tempfile::tempdir().unwrap();
    let upstream_base = format!("http://{upstream_addr}");
    let config = gateway_config(&upstream_base, dist.path(), dist.path());
    let gateway_addr = spawn(gateway(config)).await;
    (format!("http://{gateway_addr}"), upstream_addr.to_string(), dist)
}

#[tokio::test]
async fn test_round_trip_preserves_bytes_and_status() {
    let (base, _, _dist) = gateway_for(echo_upstream()).await;
    let client = reqwest::Client::new();

    for (len, status) in [(0usize, 200u16), (1, 201), (64 * 1024 + 7, 404), (5 * 1024 * 1024, 503)] {
        let body = payload(len);
        let resp = client
            .post(format!("{base}/api/files/upload"))
            .header("x-echo-status", status.to_string())
            .header("content-type", "application/octet-stream")
            .body(body.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status().as_u16(), status, "status for {len} bytes");
        assert_eq!(resp.headers()["x-echo-method"], "POST");
        assert_eq!(resp.headers()["x-echo-content-type"], "application/octet-stream");
        let echoed = resp.bytes().await.unwrap();
        assert_eq!(echoed.len(), len);
        assert!(echoed.as_ref() == body.as_slice(), "body mismatch for {len} bytes");
    }
}

#[tokio::test]
async fn test_path_query_and_host_rewrite() {
    let (base, upstream_host, _dist) = gateway_for(echo_upstream()).await;

    let resp = reqwest::get(format!("{base}/api/query/status?id=a%20b&x=1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-echo-method"], "GET");
    assert_eq!(resp.headers()["x-echo-path"], "/api/query/status?id=a%20b&x=1");
    assert_eq!(resp.headers()["x-echo-host"], upstream_host.as_str());
}

#[tokio::test]
async fn test_bare_prefix_is_forwarded() {
    let (base, _, _dist) = gateway_for(echo_upstream()).await;
    let resp = reqwest::Client::new()
        .delete(format!("{base}/api"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-echo-method"], "DELETE");
    assert_eq!(resp.headers()["x-echo-path"], "/api");
}

#[tokio::test]
async fn test_prefix_with_trailing_slash_is_forwarded() {
    let (base, _, _dist) = gateway_for(echo_upstream()).await;
    let resp = reqwest::get(format!("{base}/api/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-echo-method"], "GET");
    assert_eq!(resp.headers()["x-echo-path"], "/api/");
}

#[tokio::test]
async fn test_unreachable_upstream_is_502() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = listener.local_addr().unwrap();
    drop(listener);

    let dist = tempfile::tempdir().unwrap();
    let config = gateway_config(&format!("http://{dead}"), dist.path(), dist.path());
    let base = format!("http://{}", spawn(gateway(config)).await);

    let resp = reqwest::get(format!("{base}/api/files/list")).await.unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "error": "proxy_failed" }));
}

#[tokio::test]
async fn test_first_event_arrives_before_stream_ends() {
    let upstream = Router::new().route(
        "/api/events",
        get(|| async {
            let first = stream::once(async { Ok::<_, io::Error>(Bytes::from_static(b"data: one\n\n")) });
            Response::builder()
                .header("content-type", "text/event-stream")
                .body(Body::from_stream(first.chain(stream::pending())))
                .unwrap()
        }),
    );
    let (base, _, _dist) = gateway_for(upstream).await;

    let mut resp = reqwest::get(format!("{base}/api/events")).await.unwrap();
    assert_eq!(resp.headers()["content-type"], "text/event-stream");
    let chunk = tokio::time::timeout(Duration::from_secs(5), resp.chunk())
        .await
        .expect("first event was held back")
        .unwrap()
        .unwrap();
    assert_eq!(chunk.as_ref(), b"data: one\n\n");
}

#[tokio::test]
async fn test_mid_stream_failure_ends_response() {
    let upstream = Router::new().route(
        "/api/files/download",
        get(|| async {
            let parts: Vec<Result<Bytes, io::Error>> = vec![
                Ok(Bytes::from_static(b"partial")),
                Err(io::Error::other("upstream reset")),
            ];
            Response::new(Body::from_stream(stream::iter(parts)))
        }),
    );
    let (base, _, _dist) = gateway_for(upstream).await;

    let resp = reqwest::get(format!("{base}/api/files/download")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.bytes().await.is_err());
}
