//! Engine HTTP contract, as reached through the gateway.
//!
//! Endpoints:
//!   POST /api/query/create        {q, top_k}   → {id}
//!   GET  /api/query/status?id=               → {status}
//!   GET  /api/query/result?id=               → {result}
//!   GET  /api/query/cancel?id=               → acknowledgement
//!   GET  /api/files/list                     → {files: [...]}
//!   POST /api/files/import-demo              → {imported, skipped, error?}

use std::time::Duration;

use astra_common::{AstraError, CreateQueryRequest, FileSummary, ImportSummary, QueryStatus, Result};
use astra_config::ClientConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::files::parse_file_list;

/// Per-request timeout for the short JSON calls of the query protocol.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the query client needs from the engine.
#[async_trait]
pub trait EngineApi: Send + Sync {
    /// Create a query; returns the engine-assigned id.
    async fn create_query(&self, request: &CreateQueryRequest) -> Result<String>;

    /// Current status, or `None` when the engine reports something unrecognised.
    async fn query_status(&self, id: &str) -> Result<Option<QueryStatus>>;

    /// The raw `result` field; `Value::Null` when the engine has none.
    async fn query_result(&self, id: &str) -> Result<Value>;

    async fn cancel_query(&self, id: &str) -> Result<Value>;

    /// Never fails on a malformed listing, only on transport or HTTP errors.
    async fn list_files(&self) -> Result<Vec<FileSummary>>;

    async fn import_demo(&self) -> Result<ImportSummary>;
}

pub struct HttpEngineApi {
    client: Client,
    base_url: String,
}

impl HttpEngineApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn url_with_id(&self, path: &str, id: &str) -> String {
        format!("{}{}?id={}", self.base_url, path, urlencoding::encode(id))
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        parse_json_response(resp).await
    }
}

/// Decode a JSON reply leniently.
///
/// An empty body is `{}`; a non-JSON body becomes `{"raw": text}`. A non-2xx
/// status is an `Api` error carrying the body's `error` field when present.
pub async fn parse_json_response(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let text = resp.text().await?;
    let data = if text.is_empty() {
        None
    } else {
        Some(serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "raw": text })))
    };

    if !status.is_success() {
        let message = data
            .as_ref()
            .and_then(|d| d["error"].as_str())
            .filter(|m| !m.is_empty())
            .map(String::from)
            .or_else(|| status.canonical_reason().map(String::from))
            .unwrap_or_else(|| "Request failed".to_string());
        warn!(status = status.as_u16(), %message, "engine request failed");
        return Err(AstraError::Api { status: status.as_u16(), message });
    }

    Ok(data.unwrap_or_else(|| json!({})))
}

#[async_trait]
impl EngineApi for HttpEngineApi {
    #[instrument(skip(self, request), fields(top_k = request.top_k))]
    async fn create_query(&self, request: &CreateQueryRequest) -> Result<String> {
        let resp = self
            .client
            .post(self.url("/api/query/create"))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;
        let data = parse_json_response(resp).await?;

        match data["id"].as_str() {
            Some(id) if !id.is_empty() => {
                debug!(id, "query created");
                Ok(id.to_string())
            }
            _ => Err(AstraError::Creation),
        }
    }

    #[instrument(skip(self))]
    async fn query_status(&self, id: &str) -> Result<Option<QueryStatus>> {
        let data = self.get_json(&self.url_with_id("/api/query/status", id)).await?;
        Ok(data["status"].as_str().and_then(QueryStatus::parse))
    }

    #[instrument(skip(self))]
    async fn query_result(&self, id: &str) -> Result<Value> {
        let mut data = self.get_json(&self.url_with_id("/api/query/result", id)).await?;
        Ok(data.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }

    #[instrument(skip(self))]
    async fn cancel_query(&self, id: &str) -> Result<Value> {
        self.get_json(&self.url_with_id("/api/query/cancel", id)).await
    }

    #[instrument(skip(self))]
    async fn list_files(&self) -> Result<Vec<FileSummary>> {
        let data = self
            .get_json(&self.url("/api/files/list"))
            .await
            .map_err(|e| AstraError::ListFiles(e.to_string()))?;
        Ok(parse_file_list(&data))
    }

    #[instrument(skip(self))]
    async fn import_demo(&self) -> Result<ImportSummary> {
        let resp = self
            .client
            .post(self.url("/api/files/import-demo"))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let data = parse_json_response(resp).await?;
        Ok(serde_json::from_value(data)?)
    }
}
