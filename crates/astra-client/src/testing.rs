//! In-memory engine double for poll-loop tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use astra_common::{AstraError, CreateQueryRequest, FileSummary, ImportSummary, QueryStatus, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::api::EngineApi;

/// Replays a scripted status sequence and records every call.
///
/// Once the script runs out, the last status repeats forever.
pub struct ScriptedEngine {
    id: Option<String>,
    statuses: Mutex<VecDeque<Option<QueryStatus>>>,
    last_status: Mutex<Option<QueryStatus>>,
    result: Value,
    files: Mutex<Option<Vec<FileSummary>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    pub fn new(id: &str, statuses: &[QueryStatus], result: Value) -> Self {
        Self {
            id: Some(id.to_string()),
            statuses: Mutex::new(statuses.iter().copied().map(Some).collect()),
            last_status: Mutex::new(None),
            result,
            files: Mutex::new(Some(Vec::new())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create calls succeed at the HTTP level but carry no id.
    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    pub fn with_files(self, files: Vec<FileSummary>) -> Self {
        *self.files.lock().unwrap() = Some(files);
        self
    }

    /// Listing calls fail with a transport-level error.
    pub fn with_failing_listing(self) -> Self {
        *self.files.lock().unwrap() = None;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl EngineApi for ScriptedEngine {
    async fn create_query(&self, request: &CreateQueryRequest) -> Result<String> {
        self.record(format!("create:{}", request.q));
        self.id.clone().ok_or(AstraError::Creation)
    }

    async fn query_status(&self, id: &str) -> Result<Option<QueryStatus>> {
        self.record(format!("status:{id}"));
        let next = self.statuses.lock().unwrap().pop_front();
        let mut last = self.last_status.lock().unwrap();
        if let Some(status) = next {
            *last = status;
        }
        Ok(*last)
    }

    async fn query_result(&self, id: &str) -> Result<Value> {
        self.record(format!("result:{id}"));
        Ok(self.result.clone())
    }

    async fn cancel_query(&self, id: &str) -> Result<Value> {
        self.record(format!("cancel:{id}"));
        Ok(serde_json::json!({ "cancelled": true }))
    }

    async fn list_files(&self) -> Result<Vec<FileSummary>> {
        self.record("list_files");
        self.files
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AstraError::ListFiles("engine unreachable".to_string()))
    }

    async fn import_demo(&self) -> Result<ImportSummary> {
        self.record("import_demo");
        Ok(ImportSummary::default())
    }
}
