//! Query submission and the poll loop.
//!
//! Lifecycle of `submit_query`:
//!   create → poll status every `POLL_INTERVAL` → on a terminal status fetch the
//!   result → render. At most one query is in flight per `QueryClient`.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use astra_common::{AstraError, CreateQueryRequest, Query, QueryResult, QueryStatus, Result};
use astra_config::ClientConfig;
use serde_json::Value;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

use crate::api::{EngineApi, HttpEngineApi};
use crate::cancel::CancellationToken;
use crate::render::{render, DisplayDocument};

pub const POLL_INTERVAL: Duration = Duration::from_millis(1_500);
pub const POLL_TIMEOUT: Duration = Duration::from_secs(120);

const DEFAULT_FAILURE_REASON: &str = "Query failed";

pub struct QueryClient {
    api: Arc<dyn EngineApi>,
    storage_prefix: String,
    /// Token of the in-flight query; `Some` while one is active.
    active: Mutex<Option<CancellationToken>>,
}

/// Clears the in-flight slot when the submission ends, however it ends.
struct ActiveQuery<'a> {
    slot: &'a Mutex<Option<CancellationToken>>,
    token: CancellationToken,
}

impl Drop for ActiveQuery<'_> {
    fn drop(&mut self) {
        *lock_slot(self.slot) = None;
    }
}

fn lock_slot(slot: &Mutex<Option<CancellationToken>>) -> MutexGuard<'_, Option<CancellationToken>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl QueryClient {
    pub fn new(api: Arc<dyn EngineApi>, storage_prefix: impl Into<String>) -> Self {
        Self {
            api,
            storage_prefix: storage_prefix.into(),
            active: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let api = HttpEngineApi::from_config(config)?;
        Ok(Self::new(Arc::new(api), config.storage_prefix.clone()))
    }

    pub fn api(&self) -> &Arc<dyn EngineApi> {
        &self.api
    }

    pub fn is_busy(&self) -> bool {
        lock_slot(&self.active).is_some()
    }

    /// Abort the in-flight poll, if any. Returns whether one was active.
    pub fn cancel(&self) -> bool {
        match lock_slot(&self.active).as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn begin(&self) -> Result<ActiveQuery<'_>> {
        let mut slot = lock_slot(&self.active);
        if slot.is_some() {
            return Err(AstraError::ConcurrentQuery);
        }
        let token = CancellationToken::new();
        *slot = Some(token.clone());
        Ok(ActiveQuery { slot: &self.active, token })
    }

    /// Submit a question and wait for its rendered answer.
    #[instrument(skip(self, question), fields(chars = question.chars().count()))]
    pub async fn submit_query(&self, question: &str, top_k: u32) -> Result<DisplayDocument> {
        let active = self.begin()?;
        let query = self.create(question, top_k).await?;
        let result = self.wait_for_result(&query.id, &active.token).await?;
        info!(id = %query.id, "query completed");
        Ok(render(Some(&result), &self.storage_prefix))
    }

    pub async fn create(&self, question: &str, top_k: u32) -> Result<Query> {
        let request = CreateQueryRequest {
            q: question.to_string(),
            top_k,
        };
        let id = self.api.create_query(&request).await?;
        Ok(Query {
            id,
            question_text: request.q,
            top_k,
        })
    }

    /// Poll `id` until it reaches a terminal status; returns the raw result
    /// payload of a `Completed` query.
    ///
    /// `token` is checked before every tick and after every response; once it
    /// is set no further request is issued.
    pub async fn wait_for_result(&self, id: &str, token: &CancellationToken) -> Result<Value> {
        let started = Instant::now();

        loop {
            if token.is_cancelled() {
                return Err(AstraError::PollingAborted);
            }
            if started.elapsed() > POLL_TIMEOUT {
                warn!(id, "query timed out");
                return Err(AstraError::QueryTimeout);
            }

            let status = self.api.query_status(id).await?;
            if token.is_cancelled() {
                return Err(AstraError::PollingAborted);
            }
            debug!(id, ?status, "polled query status");

            match status {
                Some(QueryStatus::Completed) => {
                    let result = self.api.query_result(id).await?;
                    if token.is_cancelled() {
                        return Err(AstraError::PollingAborted);
                    }
                    return Ok(result);
                }
                Some(QueryStatus::Failed) => {
                    let result = self.api.query_result(id).await?;
                    if token.is_cancelled() {
                        return Err(AstraError::PollingAborted);
                    }
                    let reason = QueryResult::from_value(&result)
                        .and_then(|r| r.error)
                        .unwrap_or_else(|| DEFAULT_FAILURE_REASON.to_string());
                    return Err(AstraError::QueryFailed(reason));
                }
                Some(QueryStatus::Cancelled) => return Err(AstraError::QueryCancelled),
                Some(QueryStatus::NotFound) => return Err(AstraError::QueryNotFound),
                Some(QueryStatus::Queued) | Some(QueryStatus::Running) | None => {}
            }

            sleep(POLL_INTERVAL).await;
        }
    }

    /// Ask the engine to cancel `id` and trip the local poll.
    pub async fn cancel_remote(&self, id: &str) -> Result<Value> {
        self.cancel();
        self.api.cancel_query(id).await
    }
}
