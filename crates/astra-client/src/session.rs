//! Chat transcript driven by a `QueryClient`.
//!
//! Each send adds a user entry and a pending assistant placeholder. The
//! placeholder is replaced by the rendered answer, or flagged as an error with
//! the failure reason. Surfaced errors also raise a short-lived notice.

use std::sync::Arc;
use std::time::Duration;

use astra_common::{AstraError, FileSummary, Result};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::QueryClient;
use crate::files::summarize;
use crate::render::DisplayDocument;

pub const INTRO_MESSAGE: &str = "Ask me about the demo PDFs and I'll respond with the best matches pulled from the processed files.";
pub const PENDING_MESSAGE: &str = "_Analyzing indexed documents..._";
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatEntry {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub pending: bool,
    pub error: bool,
    #[serde(skip)]
    pub document: Option<DisplayDocument>,
}

impl ChatEntry {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            pending: false,
            error: false,
            document: None,
        }
    }

    fn intro() -> Self {
        Self {
            id: "intro".to_string(),
            ..Self::new(Role::Assistant, INTRO_MESSAGE)
        }
    }
}

#[derive(Debug, Clone)]
struct Notice {
    message: String,
    raised_at: Instant,
}

pub struct ChatSession {
    client: Arc<QueryClient>,
    top_k: u32,
    entries: Vec<ChatEntry>,
    files: Vec<FileSummary>,
    notice: Option<Notice>,
}

impl ChatSession {
    pub fn new(client: Arc<QueryClient>, top_k: u32) -> Self {
        Self {
            client,
            top_k,
            entries: vec![ChatEntry::intro()],
            files: Vec::new(),
            notice: None,
        }
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn files(&self) -> &[FileSummary] {
        &self.files
    }

    pub fn file_summary(&self) -> String {
        summarize(&self.files)
    }

    pub fn is_processing(&self) -> bool {
        self.client.is_busy()
    }

    /// Message of the current notice, until it expires.
    pub fn active_notice(&self) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|n| n.raised_at.elapsed() < NOTICE_TTL)
            .map(|n| n.message.as_str())
    }

    fn raise_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            message: message.into(),
            raised_at: Instant::now(),
        });
    }

    /// Reset the transcript to the intro entry.
    pub fn clear(&mut self) {
        self.entries = vec![ChatEntry::intro()];
    }

    /// Ask a question and settle the assistant entry for it.
    ///
    /// Query failures are recorded on the returned entry; only a rejected
    /// concurrent send returns `Err`, and it leaves the transcript untouched.
    pub async fn send(&mut self, text: &str) -> Result<&ChatEntry> {
        if self.client.is_busy() {
            let err = AstraError::ConcurrentQuery;
            self.raise_notice(err.to_string());
            return Err(err);
        }

        self.entries.push(ChatEntry::new(Role::User, text));
        let mut placeholder = ChatEntry::new(Role::Assistant, PENDING_MESSAGE);
        placeholder.pending = true;
        self.entries.push(placeholder);
        let slot = self.entries.len() - 1;

        let outcome = self.client.submit_query(text, self.top_k).await;
        let entry = &mut self.entries[slot];
        entry.pending = false;
        let notice = match outcome {
            Ok(doc) => {
                entry.content = doc.markdown.clone();
                entry.document = Some(doc);
                None
            }
            Err(e) => {
                if e.is_terminal_status() {
                    info!(error = %e, "query ended without an answer");
                } else {
                    warn!(error = %e, "query failed");
                }
                entry.content = format!("⚠️ {e}");
                entry.error = true;
                Some(e.to_string())
            }
        };
        if let Some(message) = notice {
            self.raise_notice(message);
        }

        self.refresh_files().await;
        Ok(&self.entries[slot])
    }

    /// Reload the file listing; a failure only raises a notice.
    pub async fn refresh_files(&mut self) {
        match self.client.api().list_files().await {
            Ok(files) => self.files = files,
            Err(e) => {
                warn!(error = %e, "file listing failed");
                let message = e.to_string();
                self.raise_notice(if message.is_empty() {
                    "Failed to load files".to_string()
                } else {
                    message
                });
            }
        }
    }
}
