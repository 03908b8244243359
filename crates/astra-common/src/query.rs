//! Query lifecycle types shared by the client and the gateway tests.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A query accepted by the upstream engine. The id is engine-assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub id: String,
    pub question_text: String,
    pub top_k: u32,
}

/// Wire body of `POST /api/query/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateQueryRequest {
    pub q: String,
    pub top_k: u32,
}

/// Engine-side lifecycle state of a query. The client only observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryStatus {
    Queued,
    #[serde(alias = "InProgress")]
    Running,
    Completed,
    Failed,
    Cancelled,
    #[serde(rename = "not_found", alias = "NotFound")]
    NotFound,
}

impl QueryStatus {
    /// Parse the engine's status string with the same names serde accepts.
    /// Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_value(Value::from(raw)).ok()
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            QueryStatus::Completed
                | QueryStatus::Failed
                | QueryStatus::Cancelled
                | QueryStatus::NotFound
        )
    }
}

/// A document the engine considered relevant to the answer.
///
/// Built only through `from_value`; the engine's entries are too loose for a
/// derived decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReference {
    pub filename: String,
    pub description: Option<String>,
    pub relevance_score: Option<f64>,
}

impl FileReference {
    /// Lenient extraction from one `related_files` entry.
    /// Non-object entries are rejected; a missing filename falls back to the id.
    pub fn from_value(v: &Value) -> Option<Self> {
        if !v.is_object() {
            return None;
        }
        let filename = v["filename"]
            .as_str()
            .filter(|s| !s.is_empty())
            .or_else(|| v["id"].as_str().filter(|s| !s.is_empty()))
            .unwrap_or("download")
            .to_string();

        Some(Self {
            filename,
            description: v["description"]
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            relevance_score: v["score"].as_f64(),
        })
    }
}

/// Terminal payload of a query, as stored by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub final_answer: Option<String>,
    pub relationships_narrative: Option<String>,
    pub related_files: Vec<FileReference>,
    /// Failure reason; only set when the query ended `Failed`.
    pub error: Option<String>,
}

impl QueryResult {
    /// Lenient extraction from the `result` field of `GET /api/query/result`.
    /// Returns `None` when the payload is absent or not an object.
    pub fn from_value(v: &Value) -> Option<Self> {
        if !v.is_object() {
            return None;
        }
        let text = |key: &str| {
            v[key]
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let related_files = v["related_files"]
            .as_array()
            .map(|files| files.iter().filter_map(FileReference::from_value).collect())
            .unwrap_or_default();

        Some(Self {
            final_answer: text("final_answer"),
            relationships_narrative: text("relationships"),
            related_files,
            error: text("error"),
        })
    }
}
