//! Ingested-document records as listed by the engine.

use serde::{Deserialize, Serialize};

/// One entry of `GET /api/files/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    #[serde(default)]
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub description: Option<String>,
    /// True while the engine has not finished analysing the file.
    #[serde(default)]
    pub pending_analysis: bool,
    #[serde(default)]
    pub analysis_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Reply of `POST /api/files/import-demo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    #[serde(default)]
    pub imported: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
