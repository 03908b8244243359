//! Listing of previously ingested documents.

use astra_common::FileSummary;
use serde_json::Value;
use tracing::debug;

/// Extract `files` from a listing reply.
///
/// A missing or non-array `files` yields an empty list, and entries that do not
/// look like a file record are skipped, so the UI degrades instead of failing.
pub fn parse_file_list(data: &Value) -> Vec<FileSummary> {
    let Some(entries) = data["files"].as_array() else {
        debug!("file listing carried no files array");
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect()
}

/// One-line header summary, e.g. `"3 ready • 1 processing"`.
pub fn summarize(files: &[FileSummary]) -> String {
    if files.is_empty() {
        return "No files indexed yet.".to_string();
    }
    let pending = files.iter().filter(|f| f.pending_analysis).count();
    let ready = files.len() - pending;
    format!("{ready} ready • {pending} processing")
}
