//! Engine result → display document. No I/O.

use astra_common::{FileReference, QueryResult};
use serde::Serialize;
use serde_json::Value;

pub const NO_RESPONSE: &str = "I could not find a response for that request.";
pub const NO_ANSWER: &str = "I could not determine an answer from the indexed documents yet.";
pub const NO_MATCHES_HINT: &str =
    "_No analyzed documents matched yet. Try seeding demo data or wait for processing to finish._";

/// Answers shorter than this, with no related files, get the no-matches hint.
pub const MIN_ANSWER_CHARS: usize = 10;

/// A related file, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub display_name: String,
    pub link: String,
    pub description: Option<String>,
    pub score: Option<f64>,
}

impl Citation {
    pub fn from_reference(file: &FileReference, storage_prefix: &str) -> Self {
        Self {
            display_name: file.filename.clone(),
            link: format!(
                "{}/{}",
                storage_prefix.trim_end_matches('/'),
                urlencoding::encode(&file.filename)
            ),
            description: file.description.clone(),
            score: file.relevance_score,
        }
    }

    /// `- [name](link) — description _(score: 0.823)_`
    pub fn to_markdown_line(&self) -> String {
        let detail = self
            .description
            .as_deref()
            .map(|d| format!(" — {d}"))
            .unwrap_or_default();
        let score = self
            .score
            .map(|s| format!(" _(score: {s:.3})_"))
            .unwrap_or_default();
        format!("- [{}]({}){}{}", self.display_name, self.link, detail, score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayDocument {
    /// The answer, or a fixed fallback message.
    pub primary_text: String,
    pub citations: Vec<Citation>,
    pub relationships: Option<String>,
    /// Whether the no-matches hint was appended.
    pub hint: bool,
    /// Full markdown body for the view layer.
    pub markdown: String,
}

impl DisplayDocument {
    fn no_response() -> Self {
        Self {
            primary_text: NO_RESPONSE.to_string(),
            citations: Vec::new(),
            relationships: None,
            hint: false,
            markdown: NO_RESPONSE.to_string(),
        }
    }
}

/// Render the raw `result` payload of a completed query.
pub fn render(result: Option<&Value>, storage_prefix: &str) -> DisplayDocument {
    match result.and_then(QueryResult::from_value) {
        Some(parsed) => render_result(&parsed, storage_prefix),
        None => DisplayDocument::no_response(),
    }
}

pub fn render_result(result: &QueryResult, storage_prefix: &str) -> DisplayDocument {
    let answer = result
        .final_answer
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());

    let citations: Vec<Citation> = result
        .related_files
        .iter()
        .map(|f| Citation::from_reference(f, storage_prefix))
        .collect();

    let primary_text = answer.unwrap_or(NO_ANSWER).to_string();
    let mut markdown = primary_text.clone();

    if !citations.is_empty() {
        let lines: Vec<String> = citations.iter().map(Citation::to_markdown_line).collect();
        markdown.push_str("\n\n**Related Files**\n");
        markdown.push_str(&lines.join("\n"));
    }

    // Skip the narrative when it only repeats the answer.
    let relationships = result
        .relationships_narrative
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty() && Some(*r) != answer)
        .map(String::from);
    if let Some(rel) = &relationships {
        markdown.push_str("\n\n---\n");
        markdown.push_str(rel);
    }

    let hint = citations.is_empty()
        && answer.map_or(true, |a| a.chars().count() < MIN_ANSWER_CHARS);
    if hint {
        markdown.push_str("\n\n");
        markdown.push_str(NO_MATCHES_HINT);
    }

    DisplayDocument {
        primary_text,
        citations,
        relationships,
        hint,
        markdown,
    }
}
