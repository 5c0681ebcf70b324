//! Output formatting for search results.
//!
//! Supports both human-readable terminal output and JSON for scripting.
//! Every result line carries its citation (document, page, partition) so
//! answers can point back to the source agreement.

use docket_core::search::ScoredResult;
use serde::Serialize;

/// Maximum characters to show in a text snippet
const SNIPPET_MAX_LEN: usize = 200;

/// JSON output structure for search results
#[derive(Serialize)]
pub struct JsonOutput {
    pub query: String,
    pub partition: String,
    pub results: Vec<JsonResult>,
}

/// One ranked chunk in JSON format
#[derive(Serialize)]
pub struct JsonResult {
    pub id: String,
    pub document_name: String,
    pub page_no: u32,
    pub score: f32,
    pub semantic_score: Option<f32>,
    pub lexical_score: Option<f32>,
    pub snippet: String,
}

impl From<&ScoredResult> for JsonResult {
    fn from(result: &ScoredResult) -> Self {
        Self {
            id: result.id.clone(),
            document_name: result.document_name.clone(),
            page_no: result.page_no,
            score: result.score,
            semantic_score: result.semantic_score,
            lexical_score: result.lexical_score,
            snippet: truncate_text(&result.text, SNIPPET_MAX_LEN),
        }
    }
}

/// Formats search results as JSON.
pub fn format_json(query: &str, partition: &str, results: &[ScoredResult]) -> String {
    let output = JsonOutput {
        query: query.to_string(),
        partition: partition.to_string(),
        results: results.iter().map(JsonResult::from).collect(),
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Formats search results for human-readable terminal output.
pub fn format_human(query: &str, partition: &str, results: &[ScoredResult]) -> String {
    if results.is_empty() {
        return format!("No results found for \"{}\" in partition {}", query, partition);
    }

    let mut output = String::new();
    output.push_str(&format!(
        "Found {} result{} for \"{}\" in partition {}:\n\n",
        results.len(),
        if results.len() == 1 { "" } else { "s" },
        query,
        partition
    ));

    for (i, result) in results.iter().enumerate() {
        output.push_str(&format!(
            "{}. {}, Page {} (score: {:.2})\n",
            i + 1,
            result.document_name,
            result.page_no,
            result.score
        ));

        let mut score_parts = Vec::new();
        if let Some(semantic) = result.semantic_score {
            score_parts.push(format!("semantic: {:.2}", semantic));
        }
        if let Some(lexical) = result.lexical_score {
            score_parts.push(format!("keyword: {:.2}", lexical));
        }
        if !score_parts.is_empty() {
            output.push_str(&format!("   [{}]\n", score_parts.join(", ")));
        }

        let snippet = truncate_text(&result.text, SNIPPET_MAX_LEN);
        output.push_str(&format!("   {}\n", indent_text(&snippet, "   ")));
        output.push('\n');
    }

    output.trim_end().to_string()
}

/// Truncates text to a maximum length in bytes, adding ellipsis if
/// needed. The cut never lands inside a multi-byte character.
fn truncate_text(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.len() <= max_len {
        return text.to_string();
    }

    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    // Prefer a word boundary near the cut
    let truncated = &text[..end];
    if let Some(last_space) = truncated.rfind(' ') {
        format!("{}...", &truncated[..last_space])
    } else {
        format!("{}...", truncated)
    }
}

/// Indents all lines of text after the first line.
fn indent_text(text: &str, indent: &str) -> String {
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.to_string()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
