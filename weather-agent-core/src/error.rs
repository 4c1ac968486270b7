//! Error types for the weather lookup and the tool boundary.

use thiserror::Error;

/// Why a weather lookup could not produce a success report.
///
/// The `Display` text is what ends up after the colon in an error report.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("地名が指定されていません")]
    EmptyPlace,

    /// Connection failure, timeout or unreadable body.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-2xx status.
    #[error("weather request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse weather response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A 2xx body that lacks a field the report needs.
    #[error("weather response is missing `{0}`")]
    MissingField(&'static str),
}

/// Errors raised while dispatching a tool call from the agent runtime.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shorten an upstream body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
