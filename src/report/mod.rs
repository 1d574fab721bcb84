//! Report envelope types.
//!
//! One JSON shape for both outcomes: `ok: true` reports carry a score and
//! advisory content, `ok: false` reports carry an error envelope and a null
//! score. The debug block is present either way so failures can be traced
//! from the report alone.

use chrono::Utc;
use serde::Serialize;

use crate::advisory::{PageType, RewriteExample};
use crate::config::MAX_RAW_ERROR_LEN;
use crate::error_handling::ErrorCode;
use crate::matcher::Issue;

/// Identifier stamped into every debug block by the pipeline.
pub const HANDLER_ID: &str = "page_audit::pipeline";

/// Trace data attached to every report.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    /// Which handler produced the report.
    pub handler_id: &'static str,
    /// Terminal HTTP status, 0 when the fetch failed.
    pub fetch_status: u16,
    /// URL the fetch resolved to.
    pub final_url: String,
    /// Content-Type of the body response.
    pub content_type: Option<String>,
    /// Byte length of the captured HTML.
    pub html_len: usize,
    /// Flattened fetch error message, if any.
    pub fetch_error: Option<String>,
    /// RFC 3339 generation timestamp.
    pub generated_at: String,
}

impl DebugInfo {
    /// Creates a debug block stamped with the current time.
    pub fn new(
        fetch_status: u16,
        final_url: String,
        content_type: Option<String>,
        html_len: usize,
        fetch_error: Option<String>,
    ) -> Self {
        DebugInfo {
            handler_id: HANDLER_ID,
            fetch_status,
            final_url,
            content_type,
            html_len,
            fetch_error,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Stable machine-readable failure description.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    /// Stable error code.
    pub code: ErrorCode,
    /// Friendly, user-facing message.
    pub message: String,
    /// Truncated raw error text for operators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ErrorEnvelope {
    /// Builds an envelope, truncating the raw text to the configured cap.
    pub fn new(code: ErrorCode, raw: Option<String>) -> Self {
        ErrorEnvelope {
            message: code.friendly_message().to_string(),
            code,
            raw: raw.map(truncate_raw),
        }
    }
}

fn truncate_raw(raw: String) -> String {
    if raw.len() <= MAX_RAW_ERROR_LEN {
        return raw;
    }
    let mut end = MAX_RAW_ERROR_LEN;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    raw[..end].to_string()
}

/// The complete audit report for one page.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// True when the audit completed and produced a score.
    pub ok: bool,
    /// URL as requested.
    pub url: String,
    /// URL the audit resolved to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    /// Terminal HTTP status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// 0-100 audit score, absent when `ok` is false.
    pub score: Option<u8>,
    /// Top actionable issue titles, capped.
    pub quick_wins: Vec<String>,
    /// All detected issues.
    pub issues: Vec<Issue>,
    /// Classified page type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_type: Option<PageType>,
    /// Advice bullets for the page type.
    pub page_type_advice: Vec<String>,
    /// Templated rewrite suggestions.
    pub rewrite_examples: Vec<RewriteExample>,
    /// Outline-based content brief.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_brief: Option<String>,
    /// Non-fatal caveat (e.g., non-HTML content audited headers-only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Failure envelope, present exactly when `ok` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    /// Trace data.
    pub debug: DebugInfo,
}

impl AuditReport {
    /// Builds a failure report. `ok` is false and the score is absent.
    pub fn failure(url: String, envelope: ErrorEnvelope, debug: DebugInfo) -> Self {
        AuditReport {
            ok: false,
            url,
            final_url: None,
            status: None,
            score: None,
            quick_wins: vec![],
            issues: vec![],
            page_type: None,
            page_type_advice: vec![],
            rewrite_examples: vec![],
            content_brief: None,
            warning: None,
            error: Some(envelope),
            debug,
        }
    }
}
