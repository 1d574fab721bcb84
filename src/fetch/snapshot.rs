//! The fetched page snapshot handed to extraction and matching.

use serde::Serialize;

use crate::config::MAX_HTML_BYTES;
use crate::error_handling::FetchError;
use crate::fetch::walker::WalkOutcome;

/// Everything the audit needs from the network, captured in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    /// URL as requested.
    pub requested_url: String,
    /// URL the chain resolved to.
    pub final_url: String,
    /// Terminal HTTP status, 0 on network failure.
    pub final_status: u16,
    /// Clipped HTML body, present only for HTML responses.
    pub html: Option<String>,
    /// Content-Type of the body response.
    pub content_type: Option<String>,
    /// The walked redirect chain.
    pub outcome: WalkOutcome,
    /// Probe of the `https://` variant, walked only for plain-http starts
    /// that did not end on https.
    pub https_probe: Option<WalkOutcome>,
    /// Network-level failure, if the fetch did not complete.
    pub fetch_error: Option<FetchError>,
}

impl PageSnapshot {
    /// True when the snapshot carries a usable HTML body.
    pub fn has_html(&self) -> bool {
        self.html.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// True when the Content-Type marks an HTML document.
    pub fn is_html_content(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
    }
}

/// Clips a body to the HTML size cap, keeping the cut on a char boundary.
pub fn clip_html(mut html: String) -> String {
    if html.len() > MAX_HTML_BYTES {
        let mut end = MAX_HTML_BYTES;
        while !html.is_char_boundary(end) {
            end -= 1;
        }
        html.truncate(end);
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_html_leaves_small_bodies_alone() {
        let body = "<html></html>".to_string();
        assert_eq!(clip_html(body.clone()), body);
    }

    #[test]
    fn test_clip_html_respects_char_boundaries() {
        // Multibyte char straddling the cap must not cause a panic.
        let mut body = "a".repeat(MAX_HTML_BYTES - 1);
        body.push('\u{00e9}');
        body.push_str("tail");
        let clipped = clip_html(body);
        assert!(clipped.len() <= MAX_HTML_BYTES);
        assert!(clipped.is_char_boundary(clipped.len()));
    }
}
