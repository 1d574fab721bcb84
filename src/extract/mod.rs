//! On-page signal extraction.
//!
//! Pure functions over raw HTML text. Extraction uses targeted pattern
//! matching against known tag shapes rather than a full DOM, and tolerates
//! malformed or partial HTML: absence of a tag is a valid, common case,
//! never an error.

mod links;

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

pub use links::{link_stats, LinkStats};

use crate::config::{META_FALLBACK_MIN_CHARS, META_FALLBACK_TRUNCATE_CHARS};

/// Phrases in the title that mark a page as a likely error page.
const NOT_FOUND_TITLE_PHRASES: [&str; 3] = ["404", "not found", "page not found"];

/// Phrases in the body that mark a page as a likely error page.
const NOT_FOUND_BODY_PHRASES: [&str; 10] = [
    "page not found",
    "not found",
    "does not exist",
    "doesn't exist",
    "error 404",
    "404 error",
    "the page you requested",
    "cannot be found",
    "we can't find",
    "we cannot find",
];

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title regex is valid"));
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("h1 regex is valid"));
static P_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p[^>]*>(.*?)</p>").expect("p regex is valid"));
static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("meta tag regex is valid"));
static LINK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").expect("link tag regex is valid"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag strip regex is valid"));
static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>")
        .expect("script/style regex is valid")
});
static WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([a-zA-Z][a-zA-Z0-9:_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("attribute regex is valid")
});

/// Structured read-only view of a fetched page.
///
/// Consumed by both the issue matcher and the advisory generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedSignals {
    /// Collapsed, trimmed text of the first `<title>`.
    pub title: String,
    /// Character length of the title.
    pub title_len: usize,
    /// Meta description (or first-paragraph fallback).
    pub meta_description: String,
    /// Character length of the meta description.
    pub meta_description_len: usize,
    /// Tag-stripped text of the first `<h1>`.
    pub h1: String,
    /// Total `<h1>` occurrences.
    pub h1_count: usize,
    /// Resolved canonical URL, or empty.
    pub canonical_url: String,
    /// Word count of the tag-stripped `<body>` text.
    pub word_count: usize,
    /// Internal link count.
    pub internal_links: usize,
    /// External link count.
    pub external_links: usize,
    /// Mean internal-link depth over sampled unique paths.
    pub avg_link_depth: f64,
    /// Max internal-link depth over sampled unique paths.
    pub max_link_depth: usize,
    /// Whether meta robots contains a `noindex` directive.
    pub robots_noindex: bool,
    /// Byte length of the raw HTML the signals came from.
    pub html_bytes: usize,
    /// "Not found" phrases matched in the title.
    pub not_found_title_hits: Vec<String>,
    /// "Not found" phrases matched anywhere in the HTML.
    pub not_found_body_hits: Vec<String>,
}

/// Extracts all on-page signals from `html`, resolving links against
/// `final_url`. Pure function, no I/O, never panics on malformed input.
pub fn extract(html: &str, final_url: &str) -> ExtractedSignals {
    let title = TITLE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| collapse_ws(m.as_str()))
        .unwrap_or_default();

    let h1 = H1_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| collapse_ws(&strip_tags(m.as_str())))
        .unwrap_or_default();
    let h1_count = H1_RE.find_iter(html).count();

    let head = head_slice(html);
    let meta_description = meta_description(head, html);
    let canonical_url = canonical_href(html)
        .map(|href| resolve_maybe(&href, final_url))
        .unwrap_or_default();

    let robots_noindex = meta_content(head, "robots")
        .map(|v| v.to_lowercase().contains("noindex"))
        .unwrap_or(false);

    let word_count = body_word_count(html);
    let links = link_stats(html, final_url);

    let not_found_title_hits = phrase_hits(&title, &NOT_FOUND_TITLE_PHRASES);
    let not_found_body_hits = phrase_hits(html, &NOT_FOUND_BODY_PHRASES);

    ExtractedSignals {
        title_len: title.chars().count(),
        title,
        meta_description_len: meta_description.chars().count(),
        meta_description,
        h1,
        h1_count,
        canonical_url,
        word_count,
        internal_links: links.internal,
        external_links: links.external,
        avg_link_depth: links.avg_depth,
        max_link_depth: links.max_depth,
        robots_noindex,
        html_bytes: html.len(),
        not_found_title_hits,
        not_found_body_hits,
    }
}

/// Returns the phrases from `patterns` present in `text`, case-insensitively.
fn phrase_hits(text: &str, patterns: &[&str]) -> Vec<String> {
    let lower = text.to_lowercase();
    patterns
        .iter()
        .filter(|p| lower.contains(*p))
        .map(|p| p.to_string())
        .collect()
}

/// Collapses runs of whitespace to single spaces and trims.
pub fn collapse_ws(s: &str) -> String {
    WS_RE.replace_all(s, " ").trim().to_string()
}

/// Replaces tags with spaces so adjacent words do not merge.
pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, " ").to_string()
}

/// ASCII case-insensitive substring search. Byte-indexed lowercase search is
/// unsafe for non-ASCII text, and every needle here starts with an ASCII `<`.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| {
        h[i..i + n.len()]
            .iter()
            .zip(n)
            .all(|(a, b)| a.to_ascii_lowercase() == b.to_ascii_lowercase())
    })
}

/// Returns the `<head>` portion of the document, or the whole document when
/// no closing tag is present (partial HTML is common).
fn head_slice(html: &str) -> &str {
    match find_ascii_ci(html, "</head") {
        Some(end) => &html[..end],
        None => html,
    }
}

/// Extracts an attribute value from a single tag's text.
fn tag_attr(tag: &str, name: &str) -> Option<String> {
    for caps in ATTR_RE.captures_iter(tag) {
        let attr = caps.get(1)?.as_str();
        if attr.eq_ignore_ascii_case(name) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().trim().to_string())?;
            return Some(value);
        }
    }
    None
}

/// Finds the first `<meta>` whose name/property/itemprop equals `key`
/// (case-insensitively) and returns its `content`.
fn meta_content(head: &str, key: &str) -> Option<String> {
    for m in META_TAG_RE.find_iter(head) {
        let tag = m.as_str();
        let matches_key = ["name", "property", "itemprop"].iter().any(|attr| {
            tag_attr(tag, attr)
                .map(|v| v.eq_ignore_ascii_case(key))
                .unwrap_or(false)
        });
        if matches_key {
            if let Some(content) = tag_attr(tag, "content") {
                return Some(collapse_ws(&content));
            }
        }
    }
    None
}

/// Meta description with the first-paragraph fallback.
///
/// Scans `<meta>` tags in `<head>` for description, og:description, then
/// twitter:description (first match wins). When none is present, falls back
/// to the first `<p>` whose collapsed text reaches the minimum length,
/// truncated to the configured point. Many thin landing pages omit the meta
/// tag but carry an obvious lead paragraph.
fn meta_description(head: &str, html: &str) -> String {
    for key in ["description", "og:description", "twitter:description"] {
        if let Some(content) = meta_content(head, key) {
            if !content.is_empty() {
                return content;
            }
        }
    }

    for caps in P_RE.captures_iter(html) {
        if let Some(m) = caps.get(1) {
            let text = collapse_ws(&strip_tags(m.as_str()));
            if text.chars().count() >= META_FALLBACK_MIN_CHARS {
                return text.chars().take(META_FALLBACK_TRUNCATE_CHARS).collect();
            }
        }
    }

    String::new()
}

/// First `<link>` whose `rel` attribute contains the `canonical` token,
/// tolerant of quote style and multiple rel tokens.
fn canonical_href(html: &str) -> Option<String> {
    for m in LINK_TAG_RE.find_iter(html) {
        let tag = m.as_str();
        let is_canonical = tag_attr(tag, "rel")
            .map(|rel| {
                rel.split_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("canonical"))
            })
            .unwrap_or(false);
        if is_canonical {
            if let Some(href) = tag_attr(tag, "href") {
                if !href.is_empty() {
                    return Some(href);
                }
            }
        }
    }
    None
}

fn resolve_maybe(href: &str, base: &str) -> String {
    match Url::parse(href) {
        Ok(u) => u.to_string(),
        Err(_) => Url::parse(base)
            .and_then(|b| b.join(href))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
    }
}

/// Word count of the `<body>` text with scripts, styles, and tags stripped.
fn body_word_count(html: &str) -> usize {
    let start = find_ascii_ci(html, "<body")
        .and_then(|i| html[i..].find('>').map(|j| i + j + 1))
        .unwrap_or(0);
    let end = find_ascii_ci(html, "</body").unwrap_or(html.len());
    if start >= end {
        return 0;
    }
    let body = &html[start..end];
    let without_scripts = SCRIPT_STYLE_RE.replace_all(body, " ");
    let text = strip_tags(&without_scripts);
    text.split_whitespace().count()
}
