//! Signal-to-issue matching.
//!
//! Deterministic rules that turn "signal present/absent/out-of-range" into
//! concrete [`Issue`] records carrying the evidence that triggered them, so
//! a report is self-explanatory without re-fetching the page.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::{json, Value};

use url::Url;

use crate::catalog::{IssueCatalog, Priority, Severity};
use crate::config::{SOFT_404_BODY_MAX_BYTES, SOFT_404_TITLE_MAX_BYTES, TITLE_MAX_LEN};
use crate::extract::ExtractedSignals;
use crate::fetch::norm_url;

/// A single detected problem, tied to a catalog definition.
///
/// Severity and priority default to the definition's values; detectors may
/// escalate them (e.g., a 5xx terminal status always escalates to fix_now).
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    /// Stable catalog key.
    pub issue_id: String,
    /// Human-readable title.
    pub title: String,
    /// Resolved severity.
    pub severity: Severity,
    /// Resolved priority.
    pub priority: Priority,
    /// "Why it matters" explanation.
    pub why: String,
    /// Rendered fix recommendation.
    pub example_fix: String,
    /// Concrete values that triggered the issue.
    pub evidence: BTreeMap<String, Value>,
}

/// Builds an [`Issue`] from its catalog definition.
///
/// # Panics
///
/// Panics if `issue_id` is not in the catalog (programming invariant).
pub fn mk_issue(
    catalog: &IssueCatalog,
    issue_id: &str,
    evidence: BTreeMap<String, Value>,
) -> Issue {
    let def = catalog.get(issue_id);
    Issue {
        issue_id: def.issue_id.clone(),
        title: def.title.clone(),
        severity: def.severity,
        priority: def.priority,
        why: def.why.clone(),
        example_fix: def.example_fix.steps.join(" "),
        evidence,
    }
}

/// Builds an [`Issue`] with the definition's priority overridden.
pub fn mk_issue_with_priority(
    catalog: &IssueCatalog,
    issue_id: &str,
    priority: Priority,
    evidence: BTreeMap<String, Value>,
) -> Issue {
    let mut issue = mk_issue(catalog, issue_id, evidence);
    issue.priority = priority;
    issue
}

/// Evidence map builder for the common `(final_url, status)` pair.
fn base_evidence(final_url: &str, status: u16) -> BTreeMap<String, Value> {
    let mut ev = BTreeMap::new();
    ev.insert("final_url".to_string(), json!(final_url));
    ev.insert("status".to_string(), json!(status));
    ev
}

/// Applies the on-page matching rules to the extracted signals.
///
/// | Signal | Issue |
/// |---|---|
/// | title empty | `missing_title` |
/// | title length > 60 | `title_too_long` |
/// | meta description empty | `missing_meta_description` |
/// | H1 empty | `missing_h1` |
/// | H1 count > 1 | `multiple_h1` |
/// | canonical empty | `missing_canonical` |
/// | final status >= 400 | `http_status_error` |
/// | meta robots noindex | `robots_noindex` |
/// | canonical differs from final URL (200 only) | `canonical_redirect_mismatch` |
/// | 200 page with "not found" phrasing | `http_soft_404` |
pub fn match_signals(
    catalog: &IssueCatalog,
    signals: &ExtractedSignals,
    final_url: &str,
    final_status: u16,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    if signals.title.is_empty() {
        issues.push(mk_issue(
            catalog,
            "missing_title",
            base_evidence(final_url, final_status),
        ));
    } else if signals.title_len > TITLE_MAX_LEN {
        let mut ev = base_evidence(final_url, final_status);
        ev.insert("title".to_string(), json!(signals.title));
        ev.insert("title_len".to_string(), json!(signals.title_len));
        issues.push(mk_issue(catalog, "title_too_long", ev));
    }

    if signals.meta_description.is_empty() {
        issues.push(mk_issue(
            catalog,
            "missing_meta_description",
            base_evidence(final_url, final_status),
        ));
    }

    if signals.h1.is_empty() {
        issues.push(mk_issue(
            catalog,
            "missing_h1",
            base_evidence(final_url, final_status),
        ));
    } else if signals.h1_count > 1 {
        let mut ev = base_evidence(final_url, final_status);
        ev.insert("h1".to_string(), json!(signals.h1));
        ev.insert("h1_count".to_string(), json!(signals.h1_count));
        issues.push(mk_issue(catalog, "multiple_h1", ev));
    }

    if signals.canonical_url.is_empty() {
        issues.push(mk_issue(
            catalog,
            "missing_canonical",
            base_evidence(final_url, final_status),
        ));
    }

    if signals.robots_noindex {
        issues.push(mk_issue(
            catalog,
            "robots_noindex",
            base_evidence(final_url, final_status),
        ));
    }

    if final_status >= 400 {
        issues.push(mk_issue(
            catalog,
            "http_status_error",
            base_evidence(final_url, final_status),
        ));
    }

    if final_status == 200 {
        if let Some(issue) = canonical_mismatch(catalog, signals, final_url, final_status) {
            issues.push(issue);
        }
        if let Some(issue) = soft_404(catalog, signals, final_url, final_status) {
            issues.push(issue);
        }
    }

    issues
}

/// `canonical_redirect_mismatch` when the declared canonical's normalized
/// URL or host differs from the URL the page resolved to.
fn canonical_mismatch(
    catalog: &IssueCatalog,
    signals: &ExtractedSignals,
    final_url: &str,
    final_status: u16,
) -> Option<Issue> {
    if signals.canonical_url.is_empty() {
        return None;
    }
    let canon = Url::parse(&signals.canonical_url).ok()?;
    let fin = Url::parse(final_url).ok()?;
    let host_mismatch = {
        let c = norm_host(&canon);
        let f = norm_host(&fin);
        !c.is_empty() && !f.is_empty() && c != f
    };
    let url_mismatch = norm_url(&canon) != norm_url(&fin);
    if !host_mismatch && !url_mismatch {
        return None;
    }
    let mut ev = base_evidence(final_url, final_status);
    ev.insert("canonical_url".to_string(), json!(signals.canonical_url));
    ev.insert("canonical_host_mismatch".to_string(), json!(host_mismatch));
    ev.insert("canonical_url_mismatch".to_string(), json!(url_mismatch));
    Some(mk_issue(catalog, "canonical_redirect_mismatch", ev))
}

/// `http_soft_404` when a 200 page reads like an error page: "not found"
/// phrasing in both title and body, or in either one with a small body.
fn soft_404(
    catalog: &IssueCatalog,
    signals: &ExtractedSignals,
    final_url: &str,
    final_status: u16,
) -> Option<Issue> {
    let title_hits = &signals.not_found_title_hits;
    let body_hits = &signals.not_found_body_hits;
    let likely = (!title_hits.is_empty() && !body_hits.is_empty())
        || (!title_hits.is_empty() && signals.html_bytes < SOFT_404_TITLE_MAX_BYTES)
        || (body_hits.len() >= 2 && signals.html_bytes < SOFT_404_BODY_MAX_BYTES);
    if !likely {
        return None;
    }
    let mut ev = base_evidence(final_url, final_status);
    ev.insert("title".to_string(), json!(signals.title));
    ev.insert("title_hits".to_string(), json!(title_hits));
    ev.insert("body_hits".to_string(), json!(body_hits));
    ev.insert("html_bytes".to_string(), json!(signals.html_bytes));
    Some(mk_issue(catalog, "http_soft_404", ev))
}

fn norm_host(url: &Url) -> String {
    let host = url.host_str().unwrap_or("").to_lowercase();
    host.strip_prefix("www.").unwrap_or(&host).to_string()
}

/// Deduplicates issues by `(issue_id, evidence url)` composite key,
/// preserving first-seen order.
pub fn dedup_issues(issues: Vec<Issue>) -> Vec<Issue> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(issues.len());
    for issue in issues {
        let url_key = issue
            .evidence
            .get("final_url")
            .or_else(|| issue.evidence.get("start_url"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let key = format!("{}::{}", issue.issue_id, url_key);
        if seen.insert(key) {
            out.push(issue);
        }
    }
    out
}
