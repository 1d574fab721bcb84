//! Static issue catalog.
//!
//! Issue definitions (id, severity, priority, copy, fix guidance) live in an
//! embedded JSON asset, parsed once and treated as read-only. The catalog is
//! passed into the matcher and scorer rather than accessed as a process-wide
//! global, so tests can substitute fixture catalogs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Raw catalog asset, embedded at compile time.
const CATALOG_JSON: &str = include_str!("../../assets/issues_catalog.json");

static BUILTIN: LazyLock<IssueCatalog> = LazyLock::new(|| {
    IssueCatalog::from_json(CATALOG_JSON).expect("embedded issues_catalog.json is valid")
});

/// How urgently an issue should be addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Blocking problems; fix immediately.
    FixNow,
    /// Meaningful problems; fix in the next iteration.
    FixNext,
    /// Polish; fix when convenient.
    FixLater,
}

impl Priority {
    /// Returns the wire representation of the priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::FixNow => "fix_now",
            Priority::FixNext => "fix_next",
            Priority::FixLater => "fix_later",
        }
    }
}

/// Impact severity of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Materially harms indexing or ranking.
    High,
    /// Noticeable impact on CTR or clarity.
    Medium,
    /// Minor polish.
    Low,
}

/// Fix-recommendation template carried by each definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixGuidance {
    /// Ordered remediation steps.
    pub steps: Vec<String>,
    /// Example of the broken state.
    pub before: String,
    /// Example of the fixed state.
    pub after: String,
}

/// A single issue definition from the static catalog. Never mutated at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDefinition {
    /// Stable string key, unique within the catalog.
    pub issue_id: String,
    /// Grouping (http, on_page, indexability).
    pub category: String,
    /// Default severity; detectors may escalate.
    pub severity: Severity,
    /// Default priority; detectors may escalate.
    pub priority: Priority,
    /// Short human-readable title.
    pub title: String,
    /// "Why it matters" explanation.
    pub why: String,
    /// Fix-recommendation template.
    pub example_fix: FixGuidance,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    issues: Vec<IssueDefinition>,
}

/// Read-only table of issue definitions keyed by `issue_id`.
#[derive(Debug)]
pub struct IssueCatalog {
    defs: BTreeMap<String, IssueDefinition>,
}

impl IssueCatalog {
    /// Returns the built-in catalog parsed from the embedded asset.
    pub fn builtin() -> &'static IssueCatalog {
        &BUILTIN
    }

    /// Parses a catalog from JSON. Used for the embedded asset and for test
    /// fixtures.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or contains duplicate ids.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).context("failed to parse issues catalog JSON")?;
        Self::from_definitions(file.issues)
    }

    /// Builds a catalog from a definition list.
    ///
    /// # Errors
    ///
    /// Returns an error if two definitions share an `issue_id`.
    pub fn from_definitions(defs: Vec<IssueDefinition>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for def in defs {
            let id = def.issue_id.clone();
            if map.insert(id.clone(), def).is_some() {
                anyhow::bail!("duplicate issue_id in catalog: {id}");
            }
        }
        Ok(Self { defs: map })
    }

    /// Looks up a definition by id.
    ///
    /// # Panics
    ///
    /// Panics if the id is not in the catalog. Requesting an unknown id is a
    /// programming defect, not a runtime condition, so it fails loudly.
    pub fn get(&self, issue_id: &str) -> &IssueDefinition {
        self.defs
            .get(issue_id)
            .unwrap_or_else(|| panic!("Issue definition not found: {issue_id}"))
    }

    /// Non-panicking lookup, for callers that probe optional definitions.
    pub fn lookup(&self, issue_id: &str) -> Option<&IssueDefinition> {
        self.defs.get(issue_id)
    }

    /// Number of definitions in the catalog.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = IssueCatalog::builtin();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_builtin_contains_core_issues() {
        let catalog = IssueCatalog::builtin();
        for id in [
            "missing_title",
            "title_too_long",
            "missing_meta_description",
            "missing_h1",
            "multiple_h1",
            "missing_canonical",
            "http_status_error",
            "http_non_200",
            "http_redirect_loop",
            "http_redirect_chain_too_long",
            "http_redirect_different_host",
            "http_https_not_enforced",
            "canonical_redirect_mismatch",
            "http_soft_404",
            "robots_noindex",
            "non_html_content",
        ] {
            let def = catalog.get(id);
            assert_eq!(def.issue_id, id);
            assert!(!def.title.is_empty());
            assert!(!def.why.is_empty());
            assert!(!def.example_fix.steps.is_empty());
        }
    }

    #[test]
    #[should_panic(expected = "Issue definition not found: no_such_issue")]
    fn test_unknown_id_panics() {
        IssueCatalog::builtin().get("no_such_issue");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let def = IssueCatalog::builtin().get("missing_title").clone();
        let result = IssueCatalog::from_definitions(vec![def.clone(), def]);
        assert!(result.is_err());
    }

    #[test]
    fn test_priority_wire_format() {
        assert_eq!(Priority::FixNow.as_str(), "fix_now");
        assert_eq!(
            serde_json::to_string(&Priority::FixNext).unwrap(),
            "\"fix_next\""
        );
    }
}
