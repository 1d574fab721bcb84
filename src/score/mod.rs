//! Weighted scoring engine.
//!
//! Converts an issue list (plus content/link signals and optional Core Web
//! Vitals) into a single 0-100 score. Scoring is a pure function of its
//! inputs: identical inputs always yield identical scores, which regression
//! tests and before/after comparisons depend on.

use serde::{Deserialize, Serialize};

use crate::extract::ExtractedSignals;
use crate::matcher::Issue;

/// One set of Core Web Vitals measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CwvMetrics {
    /// Largest Contentful Paint, seconds.
    pub lcp_s: f64,
    /// Interaction to Next Paint, milliseconds.
    pub inp_ms: f64,
    /// Cumulative Layout Shift, unitless.
    pub cls: f64,
}

/// Core Web Vitals report from the external performance provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CwvReport {
    /// Field (real-user) measurements, preferred when present.
    pub field: Option<CwvMetrics>,
    /// Lab measurements, used when no field data exists.
    pub lab: Option<CwvMetrics>,
}

impl CwvReport {
    /// The measurement set scoring should use: field data when present,
    /// otherwise lab data.
    pub fn effective(&self) -> Option<CwvMetrics> {
        self.field.or(self.lab)
    }
}

/// Penalty weights. Hand-tuned policy values, not a derived formula; kept in
/// one swappable table so alternative policies can be injected.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWeights {
    /// Penalty for `missing_title`.
    pub missing_title: i32,
    /// Penalty for `missing_meta_description`.
    pub missing_meta_description: i32,
    /// Penalty for `missing_h1`.
    pub missing_h1: i32,
    /// Penalty for `missing_canonical`.
    pub missing_canonical: i32,
    /// Penalty for `title_too_long`.
    pub title_too_long: i32,
    /// Penalty for `multiple_h1`.
    pub multiple_h1: i32,
    /// Penalty for `http_status_error`.
    pub http_status_error: i32,
    /// Penalty for any issue id without an explicit weight.
    pub default_issue: i32,

    /// Word count below 200.
    pub thin_content_severe: i32,
    /// Word count in 200..=449.
    pub thin_content_mild: i32,
    /// Fewer than 5 internal links.
    pub few_internal_links_severe: i32,
    /// 5..=11 internal links.
    pub few_internal_links_mild: i32,
    /// Average internal link depth above 2.5.
    pub deep_internal_links: i32,

    /// LCP above 4s.
    pub lcp_poor: i32,
    /// LCP above 2.5s.
    pub lcp_needs_improvement: i32,
    /// INP above 500ms.
    pub inp_poor: i32,
    /// INP above 200ms.
    pub inp_needs_improvement: i32,
    /// CLS above 0.25.
    pub cls_poor: i32,
    /// CLS above 0.1.
    pub cls_needs_improvement: i32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            missing_title: 25,
            missing_meta_description: 20,
            missing_h1: 20,
            missing_canonical: 15,
            title_too_long: 8,
            multiple_h1: 6,
            http_status_error: 30,
            default_issue: 6,
            thin_content_severe: 15,
            thin_content_mild: 8,
            few_internal_links_severe: 10,
            few_internal_links_mild: 6,
            deep_internal_links: 8,
            lcp_poor: 14,
            lcp_needs_improvement: 8,
            inp_poor: 14,
            inp_needs_improvement: 8,
            cls_poor: 10,
            cls_needs_improvement: 6,
        }
    }
}

impl ScoreWeights {
    /// Weight for a single issue id.
    pub fn issue_weight(&self, issue_id: &str) -> i32 {
        match issue_id {
            "missing_title" => self.missing_title,
            "missing_meta_description" => self.missing_meta_description,
            "missing_h1" => self.missing_h1,
            "missing_canonical" => self.missing_canonical,
            "title_too_long" => self.title_too_long,
            "multiple_h1" => self.multiple_h1,
            "http_status_error" => self.http_status_error,
            _ => self.default_issue,
        }
    }
}

/// Computes the page score.
///
/// Starts at 100, subtracts a fixed weight per issue, then applies
/// content-depth, link-health, and optional Core Web Vitals penalties, and
/// clamps to [0, 100].
pub fn score(
    issues: &[Issue],
    signals: &ExtractedSignals,
    perf: Option<&CwvReport>,
    weights: &ScoreWeights,
) -> u8 {
    let mut total: i32 = 100;

    for issue in issues {
        total -= weights.issue_weight(&issue.issue_id);
    }

    // Content depth, independent of the issue list.
    if signals.word_count < 200 {
        total -= weights.thin_content_severe;
    } else if signals.word_count < 450 {
        total -= weights.thin_content_mild;
    }

    // Link health.
    if signals.internal_links < 5 {
        total -= weights.few_internal_links_severe;
    } else if signals.internal_links < 12 {
        total -= weights.few_internal_links_mild;
    }
    if signals.avg_link_depth > 2.5 {
        total -= weights.deep_internal_links;
    }

    if let Some(metrics) = perf.and_then(|p| p.effective()) {
        if metrics.lcp_s > 4.0 {
            total -= weights.lcp_poor;
        } else if metrics.lcp_s > 2.5 {
            total -= weights.lcp_needs_improvement;
        }
        if metrics.inp_ms > 500.0 {
            total -= weights.inp_poor;
        } else if metrics.inp_ms > 200.0 {
            total -= weights.inp_needs_improvement;
        }
        if metrics.cls > 0.25 {
            total -= weights.cls_poor;
        } else if metrics.cls > 0.1 {
            total -= weights.cls_needs_improvement;
        }
    }

    total.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IssueCatalog;
    use crate::matcher::mk_issue;
    use std::collections::BTreeMap;

    fn healthy_signals() -> ExtractedSignals {
        ExtractedSignals {
            word_count: 800,
            internal_links: 20,
            avg_link_depth: 1.5,
            ..Default::default()
        }
    }

    fn issue(id: &str) -> Issue {
        mk_issue(IssueCatalog::builtin(), id, BTreeMap::new())
    }

    #[test]
    fn test_perfect_page_scores_100() {
        let s = score(&[], &healthy_signals(), None, &ScoreWeights::default());
        assert_eq!(s, 100);
    }

    #[test]
    fn test_issue_weights_subtract() {
        let issues = vec![issue("missing_title"), issue("title_too_long")];
        let s = score(&issues, &healthy_signals(), None, &ScoreWeights::default());
        assert_eq!(s, 100 - 25 - 8);
    }

    #[test]
    fn test_unlisted_issue_uses_default_weight() {
        let issues = vec![issue("http_redirect_chain_too_long")];
        let s = score(&issues, &healthy_signals(), None, &ScoreWeights::default());
        assert_eq!(s, 94);
    }

    #[test]
    fn test_thin_content_penalties() {
        let mut signals = healthy_signals();
        signals.word_count = 100;
        assert_eq!(score(&[], &signals, None, &ScoreWeights::default()), 85);
        signals.word_count = 300;
        assert_eq!(score(&[], &signals, None, &ScoreWeights::default()), 92);
        signals.word_count = 450;
        assert_eq!(score(&[], &signals, None, &ScoreWeights::default()), 100);
    }

    #[test]
    fn test_link_health_penalties() {
        let mut signals = healthy_signals();
        signals.internal_links = 3;
        assert_eq!(score(&[], &signals, None, &ScoreWeights::default()), 90);
        signals.internal_links = 8;
        assert_eq!(score(&[], &signals, None, &ScoreWeights::default()), 94);
        signals.internal_links = 20;
        signals.avg_link_depth = 3.0;
        assert_eq!(score(&[], &signals, None, &ScoreWeights::default()), 92);
    }

    #[test]
    fn test_cwv_penalties_field_preferred() {
        let perf = CwvReport {
            field: Some(CwvMetrics {
                lcp_s: 4.5,
                inp_ms: 250.0,
                cls: 0.05,
            }),
            lab: Some(CwvMetrics {
                lcp_s: 1.0,
                inp_ms: 50.0,
                cls: 0.0,
            }),
        };
        let s = score(&[], &healthy_signals(), Some(&perf), &ScoreWeights::default());
        assert_eq!(s, 100 - 14 - 8);
    }

    #[test]
    fn test_cwv_lab_fallback() {
        let perf = CwvReport {
            field: None,
            lab: Some(CwvMetrics {
                lcp_s: 3.0,
                inp_ms: 100.0,
                cls: 0.3,
            }),
        };
        let s = score(&[], &healthy_signals(), Some(&perf), &ScoreWeights::default());
        assert_eq!(s, 100 - 8 - 10);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let issues: Vec<Issue> = ["missing_title", "missing_meta_description", "missing_h1"]
            .iter()
            .map(|id| issue(id))
            .collect();
        let mut signals = healthy_signals();
        signals.word_count = 10;
        signals.internal_links = 0;
        signals.avg_link_depth = 5.0;
        let perf = CwvReport {
            field: Some(CwvMetrics {
                lcp_s: 9.0,
                inp_ms: 900.0,
                cls: 0.9,
            }),
            lab: None,
        };
        let s = score(&issues, &signals, Some(&perf), &ScoreWeights::default());
        assert_eq!(s, 0);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let issues = vec![issue("missing_h1"), issue("missing_canonical")];
        let signals = healthy_signals();
        let first = score(&issues, &signals, None, &ScoreWeights::default());
        for _ in 0..10 {
            assert_eq!(score(&issues, &signals, None, &ScoreWeights::default()), first);
        }
    }
}
