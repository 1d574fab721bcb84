//! Link counting and depth statistics.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::MAX_SAMPLED_LINK_PATHS;

static ANCHOR_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("anchor href regex is valid")
});

/// Link statistics for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkStats {
    /// Links resolving to the page's own host (or relative links).
    pub internal: usize,
    /// Links resolving to any other host.
    pub external: usize,
    /// Mean path-segment count over sampled unique internal paths.
    pub avg_depth: f64,
    /// Largest path-segment count over sampled unique internal paths.
    pub max_depth: usize,
}

fn norm_host(host: &str) -> String {
    host.trim().to_lowercase().trim_start_matches("www.").to_string()
}

/// Counts internal/external links in `html` and computes depth statistics
/// over unique internal paths.
///
/// Every `<a href>` is resolved against `final_url`; same-hostname (or
/// relative) links are internal, everything else external. Fragment-only,
/// `javascript:` and `mailto:` hrefs are ignored. Depth is the number of
/// non-empty path segments, sampled over at most
/// [`MAX_SAMPLED_LINK_PATHS`] unique internal paths.
pub fn link_stats(html: &str, final_url: &str) -> LinkStats {
    let base = match Url::parse(final_url) {
        Ok(u) => u,
        Err(_) => return LinkStats::default(),
    };
    let base_host = base.host_str().map(norm_host).unwrap_or_default();

    let mut stats = LinkStats::default();
    let mut sampled_paths: HashSet<String> = HashSet::new();

    for caps in ANCHOR_HREF_RE.captures_iter(html) {
        let href = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().trim())
            .unwrap_or("");

        if href.is_empty() || href.starts_with('#') {
            continue;
        }
        let lower = href.to_lowercase();
        if lower.starts_with("javascript:") || lower.starts_with("mailto:") {
            continue;
        }

        let resolved = match base.join(href) {
            Ok(u) => u,
            Err(_) => continue,
        };

        let host = resolved.host_str().map(norm_host).unwrap_or_default();
        let internal = host.is_empty() || host == base_host;
        if internal {
            stats.internal += 1;
            if sampled_paths.len() < MAX_SAMPLED_LINK_PATHS {
                sampled_paths.insert(resolved.path().to_string());
            }
        } else {
            stats.external += 1;
        }
    }

    if !sampled_paths.is_empty() {
        let depths: Vec<usize> = sampled_paths
            .iter()
            .map(|p| p.split('/').filter(|s| !s.is_empty()).count())
            .collect();
        let total: usize = depths.iter().sum();
        stats.avg_depth = total as f64 / depths.len() as f64;
        stats.max_depth = depths.iter().copied().max().unwrap_or(0);
    }

    stats
}
