//! Manual redirect-chain walking.
//!
//! The chain is observed one hop at a time with redirects disabled on the
//! client, so every intermediate status, Location, and X-Robots-Tag header
//! is captured. Loop detection runs on normalized URLs (lowercased host,
//! `www.` stripped, fragment dropped) so `example.com` and
//! `WWW.example.com/#top` count as the same node.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use reqwest::Method;
use serde::Serialize;
use serde_json::json;
use url::Url;

use crate::catalog::{IssueCatalog, Priority};
use crate::config::MAX_REDIRECT_HOPS;
use crate::error_handling::{classify_reqwest_error, FetchError, FetchErrorKind};
use crate::fetch::context::FetchContext;
use crate::matcher::{mk_issue, mk_issue_with_priority, Issue};

/// One observed request in the redirect chain.
#[derive(Debug, Clone, Serialize)]
pub struct RedirectHop {
    /// URL requested at this hop.
    pub url: String,
    /// Response status, 0 when the request itself failed.
    pub status: u16,
    /// Location header for 3xx responses.
    pub location: Option<String>,
    /// X-Robots-Tag header, when present.
    pub x_robots_tag: Option<String>,
    /// Transport failure classification when the hop never got a response.
    pub error: Option<FetchErrorKind>,
}

/// A revisit of an already-seen normalized URL, evidence of a loop.
#[derive(Debug, Clone, Serialize)]
pub struct RepeatVisit {
    /// URL as it appeared in the Location header.
    pub url: String,
    /// Normalized form used for the comparison.
    pub norm: String,
    /// Hop index of the first visit.
    pub first_hop: usize,
    /// Hop index at which the revisit was detected.
    pub repeat_hop: usize,
}

/// The result of walking a redirect chain.
#[derive(Debug, Clone, Serialize)]
pub struct WalkOutcome {
    /// Every hop observed, in order.
    pub chain: Vec<RedirectHop>,
    /// URL of the last hop.
    pub final_url: String,
    /// Status of the last hop, 0 when it failed at the network level.
    pub final_status: u16,
    /// Revisits detected during the walk.
    pub repeats: Vec<RepeatVisit>,
    /// True when the walk stopped because the hop limit was reached while
    /// the response was still a redirect.
    pub exceeded_max_hops: bool,
    /// Network-level failure of the last hop, if any.
    pub error: Option<FetchError>,
}

impl WalkOutcome {
    /// True when the chain ended on an HTTP response rather than an error.
    pub fn completed(&self) -> bool {
        self.error.is_none()
    }
}

/// Normalizes a URL for loop detection: lowercased host, `www.` prefix
/// stripped, fragment removed. Scheme, path, and query are preserved.
pub fn norm_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or("").to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let query = url.query().map(|q| format!("?{q}")).unwrap_or_default();
    format!("{}://{}{}{}", url.scheme(), host, url.path(), query)
}

fn is_redirect(status: u16) -> bool {
    (300..400).contains(&status) && status != 304
}

/// Statuses where a HEAD probe is retried as GET; some origins reject or
/// misreport HEAD.
fn head_rejected(status: u16) -> bool {
    matches!(status, 403 | 405 | 501)
}

struct HopResponse {
    status: u16,
    location: Option<String>,
    x_robots_tag: Option<String>,
}

async fn request_hop(
    ctx: &FetchContext,
    method: Method,
    url: &Url,
) -> Result<HopResponse, FetchError> {
    let resp = ctx
        .hop_client
        .request(method, url.clone())
        .send()
        .await
        .map_err(|e| classify_reqwest_error(&e))?;
    let status = resp.status().as_u16();
    let header = |name: &str| {
        resp.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };
    Ok(HopResponse {
        status,
        location: header("location"),
        x_robots_tag: header("x-robots-tag"),
    })
}

/// Fetches one hop, preferring HEAD and falling back to GET once when the
/// origin rejects HEAD or the request fails outright.
async fn fetch_hop(ctx: &FetchContext, url: &Url) -> Result<HopResponse, FetchError> {
    match request_hop(ctx, Method::HEAD, url).await {
        Ok(resp) if head_rejected(resp.status) => {
            debug!("HEAD rejected with {} for {url}, retrying as GET", resp.status);
            request_hop(ctx, Method::GET, url).await
        }
        Ok(resp) => Ok(resp),
        Err(err) => {
            debug!("HEAD failed for {url} ({err}), retrying as GET");
            request_hop(ctx, Method::GET, url).await
        }
    }
}

/// Walks the redirect chain starting at `start`, up to `max_hops` redirects.
///
/// The walk stops at the first non-redirect response, at a network failure,
/// when a normalized URL repeats, or when the hop budget is exhausted while
/// still being redirected.
pub async fn walk(ctx: &FetchContext, start: &Url, max_hops: usize) -> WalkOutcome {
    let mut chain: Vec<RedirectHop> = Vec::new();
    let mut repeats: Vec<RepeatVisit> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut current = start.clone();
    let mut exceeded_max_hops = false;
    let mut error: Option<FetchError> = None;

    for hop in 0..=max_hops {
        let norm = norm_url(&current);
        if let Some(&first_hop) = seen.get(&norm) {
            repeats.push(RepeatVisit {
                url: current.to_string(),
                norm,
                first_hop,
                repeat_hop: hop,
            });
            break;
        }
        seen.insert(norm, hop);

        match fetch_hop(ctx, &current).await {
            Ok(resp) => {
                chain.push(RedirectHop {
                    url: current.to_string(),
                    status: resp.status,
                    location: resp.location.clone(),
                    x_robots_tag: resp.x_robots_tag,
                    error: None,
                });
                if !is_redirect(resp.status) {
                    break;
                }
                let Some(location) = resp.location else {
                    // Redirect status with no Location header is terminal.
                    break;
                };
                let Ok(next) = current.join(&location) else {
                    debug!("unresolvable Location {location:?} at hop {hop}");
                    break;
                };
                if hop == max_hops {
                    exceeded_max_hops = true;
                    break;
                }
                current = next;
            }
            Err(err) => {
                chain.push(RedirectHop {
                    url: current.to_string(),
                    status: 0,
                    location: None,
                    x_robots_tag: None,
                    error: Some(err.kind),
                });
                error = Some(err);
                break;
            }
        }
    }

    let (final_url, final_status) = chain
        .last()
        .map(|hop| (hop.url.clone(), hop.status))
        .unwrap_or_else(|| (current.to_string(), 0));

    WalkOutcome {
        chain,
        final_url,
        final_status,
        repeats,
        exceeded_max_hops,
        error,
    }
}

/// Walks with the default hop budget.
pub async fn walk_default(ctx: &FetchContext, start: &Url) -> WalkOutcome {
    walk(ctx, start, MAX_REDIRECT_HOPS).await
}

fn chain_evidence(outcome: &WalkOutcome) -> BTreeMap<String, serde_json::Value> {
    let mut ev = BTreeMap::new();
    ev.insert("final_url".to_string(), json!(outcome.final_url));
    ev.insert("status".to_string(), json!(outcome.final_status));
    ev.insert(
        "chain".to_string(),
        json!(outcome
            .chain
            .iter()
            .map(|h| json!({"url": h.url, "status": h.status}))
            .collect::<Vec<_>>()),
    );
    ev
}

/// Derives transport-level issues from one or two walk outcomes.
///
/// Pure over its inputs: `primary` is the walk of the requested URL,
/// `https_probe` the optional walk of the `https://` variant of a plain
/// `http://` start URL.
pub fn classify_chain(
    catalog: &IssueCatalog,
    primary: &WalkOutcome,
    https_probe: Option<&WalkOutcome>,
    start_url: &Url,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    // A chain still redirecting at the hop limit is treated as a loop;
    // crawlers cannot tell the difference from the outside.
    if !primary.repeats.is_empty() || primary.exceeded_max_hops {
        let mut ev = chain_evidence(primary);
        ev.insert("repeats".to_string(), json!(primary.repeats));
        ev.insert("exhausted_hop_limit".to_string(), json!(primary.exceeded_max_hops));
        issues.push(mk_issue(catalog, "http_redirect_loop", ev));
    }

    // A looping chain would keep redirecting to the hop limit, so it is
    // over-long as well even though the walk aborts at the first repeat.
    if primary.exceeded_max_hops || !primary.repeats.is_empty() || primary.chain.len() > 2 {
        let mut ev = chain_evidence(primary);
        ev.insert("hops".to_string(), json!(primary.chain.len().saturating_sub(1)));
        issues.push(mk_issue(catalog, "http_redirect_chain_too_long", ev));
    }

    if primary.final_status != 200 {
        let ev = chain_evidence(primary);
        // Server errors and dead connections jump the queue.
        if primary.final_status >= 500 || primary.final_status == 0 {
            issues.push(mk_issue_with_priority(
                catalog,
                "http_non_200",
                Priority::FixNow,
                ev,
            ));
        } else {
            issues.push(mk_issue(catalog, "http_non_200", ev));
        }
    }

    if let Ok(final_url) = Url::parse(&primary.final_url) {
        let start_host = norm_host(start_url);
        let final_host = norm_host(&final_url);
        if !start_host.is_empty() && !final_host.is_empty() && start_host != final_host {
            let mut ev = chain_evidence(primary);
            ev.insert("start_host".to_string(), json!(start_host));
            ev.insert("final_host".to_string(), json!(final_host));
            issues.push(mk_issue(catalog, "http_redirect_different_host", ev));
        }

        if start_url.scheme() == "http" && final_url.scheme() != "https" {
            if let Some(probe) = https_probe {
                let probe_ends_https = Url::parse(&probe.final_url)
                    .map(|u| u.scheme() == "https")
                    .unwrap_or(false);
                if probe.completed()
                    && (200..400).contains(&probe.final_status)
                    && probe_ends_https
                {
                    let mut ev = chain_evidence(primary);
                    ev.insert("https_final_url".to_string(), json!(probe.final_url));
                    ev.insert("https_status".to_string(), json!(probe.final_status));
                    issues.push(mk_issue(catalog, "http_https_not_enforced", ev));
                }
            }
        }
    }

    issues
}

fn norm_host(url: &Url) -> String {
    let host = url.host_str().unwrap_or("").to_lowercase();
    host.strip_prefix("www.").unwrap_or(&host).to_string()
}
