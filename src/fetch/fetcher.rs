//! Page fetching strategies.
//!
//! [`PageFetcher`] is the seam between the pipeline and the network: the
//! real [`HttpFetcher`] walks chains over the wire, while [`MockFetcher`]
//! serves canned snapshots for sentinel hosts so demos and smoke tests run
//! without touching the network.

use log::{debug, info};
use url::Url;

use crate::error_handling::{FetchError, FetchErrorKind};
use crate::fetch::context::FetchContext;
use crate::fetch::snapshot::{clip_html, PageSnapshot};
use crate::fetch::walker::{walk, RedirectHop, WalkOutcome};

/// Strategy for turning a URL into a [`PageSnapshot`].
pub trait PageFetcher {
    /// Fetches the page at `url`, following at most `max_hops` redirects.
    async fn fetch(&self, url: &Url, max_hops: usize) -> PageSnapshot;
}

/// The production fetcher: walks the chain, probes https for plain-http
/// starts, then fetches the body of the terminal URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    ctx: FetchContext,
}

impl HttpFetcher {
    /// Wraps a [`FetchContext`] as a fetcher.
    pub fn new(ctx: FetchContext) -> Self {
        HttpFetcher { ctx }
    }

    async fn fetch_body(&self, final_url: &str) -> (Option<String>, Option<String>) {
        let resp = match self.ctx.body_client.get(final_url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!("body fetch failed for {final_url}: {e}");
                return (None, None);
            }
        };
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let is_html = content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("text/html") || ct.contains("application/xhtml"));
        if !is_html {
            return (None, content_type);
        }
        match resp.text().await {
            Ok(body) => (Some(clip_html(body)), content_type),
            Err(e) => {
                debug!("body read failed for {final_url}: {e}");
                (None, content_type)
            }
        }
    }
}

/// Builds the `https://` variant of a plain-http URL, if one makes sense.
fn https_variant(url: &Url) -> Option<Url> {
    if url.scheme() != "http" {
        return None;
    }
    let mut probe = url.clone();
    probe.set_scheme("https").ok()?;
    Some(probe)
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, max_hops: usize) -> PageSnapshot {
        let outcome = walk(&self.ctx, url, max_hops).await;
        info!(
            "walked {} in {} hop(s), final status {}",
            url,
            outcome.chain.len(),
            outcome.final_status
        );

        let final_is_https = Url::parse(&outcome.final_url)
            .map(|u| u.scheme() == "https")
            .unwrap_or(false);
        let https_probe = match https_variant(url) {
            Some(probe) if !final_is_https => Some(walk(&self.ctx, &probe, max_hops).await),
            _ => None,
        };

        let (html, content_type) = if outcome.completed() && outcome.final_status != 0 {
            self.fetch_body(&outcome.final_url).await
        } else {
            (None, None)
        };

        PageSnapshot {
            requested_url: url.to_string(),
            final_url: outcome.final_url.clone(),
            final_status: outcome.final_status,
            html,
            content_type,
            fetch_error: outcome.error.clone(),
            outcome,
            https_probe,
        }
    }
}

/// Sentinel hosts served from canned fixtures instead of the network.
const MOCK_HOSTS: [&str; 3] = ["example.com", "www.example.com", "127.0.0.1"];

/// Offline fetcher for demos and smoke checks.
///
/// Sentinel hosts get a deterministic well-formed page; anything else gets
/// a network-style failure so callers exercise their error paths.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher;

const MOCK_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<title>Example Domain</title>
<meta name="description" content="A placeholder domain established for use in illustrative examples in documents and tutorials.">
<link rel="canonical" href="https://example.com/">
</head>
<body>
<h1>Example Domain</h1>
<p>This domain is for use in illustrative examples in documents. You may use this domain in literature without prior coordination or asking for permission.</p>
<p><a href="https://www.iana.org/domains/example">More information...</a></p>
</body>
</html>
"#;

impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &Url, _max_hops: usize) -> PageSnapshot {
        let host = url.host_str().unwrap_or("");
        if MOCK_HOSTS.contains(&host) {
            let outcome = WalkOutcome {
                chain: vec![RedirectHop {
                    url: url.to_string(),
                    status: 200,
                    location: None,
                    x_robots_tag: None,
                    error: None,
                }],
                final_url: url.to_string(),
                final_status: 200,
                repeats: vec![],
                exceeded_max_hops: false,
                error: None,
            };
            PageSnapshot {
                requested_url: url.to_string(),
                final_url: url.to_string(),
                final_status: 200,
                html: Some(MOCK_HTML.to_string()),
                content_type: Some("text/html; charset=utf-8".to_string()),
                outcome,
                https_probe: None,
                fetch_error: None,
            }
        } else {
            // Terminal on purpose; retrying a fixture miss cannot succeed.
            let error = FetchError {
                kind: FetchErrorKind::Failed,
                message: format!("mock mode has no fixture for host {host:?}"),
            };
            PageSnapshot {
                requested_url: url.to_string(),
                final_url: url.to_string(),
                final_status: 0,
                html: None,
                content_type: None,
                outcome: WalkOutcome {
                    chain: vec![],
                    final_url: url.to_string(),
                    final_status: 0,
                    repeats: vec![],
                    exceeded_max_hops: false,
                    error: Some(error.clone()),
                },
                https_probe: None,
                fetch_error: Some(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_fetcher_serves_sentinel_host() {
        let snapshot = MockFetcher
            .fetch(&Url::parse("https://example.com/").unwrap(), 5)
            .await;
        assert_eq!(snapshot.final_status, 200);
        assert!(snapshot.has_html());
        assert!(snapshot.is_html_content());
        assert!(snapshot.fetch_error.is_none());
    }

    #[tokio::test]
    async fn test_mock_fetcher_fails_unknown_host() {
        let snapshot = MockFetcher
            .fetch(&Url::parse("https://nope.invalid/").unwrap(), 5)
            .await;
        assert_eq!(snapshot.final_status, 0);
        let err = snapshot.fetch_error.unwrap();
        assert_eq!(err.kind, FetchErrorKind::Failed);
        // A fixture miss must not burn retry attempts or backoff delay.
        assert!(!err.kind.is_retryable());
    }

    #[test]
    fn test_https_variant_only_for_http() {
        let http = Url::parse("http://example.com/a?b=1").unwrap();
        assert_eq!(
            https_variant(&http).unwrap().as_str(),
            "https://example.com/a?b=1"
        );
        let https = Url::parse("https://example.com/").unwrap();
        assert!(https_variant(&https).is_none());
    }
}
