//! Audit orchestration.
//!
//! One entry point, [`Auditor::audit`], drives the whole run: fetch with
//! bounded retry, signal extraction, issue matching, scoring, and advisory
//! generation. Retry applies only to transient transport failures; HTTP
//! error statuses are findings, not failures.

use std::collections::BTreeMap;
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use serde_json::json;
use tokio::time::sleep;
use url::Url;

use crate::advisory;
use crate::catalog::{IssueCatalog, Priority};
use crate::collaborators::{
    NoPerformanceData, PerformanceProvider, Principal, QuotaDecision, QuotaGate, ReportSink,
};
use crate::config::{AuditConfig, MAX_QUICK_WINS, RETRY_JITTER_MS};
use crate::error_handling::ErrorCode;
use crate::extract::{self, ExtractedSignals};
use crate::fetch::{
    classify_chain, FetchContext, HttpFetcher, MockFetcher, PageFetcher, PageSnapshot,
};
use crate::matcher::{dedup_issues, match_signals, mk_issue, Issue};
use crate::report::{AuditReport, DebugInfo, ErrorEnvelope};
use crate::score::{score, ScoreWeights};

/// Runs audits with a fixed fetcher, catalog, and scoring policy.
pub struct Auditor<'c, F: PageFetcher> {
    fetcher: F,
    catalog: &'c IssueCatalog,
    weights: ScoreWeights,
    perf: Box<dyn PerformanceProvider + Send + Sync + 'c>,
    max_hops: usize,
    max_attempts: u32,
    retry_base_delay: Duration,
}

impl<'c, F: PageFetcher> Auditor<'c, F> {
    /// Creates an auditor from a fetcher, catalog, and config. Performance
    /// data is disabled until a provider is attached.
    pub fn new(fetcher: F, catalog: &'c IssueCatalog, config: &AuditConfig) -> Self {
        Auditor {
            fetcher,
            catalog,
            weights: ScoreWeights::default(),
            perf: Box::new(NoPerformanceData),
            max_hops: config.max_hops,
            max_attempts: config.max_attempts,
            retry_base_delay: config.retry_base_delay(),
        }
    }

    /// Attaches a Core Web Vitals provider.
    pub fn with_performance(mut self, perf: Box<dyn PerformanceProvider + Send + Sync + 'c>) -> Self {
        self.perf = perf;
        self
    }

    /// Replaces the scoring policy.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Audits a single page and always returns a report.
    ///
    /// Invalid URLs and exhausted retries yield `ok: false` reports; no
    /// input makes this return an `Err` at the caller.
    pub async fn audit(&self, raw_url: &str) -> AuditReport {
        let url = match parse_target(raw_url) {
            Ok(url) => url,
            Err(parse_err) => {
                warn!("rejecting unparseable target {raw_url:?}: {parse_err}");
                let debug = DebugInfo::new(0, raw_url.to_string(), None, 0, None);
                return AuditReport::failure(
                    raw_url.to_string(),
                    ErrorEnvelope::new(ErrorCode::Failed, Some(parse_err.to_string())),
                    debug,
                );
            }
        };

        let snapshot = self.fetch_with_retry(&url).await;

        if let Some(err) = &snapshot.fetch_error {
            let debug = debug_block(&snapshot);
            return AuditReport::failure(
                url.to_string(),
                ErrorEnvelope::new(err.kind.error_code(), Some(err.message.clone())),
                debug,
            );
        }

        self.build_report(&url, snapshot).await
    }

    async fn fetch_with_retry(&self, url: &Url) -> PageSnapshot {
        let mut attempt = 1;
        loop {
            let snapshot = self.fetcher.fetch(url, self.max_hops).await;
            let Some(err) = &snapshot.fetch_error else {
                return snapshot;
            };
            if !err.kind.is_retryable() || attempt >= self.max_attempts {
                if err.kind.is_retryable() {
                    warn!(
                        "giving up on {url} after {attempt} attempt(s): {} ({})",
                        err.message,
                        err.kind.as_str()
                    );
                }
                return snapshot;
            }
            let delay = backoff_delay(self.retry_base_delay, attempt);
            info!(
                "attempt {attempt}/{} for {url} failed with {}, retrying in {delay:?}",
                self.max_attempts,
                err.kind.as_str()
            );
            sleep(delay).await;
            attempt += 1;
        }
    }

    async fn build_report(&self, url: &Url, snapshot: PageSnapshot) -> AuditReport {
        let signals = match snapshot.html.as_deref() {
            Some(html) => extract::extract(html, &snapshot.final_url),
            None => ExtractedSignals::default(),
        };

        let mut issues = classify_chain(
            self.catalog,
            &snapshot.outcome,
            snapshot.https_probe.as_ref(),
            url,
        );
        // On-page rules only apply when there was a page to look at;
        // absence of HTML must not read as "everything is missing".
        if snapshot.has_html() {
            issues.extend(match_signals(
                self.catalog,
                &signals,
                &snapshot.final_url,
                snapshot.final_status,
            ));
        }
        issues.extend(self.snapshot_issues(&snapshot));
        let issues = dedup_issues(issues);

        let vitals = self.perf.vitals(&snapshot.final_url).await;
        let score = score(&issues, &signals, vitals.as_ref(), &self.weights);
        let advisory = advisory::generate(&signals, &snapshot.final_url);

        let success_status = (200..300).contains(&snapshot.final_status);
        let warning = if !success_status || snapshot.is_html_content() {
            None
        } else {
            Some(
                "Response was not HTML; on-page checks were skipped and only \
                 transport-level signals were audited."
                    .to_string(),
            )
        };

        debug!(
            "audited {url}: score {score}, {} issue(s), page type {}",
            issues.len(),
            advisory.page_type.as_str()
        );

        AuditReport {
            ok: true,
            url: url.to_string(),
            final_url: Some(snapshot.final_url.clone()),
            status: Some(snapshot.final_status),
            score: Some(score),
            quick_wins: quick_wins(&issues),
            issues,
            page_type: Some(advisory.page_type),
            page_type_advice: advisory.advice,
            rewrite_examples: advisory.rewrite_examples,
            content_brief: Some(advisory.content_brief),
            warning,
            error: None,
            debug: debug_block(&snapshot),
        }
    }

    /// Issues derivable only from the snapshot itself, not from the HTML
    /// signals or the chain shape.
    fn snapshot_issues(&self, snapshot: &PageSnapshot) -> Vec<Issue> {
        let mut issues = Vec::new();

        // Non-HTML only matters on a successful response; error pages are
        // already covered by the status issues.
        if (200..300).contains(&snapshot.final_status) && !snapshot.is_html_content() {
            let mut ev = BTreeMap::new();
            ev.insert("final_url".to_string(), json!(snapshot.final_url));
            ev.insert(
                "content_type".to_string(),
                json!(snapshot.content_type.as_deref().unwrap_or("(none)")),
            );
            issues.push(mk_issue(self.catalog, "non_html_content", ev));
        }

        let header_noindex = snapshot
            .outcome
            .chain
            .iter()
            .filter_map(|hop| hop.x_robots_tag.as_deref())
            .any(|tag| tag.to_lowercase().contains("noindex"));
        if header_noindex {
            let mut ev = BTreeMap::new();
            ev.insert("final_url".to_string(), json!(snapshot.final_url));
            ev.insert("source".to_string(), json!("x-robots-tag"));
            issues.push(mk_issue(self.catalog, "robots_noindex", ev));
        }

        issues
    }
}

/// Runs one audit with the built-in catalog and the fetcher implied by the
/// config (mock or real HTTP).
///
/// # Errors
///
/// Returns an error for invalid configuration or when the HTTP client
/// cannot be constructed. Fetch failures do not error; they come back as
/// `ok: false` reports.
pub async fn run_audit(config: &AuditConfig) -> anyhow::Result<AuditReport> {
    config.validate()?;
    let catalog = IssueCatalog::builtin();
    if config.mock_mode {
        info!("mock mode enabled, serving canned fixtures");
        let auditor = Auditor::new(MockFetcher, catalog, config);
        Ok(auditor.audit(&config.url).await)
    } else {
        let ctx = FetchContext::new(config.timeout(), &config.user_agent)?;
        let auditor = Auditor::new(HttpFetcher::new(ctx), catalog, config);
        Ok(auditor.audit(&config.url).await)
    }
}

/// Runs one audit on behalf of `principal`, gated by `gate`, delivering the
/// finished report to `sink`.
///
/// A denied principal short-circuits before any network traffic. The sink
/// receives the refusal report too, so delivery-side history stays complete.
pub async fn run_audit_for(
    config: &AuditConfig,
    principal: &Principal,
    gate: &dyn QuotaGate,
    sink: &dyn ReportSink,
) -> anyhow::Result<AuditReport> {
    let report = match gate.check(principal) {
        QuotaDecision::Allowed => run_audit(config).await?,
        QuotaDecision::Denied { reason } => {
            warn!("quota denied for principal {}: {reason}", principal.id);
            AuditReport::failure(
                config.url.clone(),
                ErrorEnvelope::new(ErrorCode::Failed, Some(reason)),
                DebugInfo::new(0, config.url.clone(), None, 0, None),
            )
        }
    };
    sink.deliver(&report).await;
    Ok(report)
}

fn debug_block(snapshot: &PageSnapshot) -> DebugInfo {
    DebugInfo::new(
        snapshot.final_status,
        snapshot.final_url.clone(),
        snapshot.content_type.clone(),
        snapshot.html.as_deref().map_or(0, str::len),
        snapshot.fetch_error.as_ref().map(|e| e.message.clone()),
    )
}

/// Parses the audit target, defaulting to `https://` for bare hostnames.
fn parse_target(raw: &str) -> Result<Url, url::ParseError> {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(url) if url.host_str().is_some() => Ok(url),
        Ok(_) => Err(url::ParseError::EmptyHost),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{trimmed}")),
        Err(e) => Err(e),
    }
}

/// Exponential backoff with uniform jitter: `base * 2^(attempt-1) + U(0, jitter)`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exp = base * 2u32.saturating_pow(attempt.saturating_sub(1));
    let jitter = Duration::from_millis(rand::rng().random_range(0..RETRY_JITTER_MS));
    exp + jitter
}

/// Top actionable issue titles: fix-now first, then fix-next, capped.
fn quick_wins(issues: &[Issue]) -> Vec<String> {
    let mut wins: Vec<String> = issues
        .iter()
        .filter(|i| i.priority == Priority::FixNow)
        .map(|i| i.title.clone())
        .collect();
    wins.extend(
        issues
            .iter()
            .filter(|i| i.priority == Priority::FixNext)
            .map(|i| i.title.clone()),
    );
    wins.truncate(MAX_QUICK_WINS);
    wins
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::error_handling::{FetchError, FetchErrorKind};
    use crate::fetch::{MockFetcher, WalkOutcome};

    /// Fetcher that always fails with a fixed error kind, counting calls.
    struct FailingFetcher {
        kind: FetchErrorKind,
        calls: AtomicU32,
    }

    impl FailingFetcher {
        fn new(kind: FetchErrorKind) -> Self {
            FailingFetcher {
                kind,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl PageFetcher for FailingFetcher {
        async fn fetch(&self, url: &Url, _max_hops: usize) -> PageSnapshot {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let error = FetchError {
                kind: self.kind,
                message: "synthetic failure".to_string(),
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

    fn fast_config() -> AuditConfig {
        AuditConfig {
            retry_base_delay_ms: 1,
            ..AuditConfig::default()
        }
    }

    #[tokio::test]
    async fn test_mock_audit_produces_scored_report() {
        let config = fast_config();
        let auditor = Auditor::new(MockFetcher, IssueCatalog::builtin(), &config);
        let report = auditor.audit("https://example.com/").await;
        assert!(report.ok);
        assert!(report.score.is_some());
        assert!(report.error.is_none());
        assert_eq!(report.status, Some(200));
        assert!(report.page_type.is_some());
        assert!(report.content_brief.is_some());
    }

    #[tokio::test]
    async fn test_retryable_error_exhausts_attempts() {
        let config = fast_config();
        let fetcher = FailingFetcher::new(FetchErrorKind::Timeout);
        let auditor = Auditor::new(fetcher, IssueCatalog::builtin(), &config);
        let report = auditor.audit("https://example.com/").await;
        assert!(!report.ok);
        assert!(report.score.is_none());
        assert_eq!(
            report.error.as_ref().unwrap().code.as_str(),
            "TIMEOUT"
        );
        assert_eq!(auditor.fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_terminal_error_does_not_retry() {
        let config = fast_config();
        let fetcher = FailingFetcher::new(FetchErrorKind::Failed);
        let auditor = Auditor::new(fetcher, IssueCatalog::builtin(), &config);
        let report = auditor.audit("https://example.com/").await;
        assert!(!report.ok);
        assert_eq!(auditor.fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_fails_without_fetching() {
        let config = fast_config();
        let fetcher = FailingFetcher::new(FetchErrorKind::Timeout);
        let auditor = Auditor::new(fetcher, IssueCatalog::builtin(), &config);
        let report = auditor.audit("http://").await;
        assert!(!report.ok);
        assert_eq!(report.error.as_ref().unwrap().code.as_str(), "FAILED");
        assert_eq!(auditor.fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bare_hostname_gets_https_scheme() {
        let config = fast_config();
        let auditor = Auditor::new(MockFetcher, IssueCatalog::builtin(), &config);
        let report = auditor.audit("example.com").await;
        assert!(report.ok);
        assert_eq!(report.url, "https://example.com/");
    }

    struct DenyAll;

    impl crate::collaborators::QuotaGate for DenyAll {
        fn check(&self, _principal: &Principal) -> QuotaDecision {
            QuotaDecision::Denied {
                reason: "monthly audit quota exhausted".to_string(),
            }
        }
    }

    struct CountingSink {
        delivered: AtomicU32,
    }

    impl crate::collaborators::ReportSink for CountingSink {
        fn deliver<'a>(
            &'a self,
            _report: &'a AuditReport,
        ) -> crate::collaborators::BoxFuture<'a, ()> {
            Box::pin(async move {
                self.delivered.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    #[tokio::test]
    async fn test_denied_quota_short_circuits_but_still_delivers() {
        let config = AuditConfig {
            url: "https://example.com/".to_string(),
            mock_mode: true,
            ..fast_config()
        };
        let sink = CountingSink {
            delivered: AtomicU32::new(0),
        };
        let report = run_audit_for(&config, &Principal::anonymous(), &DenyAll, &sink)
            .await
            .unwrap();
        assert!(!report.ok);
        assert_eq!(report.error.as_ref().unwrap().code.as_str(), "FAILED");
        assert_eq!(sink.delivered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_allowed_quota_runs_and_delivers() {
        let config = AuditConfig {
            url: "https://example.com/".to_string(),
            mock_mode: true,
            ..fast_config()
        };
        let sink = CountingSink {
            delivered: AtomicU32::new(0),
        };
        let report = run_audit_for(
            &config,
            &Principal::anonymous(),
            &crate::collaborators::UnlimitedQuota,
            &sink,
        )
        .await
        .unwrap();
        assert!(report.ok);
        assert_eq!(sink.delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_grows_and_stays_bounded() {
        let base = Duration::from_millis(350);
        for _ in 0..20 {
            let first = backoff_delay(base, 1);
            let jitter = Duration::from_millis(RETRY_JITTER_MS);
            assert!(first >= base && first < base + jitter);
            let second = backoff_delay(base, 2);
            assert!(second >= base * 2 && second < base * 2 + jitter);
            let third = backoff_delay(base, 3);
            assert!(third >= base * 4 && third < base * 4 + jitter);
        }
    }

    #[test]
    fn test_quick_wins_prefer_fix_now_and_cap() {
        let catalog = IssueCatalog::builtin();
        let mut issues = vec![
            mk_issue(catalog, "missing_meta_description", BTreeMap::new()),
            mk_issue(catalog, "http_redirect_loop", BTreeMap::new()),
            mk_issue(catalog, "missing_title", BTreeMap::new()),
            mk_issue(catalog, "missing_h1", BTreeMap::new()),
            mk_issue(catalog, "missing_canonical", BTreeMap::new()),
            mk_issue(catalog, "multiple_h1", BTreeMap::new()),
            mk_issue(catalog, "title_too_long", BTreeMap::new()),
        ];
        issues[1].priority = Priority::FixNow;
        let wins = quick_wins(&issues);
        assert_eq!(wins.len(), MAX_QUICK_WINS);
        // The three fix-now titles lead, in their original order.
        assert_eq!(wins[0], issues[0].title);
        assert_eq!(wins[1], issues[1].title);
        assert_eq!(wins[2], issues[2].title);
        assert_eq!(wins[3], issues[3].title);
    }
}
