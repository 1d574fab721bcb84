//! Host-application seams.
//!
//! The audit pipeline is embeddable: quota enforcement, Core Web Vitals
//! lookup, and report delivery are owned by the host. Each seam ships with
//! a permissive no-op implementation so the CLI works standalone.

use std::future::Future;
use std::pin::Pin;

use log::debug;
use serde::Serialize;

use crate::report::AuditReport;
use crate::score::CwvReport;

/// The identity an audit runs on behalf of.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    /// Host-assigned stable identifier.
    pub id: String,
    /// Billing plan name, informational.
    pub plan: Option<String>,
}

impl Principal {
    /// Anonymous principal used by the standalone CLI.
    pub fn anonymous() -> Self {
        Principal {
            id: "anonymous".to_string(),
            plan: None,
        }
    }
}

/// Outcome of a quota check, decided before any network work starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
    /// Proceed with the audit.
    Allowed,
    /// Refuse with a host-supplied reason.
    Denied {
        /// Reason surfaced to the caller.
        reason: String,
    },
}

/// Pre-flight usage gate. Checked once per audit, before fetching.
pub trait QuotaGate {
    /// Decides whether `principal` may run another audit.
    fn check(&self, principal: &Principal) -> QuotaDecision;
}

/// Gate that always allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlimitedQuota;

impl QuotaGate for UnlimitedQuota {
    fn check(&self, _principal: &Principal) -> QuotaDecision {
        QuotaDecision::Allowed
    }
}

/// Boxed future type for the dyn-safe async seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Source of Core Web Vitals data for a URL.
///
/// Failures are swallowed into `None`; vitals are an enrichment, never a
/// reason to fail an audit.
pub trait PerformanceProvider {
    /// Looks up field/lab vitals for `url`.
    fn vitals<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Option<CwvReport>>;
}

/// Provider that reports no vitals.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPerformanceData;

impl PerformanceProvider for NoPerformanceData {
    fn vitals<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Option<CwvReport>> {
        Box::pin(async move {
            debug!("no performance provider configured, skipping vitals for {url}");
            None
        })
    }
}

/// Destination for finished reports, beyond the process stdout.
pub trait ReportSink {
    /// Delivers one finished report.
    fn deliver<'a>(&'a self, report: &'a AuditReport) -> BoxFuture<'a, ()>;
}

/// Sink that drops reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl ReportSink for DiscardSink {
    fn deliver<'a>(&'a self, report: &'a AuditReport) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            debug!("discarding report for {} (ok={})", report.url, report.ok);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_quota_always_allows() {
        let gate = UnlimitedQuota;
        assert_eq!(
            gate.check(&Principal::anonymous()),
            QuotaDecision::Allowed
        );
    }

    #[tokio::test]
    async fn test_no_performance_data_yields_none() {
        let provider = NoPerformanceData;
        assert!(provider.vitals("https://example.com/").await.is_none());
    }
}
