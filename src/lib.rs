//! page_audit library: single-page SEO auditing.
//!
//! Given one URL, this library walks its redirect chain, extracts on-page
//! signals from the HTML, matches them against an issue catalog, computes
//! a 0-100 score, and produces content advisory guidance. The result is a
//! single self-contained JSON report.
//!
//! # Example
//!
//! ```no_run
//! use page_audit::{run_audit, AuditConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = AuditConfig {
//!     url: "https://example.org/pricing".to_string(),
//!     ..Default::default()
//! };
//!
//! let report = run_audit(&config).await?;
//! println!("score: {:?}, issues: {}", report.score, report.issues.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or call library functions from an async context.

#![warn(missing_docs)]

pub mod advisory;
pub mod catalog;
pub mod collaborators;
pub mod config;
pub mod error_handling;
pub mod extract;
pub mod fetch;
pub mod initialization;
pub mod matcher;
pub mod pipeline;
pub mod report;
pub mod score;

// Re-export public API
pub use catalog::IssueCatalog;
pub use collaborators::{PerformanceProvider, Principal, QuotaGate, ReportSink};
pub use config::{AuditConfig, LogFormat, LogLevel};
pub use error_handling::{ErrorCode, FetchError, FetchErrorKind};
pub use fetch::{HttpFetcher, MockFetcher, PageFetcher, PageSnapshot};
pub use matcher::Issue;
pub use pipeline::{run_audit, run_audit_for, Auditor};
pub use report::{AuditReport, DebugInfo, ErrorEnvelope};
pub use score::{CwvMetrics, CwvReport, ScoreWeights};
