//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the crate,
//! including timeouts, retry policy, and extraction thresholds.

use std::time::Duration;

/// Maximum redirect hops to follow when walking a chain.
///
/// A chain that is still redirecting after this many hops is cut off and
/// reported as a redirect loop, since a crawler cannot tell the two apart.
pub const MAX_REDIRECT_HOPS: usize = 5;

/// Per-request timeout for each hop of the redirect walk and the body fetch.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum audit attempts per request (initial attempt + retries).
pub const RETRY_MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff between retry attempts.
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(350);

/// Upper bound (exclusive) of the random jitter added to each backoff delay.
pub const RETRY_JITTER_MS: u64 = 150;

/// Maximum HTML body size retained for extraction, in bytes.
/// Bodies larger than this are truncated to prevent memory exhaustion.
pub const MAX_HTML_BYTES: usize = 300_000;

/// Title length above which `title_too_long` is raised.
pub const TITLE_MAX_LEN: usize = 60;

/// Minimum collapsed length for a `<p>` block to qualify as the
/// meta-description fallback.
///
/// Tunable heuristic: thin landing pages often omit a meta tag but carry an
/// obvious lead paragraph. The threshold is hand-picked, not derived.
pub const META_FALLBACK_MIN_CHARS: usize = 40;

/// Truncation point for the meta-description fallback text.
/// Tunable alongside [`META_FALLBACK_MIN_CHARS`].
pub const META_FALLBACK_TRUNCATE_CHARS: usize = 160;

/// Body size below which a "not found" title alone marks a soft 404.
pub const SOFT_404_TITLE_MAX_BYTES: usize = 8_000;

/// Body size below which repeated "not found" body phrases mark a soft 404.
pub const SOFT_404_BODY_MAX_BYTES: usize = 12_000;

/// Maximum number of unique internal paths sampled for link-depth statistics.
pub const MAX_SAMPLED_LINK_PATHS: usize = 100;

/// Maximum number of quick wins surfaced at the top of a report.
pub const MAX_QUICK_WINS: usize = 5;

/// Maximum length of the raw error detail retained in the error envelope.
pub const MAX_RAW_ERROR_LEN: usize = 500;

/// Default User-Agent string for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "PageAuditBot/1.0";
