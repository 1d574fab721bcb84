//! Error type definitions.
//!
//! This module defines the closed error-kind taxonomy used for retry
//! decisions, plus the machine-readable codes surfaced in error envelopes.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Closed taxonomy of fetch failures.
///
/// Every transport error raised by the walker or body fetch is classified
/// into one of these kinds at the point it is raised. The orchestrator
/// switches on this enum to decide retryability instead of inspecting error
/// message text, so message-format changes cannot break the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The request exceeded its deadline or was aborted.
    Timeout,
    /// The hostname could not be resolved.
    Dns,
    /// The remote host actively refused the connection.
    ConnectionRefused,
    /// The connection was reset mid-request.
    ConnectionReset,
    /// TLS negotiation or certificate validation failed.
    Tls,
    /// Any other transport-level failure (socket errors, protocol errors).
    Network,
    /// The upstream response was unusable (non-HTML body, invalid shape).
    /// Not a transport condition; retrying will not help.
    MalformedUpstream,
    /// Catch-all for failures with no more specific classification.
    Failed,
}

impl FetchErrorKind {
    /// Whether a failure of this kind is worth retrying.
    ///
    /// Transient-network kinds are retryable; malformed-upstream and
    /// unclassified failures are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchErrorKind::Timeout
                | FetchErrorKind::Dns
                | FetchErrorKind::ConnectionRefused
                | FetchErrorKind::ConnectionReset
                | FetchErrorKind::Tls
                | FetchErrorKind::Network
        )
    }

    /// The machine-readable envelope code for this kind.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            FetchErrorKind::Timeout => ErrorCode::Timeout,
            FetchErrorKind::Dns => ErrorCode::Dns,
            FetchErrorKind::ConnectionRefused => ErrorCode::ConnectionRefused,
            FetchErrorKind::Tls => ErrorCode::Tls,
            FetchErrorKind::ConnectionReset | FetchErrorKind::Network => ErrorCode::Network,
            FetchErrorKind::MalformedUpstream | FetchErrorKind::Failed => ErrorCode::Failed,
        }
    }

    /// Returns a short string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::Dns => "dns",
            FetchErrorKind::ConnectionRefused => "connection_refused",
            FetchErrorKind::ConnectionReset => "connection_reset",
            FetchErrorKind::Tls => "tls",
            FetchErrorKind::Network => "network",
            FetchErrorKind::MalformedUpstream => "malformed_upstream",
            FetchErrorKind::Failed => "failed",
        }
    }
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified fetch failure: the kind drives retry decisions, the message
/// preserves the diagnostic detail for the `debug` block.
#[derive(Error, Debug, Clone, Serialize)]
#[error("{message}")]
pub struct FetchError {
    /// Closed-enum classification of the failure.
    pub kind: FetchErrorKind,
    /// Diagnostic detail from the underlying transport error.
    pub message: String,
}

impl FetchError {
    /// Creates a classified fetch error.
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Machine-readable codes for the error envelope of a failed audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The audit timed out.
    Timeout,
    /// The domain could not be resolved.
    Dns,
    /// The connection was refused.
    ConnectionRefused,
    /// TLS/SSL handshake failed.
    Tls,
    /// Generic network failure.
    Network,
    /// Unclassified failure.
    Failed,
}

impl ErrorCode {
    /// Returns the wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Dns => "DNS",
            ErrorCode::ConnectionRefused => "CONNECTION_REFUSED",
            ErrorCode::Tls => "TLS",
            ErrorCode::Network => "NETWORK",
            ErrorCode::Failed => "FAILED",
        }
    }

    /// Returns the human-readable warning shown to callers for this code.
    pub fn friendly_message(&self) -> &'static str {
        match self {
            ErrorCode::Timeout => {
                "Audit timed out. Please try again (we'll retry automatically on slow sites)."
            }
            ErrorCode::Dns => {
                "We couldn't resolve this domain (DNS). Please double-check the URL and try again."
            }
            ErrorCode::ConnectionRefused => {
                "The server refused the connection. Please confirm the site is up and try again."
            }
            ErrorCode::Tls => {
                "TLS/SSL handshake failed for this URL. Please confirm the site supports HTTPS and try again."
            }
            ErrorCode::Network => "Network error while auditing this page. Please try again in a moment.",
            ErrorCode::Failed => "Audit failed. Please try again in a moment.",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
