//! Configuration types and CLI options.
//!
//! This module defines the enums and structs used for command-line argument
//! parsing and programmatic configuration.

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_USER_AGENT, HTTP_TIMEOUT, MAX_REDIRECT_HOPS, RETRY_BASE_DELAY, RETRY_MAX_ATTEMPTS,
};

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// A field-level configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Audit configuration.
///
/// This is the core configuration struct used by the library. It doubles as
/// the CLI argument definition for the binary, and can be constructed
/// programmatically with [`AuditConfig::default`].
///
/// # Examples
///
/// ```no_run
/// use page_audit::AuditConfig;
///
/// let config = AuditConfig {
///     url: "https://example.org/pricing".to_string(),
///     max_hops: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "page_audit", about = "Audit a single web page for on-page SEO issues")]
pub struct AuditConfig {
    /// URL to audit (bare hostnames are normalized to https://)
    pub url: String,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// Maximum redirect hops to follow
    #[arg(long, default_value_t = MAX_REDIRECT_HOPS)]
    pub max_hops: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = HTTP_TIMEOUT.as_secs())]
    pub timeout_seconds: u64,

    /// Maximum audit attempts (initial attempt + retries)
    #[arg(long, default_value_t = RETRY_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Base retry delay in milliseconds
    #[arg(long, default_value_t = RETRY_BASE_DELAY.as_millis() as u64)]
    pub retry_base_delay_ms: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Serve canned reports for sentinel URLs instead of fetching.
    /// Development/test convenience; never enable in a real deployment.
    #[arg(long, default_value_t = false)]
    pub mock_mode: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            max_hops: MAX_REDIRECT_HOPS,
            timeout_seconds: HTTP_TIMEOUT.as_secs(),
            max_attempts: RETRY_MAX_ATTEMPTS,
            retry_base_delay_ms: RETRY_BASE_DELAY.as_millis() as u64,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            mock_mode: false,
        }
    }
}

impl AuditConfig {
    /// Validates the configuration, returning the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_hops == 0 {
            return Err(ValidationError {
                field: "max_hops",
                message: "must be greater than 0".to_string(),
            });
        }
        if self.timeout_seconds == 0 {
            return Err(ValidationError {
                field: "timeout_seconds",
                message: "must be greater than 0".to_string(),
            });
        }
        if self.max_attempts == 0 {
            return Err(ValidationError {
                field: "max_attempts",
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Per-request timeout as a [`std::time::Duration`].
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }

    /// Base retry delay as a [`std::time::Duration`].
    pub fn retry_base_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.retry_base_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = AuditConfig::default();
        assert_eq!(config.max_hops, 5);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_base_delay_ms, 350);
        assert!(!config.mock_mode);
    }

    #[test]
    fn test_validation_rejects_zero_hops() {
        let config = AuditConfig {
            max_hops: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "max_hops");
        assert!(err.message.contains("greater than 0"));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = AuditConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "timeout_seconds");
    }

    #[test]
    fn test_validation_accepts_default() {
        assert!(AuditConfig::default().validate().is_ok());
    }
}
