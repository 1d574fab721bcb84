//! Tests for CLI argument parsing.

use clap::Parser;
use page_audit::AuditConfig;

#[test]
fn test_parse_url_only_uses_defaults() {
    let config = AuditConfig::parse_from(["page_audit", "https://example.org/pricing"]);
    assert_eq!(config.url, "https://example.org/pricing");
    assert_eq!(config.max_hops, 5);
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.timeout_seconds, 15);
    assert_eq!(config.retry_base_delay_ms, 350);
    assert!(!config.mock_mode);
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_overrides() {
    let config = AuditConfig::parse_from([
        "page_audit",
        "https://example.org/",
        "--max-hops",
        "8",
        "--timeout-seconds",
        "30",
        "--max-attempts",
        "1",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "--user-agent",
        "CustomBot/2.0",
        "--mock-mode",
    ]);
    assert_eq!(config.max_hops, 8);
    assert_eq!(config.timeout_seconds, 30);
    assert_eq!(config.max_attempts, 1);
    assert_eq!(config.user_agent, "CustomBot/2.0");
    assert!(config.mock_mode);
}

#[test]
fn test_missing_url_is_an_error() {
    assert!(AuditConfig::try_parse_from(["page_audit"]).is_err());
}

#[test]
fn test_invalid_log_level_is_an_error() {
    let result =
        AuditConfig::try_parse_from(["page_audit", "https://example.org/", "--log-level", "loud"]);
    assert!(result.is_err());
}
