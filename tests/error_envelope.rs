//! Failure envelope shape for unreachable targets.

use tokio::net::TcpListener;

use page_audit::fetch::FetchContext;
use page_audit::pipeline::Auditor;
use page_audit::{AuditConfig, HttpFetcher, IssueCatalog};

/// Reserves a loopback port and releases it, so connecting is refused.
async fn refused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

fn fast_config() -> AuditConfig {
    AuditConfig {
        timeout_seconds: 5,
        retry_base_delay_ms: 1,
        ..AuditConfig::default()
    }
}

#[tokio::test]
async fn test_connection_refused_yields_error_envelope() {
    let port = refused_port().await;
    let config = fast_config();
    let ctx = FetchContext::new(config.timeout(), &config.user_agent).expect("client");
    let auditor = Auditor::new(HttpFetcher::new(ctx), IssueCatalog::builtin(), &config);

    let report = auditor.audit(&format!("http://127.0.0.1:{port}/")).await;

    assert!(!report.ok);
    assert!(report.score.is_none(), "failed audits carry no score");
    assert!(report.issues.is_empty());
    let envelope = report.error.as_ref().expect("failure carries an envelope");
    assert_eq!(envelope.code.as_str(), "CONNECTION_REFUSED");
    assert!(!envelope.message.is_empty());

    // Wire shape: ok false, score null, error object present.
    let value = serde_json::to_value(&report).expect("report serializes");
    assert_eq!(value["ok"], serde_json::json!(false));
    assert!(value["score"].is_null());
    assert_eq!(value["error"]["code"], serde_json::json!("CONNECTION_REFUSED"));
    assert_eq!(value["debug"]["fetch_status"], serde_json::json!(0));
}

#[tokio::test]
async fn test_invalid_target_reports_failed_code() {
    let config = fast_config();
    let ctx = FetchContext::new(config.timeout(), &config.user_agent).expect("client");
    let auditor = Auditor::new(HttpFetcher::new(ctx), IssueCatalog::builtin(), &config);

    let report = auditor.audit("http://").await;

    assert!(!report.ok);
    assert_eq!(report.error.as_ref().unwrap().code.as_str(), "FAILED");
}
