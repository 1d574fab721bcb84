//! Main application entry point (CLI binary).
//!
//! Thin wrapper around the `page_audit` library: parses arguments,
//! initializes logging, runs one audit, and prints the JSON report to
//! stdout. The process exits non-zero when the audit could not complete.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use page_audit::initialization::init_logger_with;
use page_audit::{run_audit, AuditConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AuditConfig::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_audit(&config).await {
        Ok(report) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            );
            if !report.ok {
                process::exit(2);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("page_audit error: {:#}", e);
            process::exit(1);
        }
    }
}
