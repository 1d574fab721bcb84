//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, retry policy, extraction thresholds)
//! - CLI option types and parsing

mod constants;
mod types;

pub use constants::*;
pub use types::{AuditConfig, LogFormat, LogLevel, ValidationError};
