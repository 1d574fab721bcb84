//! Error taxonomy and classification.
//!
//! Fetch failures are classified into a closed [`FetchErrorKind`] enum at
//! the point they are raised; the orchestrator switches on the kind to
//! decide retryability, and maps terminal kinds to envelope [`ErrorCode`]s.

mod categorization;
mod types;

pub use categorization::classify_reqwest_error;
pub use types::{ErrorCode, FetchError, FetchErrorKind, InitializationError};
