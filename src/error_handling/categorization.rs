//! Transport error classification.
//!
//! Classification happens here, at the point errors are raised, so the rest
//! of the pipeline only ever sees a [`FetchErrorKind`].

use std::error::Error;

use super::types::{FetchError, FetchErrorKind};

/// Classifies a `reqwest` error into a closed [`FetchErrorKind`].
///
/// The error chain is inspected first (structured checks on the reqwest
/// error and any wrapped `std::io::Error`); the message text is only
/// consulted as a last resort for conditions reqwest does not expose
/// structurally (DNS and TLS failures).
pub fn classify_reqwest_error(err: &reqwest::Error) -> FetchError {
    let message = full_message(err);
    let kind = classify_message(err, &message);
    FetchError::new(kind, message)
}

fn classify_message(err: &reqwest::Error, message: &str) -> FetchErrorKind {
    if err.is_timeout() {
        return FetchErrorKind::Timeout;
    }

    // Walk the source chain looking for io::Error kinds.
    let mut source: Option<&(dyn std::error::Error + 'static)> = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<std::io::Error>() {
            match io_err.kind() {
                std::io::ErrorKind::ConnectionRefused => {
                    return FetchErrorKind::ConnectionRefused
                }
                std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted => {
                    return FetchErrorKind::ConnectionReset
                }
                std::io::ErrorKind::TimedOut => return FetchErrorKind::Timeout,
                _ => {}
            }
        }
        source = cause.source();
    }

    let lower = message.to_lowercase();
    if lower.contains("dns") || lower.contains("resolve") || lower.contains("lookup") {
        return FetchErrorKind::Dns;
    }
    if lower.contains("certificate") || lower.contains("tls") || lower.contains("handshake") {
        return FetchErrorKind::Tls;
    }
    if lower.contains("connection refused") {
        return FetchErrorKind::ConnectionRefused;
    }
    if lower.contains("connection reset") {
        return FetchErrorKind::ConnectionReset;
    }
    if err.is_connect() || err.is_request() || lower.contains("network") {
        return FetchErrorKind::Network;
    }

    FetchErrorKind::Failed
}

/// Flattens an error and its full source chain into one diagnostic string.
fn full_message(err: &reqwest::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source: Option<&(dyn std::error::Error + 'static)> = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}
