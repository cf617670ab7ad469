//! Error types for the deadman check.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for configuration handling.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while building or validating a [`CheckConfig`](crate::CheckConfig).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),

    #[error("check interval must be greater than zero")]
    ZeroInterval,

    #[error("check uuid must not be empty")]
    EmptyCheckUuid,

    #[error("url cannot be used as a base: {0}")]
    CannotBeABase(String),
}

/// Errors from a single request against the monitoring server.
///
/// Every variant maps onto a [`Failure`](crate::Failure) that is reported
/// through the failure ping.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("failed to create request: {0}")]
    CreateRequest(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Execute(#[source] reqwest::Error),

    #[error("unexpected response status {status}")]
    UnexpectedStatus { status: String, body: String },

    #[error("failed to decode response body: {0}")]
    Decode(String),
}

/// Render an error together with its source chain, `outer: inner: root`.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        // hyper sometimes repeats the inner message verbatim.
        if !rendered.ends_with(&message) {
            rendered.push_str(": ");
            rendered.push_str(&message);
        }
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn error_chain_joins_sources() {
        assert_eq!(error_chain(&Outer(Inner)), "outer: inner");
    }

    #[test]
    fn error_chain_without_source() {
        assert_eq!(error_chain(&Inner), "inner");
    }

    #[test]
    fn config_error_messages() {
        assert_eq!(
            ConfigError::InvalidDuration("5x".to_string()).to_string(),
            "invalid duration: \"5x\""
        );
        assert_eq!(
            ConfigError::ZeroInterval.to_string(),
            "check interval must be greater than zero"
        );
    }
}
