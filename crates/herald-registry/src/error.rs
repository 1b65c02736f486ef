//! Error types for the listener registry.
//!
//! None of these are returned from the registry's public operations,
//! which report through `bool`. They travel to the
//! [`DiagnosticSink`](crate::DiagnosticSink) instead, except
//! [`ConfigError`], which comes back from config loading.
//!
//! | Error | Code |
//! |-------|------|
//! | [`DispatchError::ListenerFailed`] | `LISTENER_FAILED` |
//! | [`DispatchError::IterationFailed`] | `DISPATCH_ITERATION_FAILED` |
//! | [`DispatchError::DepthExceeded`] | `DISPATCH_DEPTH_EXCEEDED` |

use thiserror::Error;

/// Failure of a single listener invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// The listener returned an error.
    #[error("listener returned error: {message}")]
    Failed {
        /// Rendered error.
        message: String,
    },

    /// The listener panicked.
    #[error("listener panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string.
        message: String,
    },
}

impl ListenerError {
    /// Creates a [`ListenerError::Failed`] from any message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// A failure contained inside `dispatch`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// One listener failed; delivery continued with the next one.
    #[error("an error occurred while firing '{tag}' event: {source}")]
    ListenerFailed {
        /// Tag of the event being dispatched.
        tag: String,
        /// What the listener did.
        #[source]
        source: ListenerError,
    },

    /// The listener list could not be walked; nothing was delivered.
    #[error("an error occurred while iterating through '{tag}' event listeners: {reason}")]
    IterationFailed {
        /// Tag of the event being dispatched.
        tag: String,
        /// Why iteration could not proceed.
        reason: String,
    },

    /// Nested dispatch on this thread went past the configured limit.
    #[error("dispatch of '{tag}' exceeded nesting limit (depth={depth}, max={max_depth})")]
    DepthExceeded {
        /// Tag of the event being dispatched.
        tag: String,
        /// Depth at which dispatch was refused.
        depth: u8,
        /// Configured limit.
        max_depth: u8,
    },
}

impl DispatchError {
    /// Returns a stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ListenerFailed { .. } => "LISTENER_FAILED",
            Self::IterationFailed { .. } => "DISPATCH_ITERATION_FAILED",
            Self::DepthExceeded { .. } => "DISPATCH_DEPTH_EXCEEDED",
        }
    }

    /// Returns the tag of the event that was being dispatched.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::ListenerFailed { tag, .. }
            | Self::IterationFailed { tag, .. }
            | Self::DepthExceeded { tag, .. } => tag,
        }
    }
}

/// Errors from loading or validating a [`RegistryConfig`](crate::RegistryConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The TOML source could not be parsed.
    #[error("failed to parse registry config: {0}")]
    Parse(String),

    /// A field holds a value the registry cannot work with.
    #[error("invalid registry config field '{field}': {reason}")]
    Invalid {
        /// Field name as written in TOML.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_listener_failed() {
        let err = DispatchError::ListenerFailed {
            tag: "save".into(),
            source: ListenerError::failed("disk full"),
        };
        assert_eq!(
            err.to_string(),
            "an error occurred while firing 'save' event: listener returned error: disk full"
        );
        assert_eq!(err.code(), "LISTENER_FAILED");
        assert_eq!(err.tag(), "save");
    }

    #[test]
    fn display_iteration_failed() {
        let err = DispatchError::IterationFailed {
            tag: "save".into(),
            reason: "lock poisoned".into(),
        };
        assert_eq!(
            err.to_string(),
            "an error occurred while iterating through 'save' event listeners: lock poisoned"
        );
        assert_eq!(err.code(), "DISPATCH_ITERATION_FAILED");
    }

    #[test]
    fn display_depth_exceeded() {
        let err = DispatchError::DepthExceeded {
            tag: "tick".into(),
            depth: 8,
            max_depth: 8,
        };
        assert_eq!(
            err.to_string(),
            "dispatch of 'tick' exceeded nesting limit (depth=8, max=8)"
        );
        assert_eq!(err.tag(), "tick");
    }

    #[test]
    fn listener_failure_exposes_source() {
        use std::error::Error as _;

        let err = DispatchError::ListenerFailed {
            tag: "save".into(),
            source: ListenerError::Panicked {
                message: "boom".into(),
            },
        };
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("listener panicked: boom"));
    }

    #[test]
    fn display_config_invalid() {
        let err = ConfigError::Invalid {
            field: "max_listeners",
            reason: "must be greater than zero".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid registry config field 'max_listeners': must be greater than zero"
        );
    }
}
