//! Diagnostic sinks: where contained dispatch failures go.

use crate::DispatchError;

/// Receives every failure that `dispatch` contains.
///
/// The registry never propagates listener failures to the dispatching
/// caller. Each one is handed to the sink together with the name of the
/// registry it happened in.
pub trait DiagnosticSink: Send + Sync {
    /// Reports one contained failure.
    fn report(&self, registry: &str, error: &DispatchError);
}

/// Default sink: writes diagnostics as `tracing` events.
///
/// Listener failures are logged at `WARN`; failures that stopped a
/// dispatch as a whole are logged at `ERROR`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, registry: &str, error: &DispatchError) {
        match error {
            DispatchError::ListenerFailed { tag, source } => {
                tracing::warn!(
                    registry,
                    tag = %tag,
                    code = error.code(),
                    error = %source,
                    "listener failed while firing event"
                );
            }
            DispatchError::IterationFailed { tag, reason } => {
                tracing::error!(
                    registry,
                    tag = %tag,
                    code = error.code(),
                    reason = %reason,
                    "failed to iterate event listeners"
                );
            }
            DispatchError::DepthExceeded {
                tag,
                depth,
                max_depth,
            } => {
                tracing::error!(
                    registry,
                    tag = %tag,
                    code = error.code(),
                    depth,
                    max_depth,
                    "dispatch nesting limit exceeded"
                );
            }
        }
    }
}

/// Test utilities for diagnostics.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::DiagnosticSink;
    use crate::DispatchError;
    use parking_lot::Mutex;

    /// A sink that keeps every report in memory.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        reports: Mutex<Vec<(String, DispatchError)>>,
    }

    impl RecordingSink {
        /// Creates an empty sink.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Reported errors in order.
        pub fn errors(&self) -> Vec<DispatchError> {
            self.reports.lock().iter().map(|(_, e)| e.clone()).collect()
        }

        /// Registry names in report order.
        pub fn registries(&self) -> Vec<String> {
            self.reports.lock().iter().map(|(r, _)| r.clone()).collect()
        }

        /// Tags of reported errors in order.
        pub fn tags(&self) -> Vec<String> {
            self.reports
                .lock()
                .iter()
                .map(|(_, e)| e.tag().to_string())
                .collect()
        }

        /// Number of reports.
        pub fn len(&self) -> usize {
            self.reports.lock().len()
        }

        /// Returns `true` if nothing was reported.
        pub fn is_empty(&self) -> bool {
            self.reports.lock().is_empty()
        }
    }

    impl DiagnosticSink for RecordingSink {
        fn report(&self, registry: &str, error: &DispatchError) {
            self.reports
                .lock()
                .push((registry.to_string(), error.clone()));
        }
    }
}
