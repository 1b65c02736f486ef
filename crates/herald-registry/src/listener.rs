//! Listener handles and testing utilities.

use crate::ListenerError;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

type ListenerFn<E> = dyn Fn(&E) -> Result<(), ListenerError> + Send + Sync;

/// A shared, identity-compared event callback.
///
/// Cloning a `Listener` yields another handle to the *same* callback, so a
/// clone can be used to remove what the original registered. Two listeners
/// built from identical closures are still different listeners.
///
/// ```
/// use herald_event::EventArgs;
/// use herald_registry::Listener;
///
/// let a: Listener<EventArgs> = Listener::new(|_| {});
/// let b = a.clone();
/// let c: Listener<EventArgs> = Listener::new(|_| {});
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
pub struct Listener<E> {
    callback: Arc<ListenerFn<E>>,
}

impl<E: 'static> Listener<E> {
    /// Wraps an infallible callback.
    pub fn new(callback: impl Fn(&E) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(move |event: &E| {
                callback(event);
                Ok(())
            }),
        }
    }

    /// Wraps a fallible callback. An `Err` is reported as
    /// [`ListenerError::Failed`] and does not stop delivery to other
    /// listeners.
    pub fn try_new<F, T>(callback: F) -> Self
    where
        F: Fn(&E) -> Result<(), T> + Send + Sync + 'static,
        T: fmt::Display,
    {
        Self {
            callback: Arc::new(move |event: &E| {
                callback(event).map_err(|e| ListenerError::failed(e.to_string()))
            }),
        }
    }

    /// Returns `true` if both handles refer to the same callback.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }

    /// Invokes the callback, converting a panic into
    /// [`ListenerError::Panicked`].
    ///
    /// The panic never reaches the caller, but the process-wide panic hook
    /// still runs first, so the default hook prints its "thread panicked"
    /// line to stderr in addition to the sink report. Hosts that want the
    /// sink to be the only channel install their own hook with
    /// [`std::panic::set_hook`].
    pub(crate) fn invoke(&self, event: &E) -> Result<(), ListenerError> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(event))) {
            Ok(result) => result,
            Err(payload) => Err(ListenerError::Panicked {
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl<E> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<E> PartialEq for Listener<E> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<E> Eq for Listener<E> {}

impl<E> fmt::Debug for Listener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Test utilities for listeners.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::Listener;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records which labelled listener saw which payload, in call order.
    ///
    /// Every listener built from the same log appends to one shared
    /// sequence, which makes delivery order across listeners observable.
    pub struct CallLog<E> {
        calls: Arc<Mutex<Vec<(String, E)>>>,
    }

    impl<E: Clone + Send + 'static> CallLog<E> {
        /// Creates an empty log.
        #[must_use]
        pub fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Returns a new listener that records `(label, payload)` on each call.
        pub fn listener(&self, label: &str) -> Listener<E> {
            let calls = Arc::clone(&self.calls);
            let label = label.to_string();
            Listener::new(move |event: &E| {
                calls.lock().push((label.clone(), event.clone()));
            })
        }

        /// Returns a new listener that records the call and then fails.
        pub fn failing_listener(&self, label: &str, message: &str) -> Listener<E> {
            let calls = Arc::clone(&self.calls);
            let label = label.to_string();
            let message = message.to_string();
            Listener::try_new(move |event: &E| {
                calls.lock().push((label.clone(), event.clone()));
                Err(message.clone())
            })
        }

        /// Returns a new listener that records the call and then panics.
        pub fn panicking_listener(&self, label: &str) -> Listener<E> {
            let calls = Arc::clone(&self.calls);
            let label = label.to_string();
            Listener::new(move |event: &E| {
                calls.lock().push((label.clone(), event.clone()));
                panic!("listener '{label}' panicked");
            })
        }

        /// Labels in call order.
        pub fn labels(&self) -> Vec<String> {
            self.calls.lock().iter().map(|(l, _)| l.clone()).collect()
        }

        /// Payloads in call order.
        pub fn events(&self) -> Vec<E> {
            self.calls.lock().iter().map(|(_, e)| e.clone()).collect()
        }

        /// Number of calls recorded for `label`.
        pub fn count(&self, label: &str) -> usize {
            self.calls.lock().iter().filter(|(l, _)| l == label).count()
        }

        /// Total number of calls recorded.
        pub fn len(&self) -> usize {
            self.calls.lock().len()
        }

        /// Returns `true` if nothing has been recorded.
        pub fn is_empty(&self) -> bool {
            self.calls.lock().is_empty()
        }

        /// Forgets all recorded calls.
        pub fn clear(&self) {
            self.calls.lock().clear();
        }
    }

    impl<E: Clone + Send + 'static> Default for CallLog<E> {
        fn default() -> Self {
            Self::new()
        }
    }
}
