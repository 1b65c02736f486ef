//! Shared registry: a cloneable, lock-protected [`ListenerRegistry`].
//!
//! Dispatch holds the read lock only while it copies the listener list,
//! then invokes listeners with no lock held. A listener may therefore
//! register, remove or dispatch through the same registry, and other
//! threads may mutate it, without disturbing the walk in progress.
//!
//! # Snapshot policy
//!
//! The list copied at the start of a dispatch is authoritative for that
//! dispatch:
//!
//! - a listener added while it runs is not called by it;
//! - a listener removed while it runs is still called by it.
//!
//! Both changes are visible to the next dispatch.

use crate::registry::deliver;
use crate::{
    ConfigError, DispatchError, EventManager, Listener, ListenerRegistry, RegistryConfig,
};
use herald_event::Event;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe handle to a [`ListenerRegistry`].
///
/// Clones share one registry. All operations take `&self`.
pub struct SharedRegistry<E: Event> {
    inner: Arc<RwLock<ListenerRegistry<E>>>,
}

impl<E: Event> SharedRegistry<E> {
    /// Creates an empty shared registry with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::from_registry(ListenerRegistry::new())
    }

    /// Creates an empty shared registry with the given config, falling
    /// back to defaults if it is invalid. See
    /// [`ListenerRegistry::with_config`].
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self::from_registry(ListenerRegistry::with_config(config))
    }

    /// Creates an empty shared registry, failing if `config` does not
    /// validate.
    pub fn try_with_config(config: RegistryConfig) -> Result<Self, ConfigError> {
        ListenerRegistry::try_with_config(config).map(Self::from_registry)
    }

    /// Wraps an existing registry, keeping its listeners, config and sink.
    #[must_use]
    pub fn from_registry(registry: ListenerRegistry<E>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    fn read(&self, op: &'static str) -> Option<RwLockReadGuard<'_, ListenerRegistry<E>>> {
        match self.inner.read() {
            Ok(guard) => Some(guard),
            Err(e) => {
                tracing::error!("shared registry: lock poisoned on {op}: {e}");
                None
            }
        }
    }

    fn write(&self, op: &'static str) -> Option<RwLockWriteGuard<'_, ListenerRegistry<E>>> {
        match self.inner.write() {
            Ok(guard) => Some(guard),
            Err(e) => {
                tracing::error!("shared registry: lock poisoned on {op}: {e}");
                None
            }
        }
    }

    /// See [`ListenerRegistry::add_listener`]. Also `false` if the lock is
    /// poisoned.
    pub fn add_listener(&self, tag: E::Tag, listener: Listener<E>) -> bool {
        self.write("add_listener")
            .is_some_and(|mut reg| reg.add_listener(tag, listener))
    }

    /// See [`ListenerRegistry::remove_listener`].
    pub fn remove_listener(
        &self,
        listener: &Listener<E>,
        tag: Option<&E::Tag>,
        remove_all: bool,
    ) -> bool {
        self.write("remove_listener")
            .is_some_and(|mut reg| reg.remove_listener(listener, tag, remove_all))
    }

    /// See [`ListenerRegistry::remove_listeners`].
    pub fn remove_listeners(&self, tag: Option<&E::Tag>) {
        if let Some(mut reg) = self.write("remove_listeners") {
            reg.remove_listeners(tag);
        }
    }

    /// Copies listeners from another `SharedRegistry<E>`.
    ///
    /// The source is read in one step and released before anything is
    /// added, so copying a registry into itself is allowed (it doubles
    /// every list).
    pub fn copy_listeners(&self, source: &dyn EventManager<E>, tag: Option<&E::Tag>) -> bool {
        let Some(source) = source.as_any().downcast_ref::<Self>() else {
            tracing::debug!("shared registry: copy source is not a compatible registry");
            return false;
        };
        let entries = match source.read("copy_listeners") {
            Some(reg) => reg.entries(tag),
            None => return false,
        };
        self.write("copy_listeners")
            .is_some_and(|mut reg| reg.add_entries(entries))
    }

    /// Delivers `event` to a snapshot of the listeners for its tag.
    ///
    /// Returns `false` if nobody is listening, if the lock is poisoned, or
    /// if the dispatch is nested too deeply. The last two are reported to
    /// the sink.
    pub fn dispatch(&self, event: &E) -> bool {
        let tag = event.tag();
        let (listeners, config, sink) = match self.inner.read() {
            Ok(reg) => (reg.snapshot(&tag), reg.shared_config(), reg.sink()),
            Err(poisoned) => {
                let reg = poisoned.into_inner();
                let (config, sink) = (reg.shared_config(), reg.sink());
                drop(reg);
                sink.report(
                    &config.name,
                    &DispatchError::IterationFailed {
                        tag: tag.to_string(),
                        reason: "listener registry lock poisoned".to_string(),
                    },
                );
                return false;
            }
        };

        match listeners {
            Some(listeners) => deliver(&config, sink.as_ref(), &tag, &listeners, event),
            None => false,
        }
    }

    /// Alias of [`dispatch`](Self::dispatch).
    pub fn fire(&self, event: &E) -> bool {
        self.dispatch(event)
    }

    /// Number of listeners registered for `tag`.
    #[must_use]
    pub fn listener_count(&self, tag: &E::Tag) -> usize {
        self.read("listener_count")
            .map_or(0, |reg| reg.listener_count(tag))
    }

    /// Returns `true` if at least one listener is registered for `tag`.
    #[must_use]
    pub fn has_listeners(&self, tag: &E::Tag) -> bool {
        self.listener_count(tag) > 0
    }

    /// Tags with at least one listener, in first registration order.
    #[must_use]
    pub fn tags(&self) -> Vec<E::Tag> {
        self.read("tags").map_or_else(Vec::new, |reg| reg.tags())
    }

    /// Total number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read("len").map_or(0, |reg| reg.len())
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Event> Clone for SharedRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Event> Default for SharedRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for SharedRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_read() {
            Ok(reg) => f.debug_tuple("SharedRegistry").field(&*reg).finish(),
            Err(_) => f.write_str("SharedRegistry(<locked>)"),
        }
    }
}

impl<E: Event> EventManager<E> for SharedRegistry<E> {
    fn add_listener(&mut self, tag: E::Tag, listener: Listener<E>) -> bool {
        SharedRegistry::add_listener(self, tag, listener)
    }

    fn remove_listener(
        &mut self,
        listener: &Listener<E>,
        tag: Option<&E::Tag>,
        remove_all: bool,
    ) -> bool {
        SharedRegistry::remove_listener(self, listener, tag, remove_all)
    }

    fn remove_listeners(&mut self, tag: Option<&E::Tag>) {
        SharedRegistry::remove_listeners(self, tag);
    }

    fn copy_listeners(&mut self, source: &dyn EventManager<E>, tag: Option<&E::Tag>) -> bool {
        SharedRegistry::copy_listeners(self, source, tag)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
