//! Listener registry: per-tag ordered listener lists and dispatch.
//!
//! Single-owner: mutation takes `&mut self`, dispatch takes `&self`.
//! Wrap in [`SharedRegistry`](crate::SharedRegistry) when listeners or
//! other threads need to mutate the registry while it dispatches.

use crate::depth::DepthGuard;
use crate::{
    ConfigError, DiagnosticSink, DispatchError, EventManager, Listener, RegistryConfig, TracingSink,
};
use herald_event::Event;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Listeners registered under one tag, in registration order.
struct TagSlot<E: Event> {
    tag: E::Tag,
    listeners: Vec<Listener<E>>,
}

/// Maps event tags to ordered listener lists.
///
/// - Delivery order is registration order.
/// - The same listener may be registered any number of times; each
///   registration is its own slot and fires once per dispatch.
/// - Tags are enumerated in the order they were first registered. A tag
///   whose list was emptied keeps its position and is treated exactly like
///   an unknown tag.
///
/// # Example
///
/// ```
/// use herald_event::EventArgs;
/// use herald_registry::{Listener, ListenerRegistry};
///
/// let mut registry = ListenerRegistry::<EventArgs>::new();
/// let on_save = Listener::new(|args: &EventArgs| {
///     assert_eq!(args.event_type, "save");
/// });
///
/// assert!(registry.add_listener("save".into(), on_save.clone()));
/// assert!(registry.dispatch(&EventArgs::new("save").with_field("id", 1)));
///
/// assert!(registry.remove_listener(&on_save, None, false));
/// assert!(!registry.dispatch(&EventArgs::new("save")));
/// ```
pub struct ListenerRegistry<E: Event> {
    slots: Vec<TagSlot<E>>,
    index: HashMap<E::Tag, usize>,
    config: Arc<RegistryConfig>,
    sink: Arc<dyn DiagnosticSink>,
}

impl<E: Event> ListenerRegistry<E> {
    /// Creates an empty registry with default config, reporting to
    /// [`TracingSink`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry with the given config.
    ///
    /// A config that fails [`RegistryConfig::validate`] is replaced by the
    /// default one and a warning is logged. Use
    /// [`try_with_config`](Self::try_with_config) to reject it instead.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(registry) => registry,
            Err(e) => {
                tracing::warn!(error = %e, "invalid registry config, using defaults");
                Self::from_valid(RegistryConfig::default())
            }
        }
    }

    /// Creates an empty registry, failing if `config` does not validate.
    pub fn try_with_config(config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: RegistryConfig) -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            config: Arc::new(config),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replaces the diagnostic sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the active config.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Appends `listener` to the list for `tag`, creating the list if needed.
    ///
    /// Returns `false` only when the tag is at its configured capacity.
    pub fn add_listener(&mut self, tag: E::Tag, listener: Listener<E>) -> bool {
        if let Some(max) = self.config.max_listeners {
            if self.listener_count(&tag) >= max {
                tracing::warn!(
                    registry = %self.config.name,
                    tag = %tag,
                    max_listeners = max,
                    "listener capacity reached, listener not added"
                );
                return false;
            }
        }

        let pos = match self.index.get(&tag) {
            Some(&pos) => pos,
            None => {
                let pos = self.slots.len();
                self.slots.push(TagSlot {
                    tag: tag.clone(),
                    listeners: Vec::new(),
                });
                self.index.insert(tag, pos);
                pos
            }
        };

        let slot = &mut self.slots[pos];
        slot.listeners.push(listener);
        tracing::debug!(
            registry = %self.config.name,
            tag = %slot.tag,
            count = slot.listeners.len(),
            "listener added"
        );
        true
    }

    /// Removes `listener` by identity.
    ///
    /// Searches only `tag` when given, otherwise every tag in first
    /// registration order. Without `remove_all`, stops after the first
    /// match; with it, removes every match. Returns `true` if anything was
    /// removed.
    pub fn remove_listener(
        &mut self,
        listener: &Listener<E>,
        tag: Option<&E::Tag>,
        remove_all: bool,
    ) -> bool {
        let Some(range) = self.search_range(tag) else {
            return false;
        };

        let mut removed = 0;
        for slot in &mut self.slots[range] {
            if remove_all {
                let before = slot.listeners.len();
                slot.listeners.retain(|l| !l.same(listener));
                removed += before - slot.listeners.len();
            } else if let Some(pos) = slot.listeners.iter().position(|l| l.same(listener)) {
                slot.listeners.remove(pos);
                tracing::debug!(
                    registry = %self.config.name,
                    tag = %slot.tag,
                    "listener removed"
                );
                return true;
            }
        }

        if removed > 0 {
            tracing::debug!(
                registry = %self.config.name,
                removed,
                "listener removed from all matching slots"
            );
        }
        removed > 0
    }

    /// Drops every listener for `tag`, or the whole registry when `tag` is
    /// `None`.
    ///
    /// Clearing one tag keeps its (now empty) slot so the tag keeps its
    /// place in [`tags`](Self::tags) order if it is registered again. The
    /// slot costs one entry per distinct tag ever seen; hosts that churn
    /// through many short-lived tags reclaim it with
    /// `remove_listeners(None)`.
    pub fn remove_listeners(&mut self, tag: Option<&E::Tag>) {
        match tag {
            Some(tag) => {
                if let Some(&pos) = self.index.get(tag) {
                    self.slots[pos].listeners.clear();
                    tracing::debug!(registry = %self.config.name, tag = %tag, "listeners cleared");
                }
            }
            None => {
                self.slots.clear();
                self.index.clear();
                tracing::debug!(registry = %self.config.name, "all listeners cleared");
            }
        }
    }

    /// Appends the listeners of `source` to this registry by calling
    /// [`add_listener`](Self::add_listener) for each, in source order.
    ///
    /// Returns `false` without copying anything if `source` is not a
    /// `ListenerRegistry<E>`. Otherwise attempts every entry and returns
    /// `false` if any add was refused; entries already added stay.
    pub fn copy_listeners(&mut self, source: &dyn EventManager<E>, tag: Option<&E::Tag>) -> bool {
        let Some(source) = source.as_any().downcast_ref::<Self>() else {
            tracing::debug!(
                registry = %self.config.name,
                "copy source is not a compatible registry"
            );
            return false;
        };
        let entries = source.entries(tag);
        self.add_entries(entries)
    }

    /// Delivers `event` to every listener registered for its tag.
    ///
    /// Returns `false` if no listener is registered for the tag, or if the
    /// dispatch was refused because it is nested too deeply. Listener
    /// failures are reported to the sink and do not affect the result.
    pub fn dispatch(&self, event: &E) -> bool {
        let tag = event.tag();
        match self.listeners_for(&tag) {
            Some(listeners) => deliver(&self.config, self.sink.as_ref(), &tag, listeners, event),
            None => false,
        }
    }

    /// Alias of [`dispatch`](Self::dispatch).
    pub fn fire(&self, event: &E) -> bool {
        self.dispatch(event)
    }

    /// Listeners registered for `tag`, in delivery order.
    #[must_use]
    pub fn listeners(&self, tag: &E::Tag) -> &[Listener<E>] {
        match self.index.get(tag) {
            Some(&pos) => self.slots[pos].listeners.as_slice(),
            None => &[],
        }
    }

    /// Number of listeners registered for `tag`.
    #[must_use]
    pub fn listener_count(&self, tag: &E::Tag) -> usize {
        self.listeners(tag).len()
    }

    /// Returns `true` if at least one listener is registered for `tag`.
    #[must_use]
    pub fn has_listeners(&self, tag: &E::Tag) -> bool {
        !self.listeners(tag).is_empty()
    }

    /// Tags with at least one listener, in first registration order.
    #[must_use]
    pub fn tags(&self) -> Vec<E::Tag> {
        self.slots
            .iter()
            .filter(|slot| !slot.listeners.is_empty())
            .map(|slot| slot.tag.clone())
            .collect()
    }

    /// Total number of registrations across all tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().map(|slot| slot.listeners.len()).sum()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-empty listener list for `tag`.
    fn listeners_for(&self, tag: &E::Tag) -> Option<&[Listener<E>]> {
        let listeners = self.listeners(tag);
        (!listeners.is_empty()).then_some(listeners)
    }

    /// Slot positions a removal has to search.
    fn search_range(&self, tag: Option<&E::Tag>) -> Option<Range<usize>> {
        match tag {
            Some(tag) => self.index.get(tag).map(|&pos| pos..pos + 1),
            None => Some(0..self.slots.len()),
        }
    }

    /// Owned copy of the listeners for `tag`, for dispatch outside a lock.
    pub(crate) fn snapshot(&self, tag: &E::Tag) -> Option<Vec<Listener<E>>> {
        self.listeners_for(tag).map(<[Listener<E>]>::to_vec)
    }

    /// `(tag, listener)` pairs in tag order then delivery order.
    pub(crate) fn entries(&self, tag: Option<&E::Tag>) -> Vec<(E::Tag, Listener<E>)> {
        let Some(range) = self.search_range(tag) else {
            return Vec::new();
        };
        self.slots[range]
            .iter()
            .flat_map(|slot| {
                slot.listeners
                    .iter()
                    .map(move |listener| (slot.tag.clone(), listener.clone()))
            })
            .collect()
    }

    /// Adds every entry, continuing past refusals.
    pub(crate) fn add_entries(&mut self, entries: Vec<(E::Tag, Listener<E>)>) -> bool {
        let mut all_added = true;
        for (tag, listener) in entries {
            all_added &= self.add_listener(tag, listener);
        }
        all_added
    }

    pub(crate) fn shared_config(&self) -> Arc<RegistryConfig> {
        Arc::clone(&self.config)
    }

    pub(crate) fn sink(&self) -> Arc<dyn DiagnosticSink> {
        Arc::clone(&self.sink)
    }
}

/// Walks `listeners` in order, containing each failure.
pub(crate) fn deliver<E: Event>(
    config: &RegistryConfig,
    sink: &dyn DiagnosticSink,
    tag: &E::Tag,
    listeners: &[Listener<E>],
    event: &E,
) -> bool {
    let _guard = match DepthGuard::enter(config.max_dispatch_depth) {
        Ok(guard) => guard,
        Err(depth) => {
            sink.report(
                &config.name,
                &DispatchError::DepthExceeded {
                    tag: tag.to_string(),
                    depth,
                    max_depth: config.max_dispatch_depth,
                },
            );
            return false;
        }
    };

    for listener in listeners {
        if let Err(source) = listener.invoke(event) {
            sink.report(
                &config.name,
                &DispatchError::ListenerFailed {
                    tag: tag.to_string(),
                    source,
                },
            );
        }
    }
    true
}

impl<E: Event> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for ListenerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for slot in self.slots.iter().filter(|s| !s.listeners.is_empty()) {
            map.entry(&slot.tag, &slot.listeners.len());
        }
        map.finish()
    }
}

impl<E: Event> EventManager<E> for ListenerRegistry<E> {
    fn add_listener(&mut self, tag: E::Tag, listener: Listener<E>) -> bool {
        ListenerRegistry::add_listener(self, tag, listener)
    }

    fn remove_listener(
        &mut self,
        listener: &Listener<E>,
        tag: Option<&E::Tag>,
        remove_all: bool,
    ) -> bool {
        ListenerRegistry::remove_listener(self, listener, tag, remove_all)
    }

    fn remove_listeners(&mut self, tag: Option<&E::Tag>) {
        ListenerRegistry::remove_listeners(self, tag);
    }

    fn copy_listeners(&mut self, source: &dyn EventManager<E>, tag: Option<&E::Tag>) -> bool {
        ListenerRegistry::copy_listeners(self, source, tag)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
