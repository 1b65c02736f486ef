//! The subscriber-facing registry surface.

use crate::Listener;
use herald_event::Event;
use std::any::Any;

/// Registration surface a host exposes to its subscribers.
///
/// Dispatch is deliberately absent: firing events belongs to the host that
/// owns the registry, not to the code that listens. Hosts usually own a
/// [`ListenerRegistry`](crate::ListenerRegistry) and implement this trait
/// by delegating to it.
///
/// Every method is total. Failures are reported as `false`, never as a
/// panic or `Err`.
pub trait EventManager<E: Event> {
    /// Appends `listener` to the list for `tag`.
    ///
    /// Returns `false` if the listener was refused.
    fn add_listener(&mut self, tag: E::Tag, listener: Listener<E>) -> bool;

    /// Removes `listener` from `tag`, or from every tag when `tag` is `None`.
    ///
    /// With `remove_all == false` only the first match is removed.
    /// Returns `true` if anything was removed.
    fn remove_listener(
        &mut self,
        listener: &Listener<E>,
        tag: Option<&E::Tag>,
        remove_all: bool,
    ) -> bool;

    /// Drops every listener for `tag`, or every listener when `tag` is `None`.
    fn remove_listeners(&mut self, tag: Option<&E::Tag>);

    /// Appends the listeners of `source` (for `tag`, or all tags) to this
    /// registry.
    ///
    /// Returns `false` if `source` is not the same kind of registry as
    /// `self`, or if any individual add was refused.
    fn copy_listeners(&mut self, source: &dyn EventManager<E>, tag: Option<&E::Tag>) -> bool;

    /// Returns `self` as [`Any`], so a copy can recognise a compatible
    /// source.
    fn as_any(&self) -> &dyn Any;
}
