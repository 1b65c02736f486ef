//! Listener registry for herald.
//!
//! Callers register listeners under an event tag; the owner of the registry
//! later dispatches a payload, and every listener registered for the
//! payload's tag is called with it, synchronously and in registration order.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Contract Layer                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  herald-event    : Tag, Event, EventArgs                     │
//! └─────────────────────────────────────────────────────────────┘
//!           ↕
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Registry Layer              ◄── HERE    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  herald-registry : ListenerRegistry, SharedRegistry, sinks   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Concepts
//!
//! ## Listeners
//!
//! A [`Listener`] is a shared callback compared by identity. Keep a clone
//! of the handle you registered to remove it later.
//!
//! ## Registries
//!
//! - [`ListenerRegistry`]: single owner, `&mut self` mutation.
//! - [`SharedRegistry`]: cloneable and lock-protected; listeners may
//!   mutate or dispatch through it while it is dispatching.
//!
//! Both implement [`EventManager`], the subscriber-facing surface.
//! `dispatch` stays on the concrete types because firing belongs to the
//! owner.
//!
//! ## Failure Isolation
//!
//! A listener that returns `Err` or panics never reaches the dispatching
//! caller and never stops the remaining listeners. Each failure is handed
//! to the registry's [`DiagnosticSink`], [`TracingSink`] by default.
//!
//! ## Configuration
//!
//! [`RegistryConfig`] is TOML-deserializable and sets the registry name
//! used in logs, a per-tag capacity and the nested dispatch limit.
//! Registries validate it on construction.
//!
//! # Concurrency
//!
//! Dispatch is synchronous; "fired" means "called", not "completed".
//! Nothing is queued and nothing crosses threads on its own.
//!
//! # Example
//!
//! ```
//! use herald_event::EventArgs;
//! use herald_registry::{Listener, ListenerRegistry};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let mut registry = ListenerRegistry::<EventArgs>::new();
//! let saves = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&saves);
//! let on_save = Listener::new(move |_: &EventArgs| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//! registry.add_listener("save".into(), on_save.clone());
//!
//! // A failing listener is contained and logged.
//! registry.add_listener("save".into(), Listener::try_new(|_: &EventArgs| Err("disk full")));
//!
//! assert!(registry.dispatch(&EventArgs::new("save").with_field("id", 1)));
//! assert_eq!(saves.load(Ordering::SeqCst), 1);
//!
//! // Nobody listens for "close".
//! assert!(!registry.dispatch(&EventArgs::new("close")));
//! ```

mod config;
mod depth;
mod error;
mod listener;
mod manager;
mod registry;
mod shared;
mod sink;

pub use config::{RegistryConfig, DEFAULT_MAX_DISPATCH_DEPTH, DEFAULT_NAME};
pub use error::{ConfigError, DispatchError, ListenerError};
pub use listener::Listener;
pub use manager::EventManager;
pub use registry::ListenerRegistry;
pub use shared::SharedRegistry;
pub use sink::{DiagnosticSink, TracingSink};

// Re-export testing utilities
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! Test utilities for the listener registry.
    //!
    //! Provides [`CallLog`] for observing deliveries and [`RecordingSink`]
    //! for asserting on diagnostics.
    pub use crate::listener::testing::CallLog;
    pub use crate::sink::testing::RecordingSink;
}
