//! Event contract for herald.
//!
//! This crate defines what the listener registry needs to know about an
//! event and nothing more: every payload carries its own tag, and tags are
//! plain hashable values compared by equality.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Contract Layer                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  herald-event    : Tag, Event, EventArgs      ◄── HERE       │
//! └─────────────────────────────────────────────────────────────┘
//!           ↕ depended on by
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Registry Layer                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  herald-registry : ListenerRegistry, SharedRegistry, sinks   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Typed Events
//!
//! A host with a closed set of events uses an enum for the tag and an enum
//! for the payload. The registry is then keyed by the tag enum, so a
//! listener registered for `DocTag::Saved` can only ever be handed a
//! `DocEvent`.
//!
//! ```
//! use herald_event::Event;
//! use std::fmt;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum DocTag {
//!     Saved,
//!     Closed,
//! }
//!
//! impl fmt::Display for DocTag {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         match self {
//!             Self::Saved => f.write_str("saved"),
//!             Self::Closed => f.write_str("closed"),
//!         }
//!     }
//! }
//!
//! enum DocEvent {
//!     Saved { revision: u32 },
//!     Closed,
//! }
//!
//! impl Event for DocEvent {
//!     type Tag = DocTag;
//!
//!     fn tag(&self) -> DocTag {
//!         match self {
//!             Self::Saved { .. } => DocTag::Saved,
//!             Self::Closed => DocTag::Closed,
//!         }
//!     }
//! }
//!
//! assert_eq!(DocEvent::Saved { revision: 2 }.tag(), DocTag::Saved);
//! assert_eq!(DocEvent::Closed.tag().to_string(), "closed");
//! ```
//!
//! # Dynamic Events
//!
//! [`EventArgs`] is a string-tagged payload with an open JSON field map,
//! for hosts that do not want a closed taxonomy.

mod args;
mod event;

pub use args::EventArgs;
pub use event::{Event, Tag};
