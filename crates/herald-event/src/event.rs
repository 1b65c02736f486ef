//! The `Tag` and `Event` traits.

use std::fmt;
use std::hash::Hash;

/// Identifies a category of event.
///
/// Equality is exact; there is no hierarchy and no wildcard matching.
/// `Display` is used when a tag is written to diagnostics.
///
/// Implemented automatically for every type meeting the bounds, which
/// covers `String`, `&'static str` and plain fieldless enums.
pub trait Tag: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> Tag for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

/// A payload that can be dispatched through a listener registry.
///
/// The payload reports its own tag, which is what the registry uses to
/// select listeners. Everything else about the payload is opaque to the
/// registry.
pub trait Event: 'static {
    /// The tag type that keys listeners for this payload.
    type Tag: Tag;

    /// Returns the tag this payload is dispatched under.
    fn tag(&self) -> Self::Tag;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Phase {
        Start,
        Stop,
    }

    impl fmt::Display for Phase {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Start => f.write_str("start"),
                Self::Stop => f.write_str("stop"),
            }
        }
    }

    struct PhaseEvent(Phase);

    impl Event for PhaseEvent {
        type Tag = Phase;

        fn tag(&self) -> Phase {
            self.0
        }
    }

    fn assert_tag<T: Tag>() {}

    #[test]
    fn common_types_are_tags() {
        assert_tag::<String>();
        assert_tag::<&'static str>();
        assert_tag::<u32>();
        assert_tag::<Phase>();
    }

    #[test]
    fn enum_event_reports_its_tag() {
        assert_eq!(PhaseEvent(Phase::Start).tag(), Phase::Start);
        assert_eq!(PhaseEvent(Phase::Stop).tag().to_string(), "stop");
    }
}
