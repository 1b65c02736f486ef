//! Dynamic, string-tagged event payload.

use crate::Event;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A string-tagged payload with caller-defined fields.
///
/// Serializes as a flat JSON object whose `type` key holds the tag:
///
/// ```
/// use herald_event::{Event, EventArgs};
/// use serde_json::json;
///
/// let args = EventArgs::new("save").with_field("id", 1);
/// assert_eq!(args.tag(), "save");
/// assert_eq!(
///     serde_json::to_value(&args).unwrap(),
///     json!({"type": "save", "id": 1})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventArgs {
    /// The tag this payload is dispatched under.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Caller-defined fields, opaque to the registry.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EventArgs {
    /// Creates a payload with no fields.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            fields: Map::new(),
        }
    }

    /// Adds a field, replacing any previous value under the same key.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns a field by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl Event for EventArgs {
    type Tag = String;

    fn tag(&self) -> String {
        self.event_type.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_has_no_fields() {
        let args = EventArgs::new("open");
        assert_eq!(args.event_type, "open");
        assert!(args.fields.is_empty());
    }

    #[test]
    fn with_field_overwrites() {
        let args = EventArgs::new("save")
            .with_field("id", 1)
            .with_field("id", 2);
        assert_eq!(args.get("id"), Some(&json!(2)));
        assert_eq!(args.fields.len(), 1);
    }

    #[test]
    fn tag_matches_event_type() {
        let args = EventArgs::new("close");
        assert_eq!(args.tag(), "close");
    }

    #[test]
    fn deserialize_flat_object() {
        let args: EventArgs =
            serde_json::from_value(json!({"type": "save", "id": 3, "path": "/tmp/a"}))
                .expect("flat event object should deserialize");
        assert_eq!(args.event_type, "save");
        assert_eq!(args.get("id"), Some(&json!(3)));
        assert_eq!(args.get("path"), Some(&json!("/tmp/a")));
        assert!(args.get("type").is_none());
    }

    #[test]
    fn deserialize_without_type_fails() {
        let result = serde_json::from_value::<EventArgs>(json!({"id": 3}));
        assert!(result.is_err());
    }
}
