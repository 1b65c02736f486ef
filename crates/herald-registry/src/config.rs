//! Registry configuration.
//!
//! # Example TOML
//!
//! ```toml
//! name = "document"
//! max_listeners = 64
//! max_dispatch_depth = 8
//! ```
//!
//! Every field is optional; omitted fields take their defaults.

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Default registry name used in log fields.
pub const DEFAULT_NAME: &str = "default";

/// Default limit on nested dispatches per thread.
pub const DEFAULT_MAX_DISPATCH_DEPTH: u8 = 8;

/// Tunables for a [`ListenerRegistry`](crate::ListenerRegistry).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Name written to log fields, to tell registries apart.
    pub name: String,

    /// Per-tag listener capacity. `None` means unbounded.
    ///
    /// Adding past the limit is refused and `add_listener` returns `false`.
    pub max_listeners: Option<usize>,

    /// How many dispatches may be nested on one thread before dispatch is
    /// refused. Counts across all registries.
    pub max_dispatch_depth: u8,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            max_listeners: None,
            max_dispatch_depth: DEFAULT_MAX_DISPATCH_DEPTH,
        }
    }
}

impl RegistryConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        if self.max_listeners == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_listeners",
                reason: "must be greater than zero".into(),
            });
        }
        if self.max_dispatch_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_dispatch_depth",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Sets the registry name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the per-tag listener capacity.
    #[must_use]
    pub fn with_max_listeners(mut self, max: usize) -> Self {
        self.max_listeners = Some(max);
        self
    }

    /// Sets the nested dispatch limit.
    #[must_use]
    pub fn with_max_dispatch_depth(mut self, depth: u8) -> Self {
        self.max_dispatch_depth = depth;
        self
    }
}
