//! Ruler configuration.

use std::collections::BTreeMap;

use nebula_validation::Factory;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings applied when a [`RulerProvider`](crate::RulerProvider) boots.
///
/// Every field is optional in serialized form.
///
/// ```
/// use nebula_ruler::RulerConfig;
///
/// let config = RulerConfig::from_json_str(r#"{
///     "messages": {"email.required": "We need your :attribute."},
///     "attributes": {"dob": "date of birth"}
/// }"#).unwrap();
///
/// assert!(config.flatten_messages);
/// assert_eq!(config.attributes["dob"], "date of birth");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulerConfig {
    /// Message templates keyed by `rule` or `attribute.rule`.
    pub messages: BTreeMap<String, String>,
    /// Display names keyed by attribute.
    pub attributes: BTreeMap<String, String>,
    /// Stop a session at its first failing attribute.
    pub stop_on_first_failure: bool,
    /// Report every text of multi-text rules (default: true). When off only
    /// the first text of each rule's messages is kept.
    pub flatten_messages: bool,
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            messages: BTreeMap::new(),
            attributes: BTreeMap::new(),
            stop_on_first_failure: false,
            flatten_messages: true,
        }
    }
}

impl RulerConfig {
    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] on malformed input or mistyped fields.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Adds a message template.
    #[must_use]
    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(key.into(), template.into());
        self
    }

    /// Adds an attribute display name.
    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>, name: impl Into<String>) -> Self {
        self.attributes.insert(attribute.into(), name.into());
        self
    }

    /// Sets [`stop_on_first_failure`](Self::stop_on_first_failure).
    #[must_use]
    pub fn with_stop_on_first_failure(mut self, stop: bool) -> Self {
        self.stop_on_first_failure = stop;
        self
    }

    /// Sets [`flatten_messages`](Self::flatten_messages).
    #[must_use]
    pub fn with_flatten_messages(mut self, flatten: bool) -> Self {
        self.flatten_messages = flatten;
        self
    }

    /// Copies the host-level settings onto `factory`.
    pub fn apply(&self, factory: &mut Factory) {
        for (key, template) in &self.messages {
            factory.add_message(key.as_str(), template.as_str());
        }
        for (attribute, name) in &self.attributes {
            factory.add_attribute(attribute.as_str(), name.as_str());
        }
        factory.set_stop_on_first_failure(self.stop_on_first_failure);
    }
}
