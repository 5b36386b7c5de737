//! Instance tracking between a check and its message lookup.
//!
//! The host calls a rule's check and, on failure, its message provider as two
//! separate callbacks. The check records the instance it built here; the
//! message provider reads it back. The tracker lives in the validation
//! session's extension slot, so records are scoped to one session and keyed
//! by implementation and attribute: two attributes sharing a rule never see
//! each other's instance.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use nebula_validation::{Message, Validator};
use tracing::warn;

use crate::contract::Extension;
use crate::error::TrackerError;
use crate::implementation::ImplementationId;

/// The most recently checked instance per (implementation, attribute).
#[derive(Default)]
pub struct InstanceTracker {
    records: HashMap<(ImplementationId, String), Box<dyn Extension>>,
}

impl InstanceTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `instance`, overwriting any earlier record for the same key,
    /// and returns the stored instance.
    pub fn record(
        &mut self,
        id: ImplementationId,
        attribute: &str,
        instance: Box<dyn Extension>,
    ) -> &mut dyn Extension {
        let slot = match self.records.entry((id, attribute.to_owned())) {
            Entry::Occupied(mut entry) => {
                entry.insert(instance);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(instance),
        };
        slot.as_mut()
    }

    /// Runs `f` against the recorded instance.
    pub fn with_latest<R>(
        &mut self,
        id: ImplementationId,
        attribute: &str,
        f: impl FnOnce(&mut dyn Extension) -> R,
    ) -> Option<R> {
        self.records
            .get_mut(&(id, attribute.to_owned()))
            .map(|instance| f(instance.as_mut()))
    }

    /// The recorded instance's failure message.
    ///
    /// # Errors
    ///
    /// [`TrackerError::NoInstance`] when nothing was checked for this key,
    /// [`TrackerError::NotARule`] when the instance exposes no message.
    pub fn message_for(
        &mut self,
        id: ImplementationId,
        attribute: &str,
    ) -> Result<Message, TrackerError> {
        let Some(message) = self.with_latest(id, attribute, |instance| {
            instance.as_rule().map(|rule| rule.message())
        }) else {
            warn!(implementation = %id, attribute, "message requested without a tracked instance");
            return Err(TrackerError::NoInstance {
                implementation: id.type_name(),
                attribute: attribute.to_owned(),
            });
        };

        message.ok_or(TrackerError::NotARule {
            implementation: id.type_name(),
        })
    }

    /// Whether an instance is recorded for the key.
    pub fn contains(&self, id: ImplementationId, attribute: &str) -> bool {
        self.records.contains_key(&(id, attribute.to_owned()))
    }

    /// Number of recorded instances.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Debug for InstanceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceTracker")
            .field("records", &self.records.len())
            .finish()
    }
}

/// Runs `f` against the tracker of `validator`'s session.
pub fn with_tracker<R>(validator: &Validator, f: impl FnOnce(&mut InstanceTracker) -> R) -> R {
    validator.with_extension::<InstanceTracker, R>(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Rule;
    use serde_json::Value;

    struct Echo(String);

    impl Rule for Echo {
        fn passes(&mut self, _: &str, value: &Value) -> bool {
            self.0 = value.to_string();
            false
        }

        fn message(&self) -> Message {
            Message::Text(self.0.clone())
        }
    }

    crate::extension!(Echo: Rule);

    struct Silent;
    crate::extension!(Silent);

    #[test]
    fn record_overwrites_per_attribute() {
        let id = ImplementationId::of::<Echo>();
        let mut tracker = InstanceTracker::new();

        tracker.record(id, "a", Box::new(Echo("first".into())));
        tracker.record(id, "a", Box::new(Echo("second".into())));
        tracker.record(id, "b", Box::new(Echo("other".into())));

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.message_for(id, "a").unwrap().first(), Some("second"));
        assert_eq!(tracker.message_for(id, "b").unwrap().first(), Some("other"));
    }

    #[test]
    fn recorded_instance_keeps_check_state() {
        let id = ImplementationId::of::<Echo>();
        let mut tracker = InstanceTracker::new();

        let instance = tracker.record(id, "a", Box::new(Echo(String::new())));
        let passed = instance
            .as_rule()
            .map(|rule| rule.passes("a", &Value::from("x")));
        assert_eq!(passed, Some(false));
        assert_eq!(tracker.message_for(id, "a").unwrap().first(), Some("\"x\""));
    }

    #[test]
    fn missing_records_are_errors() {
        let mut tracker = InstanceTracker::new();
        let id = ImplementationId::of::<Echo>();
        assert!(matches!(
            tracker.message_for(id, "a"),
            Err(TrackerError::NoInstance { .. })
        ));

        let silent = ImplementationId::of::<Silent>();
        tracker.record(silent, "a", Box::new(Silent));
        assert!(matches!(
            tracker.message_for(silent, "a"),
            Err(TrackerError::NotARule { .. })
        ));
    }
}
