//! Collected failure messages.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The message(s) one failed rule contributed to an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageEntry {
    /// A single text.
    One(String),
    /// Several texts reported by one rule.
    Many(Vec<String>),
}

impl MessageEntry {
    /// The first text of the entry.
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::One(text) => Some(text.as_str()),
            Self::Many(texts) => texts.first().map(String::as_str),
        }
    }

    /// All texts of the entry, in order.
    pub fn texts(&self) -> &[String] {
        match self {
            Self::One(text) => std::slice::from_ref(text),
            Self::Many(texts) => texts,
        }
    }
}

/// Failure messages keyed by attribute, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBag {
    messages: IndexMap<String, Vec<MessageEntry>>,
}

impl MessageBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry for `attribute`.
    pub fn add(&mut self, attribute: impl Into<String>, entry: MessageEntry) {
        self.messages.entry(attribute.into()).or_default().push(entry);
    }

    /// Entries recorded for `attribute`.
    pub fn get(&self, attribute: &str) -> &[MessageEntry] {
        self.messages
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First text recorded for `attribute`.
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).first().and_then(MessageEntry::first)
    }

    /// Whether `attribute` has any entries.
    pub fn has(&self, attribute: &str) -> bool {
        self.messages.contains_key(attribute)
    }

    /// Attributes with entries, in evaluation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// Iterates attributes and their entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MessageEntry])> {
        self.messages
            .iter()
            .map(|(attribute, entries)| (attribute.as_str(), entries.as_slice()))
    }

    /// Number of attributes with entries.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consumes the bag.
    pub fn into_map(self) -> IndexMap<String, Vec<MessageEntry>> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut bag = MessageBag::new();
        bag.add("b", MessageEntry::One("b1".into()));
        bag.add("a", MessageEntry::Many(vec!["a1".into(), "a2".into()]));
        bag.add("b", MessageEntry::One("b2".into()));

        assert_eq!(bag.keys().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(bag.get("b").len(), 2);
        assert_eq!(bag.first("a"), Some("a1"));
        assert!(bag.get("missing").is_empty());
        assert!(bag.has("a"));
    }

    #[test]
    fn serializes_entries_untagged() {
        let mut bag = MessageBag::new();
        bag.add("x", MessageEntry::One("one".into()));
        bag.add("x", MessageEntry::Many(vec!["m1".into(), "m2".into()]));

        let json = serde_json::to_value(&bag).unwrap();
        assert_eq!(json, serde_json::json!({"messages": {"x": ["one", ["m1", "m2"]]}}));
    }
}
