//! Message view over a host validation session.

use std::fmt;

use indexmap::IndexMap;
use nebula_validation::{
    Dataset, EngineError, Message, MessageEntry, MessageRequest, SessionHook, ValidateError,
    Validator,
};
use serde::Serialize;
use tracing::trace;

/// Session hook that evaluates deferred messages once, right after the
/// failed check that produced them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeferredMessages;

impl SessionHook for DeferredMessages {
    fn resolve_message(&self, message: Message, request: &MessageRequest<'_>) -> Message {
        if message.is_deferred() {
            trace!(
                rule = request.rule,
                attribute = request.attribute,
                "resolving deferred message"
            );
        }
        message.resolve()
    }
}

/// Failure texts per attribute, one flat list each, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlatMessages(IndexMap<String, Vec<String>>);

impl FlatMessages {
    /// Texts for `attribute`; empty when it passed.
    pub fn get(&self, attribute: &str) -> &[String] {
        self.0.get(attribute).map(Vec::as_slice).unwrap_or_default()
    }

    /// The first text for `attribute`.
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).first().map(String::as_str)
    }

    /// Whether `attribute` has any text.
    pub fn has(&self, attribute: &str) -> bool {
        self.0.contains_key(attribute)
    }

    /// Failed attributes in evaluation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(attribute, texts)` pairs in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of failed attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The underlying map.
    pub fn into_map(self) -> IndexMap<String, Vec<String>> {
        self.0
    }
}

/// A host session whose messages come out flat.
///
/// Rules may report one text or several; [`messages`](Self::messages) merges
/// them per attribute into one list, keeping the order the host evaluated
/// them in. With flattening turned off only the first text of each
/// multi-text entry is kept.
pub struct RulerValidator {
    inner: Validator,
    flatten: bool,
}

impl RulerValidator {
    /// Wraps a session; flattening is on.
    pub fn new(inner: Validator) -> Self {
        Self {
            inner,
            flatten: true,
        }
    }

    /// Turns flattening on or off.
    #[must_use]
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Whether every attribute passed.
    ///
    /// # Errors
    ///
    /// Rule and message errors raised during evaluation.
    pub fn passes(&self) -> Result<bool, EngineError> {
        self.inner.passes()
    }

    /// Whether any attribute failed.
    ///
    /// # Errors
    ///
    /// Rule and message errors raised during evaluation.
    pub fn fails(&self) -> Result<bool, EngineError> {
        self.inner.fails()
    }

    /// The validated subset of the data.
    ///
    /// # Errors
    ///
    /// [`ValidateError::Failed`] with the host's message bag when an
    /// attribute failed, [`ValidateError::Engine`] on evaluation errors.
    pub fn validate(&self) -> Result<Dataset, ValidateError> {
        self.inner.validate()
    }

    /// All failure texts, flattened per attribute.
    ///
    /// # Errors
    ///
    /// Rule and message errors raised during evaluation.
    pub fn messages(&self) -> Result<FlatMessages, EngineError> {
        let bag = self.inner.errors()?;
        let mut flat = IndexMap::with_capacity(bag.len());

        for (attribute, entries) in bag.iter() {
            let texts: Vec<String> = entries
                .iter()
                .flat_map(|entry| self.texts(entry))
                .cloned()
                .collect();
            flat.insert(attribute.to_owned(), texts);
        }

        Ok(FlatMessages(flat))
    }

    /// The first failure text for `attribute`.
    ///
    /// # Errors
    ///
    /// Rule and message errors raised during evaluation.
    pub fn first(&self, attribute: &str) -> Result<Option<String>, EngineError> {
        Ok(self.inner.errors()?.first(attribute).map(str::to_owned))
    }

    /// The wrapped session.
    pub fn inner(&self) -> &Validator {
        &self.inner
    }

    /// Unwraps the session.
    pub fn into_inner(self) -> Validator {
        self.inner
    }

    fn texts<'a>(&self, entry: &'a MessageEntry) -> &'a [String] {
        let texts = entry.texts();
        if self.flatten {
            texts
        } else {
            &texts[..texts.len().min(1)]
        }
    }
}

impl From<Validator> for RulerValidator {
    fn from(inner: Validator) -> Self {
        Self::new(inner)
    }
}

impl fmt::Debug for RulerValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RulerValidator")
            .field("inner", &self.inner)
            .field("flatten", &self.flatten)
            .finish()
    }
}
