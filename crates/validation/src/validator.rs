//! Validation sessions.
//!
//! A [`Validator`] owns one dataset and its per-attribute rules. Evaluation is
//! strictly sequential: attribute by attribute in declaration order, rule by
//! rule, and a failing rule's message is produced right after its check,
//! before the next check runs.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use heck::ToSnakeCase;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::bag::{MessageBag, MessageEntry};
use crate::builtin::Builtin;
use crate::data::{self, Dataset};
use crate::error::{EngineError, ValidateError, ValidationFailed};
use crate::extensions::Extensions;
use crate::factory::ExtensionTable;
use crate::message::Message;
use crate::registrar::{CheckInput, MessageRequest, ReplaceInput};
use crate::rules::ParsedRule;

static NULL: Value = Value::Null;

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a validation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Transforms a failed rule's raw message before placeholder replacement.
///
/// Installed on a [`Factory`](crate::Factory); every session it makes uses it.
pub trait SessionHook: Send + Sync {
    /// Returns the message to replace and record.
    fn resolve_message(&self, message: Message, request: &MessageRequest<'_>) -> Message;
}

/// A read-only view of a session, safe to keep beyond a single check call.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    data: Arc<Dataset>,
    attributes: Arc<HashMap<String, String>>,
}

impl SessionHandle {
    /// The session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The full dataset.
    pub fn data(&self) -> &Dataset {
        &self.data
    }

    /// Looks up a value by attribute path.
    pub fn value(&self, path: &str) -> Option<&Value> {
        data::lookup(&self.data, path)
    }

    /// The displayable name of an attribute.
    pub fn display_name(&self, attribute: &str) -> String {
        display_name(&self.attributes, attribute)
    }
}

/// Everything a session needs from its factory.
pub(crate) struct SessionParts {
    pub(crate) data: Dataset,
    pub(crate) rules: IndexMap<String, Vec<ParsedRule>>,
    pub(crate) messages: HashMap<String, String>,
    pub(crate) attributes: HashMap<String, String>,
    pub(crate) table: Arc<ExtensionTable>,
    pub(crate) hook: Option<Arc<dyn SessionHook>>,
    pub(crate) stop_on_first_failure: bool,
}

/// One validation session.
pub struct Validator {
    id: SessionId,
    data: Arc<Dataset>,
    rules: IndexMap<String, Vec<ParsedRule>>,
    messages: HashMap<String, String>,
    attributes: Arc<HashMap<String, String>>,
    table: Arc<ExtensionTable>,
    hook: Option<Arc<dyn SessionHook>>,
    stop_on_first_failure: bool,
    extensions: Mutex<Extensions>,
    outcome: OnceLock<MessageBag>,
}

impl Validator {
    pub(crate) fn from_parts(parts: SessionParts) -> Self {
        Self {
            id: SessionId::next(),
            data: Arc::new(parts.data),
            rules: parts.rules,
            messages: parts.messages,
            attributes: Arc::new(parts.attributes),
            table: parts.table,
            hook: parts.hook,
            stop_on_first_failure: parts.stop_on_first_failure,
            extensions: Mutex::new(Extensions::new()),
            outcome: OnceLock::new(),
        }
    }

    /// The session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The full dataset under validation.
    pub fn data(&self) -> &Dataset {
        &self.data
    }

    /// A cloneable read-only handle to this session.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            id: self.id,
            data: Arc::clone(&self.data),
            attributes: Arc::clone(&self.attributes),
        }
    }

    /// Attributes with rules, in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Parsed rules declared for `attribute`.
    pub fn rules(&self, attribute: &str) -> Option<&[ParsedRule]> {
        self.rules.get(attribute).map(Vec::as_slice)
    }

    /// The displayable name of an attribute.
    pub fn display_name(&self, attribute: &str) -> String {
        display_name(&self.attributes, attribute)
    }

    /// Runs `f` against this session's extension slot of type `T`.
    ///
    /// The slot is created with `T::default()` on first access.
    pub fn with_extension<T, R>(&self, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Default + Send + 'static,
    {
        let mut extensions = self.extensions.lock();
        f(extensions.get_or_default::<T>())
    }

    /// Whether every attribute passed.
    pub fn passes(&self) -> Result<bool, EngineError> {
        Ok(self.errors()?.is_empty())
    }

    /// Whether any attribute failed.
    pub fn fails(&self) -> Result<bool, EngineError> {
        Ok(!self.passes()?)
    }

    /// Runs the session (once) and returns the collected messages.
    ///
    /// Not meant to be evaluated from several threads at once: concurrent
    /// first calls each run the rules against the same extension slots.
    pub fn errors(&self) -> Result<&MessageBag, EngineError> {
        if let Some(bag) = self.outcome.get() {
            return Ok(bag);
        }
        let bag = self.run()?;
        Ok(self.outcome.get_or_init(|| bag))
    }

    /// Returns the validated subset of the data, or the failure messages.
    pub fn validate(&self) -> Result<Dataset, ValidateError> {
        let bag = self.errors()?;
        if !bag.is_empty() {
            return Err(ValidationFailed {
                messages: bag.clone(),
            }
            .into());
        }

        Ok(self
            .rules
            .keys()
            .filter_map(|attribute| {
                data::lookup(&self.data, attribute).map(|value| (attribute.clone(), value.clone()))
            })
            .collect())
    }

    /// Looks up the raw (unreplaced, unresolved) message for a failed rule.
    pub fn raw_message(&self, request: &MessageRequest<'_>) -> Result<Message, EngineError> {
        let custom = format!("{}.{}", request.attribute, request.rule);
        if let Some(text) = self
            .messages
            .get(&custom)
            .or_else(|| self.messages.get(request.rule))
        {
            return Ok(Message::Text(text.clone()));
        }

        if let Some(builtin) = Builtin::from_name(request.rule) {
            return Ok(Message::from(builtin.default_message()));
        }

        if let Some(extension) = self.table.active(request.rule) {
            return (extension.message)(request, self).map_err(|source| EngineError::Message {
                rule: request.rule.to_owned(),
                attribute: request.attribute.to_owned(),
                source,
            });
        }

        Ok(Message::Text(format!("validation.{}", request.rule)))
    }

    fn run(&self) -> Result<MessageBag, EngineError> {
        debug!(session = %self.id, attributes = self.rules.len(), "running validation session");
        let mut bag = MessageBag::new();

        for (attribute, rules) in &self.rules {
            let found = data::lookup(&self.data, attribute);
            let value = found.unwrap_or(&NULL);
            let nullable = rules.iter().any(|r| r.name == "nullable");
            let bail = rules.iter().any(|r| r.name == "bail");
            let mut failed = false;

            for rule in rules {
                if !self.should_run(rule, found.is_some(), value, nullable)? {
                    continue;
                }

                trace!(session = %self.id, attribute = %attribute, rule = %rule.name, "checking rule");
                if self.check(attribute, value, rule)? {
                    continue;
                }

                failed = true;
                let entry = self.failure_entry(attribute, value, rule)?;
                bag.add(attribute.clone(), entry);
                if bail {
                    break;
                }
            }

            if failed && self.stop_on_first_failure {
                break;
            }
        }

        Ok(bag)
    }

    fn should_run(
        &self,
        rule: &ParsedRule,
        present: bool,
        value: &Value,
        nullable: bool,
    ) -> Result<bool, EngineError> {
        let implicit = match Builtin::from_name(&rule.name) {
            Some(builtin) if builtin.is_marker() => return Ok(false),
            Some(builtin) => builtin.is_implicit(),
            None if self.table.active(&rule.name).is_some() => self.table.is_implicit(&rule.name),
            None => {
                return Err(EngineError::UnknownRule {
                    rule: rule.name.clone(),
                });
            }
        };

        if implicit {
            return Ok(true);
        }
        if nullable && value.is_null() {
            return Ok(false);
        }
        let blank = value.as_str().is_some_and(|s| s.trim().is_empty());
        Ok(present && !blank)
    }

    fn check(&self, attribute: &str, value: &Value, rule: &ParsedRule) -> Result<bool, EngineError> {
        if let Some(builtin) = Builtin::from_name(&rule.name) {
            return Ok(builtin.check(value, &rule.parameters, &self.data));
        }

        let extension = self
            .table
            .active(&rule.name)
            .ok_or_else(|| EngineError::UnknownRule {
                rule: rule.name.clone(),
            })?;
        let input = CheckInput {
            attribute,
            value,
            parameters: &rule.parameters,
        };
        (extension.check)(&input, self).map_err(|source| EngineError::Check {
            rule: rule.name.clone(),
            attribute: attribute.to_owned(),
            source,
        })
    }

    fn failure_entry(
        &self,
        attribute: &str,
        value: &Value,
        rule: &ParsedRule,
    ) -> Result<MessageEntry, EngineError> {
        let request = MessageRequest {
            attribute,
            rule: &rule.name,
            parameters: &rule.parameters,
        };

        let mut message = self.raw_message(&request)?;
        if let Some(hook) = &self.hook {
            message = hook.resolve_message(message, &request);
        }

        match message.map_texts(|text| self.make_replacements(text, value, &request)) {
            Message::Text(text) => Ok(MessageEntry::One(text)),
            Message::List(texts) => Ok(MessageEntry::Many(texts)),
            Message::Deferred(_) => Err(EngineError::UnresolvedMessage {
                rule: rule.name.clone(),
                attribute: attribute.to_owned(),
            }),
        }
    }

    fn make_replacements(&self, text: String, value: &Value, request: &MessageRequest<'_>) -> String {
        let display = self.display_name(request.attribute);
        let mut text = text
            .replace(":attribute", &display)
            .replace(":ATTRIBUTE", &display.to_uppercase())
            .replace(":Attribute", &upper_first(&display))
            .replace(":input", &data::display(value));

        if request.rule == "same"
            && let Some(other) = request.parameters.first()
        {
            text = text.replace(":other", &self.display_name(other));
        }

        if let Some(replacer) = self.table.replacer(request.rule) {
            let input = ReplaceInput {
                attribute: request.attribute,
                rule: request.rule,
                parameters: request.parameters,
            };
            text = replacer(&text, &input, self);
        }

        text
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("id", &self.id)
            .field("attributes", &self.rules.keys().collect::<Vec<_>>())
            .field("evaluated", &self.outcome.get().is_some())
            .finish_non_exhaustive()
    }
}

fn display_name(attributes: &HashMap<String, String>, attribute: &str) -> String {
    attributes
        .get(attribute)
        .cloned()
        .unwrap_or_else(|| attribute.to_snake_case().replace('_', " "))
}

fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        let mut attributes = HashMap::new();
        attributes.insert("dob".to_owned(), "date of birth".to_owned());

        assert_eq!(display_name(&attributes, "dob"), "date of birth");
        assert_eq!(display_name(&attributes, "myAttribute"), "my attribute");
        assert_eq!(display_name(&attributes, "my_field"), "my field");
    }

    #[test]
    fn upper_first_handles_empty() {
        assert_eq!(upper_first(""), "");
        assert_eq!(upper_first("my field"), "My field");
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::next(), SessionId::next());
    }
}
