//! # nebula-validation
//!
//! Attribute-oriented validation sessions for Nebula.
//!
//! A [`Factory`] holds rule extensions and default messages; each call to
//! [`Factory::make`] produces a [`Validator`] session over one dataset with
//! per-attribute rule strings such as `"required|in:draft,published"`.
//!
//! ## Extending
//!
//! Rules beyond the built-ins are plugged in through [`ExtensionRegistrar`]:
//! a named check, a message provider invoked only after that check failed,
//! and an optional replacer for the message text. Checks land in one of three
//! [`CheckCategory`] buckets; implicit checks also run on absent attributes.
//!
//! ## Evaluation order
//!
//! Sessions evaluate attributes in declaration order and rules left to right.
//! A failing rule's message is produced immediately after its check, before
//! any other check runs.

pub mod bag;
mod builtin;
pub mod data;
pub mod error;
pub mod extensions;
mod factory;
pub mod message;
pub mod registrar;
pub mod rules;
mod validator;

pub use bag::{MessageBag, MessageEntry};
pub use data::Dataset;
pub use error::{BoxError, EngineError, ValidateError, ValidationFailed};
pub use extensions::Extensions;
pub use factory::Factory;
pub use message::{Deferred, Message};
pub use registrar::{
    CheckCategory, CheckFn, CheckInput, ExtensionRegistrar, MessageFn, MessageRequest,
    ReplaceInput, ReplacerFn,
};
pub use rules::{ParsedRule, RuleSpec};
pub use validator::{SessionHandle, SessionHook, SessionId, Validator};

/// Whether `name` is a built-in rule. Built-in rules take precedence over
/// extensions registered under the same name.
pub fn is_builtin_rule(name: &str) -> bool {
    builtin::Builtin::from_name(name).is_some()
}

/// Converts a JSON value into a [`Dataset`].
///
/// Anything other than an object yields an empty dataset.
pub fn dataset(value: serde_json::Value) -> Dataset {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Dataset::new(),
    }
}
