//! Extension registration API.
//!
//! Third-party rule layers plug into the engine through
//! [`ExtensionRegistrar`]: a named check paired with a message provider, and
//! an optional replacer that post-processes the rule's message text.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::BoxError;
use crate::message::Message;
use crate::validator::Validator;

/// The registration bucket an extension check lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckCategory {
    /// Runs only when the attribute is present and non-empty.
    Basic,
    /// Marks the rule as depending on the rest of the dataset.
    DataAware,
    /// Runs even when the attribute is missing or empty.
    Implicit,
}

impl CheckCategory {
    /// All categories in bucket order.
    pub const ALL: [Self; 3] = [Self::Basic, Self::DataAware, Self::Implicit];

    /// Stable lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::DataAware => "data_aware",
            Self::Implicit => "implicit",
        }
    }
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments of one check invocation.
#[derive(Debug, Clone, Copy)]
pub struct CheckInput<'a> {
    /// The attribute path under validation.
    pub attribute: &'a str,
    /// The attribute's value (`null` when absent).
    pub value: &'a Value,
    /// Raw rule parameters.
    pub parameters: &'a [String],
}

/// Arguments of a message lookup following a failed check.
#[derive(Debug, Clone, Copy)]
pub struct MessageRequest<'a> {
    /// The attribute path that failed.
    pub attribute: &'a str,
    /// The rule name that failed.
    pub rule: &'a str,
    /// Raw rule parameters.
    pub parameters: &'a [String],
}

/// Arguments passed to a replacer.
#[derive(Debug, Clone, Copy)]
pub struct ReplaceInput<'a> {
    /// The attribute path that failed.
    pub attribute: &'a str,
    /// The rule name that failed.
    pub rule: &'a str,
    /// Raw rule parameters.
    pub parameters: &'a [String],
}

/// Pass/fail check for an extension rule.
pub type CheckFn =
    Arc<dyn Fn(&CheckInput<'_>, &Validator) -> Result<bool, BoxError> + Send + Sync>;

/// Message provider for an extension rule, called only after its check failed.
pub type MessageFn =
    Arc<dyn Fn(&MessageRequest<'_>, &Validator) -> Result<Message, BoxError> + Send + Sync>;

/// Post-processor for an extension rule's message text.
pub type ReplacerFn = Arc<dyn Fn(&str, &ReplaceInput<'_>, &Validator) -> String + Send + Sync>;

/// The engine's extension registration surface.
pub trait ExtensionRegistrar {
    /// Associates `name` with a check and a message provider in `category`.
    fn register_check(
        &mut self,
        name: &str,
        category: CheckCategory,
        check: CheckFn,
        message: MessageFn,
    );

    /// Associates `name` with a message replacer, replacing any previous one.
    fn register_replacer(&mut self, name: &str, replacer: ReplacerFn);

    /// Drops every check, bucket membership and replacer registered as `name`.
    fn remove_check(&mut self, name: &str);
}

impl<T: ExtensionRegistrar + ?Sized> ExtensionRegistrar for &mut T {
    fn register_check(
        &mut self,
        name: &str,
        category: CheckCategory,
        check: CheckFn,
        message: MessageFn,
    ) {
        (**self).register_check(name, category, check, message);
    }

    fn register_replacer(&mut self, name: &str, replacer: ReplacerFn) {
        (**self).register_replacer(name, replacer);
    }

    fn remove_check(&mut self, name: &str) {
        (**self).remove_check(name);
    }
}

/// A registered check/message pair.
#[derive(Clone)]
pub(crate) struct Extension {
    pub(crate) check: CheckFn,
    pub(crate) message: MessageFn,
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension").finish_non_exhaustive()
    }
}
