//! Rule capability contracts.
//!
//! A rule type implements [`Rule`] or [`InvokableRule`] (the entry
//! contracts) and any number of the additive ones: [`DataAwareRule`],
//! [`ImplicitRule`], [`ValidatorAwareRule`] and [`ReplacerAwareRule`].
//!
//! Which contracts a type satisfies is exposed through [`Extension`], usually
//! implemented with the [`extension!`](crate::extension) macro:
//!
//! ```
//! use nebula_ruler::prelude::*;
//! use serde_json::Value;
//!
//! #[derive(Default)]
//! struct Lowercase;
//!
//! impl Rule for Lowercase {
//!     fn passes(&mut self, _attribute: &str, value: &Value) -> bool {
//!         value.as_str().is_some_and(|s| s == s.to_lowercase())
//!     }
//!
//!     fn message(&self) -> Message {
//!         "The :attribute must be lowercase.".into()
//!     }
//! }
//!
//! impl FromParameters for Lowercase {
//!     fn from_parameters(_: &Parameters) -> Result<Self, ParameterError> {
//!         Ok(Self)
//!     }
//! }
//!
//! extension!(Lowercase: Rule);
//! ```

use nebula_validation::{Dataset, Message, SessionHandle};
use serde_json::Value;

use crate::error::ParameterError;
use crate::parameters::Parameters;
use crate::replacer::ReplacerSpec;

/// Basic rule: a pass/fail check plus the message reported on failure.
pub trait Rule {
    /// Whether `value` satisfies the rule.
    fn passes(&mut self, attribute: &str, value: &Value) -> bool;

    /// The failure message. Only requested after [`passes`](Self::passes)
    /// returned `false` on this same instance.
    fn message(&self) -> Message;
}

/// Rule checked through a failure callback instead of a boolean.
///
/// Not calling [`Fail::fail`] means the value passes.
pub trait InvokableRule {
    /// Checks `value`, reporting failures through `fail`.
    fn invoke(&mut self, attribute: &str, value: &Value, fail: &mut Fail);
}

/// Receives the failures of an [`InvokableRule`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Fail {
    failed: bool,
    messages: Vec<String>,
}

impl Fail {
    /// Fails with `text` as the message.
    pub fn fail(&mut self, text: impl Into<String>) {
        self.failed = true;
        self.messages.push(text.into());
    }

    /// Fails without a message of its own.
    pub fn fail_silently(&mut self) {
        self.failed = true;
    }

    /// Whether any failure was reported.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Failure texts in reporting order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Receives the full dataset before the check runs.
pub trait DataAwareRule {
    /// Stores the dataset under validation.
    fn set_data(&mut self, data: &Dataset);
}

/// Marker: the rule also runs when the attribute is missing or empty.
pub trait ImplicitRule {}

/// Receives a handle to the active validation session before the check runs.
pub trait ValidatorAwareRule {
    /// Stores the session handle.
    fn set_validator(&mut self, validator: SessionHandle);
}

/// Declares labels for the rule's positional parameters.
pub trait ReplacerAwareRule {
    /// Labels (and optional transforms) by parameter position.
    fn replacers(&self) -> ReplacerSpec;
}

/// Builds a rule instance from one invocation's parameters.
pub trait FromParameters: Sized {
    /// Constructs the instance.
    ///
    /// # Errors
    ///
    /// A [`ParameterError`] when a required parameter is missing or malformed;
    /// it is reported to the host as a check error.
    fn from_parameters(parameters: &Parameters) -> Result<Self, ParameterError>;
}

/// The contracts a rule type satisfies.
///
/// Every accessor returns `None` unless overridden. The
/// [`extension!`](crate::extension) macro overrides the accessors of the
/// contracts it is given.
pub trait Extension: Send + 'static {
    /// The [`Rule`] view.
    fn as_rule(&mut self) -> Option<&mut dyn Rule> {
        None
    }

    /// The [`InvokableRule`] view.
    fn as_invokable(&mut self) -> Option<&mut dyn InvokableRule> {
        None
    }

    /// The [`DataAwareRule`] view.
    fn as_data_aware(&mut self) -> Option<&mut dyn DataAwareRule> {
        None
    }

    /// The [`ValidatorAwareRule`] view.
    fn as_validator_aware(&mut self) -> Option<&mut dyn ValidatorAwareRule> {
        None
    }

    /// The [`ReplacerAwareRule`] view.
    fn as_replacer_aware(&self) -> Option<&dyn ReplacerAwareRule> {
        None
    }

    /// The [`ImplicitRule`] marker.
    fn as_implicit(&self) -> Option<&dyn ImplicitRule> {
        None
    }
}
