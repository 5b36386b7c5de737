//! Engine error types.

use crate::bag::MessageBag;

/// Boxed error raised by a rule extension's check or message hook.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while evaluating a validation session.
///
/// Ordinary validation failures are *not* errors: they end up in the
/// [`MessageBag`]. These variants describe defects in the rule table or in
/// extension code.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The rule name is neither built in nor registered as an extension.
    #[error("validation rule '{rule}' does not exist")]
    UnknownRule {
        /// The unknown rule name.
        rule: String,
    },

    /// A rule string could not be parsed.
    #[error("invalid rule string: {input:?}")]
    InvalidRuleString {
        /// The offending input.
        input: String,
    },

    /// An extension check raised an error.
    #[error("rule '{rule}' failed to check attribute '{attribute}': {source}")]
    Check {
        /// The rule name.
        rule: String,
        /// The attribute under validation.
        attribute: String,
        /// The error raised by the extension, untouched.
        #[source]
        source: BoxError,
    },

    /// An extension message provider raised an error.
    #[error("rule '{rule}' failed to produce a message for attribute '{attribute}': {source}")]
    Message {
        /// The rule name.
        rule: String,
        /// The attribute under validation.
        attribute: String,
        /// The error raised by the extension, untouched.
        #[source]
        source: BoxError,
    },

    /// A deferred message reached the bag without a session hook to resolve it.
    #[error("deferred message for rule '{rule}' on '{attribute}' was never resolved")]
    UnresolvedMessage {
        /// The rule name.
        rule: String,
        /// The attribute under validation.
        attribute: String,
    },
}

impl EngineError {
    /// Returns the rule name this error belongs to, if any.
    pub fn rule(&self) -> Option<&str> {
        match self {
            Self::UnknownRule { rule }
            | Self::Check { rule, .. }
            | Self::Message { rule, .. }
            | Self::UnresolvedMessage { rule, .. } => Some(rule.as_str()),
            Self::InvalidRuleString { .. } => None,
        }
    }
}

/// Returned by [`Validator::validate`](crate::Validator::validate) when at
/// least one attribute failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("the given data was invalid ({} attribute(s) failed)", .messages.len())]
pub struct ValidationFailed {
    /// The collected messages.
    pub messages: MessageBag,
}

/// Outcome of [`Validator::validate`](crate::Validator::validate).
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    /// The data did not satisfy the rules.
    #[error(transparent)]
    Failed(#[from] ValidationFailed),

    /// The rule table or an extension is defective.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rule_display() {
        let err = EngineError::UnknownRule {
            rule: "nope".into(),
        };
        assert_eq!(err.to_string(), "validation rule 'nope' does not exist");
        assert_eq!(err.rule(), Some("nope"));
    }

    #[test]
    fn check_error_keeps_source() {
        let source: BoxError = "boom".into();
        let err = EngineError::Check {
            rule: "custom".into(),
            attribute: "name".into(),
            source,
        };
        let inner = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(inner.as_deref(), Some("boom"));
    }
}
