//! Error types for rule registration, construction and message lookup.

use crate::capability::Capabilities;

/// Raised at registration time when an implementation satisfies none of the
/// entry capabilities ([`Capabilities::ENTRY`]).
///
/// This is a configuration defect: it is surfaced to the caller immediately
/// and nothing is registered with the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation rule '{rule}' should implement one of: {}", .acceptable.contract_names().join(", "))]
pub struct InvalidRuleError {
    /// The resolved rule name.
    pub rule: String,
    /// Capabilities of which at least one is required.
    pub acceptable: Capabilities,
}

impl InvalidRuleError {
    pub(crate) fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            acceptable: Capabilities::ENTRY,
        }
    }
}

/// Building a rule instance from its invocation parameters failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    /// A positional parameter the rule needs was not supplied.
    #[error("missing rule parameter at position {index}")]
    Missing {
        /// Zero-based position.
        index: usize,
    },

    /// A positional parameter could not be parsed.
    #[error("invalid rule parameter at position {index} ({value:?}): {reason}")]
    Invalid {
        /// Zero-based position.
        index: usize,
        /// The raw parameter.
        value: String,
        /// Parser error text.
        reason: String,
    },
}

/// The message hook could not find the instance its check produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// No instance of the implementation was checked against the attribute in
    /// this session.
    #[error("no tracked instance of {implementation} for attribute '{attribute}'")]
    NoInstance {
        /// Type name of the implementation.
        implementation: &'static str,
        /// The attribute whose message was requested.
        attribute: String,
    },

    /// The tracked instance does not expose a message.
    #[error("tracked instance of {implementation} does not implement Rule")]
    NotARule {
        /// Type name of the implementation.
        implementation: &'static str,
    },
}

/// Loading a [`RulerConfig`](crate::RulerConfig) failed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON for the config shape.
    #[error("invalid ruler config: {0}")]
    Json(#[from] serde_json::Error),
}
