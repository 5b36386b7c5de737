//! Boot-time wiring of the ruler into a host factory.

use std::collections::HashMap;
use std::sync::Arc;

use nebula_validation::{Dataset, EngineError, Factory, RuleSpec};
use tracing::debug;

use crate::config::RulerConfig;
use crate::contract::{Extension, FromParameters};
use crate::error::InvalidRuleError;
use crate::registry::{RuleDescriptor, RuleSet, Ruler};
use crate::view::{DeferredMessages, RulerValidator};

/// Collects the rules to register and the configuration to apply at boot.
///
/// Default rules register first, user rules after them; a user rule with the
/// same name replaces the default.
///
/// ```
/// use nebula_ruler::{RulerConfig, RulerProvider};
/// use nebula_validation::{Factory, dataset};
/// use serde_json::json;
///
/// let ruler = RulerProvider::new()
///     .with_config(RulerConfig::default().with_attribute("dob", "date of birth"))
///     .boot(Factory::new())
///     .unwrap();
///
/// let validator = ruler.make(dataset(json!({})), [("dob", "required")]).unwrap();
/// assert_eq!(
///     validator.first("dob").unwrap().as_deref(),
///     Some("The date of birth field is required.")
/// );
/// ```
#[derive(Debug, Default)]
pub struct RulerProvider {
    defaults: RuleSet,
    rules: RuleSet,
    config: RulerConfig,
}

impl RulerProvider {
    /// A provider with no rules and the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the default rule set.
    #[must_use]
    pub fn with_defaults(mut self, defaults: RuleSet) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: RulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a user rule under its derived name.
    #[must_use]
    pub fn rule<T>(mut self) -> Self
    where
        T: Extension + FromParameters + Default,
    {
        self.rules = self.rules.rule::<T>();
        self
    }

    /// Adds a user rule under `name`.
    #[must_use]
    pub fn named<T>(mut self, name: impl Into<String>) -> Self
    where
        T: Extension + FromParameters + Default,
    {
        self.rules = self.rules.named::<T>(name);
        self
    }

    /// Adds a batch of user rules.
    #[must_use]
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = self.rules.extend(rules);
        self
    }

    /// The configuration applied at boot.
    pub fn config(&self) -> &RulerConfig {
        &self.config
    }

    /// Installs deferred-message resolution on `factory`, applies the
    /// configuration and registers every rule.
    ///
    /// # Errors
    ///
    /// The first [`InvalidRuleError`]; the factory is dropped in that case.
    pub fn boot(self, mut factory: Factory) -> Result<RulerFactory, InvalidRuleError> {
        factory.set_session_hook(Arc::new(DeferredMessages));
        self.config.apply(&mut factory);

        let mut ruler = Ruler::new(factory);
        let mut descriptors = ruler.register_all(self.defaults)?;
        descriptors.extend(ruler.register_all(self.rules)?);

        debug!(
            rules = descriptors.len(),
            flatten_messages = self.config.flatten_messages,
            "ruler booted"
        );

        Ok(RulerFactory {
            descriptors,
            flatten: self.config.flatten_messages,
            factory: ruler.into_host(),
        })
    }
}

/// A booted host factory whose sessions come back as [`RulerValidator`]s.
#[derive(Debug, Clone)]
pub struct RulerFactory {
    factory: Factory,
    descriptors: Vec<RuleDescriptor>,
    flatten: bool,
}

impl RulerFactory {
    /// Creates a session for `data` with per-attribute `rules`.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidRuleString`] for malformed rule strings.
    pub fn make<I, K, R>(&self, data: Dataset, rules: I) -> Result<RulerValidator, EngineError>
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Into<RuleSpec>,
    {
        self.make_with(data, rules, HashMap::new(), HashMap::new())
    }

    /// Like [`make`](Self::make), with session-specific messages and
    /// attribute names.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidRuleString`] for malformed rule strings.
    pub fn make_with<I, K, R>(
        &self,
        data: Dataset,
        rules: I,
        messages: HashMap<String, String>,
        attributes: HashMap<String, String>,
    ) -> Result<RulerValidator, EngineError>
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Into<RuleSpec>,
    {
        let validator = self.factory.make_with(data, rules, messages, attributes)?;
        Ok(RulerValidator::new(validator).with_flatten(self.flatten))
    }

    /// Descriptors of every rule registered at boot, in registration order.
    ///
    /// A name registered twice appears twice; the later entry is active.
    pub fn descriptors(&self) -> &[RuleDescriptor] {
        &self.descriptors
    }

    /// The active descriptor for `name`.
    pub fn descriptor(&self, name: &str) -> Option<&RuleDescriptor> {
        self.descriptors.iter().rev().find(|d| d.name == name)
    }

    /// The underlying host factory.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Unwraps the host factory.
    pub fn into_factory(self) -> Factory {
        self.factory
    }
}
