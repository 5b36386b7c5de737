//! Rule registration and capability dispatch.
//!
//! [`Ruler::register`] classifies a rule implementation and issues one host
//! check/message pair per matching bucket (data-aware, implicit, basic) plus
//! one replacer, all under the same rule name.
//!
//! At validation time every check invocation:
//!
//! 1. builds a fresh instance from the invocation's parameters,
//! 2. wraps it in an [`InvokableAdapter`] if it is invokable but not basic,
//! 3. records it in the session's [`InstanceTracker`],
//! 4. injects the dataset if it is data-aware,
//! 5. injects a session handle if it is validator-aware,
//! 6. runs the pass/fail check.
//!
//! The message provider closes over the implementation identity only and
//! reads the recorded instance back.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use nebula_validation::{
    BoxError, CheckCategory, CheckFn, CheckInput, ExtensionRegistrar, MessageFn, MessageRequest,
    ReplaceInput, ReplacerFn, Validator, is_builtin_rule,
};
use tracing::{debug, trace, warn};

use crate::adapter::InvokableAdapter;
use crate::capability::{Capabilities, classify};
use crate::contract::{Extension, FromParameters};
use crate::error::InvalidRuleError;
use crate::implementation::{Build, ImplementationId, RuleImplementation};
use crate::parameters::Parameters;
use crate::replacer::{self, ReplacerSpec};
use crate::tracker::with_tracker;

/// What a registration produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDescriptor {
    /// The rule name used in rule strings.
    pub name: String,
    /// The implementation type.
    pub implementation: ImplementationId,
    /// Capabilities found on the probe instance.
    pub capabilities: Capabilities,
}

impl RuleDescriptor {
    /// The host buckets this rule was registered in, in dispatch order.
    pub fn categories(&self) -> Vec<CheckCategory> {
        self.capabilities.registrations()
    }
}

/// Registers rule implementations with a host [`ExtensionRegistrar`].
///
/// ```
/// use nebula_ruler::prelude::*;
/// use nebula_validation::{Factory, dataset};
/// use serde_json::{Value, json};
///
/// #[derive(Default)]
/// struct Even;
///
/// impl Rule for Even {
///     fn passes(&mut self, _: &str, value: &Value) -> bool {
///         value.as_i64().is_some_and(|n| n % 2 == 0)
///     }
///
///     fn message(&self) -> Message {
///         "The :attribute must be even.".into()
///     }
/// }
///
/// impl FromParameters for Even {
///     fn from_parameters(_: &Parameters) -> Result<Self, ParameterError> {
///         Ok(Self)
///     }
/// }
///
/// extension!(Even: Rule);
///
/// let mut ruler = Ruler::new(Factory::new());
/// let descriptor = ruler.register(RuleImplementation::of::<Even>(), None).unwrap();
/// assert_eq!(descriptor.name, "even");
///
/// let validator = ruler
///     .host()
///     .make(dataset(json!({"count": 3})), [("count", "even")])
///     .unwrap();
/// assert_eq!(
///     validator.errors().unwrap().first("count"),
///     Some("The count must be even.")
/// );
/// ```
pub struct Ruler<H> {
    host: H,
    descriptors: IndexMap<String, RuleDescriptor>,
}

impl<H: ExtensionRegistrar> Ruler<H> {
    /// Wraps a host registrar.
    pub fn new(host: H) -> Self {
        Self {
            host,
            descriptors: IndexMap::new(),
        }
    }

    /// Registers `implementation` as `name`, or as its derived name when
    /// `name` is `None`.
    ///
    /// Registering again under the same name replaces the previous
    /// registration, including the host buckets it was in; registering under
    /// another name adds an independent one.
    ///
    /// # Errors
    ///
    /// [`InvalidRuleError`] when the implementation is neither a
    /// [`Rule`](crate::Rule) nor an [`InvokableRule`](crate::InvokableRule).
    /// Nothing is registered in that case.
    pub fn register(
        &mut self,
        mut implementation: RuleImplementation,
        name: Option<&str>,
    ) -> Result<RuleDescriptor, InvalidRuleError> {
        let name = name.map_or_else(|| implementation.default_rule_name(), str::to_owned);
        let capabilities = classify(implementation.probe_mut());
        if !capabilities.is_registrable() {
            return Err(InvalidRuleError::new(name));
        }

        let id = implementation.id();
        let replacers = implementation.replacers();
        debug!(
            rule = %name,
            implementation = %id,
            capabilities = ?capabilities,
            "registering rule"
        );
        if is_builtin_rule(&name) {
            warn!(rule = %name, "rule name shadows a built-in and will never run");
        }

        self.host.remove_check(&name);

        for category in capabilities.registrations() {
            debug!(rule = %name, %category, "registering check");
            self.host.register_check(
                &name,
                category,
                check_fn(&name, id, implementation.builder(), capabilities),
                message_fn(id),
            );
        }
        self.host.register_replacer(&name, replacer_fn(replacers));

        let descriptor = RuleDescriptor {
            name: name.clone(),
            implementation: id,
            capabilities,
        };
        self.descriptors.insert(name, descriptor.clone());
        Ok(descriptor)
    }

    /// Registers every entry of `rules`; unnamed entries derive their name.
    ///
    /// # Errors
    ///
    /// Stops at the first [`InvalidRuleError`]; earlier entries stay
    /// registered.
    pub fn register_all<I, N>(&mut self, rules: I) -> Result<Vec<RuleDescriptor>, InvalidRuleError>
    where
        I: IntoIterator<Item = (Option<N>, RuleImplementation)>,
        N: AsRef<str>,
    {
        rules
            .into_iter()
            .map(|(name, implementation)| {
                let name: Option<&str> = name.as_ref().map(AsRef::as_ref);
                self.register(implementation, name)
            })
            .collect()
    }

    /// Descriptors of every registered rule, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.descriptors.values()
    }

    /// The descriptor registered under `name`.
    pub fn descriptor(&self, name: &str) -> Option<&RuleDescriptor> {
        self.descriptors.get(name)
    }

    /// The host registrar.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host registrar, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consumes the ruler, returning the host registrar.
    pub fn into_host(self) -> H {
        self.host
    }
}

impl<H> fmt::Debug for Ruler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ruler")
            .field("rules", &self.descriptors.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn check_fn(
    rule: &str,
    id: ImplementationId,
    build: Build,
    capabilities: Capabilities,
) -> CheckFn {
    let rule = rule.to_owned();
    let adapt = capabilities.needs_adapter();

    Arc::new(move |input: &CheckInput<'_>, validator: &Validator| -> Result<bool, BoxError> {
        let parameters = Parameters::from(input.parameters);
        let mut instance = build(&parameters)?;
        if adapt {
            instance = Box::new(InvokableAdapter::new(instance, rule.as_str()));
        }

        trace!(
            session = %validator.id(),
            rule = %rule,
            attribute = input.attribute,
            "checking rule instance"
        );

        with_tracker(validator, |tracker| {
            let instance = tracker.record(id, input.attribute, instance);
            evaluate(instance, input, validator)
        })
        .ok_or_else(|| BoxError::from(format!("rule '{rule}' has no pass/fail check")))
    })
}

fn evaluate(
    instance: &mut dyn Extension,
    input: &CheckInput<'_>,
    validator: &Validator,
) -> Option<bool> {
    if let Some(aware) = instance.as_data_aware() {
        aware.set_data(validator.data());
    }
    if let Some(aware) = instance.as_validator_aware() {
        aware.set_validator(validator.handle());
    }
    instance
        .as_rule()
        .map(|rule| rule.passes(input.attribute, input.value))
}

fn message_fn(id: ImplementationId) -> MessageFn {
    Arc::new(move |request: &MessageRequest<'_>, validator: &Validator| {
        trace!(
            session = %validator.id(),
            rule = request.rule,
            attribute = request.attribute,
            "reading tracked message"
        );
        with_tracker(validator, |tracker| tracker.message_for(id, request.attribute))
            .map_err(BoxError::from)
    })
}

fn replacer_fn(spec: Option<ReplacerSpec>) -> ReplacerFn {
    Arc::new(move |message: &str, input: &ReplaceInput<'_>, validator: &Validator| {
        replacer::resolve(
            message,
            spec.as_ref(),
            input.parameters,
            input.attribute,
            validator.data(),
        )
    })
}

/// An ordered bulk-registration list: optional name to implementation.
#[derive(Debug, Default)]
pub struct RuleSet {
    entries: Vec<(Option<String>, RuleImplementation)>,
}

impl RuleSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `T` under its derived name.
    #[must_use]
    pub fn rule<T>(self) -> Self
    where
        T: Extension + FromParameters + Default,
    {
        self.push(None, RuleImplementation::of::<T>())
    }

    /// Adds `T` under `name`.
    #[must_use]
    pub fn named<T>(self, name: impl Into<String>) -> Self
    where
        T: Extension + FromParameters + Default,
    {
        self.push(Some(name.into()), RuleImplementation::of::<T>())
    }

    /// Adds a pre-built instance under its derived name.
    #[must_use]
    pub fn instance<T>(self, instance: T) -> Self
    where
        T: Extension + FromParameters,
    {
        self.push(None, RuleImplementation::instance(instance))
    }

    /// Adds a pre-built instance under `name`.
    #[must_use]
    pub fn named_instance<T>(self, name: impl Into<String>, instance: T) -> Self
    where
        T: Extension + FromParameters,
    {
        self.push(Some(name.into()), RuleImplementation::instance(instance))
    }

    /// Adds an entry.
    #[must_use]
    pub fn push(mut self, name: Option<String>, implementation: RuleImplementation) -> Self {
        self.entries.push((name, implementation));
        self
    }

    /// Appends every entry of `other`.
    #[must_use]
    pub fn extend(mut self, other: Self) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for RuleSet {
    type Item = (Option<String>, RuleImplementation);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

