//! Rule implementations: identity, probe instance and per-invocation builder.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use heck::ToSnakeCase;

use crate::contract::{Extension, FromParameters};
use crate::error::ParameterError;
use crate::parameters::Parameters;
use crate::replacer::ReplacerSpec;

/// Identity of a rule implementation type.
///
/// Equality and hashing use the [`TypeId`]; the type name is kept for
/// diagnostics and name derivation.
#[derive(Clone, Copy)]
pub struct ImplementationId {
    type_id: TypeId,
    type_name: &'static str,
}

impl ImplementationId {
    /// Identity of `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Fully qualified type name.
    pub fn type_name(self) -> &'static str {
        self.type_name
    }

    /// Type name without module path or generic arguments.
    pub fn basename(self) -> &'static str {
        let name = self
            .type_name
            .split_once('<')
            .map_or(self.type_name, |(head, _)| head);
        name.rsplit("::").next().unwrap_or(name)
    }

    /// The snake-cased basename, used when a rule is registered without a name.
    pub fn default_rule_name(self) -> String {
        self.basename().to_snake_case()
    }
}

impl PartialEq for ImplementationId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ImplementationId {}

impl Hash for ImplementationId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ImplementationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImplementationId").field(&self.type_name).finish()
    }
}

impl fmt::Display for ImplementationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Builds a fresh boxed instance for one invocation.
pub type Build =
    Arc<dyn Fn(&Parameters) -> Result<Box<dyn Extension>, ParameterError> + Send + Sync>;

/// A rule type ready for registration.
///
/// The probe instance is only inspected: its capabilities decide the host
/// registrations and its replacers are declared once. Every check invocation
/// builds a new instance from that invocation's parameters.
pub struct RuleImplementation {
    id: ImplementationId,
    probe: Box<dyn Extension>,
    build: Build,
}

impl RuleImplementation {
    /// Uses `T::default()` as the probe.
    pub fn of<T>() -> Self
    where
        T: Extension + FromParameters + Default,
    {
        Self::instance(T::default())
    }

    /// Uses a pre-built instance as the probe.
    pub fn instance<T>(probe: T) -> Self
    where
        T: Extension + FromParameters,
    {
        Self {
            id: ImplementationId::of::<T>(),
            probe: Box::new(probe),
            build: Arc::new(|parameters: &Parameters| {
                let instance = T::from_parameters(parameters)?;
                Ok::<Box<dyn Extension>, ParameterError>(Box::new(instance))
            }),
        }
    }

    /// The implementation identity.
    pub fn id(&self) -> ImplementationId {
        self.id
    }

    /// See [`ImplementationId::default_rule_name`].
    pub fn default_rule_name(&self) -> String {
        self.id.default_rule_name()
    }

    /// Builds an instance for one invocation.
    ///
    /// # Errors
    ///
    /// Whatever [`FromParameters::from_parameters`] reports.
    pub fn build(&self, parameters: &Parameters) -> Result<Box<dyn Extension>, ParameterError> {
        (self.build)(parameters)
    }

    /// The replacers declared by the probe, if it is replacer-aware.
    pub fn replacers(&self) -> Option<ReplacerSpec> {
        self.probe
            .as_replacer_aware()
            .map(|aware| aware.replacers())
    }

    pub(crate) fn probe_mut(&mut self) -> &mut dyn Extension {
        self.probe.as_mut()
    }

    pub(crate) fn builder(&self) -> Build {
        Arc::clone(&self.build)
    }
}

impl fmt::Debug for RuleImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleImplementation")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct BasicRule;
    struct Wrapper<T>(std::marker::PhantomData<T>);
    struct HTTPHeaderRule;

    #[rstest]
    #[case(ImplementationId::of::<BasicRule>(), "BasicRule", "basic_rule")]
    #[case(ImplementationId::of::<Wrapper<BasicRule>>(), "Wrapper", "wrapper")]
    #[case(ImplementationId::of::<HTTPHeaderRule>(), "HTTPHeaderRule", "http_header_rule")]
    fn derived_names(
        #[case] id: ImplementationId,
        #[case] basename: &str,
        #[case] rule_name: &str,
    ) {
        assert_eq!(id.basename(), basename);
        assert_eq!(id.default_rule_name(), rule_name);
    }

    #[test]
    fn identity_is_by_type() {
        assert_eq!(ImplementationId::of::<BasicRule>(), ImplementationId::of::<BasicRule>());
        assert_ne!(
            ImplementationId::of::<BasicRule>(),
            ImplementationId::of::<HTTPHeaderRule>()
        );
    }
}
