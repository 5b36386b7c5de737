//! Capability classification.
//!
//! A rule type's capabilities are read off its [`Extension`] accessors, never
//! its name. Each capability maps to at most one host registration bucket;
//! [`Capabilities::registrations`] gives the buckets in dispatch order.

use std::fmt;

use nebula_validation::CheckCategory;

use crate::contract::Extension;

/// One contract a rule implementation may satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Implements [`Rule`](crate::Rule).
    Basic,
    /// Implements [`DataAwareRule`](crate::DataAwareRule).
    DataAware,
    /// Implements [`ImplicitRule`](crate::ImplicitRule).
    Implicit,
    /// Implements [`InvokableRule`](crate::InvokableRule).
    Invokable,
    /// Implements [`ValidatorAwareRule`](crate::ValidatorAwareRule).
    ValidatorAware,
    /// Implements [`ReplacerAwareRule`](crate::ReplacerAwareRule).
    ReplacerAware,
}

impl Capability {
    /// Every capability, in flag order.
    pub const ALL: [Self; 6] = [
        Self::Basic,
        Self::DataAware,
        Self::Implicit,
        Self::Invokable,
        Self::ValidatorAware,
        Self::ReplacerAware,
    ];

    /// Returns the flag for this capability.
    pub const fn as_set(self) -> Capabilities {
        match self {
            Self::Basic => Capabilities::BASIC,
            Self::DataAware => Capabilities::DATA_AWARE,
            Self::Implicit => Capabilities::IMPLICIT,
            Self::Invokable => Capabilities::INVOKABLE,
            Self::ValidatorAware => Capabilities::VALIDATOR_AWARE,
            Self::ReplacerAware => Capabilities::REPLACER_AWARE,
        }
    }

    /// Name of the contract trait.
    pub const fn contract_name(self) -> &'static str {
        match self {
            Self::Basic => "Rule",
            Self::DataAware => "DataAwareRule",
            Self::Implicit => "ImplicitRule",
            Self::Invokable => "InvokableRule",
            Self::ValidatorAware => "ValidatorAwareRule",
            Self::ReplacerAware => "ReplacerAwareRule",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.contract_name())
    }
}

bitflags::bitflags! {
    /// A set of rule capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        /// Pass/fail check with a message.
        const BASIC = 1 << 0;
        /// Receives the dataset.
        const DATA_AWARE = 1 << 1;
        /// Runs on missing or empty attributes.
        const IMPLICIT = 1 << 2;
        /// Failure-callback check.
        const INVOKABLE = 1 << 3;
        /// Receives the session handle.
        const VALIDATOR_AWARE = 1 << 4;
        /// Declares parameter labels.
        const REPLACER_AWARE = 1 << 5;
    }
}

impl Capabilities {
    /// At least one of these is required for registration.
    pub const ENTRY: Self = Self::BASIC.union(Self::INVOKABLE);

    /// Whether the set satisfies an entry capability.
    pub const fn is_registrable(self) -> bool {
        self.intersects(Self::ENTRY)
    }

    /// Invokable rules without a basic check go through the adapter.
    pub const fn needs_adapter(self) -> bool {
        self.contains(Self::INVOKABLE) && !self.contains(Self::BASIC)
    }

    /// The capabilities in the set, in flag order.
    pub fn capabilities(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.contains(capability.as_set()))
    }

    /// Contract trait names of the capabilities in the set.
    pub fn contract_names(self) -> Vec<&'static str> {
        self.capabilities().map(Capability::contract_name).collect()
    }

    /// Host buckets to register in, in dispatch order: data-aware, implicit,
    /// basic. Basic and invokable share the basic bucket and register it once.
    pub fn registrations(self) -> Vec<CheckCategory> {
        if !self.is_registrable() {
            return Vec::new();
        }

        let mut categories = Vec::with_capacity(3);
        if self.contains(Self::DATA_AWARE) {
            categories.push(CheckCategory::DataAware);
        }
        if self.contains(Self::IMPLICIT) {
            categories.push(CheckCategory::Implicit);
        }
        categories.push(CheckCategory::Basic);
        categories
    }
}

impl From<Capability> for Capabilities {
    fn from(capability: Capability) -> Self {
        capability.as_set()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, capability| set | capability.as_set())
    }
}

/// Determines the capabilities `extension` satisfies.
pub fn classify(extension: &mut dyn Extension) -> Capabilities {
    let mut set = Capabilities::empty();
    set.set(Capabilities::BASIC, extension.as_rule().is_some());
    set.set(Capabilities::INVOKABLE, extension.as_invokable().is_some());
    set.set(Capabilities::DATA_AWARE, extension.as_data_aware().is_some());
    set.set(
        Capabilities::VALIDATOR_AWARE,
        extension.as_validator_aware().is_some(),
    );
    set.set(
        Capabilities::REPLACER_AWARE,
        extension.as_replacer_aware().is_some(),
    );
    set.set(Capabilities::IMPLICIT, extension.as_implicit().is_some());
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Capabilities::BASIC, vec![CheckCategory::Basic])]
    #[case(Capabilities::INVOKABLE, vec![CheckCategory::Basic])]
    #[case(Capabilities::BASIC | Capabilities::INVOKABLE, vec![CheckCategory::Basic])]
    #[case(
        Capabilities::BASIC | Capabilities::DATA_AWARE,
        vec![CheckCategory::DataAware, CheckCategory::Basic]
    )]
    #[case(
        Capabilities::BASIC | Capabilities::IMPLICIT | Capabilities::DATA_AWARE,
        vec![CheckCategory::DataAware, CheckCategory::Implicit, CheckCategory::Basic]
    )]
    #[case(Capabilities::BASIC | Capabilities::REPLACER_AWARE, vec![CheckCategory::Basic])]
    #[case(Capabilities::DATA_AWARE | Capabilities::IMPLICIT, vec![])]
    fn registrations_follow_dispatch_order(
        #[case] set: Capabilities,
        #[case] expected: Vec<CheckCategory>,
    ) {
        assert_eq!(set.registrations(), expected);
    }

    #[test]
    fn entry_contracts() {
        assert_eq!(Capabilities::ENTRY.contract_names(), ["Rule", "InvokableRule"]);
        assert!(Capabilities::INVOKABLE.is_registrable());
        assert!(!Capabilities::VALIDATOR_AWARE.is_registrable());
        assert!(Capabilities::INVOKABLE.needs_adapter());
        assert!(!(Capabilities::INVOKABLE | Capabilities::BASIC).needs_adapter());
    }

    #[test]
    fn collects_from_capabilities() {
        let set: Capabilities = [Capability::Basic, Capability::Implicit].into_iter().collect();
        assert_eq!(set, Capabilities::BASIC | Capabilities::IMPLICIT);
        assert_eq!(
            set.capabilities().collect::<Vec<_>>(),
            [Capability::Basic, Capability::Implicit]
        );
    }
}
