//! # nebula-ruler
//!
//! Stateful rule objects for the `nebula-validation` engine.
//!
//! The engine only knows named check functions and message providers, called
//! as two separate callbacks. This crate lets a rule be a type instead: one
//! instance is built per check invocation from the rule's parameters, and the
//! message provider reads back that same instance, so a rule can compute its
//! message while checking.
//!
//! ## Writing rules
//!
//! Implement [`Rule`] or [`InvokableRule`], optionally the additive
//! contracts ([`DataAwareRule`], [`ImplicitRule`], [`ValidatorAwareRule`],
//! [`ReplacerAwareRule`]), [`FromParameters`] for construction, and declare
//! the set with [`extension!`].
//!
//! ## Registering
//!
//! [`Ruler::register`] classifies the type and registers it once per host
//! bucket it belongs to. [`RulerProvider`] wraps the boot sequence: deferred
//! message resolution, configuration, default and user rules.
//!
//! ## Messages
//!
//! Message templates address rule parameters as `:0`, `:1`, ... or by the
//! labels a [`ReplacerAwareRule`] declares; see [`replacer`].
//! [`RulerValidator`] flattens multi-text messages per attribute.

pub mod adapter;
pub mod capability;
pub mod config;
pub mod contract;
pub mod error;
pub mod implementation;
mod macros;
pub mod parameters;
pub mod prelude;
pub mod provider;
pub mod registry;
pub mod replacer;
pub mod tracker;
pub mod view;

pub use adapter::InvokableAdapter;
pub use capability::{Capabilities, Capability, classify};
pub use config::RulerConfig;
pub use contract::{
    DataAwareRule, Extension, Fail, FromParameters, ImplicitRule, InvokableRule,
    ReplacerAwareRule, Rule, ValidatorAwareRule,
};
pub use error::{ConfigError, InvalidRuleError, ParameterError, TrackerError};
pub use implementation::{ImplementationId, RuleImplementation};
pub use parameters::Parameters;
pub use provider::{RulerFactory, RulerProvider};
pub use registry::{RuleDescriptor, RuleSet, Ruler};
pub use replacer::{Replacer, ReplacerSpec, Transform};
pub use tracker::InstanceTracker;
pub use view::{DeferredMessages, FlatMessages, RulerValidator};
