//! Prelude module for convenient imports.
//!
//! `use nebula_ruler::prelude::*;` brings in the rule contracts, the
//! registration types and the message types rule authors return.

// ============================================================================
// CONTRACTS
// ============================================================================

pub use crate::contract::{
    DataAwareRule, Extension, Fail, FromParameters, ImplicitRule, InvokableRule,
    ReplacerAwareRule, Rule, ValidatorAwareRule,
};
pub use crate::extension;

// ============================================================================
// CONSTRUCTION AND REGISTRATION
// ============================================================================

pub use crate::error::{InvalidRuleError, ParameterError};
pub use crate::implementation::RuleImplementation;
pub use crate::parameters::Parameters;
pub use crate::provider::{RulerFactory, RulerProvider};
pub use crate::registry::{RuleSet, Ruler};
pub use crate::replacer::ReplacerSpec;

// ============================================================================
// MESSAGES AND SESSIONS
// ============================================================================

pub use crate::view::RulerValidator;
pub use nebula_validation::{Dataset, Message, SessionHandle};
