//! Macros for declaring rule capabilities.

// ============================================================================
// EXTENSION MACRO
// ============================================================================

/// Implements [`Extension`](crate::Extension) for a rule type from the list of
/// contracts it implements.
///
/// Accepted contracts: `Rule`, `InvokableRule`, `DataAwareRule`,
/// `ImplicitRule`, `ValidatorAwareRule`, `ReplacerAwareRule`.
///
/// ```rust,ignore
/// extension!(BasicRule: Rule);
/// extension!(DependentRule: Rule, DataAwareRule);
///
/// // No contracts: registering it fails with `InvalidRuleError`.
/// extension!(NotARule);
/// ```
#[macro_export]
macro_rules! extension {
    // ── Accessors, one per contract ──────────────────────────────────────
    (@accessor Rule) => {
        fn as_rule(&mut self) -> ::core::option::Option<&mut dyn $crate::Rule> {
            ::core::option::Option::Some(self)
        }
    };
    (@accessor InvokableRule) => {
        fn as_invokable(&mut self) -> ::core::option::Option<&mut dyn $crate::InvokableRule> {
            ::core::option::Option::Some(self)
        }
    };
    (@accessor DataAwareRule) => {
        fn as_data_aware(&mut self) -> ::core::option::Option<&mut dyn $crate::DataAwareRule> {
            ::core::option::Option::Some(self)
        }
    };
    (@accessor ValidatorAwareRule) => {
        fn as_validator_aware(
            &mut self,
        ) -> ::core::option::Option<&mut dyn $crate::ValidatorAwareRule> {
            ::core::option::Option::Some(self)
        }
    };
    (@accessor ReplacerAwareRule) => {
        fn as_replacer_aware(&self) -> ::core::option::Option<&dyn $crate::ReplacerAwareRule> {
            ::core::option::Option::Some(self)
        }
    };
    (@accessor ImplicitRule) => {
        fn as_implicit(&self) -> ::core::option::Option<&dyn $crate::ImplicitRule> {
            ::core::option::Option::Some(self)
        }
    };

    // ── Entry point ──────────────────────────────────────────────────────
    ($ty:ty $(: $($contract:ident),+ $(,)?)?) => {
        impl $crate::Extension for $ty {
            $($($crate::extension!(@accessor $contract);)+)?
        }
    };
}
