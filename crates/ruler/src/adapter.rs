//! Basic-rule view of an invokable rule.

use nebula_validation::Message;
use serde_json::Value;

use crate::contract::{
    DataAwareRule, Extension, Fail, ImplicitRule, InvokableRule, ReplacerAwareRule, Rule,
    ValidatorAwareRule,
};

/// Exposes an [`InvokableRule`] through the [`Rule`] shape.
///
/// A call to [`Fail::fail`] makes the check fail with that text as the
/// message; no call means it passes. A silent failure reports the host's
/// `validation.<rule>` key. Every other capability accessor is forwarded to
/// the wrapped instance so data and session injection still reach it.
pub struct InvokableAdapter {
    inner: Box<dyn Extension>,
    rule: String,
    outcome: Fail,
}

impl InvokableAdapter {
    /// Wraps `inner`, registered as `rule`.
    pub fn new(inner: Box<dyn Extension>, rule: impl Into<String>) -> Self {
        Self {
            inner,
            rule: rule.into(),
            outcome: Fail::default(),
        }
    }

    /// The wrapped instance.
    pub fn inner(&self) -> &dyn Extension {
        self.inner.as_ref()
    }

    /// Failures reported by the last check.
    pub fn outcome(&self) -> &Fail {
        &self.outcome
    }
}

impl Rule for InvokableAdapter {
    fn passes(&mut self, attribute: &str, value: &Value) -> bool {
        let mut fail = Fail::default();
        if let Some(rule) = self.inner.as_invokable() {
            rule.invoke(attribute, value, &mut fail);
        }
        let passed = !fail.failed();
        self.outcome = fail;
        passed
    }

    fn message(&self) -> Message {
        match self.outcome.messages() {
            [] => Message::Text(format!("validation.{}", self.rule)),
            [text] => Message::Text(text.clone()),
            texts => Message::List(texts.to_vec()),
        }
    }
}

impl Extension for InvokableAdapter {
    fn as_rule(&mut self) -> Option<&mut dyn Rule> {
        Some(self)
    }

    fn as_invokable(&mut self) -> Option<&mut dyn InvokableRule> {
        self.inner.as_invokable()
    }

    fn as_data_aware(&mut self) -> Option<&mut dyn DataAwareRule> {
        self.inner.as_data_aware()
    }

    fn as_validator_aware(&mut self) -> Option<&mut dyn ValidatorAwareRule> {
        self.inner.as_validator_aware()
    }

    fn as_replacer_aware(&self) -> Option<&dyn ReplacerAwareRule> {
        self.inner.as_replacer_aware()
    }

    fn as_implicit(&self) -> Option<&dyn ImplicitRule> {
        self.inner.as_implicit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_validation::Dataset;
    use rstest::rstest;

    #[derive(Default)]
    struct Flaky {
        reasons: Vec<&'static str>,
        silent: bool,
    }

    impl InvokableRule for Flaky {
        fn invoke(&mut self, _: &str, _: &Value, fail: &mut Fail) {
            for reason in &self.reasons {
                fail.fail(*reason);
            }
            if self.silent {
                fail.fail_silently();
            }
        }
    }

    impl DataAwareRule for Flaky {
        fn set_data(&mut self, _: &Dataset) {}
    }

    crate::extension!(Flaky: InvokableRule, DataAwareRule);

    fn adapter(reasons: Vec<&'static str>, silent: bool) -> InvokableAdapter {
        InvokableAdapter::new(Box::new(Flaky { reasons, silent }), "flaky")
    }

    #[rstest]
    #[case(vec![], false, true, None)]
    #[case(vec!["shouldFail"], false, false, Some("shouldFail"))]
    #[case(vec![], true, false, Some("validation.flaky"))]
    #[case(vec!["a", "b"], false, false, Some("a"))]
    fn outcome(
        #[case] reasons: Vec<&'static str>,
        #[case] silent: bool,
        #[case] passes: bool,
        #[case] first: Option<&str>,
    ) {
        let mut rule = adapter(reasons, silent);
        assert_eq!(rule.passes("attr", &Value::Null), passes);
        if let Some(first) = first {
            assert_eq!(rule.message().first(), Some(first));
        }
    }

    #[test]
    fn forwards_capabilities() {
        let mut rule = adapter(vec![], false);
        assert!(rule.as_rule().is_some());
        assert!(rule.as_invokable().is_some());
        assert!(rule.as_data_aware().is_some());
        assert!(rule.as_implicit().is_none());
        assert!(rule.as_validator_aware().is_none());
    }

    #[test]
    fn multiple_failures_become_a_list() {
        let mut rule = adapter(vec!["a", "b"], false);
        assert!(!rule.passes("attr", &Value::Null));
        assert!(matches!(rule.message(), Message::List(texts) if texts == ["a", "b"]));
        assert_eq!(rule.outcome().messages().len(), 2);
    }
}
