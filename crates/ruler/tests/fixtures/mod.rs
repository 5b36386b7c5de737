//! Rule fixtures shared by the integration tests.
#![allow(dead_code)]

use nebula_ruler::prelude::*;
use nebula_validation::{CheckCategory, CheckFn, ExtensionRegistrar, MessageFn, ReplacerFn};
use serde_json::Value;

/// Implements `FromParameters` for a type that ignores its parameters.
macro_rules! no_parameters {
    ($($ty:ty),+ $(,)?) => {
        $(impl FromParameters for $ty {
            fn from_parameters(_: &Parameters) -> Result<Self, ParameterError> {
                Ok(Self::default())
            }
        })+
    };
}

// ============================================================================
// BASIC RULES
// ============================================================================

#[derive(Debug, Default)]
pub struct BasicRule;

impl Rule for BasicRule {
    fn passes(&mut self, _: &str, value: &Value) -> bool {
        value == "correctValue"
    }

    fn message(&self) -> Message {
        "This is the message".into()
    }
}

extension!(BasicRule: Rule);

#[derive(Debug, Default)]
pub struct ArrayMessageRule;

impl Rule for ArrayMessageRule {
    fn passes(&mut self, _: &str, _: &Value) -> bool {
        false
    }

    fn message(&self) -> Message {
        Message::from(["This is the message", "hide this"])
    }
}

extension!(ArrayMessageRule: Rule);

/// `param:<shouldEqual>,<with>`: passes when the value equals (or, with
/// `false`, differs from) `with`.
#[derive(Debug, Default)]
pub struct ParameterizedRule {
    should_equal: String,
    with: String,
}

impl ParameterizedRule {
    fn check(&self, value: &Value) -> bool {
        let equal = value.as_str() == Some(self.with.as_str());
        if self.should_equal == "true" { equal } else { !equal }
    }
}

impl Rule for ParameterizedRule {
    fn passes(&mut self, _: &str, value: &Value) -> bool {
        self.check(value)
    }

    fn message(&self) -> Message {
        ":attribute :0 :1".into()
    }
}

impl FromParameters for ParameterizedRule {
    fn from_parameters(parameters: &Parameters) -> Result<Self, ParameterError> {
        Ok(Self {
            should_equal: parameters.required(0)?.to_owned(),
            with: parameters.optional(1).unwrap_or_default().to_owned(),
        })
    }
}

extension!(ParameterizedRule: Rule);

/// [`ParameterizedRule`] with labelled parameters.
#[derive(Debug, Default)]
pub struct WithReplacersRule(ParameterizedRule);

impl Rule for WithReplacersRule {
    fn passes(&mut self, _: &str, value: &Value) -> bool {
        self.0.check(value)
    }

    fn message(&self) -> Message {
        ":attribute :shouldEqual :with".into()
    }
}

impl ReplacerAwareRule for WithReplacersRule {
    fn replacers(&self) -> ReplacerSpec {
        ReplacerSpec::from(["shouldEqual", "with"])
    }
}

impl FromParameters for WithReplacersRule {
    fn from_parameters(parameters: &Parameters) -> Result<Self, ParameterError> {
        ParameterizedRule::from_parameters(parameters).map(Self)
    }
}

extension!(WithReplacersRule: Rule, ReplacerAwareRule);

/// [`WithReplacersRule`] whose first label is rewritten into words.
#[derive(Debug, Default)]
pub struct WithReplacerWithCallbackRule(ParameterizedRule);

impl Rule for WithReplacerWithCallbackRule {
    fn passes(&mut self, _: &str, value: &Value) -> bool {
        self.0.check(value)
    }

    fn message(&self) -> Message {
        ":attribute :shouldEqual :with".into()
    }
}

impl ReplacerAwareRule for WithReplacerWithCallbackRule {
    fn replacers(&self) -> ReplacerSpec {
        ReplacerSpec::new()
            .transform("shouldEqual", |value, _, _, _| match value {
                "true" => "should equal".to_owned(),
                _ => "should not equal".to_owned(),
            })
            .label("with")
    }
}

impl FromParameters for WithReplacerWithCallbackRule {
    fn from_parameters(parameters: &Parameters) -> Result<Self, ParameterError> {
        ParameterizedRule::from_parameters(parameters).map(Self)
    }
}

extension!(WithReplacerWithCallbackRule: Rule, ReplacerAwareRule);

// ============================================================================
// ADDITIVE CAPABILITIES
// ============================================================================

/// Passes when the value equals `other_field` in the dataset.
#[derive(Debug, Default)]
pub struct DependentRule {
    data: Dataset,
}

impl Rule for DependentRule {
    fn passes(&mut self, _: &str, value: &Value) -> bool {
        self.data.get("other_field") == Some(value)
    }

    fn message(&self) -> Message {
        "this failed".into()
    }
}

impl DataAwareRule for DependentRule {
    fn set_data(&mut self, data: &Dataset) {
        self.data = data.clone();
    }
}

extension!(DependentRule: Rule, DataAwareRule);

/// Runs on missing attributes too; passes on anything but `null`.
#[derive(Debug, Default)]
pub struct SimpleImplicitRule;

impl Rule for SimpleImplicitRule {
    fn passes(&mut self, _: &str, value: &Value) -> bool {
        !value.is_null()
    }

    fn message(&self) -> Message {
        "The :attribute field must be present.".into()
    }
}

impl ImplicitRule for SimpleImplicitRule {}

extension!(SimpleImplicitRule: Rule, ImplicitRule);

/// `matches:<other>`: compares against another attribute through the session.
#[derive(Debug, Default)]
pub struct MatchesRule {
    other: String,
    session: Option<SessionHandle>,
}

impl Rule for MatchesRule {
    fn passes(&mut self, _: &str, value: &Value) -> bool {
        self.session
            .as_ref()
            .and_then(|session| session.value(&self.other))
            .is_some_and(|other| other == value)
    }

    fn message(&self) -> Message {
        let other = self
            .session
            .as_ref()
            .map_or_else(|| self.other.clone(), |session| session.display_name(&self.other));
        format!("The :attribute must match {other}.").into()
    }
}

impl ValidatorAwareRule for MatchesRule {
    fn set_validator(&mut self, validator: SessionHandle) {
        self.session = Some(validator);
    }
}

impl FromParameters for MatchesRule {
    fn from_parameters(parameters: &Parameters) -> Result<Self, ParameterError> {
        Ok(Self {
            other: parameters.required(0)?.to_owned(),
            session: None,
        })
    }
}

extension!(MatchesRule: Rule, ValidatorAwareRule);

// ============================================================================
// INVOKABLE RULES
// ============================================================================

/// `invokable[:true]`: fails with `shouldFail` when constructed with `true`.
#[derive(Debug, Default)]
pub struct InvokableTestRule {
    should_fail: bool,
}

impl InvokableRule for InvokableTestRule {
    fn invoke(&mut self, _: &str, _: &Value, fail: &mut Fail) {
        if self.should_fail {
            fail.fail("shouldFail");
        }
    }
}

impl FromParameters for InvokableTestRule {
    fn from_parameters(parameters: &Parameters) -> Result<Self, ParameterError> {
        Ok(Self {
            should_fail: parameters.parse_or(0, false)?,
        })
    }
}

extension!(InvokableTestRule: InvokableRule);

/// Invokable and data-aware: fails when `locked` is true in the dataset.
#[derive(Debug, Default)]
pub struct UnlessLockedRule {
    locked: bool,
}

impl InvokableRule for UnlessLockedRule {
    fn invoke(&mut self, _: &str, _: &Value, fail: &mut Fail) {
        if self.locked {
            fail.fail("The :attribute is locked.");
        }
    }
}

impl DataAwareRule for UnlessLockedRule {
    fn set_data(&mut self, data: &Dataset) {
        self.locked = data.get("locked").and_then(Value::as_bool).unwrap_or(false);
    }
}

extension!(UnlessLockedRule: InvokableRule, DataAwareRule);

// ============================================================================
// MESSAGES COMPUTED DURING THE CHECK
// ============================================================================

#[derive(Debug, Default)]
pub struct DynamicMessageRule {
    message: String,
}

impl Rule for DynamicMessageRule {
    fn passes(&mut self, attribute: &str, _: &Value) -> bool {
        self.message = format!("This is a message for {attribute}");
        false
    }

    fn message(&self) -> Message {
        self.message.clone().into()
    }
}

extension!(DynamicMessageRule: Rule);

#[derive(Debug, Default)]
pub struct DynamicMessagesRule {
    messages: Vec<String>,
}

impl Rule for DynamicMessagesRule {
    fn passes(&mut self, _: &str, _: &Value) -> bool {
        self.messages.push("This is a message".to_owned());
        self.messages.push("This is another message".to_owned());
        self.messages.is_empty()
    }

    fn message(&self) -> Message {
        self.messages.clone().into()
    }
}

extension!(DynamicMessagesRule: Rule);

/// Fails every value and reports it in the message.
#[derive(Debug, Default)]
pub struct RememberValueRule {
    seen: String,
}

impl Rule for RememberValueRule {
    fn passes(&mut self, _: &str, value: &Value) -> bool {
        self.seen = value.as_str().unwrap_or_default().to_owned();
        false
    }

    fn message(&self) -> Message {
        format!(":attribute rejected {}", self.seen).into()
    }
}

extension!(RememberValueRule: Rule);

/// Reports its message as a deferred producer.
#[derive(Debug, Default)]
pub struct DeferredMessageRule {
    attribute: String,
}

impl Rule for DeferredMessageRule {
    fn passes(&mut self, attribute: &str, _: &Value) -> bool {
        self.attribute = attribute.to_owned();
        false
    }

    fn message(&self) -> Message {
        let attribute = self.attribute.clone();
        Message::deferred(move || format!("field {attribute} failed late"))
    }
}

extension!(DeferredMessageRule: Rule);

// ============================================================================
// INVALID
// ============================================================================

/// Satisfies no contract.
#[derive(Debug, Default)]
pub struct InvalidRuleClass;

extension!(InvalidRuleClass);

no_parameters!(
    BasicRule,
    ArrayMessageRule,
    DependentRule,
    SimpleImplicitRule,
    UnlessLockedRule,
    DynamicMessageRule,
    DynamicMessagesRule,
    RememberValueRule,
    DeferredMessageRule,
    InvalidRuleClass,
);

// ============================================================================
// HOST DOUBLE
// ============================================================================

/// Records registrations instead of performing them.
#[derive(Default)]
pub struct RecordingRegistrar {
    pub checks: Vec<(String, CheckCategory)>,
    pub replacers: Vec<String>,
    pub removed: Vec<String>,
}

impl RecordingRegistrar {
    pub fn checks_named(&self, name: &str) -> Vec<CheckCategory> {
        self.checks
            .iter()
            .filter(|(rule, _)| rule == name)
            .map(|(_, category)| *category)
            .collect()
    }

    pub fn count(&self, category: CheckCategory) -> usize {
        self.checks.iter().filter(|(_, c)| *c == category).count()
    }
}

impl ExtensionRegistrar for RecordingRegistrar {
    fn register_check(&mut self, name: &str, category: CheckCategory, _: CheckFn, _: MessageFn) {
        self.checks.push((name.to_owned(), category));
    }

    fn register_replacer(&mut self, name: &str, _: ReplacerFn) {
        self.replacers.push(name.to_owned());
    }

    fn remove_check(&mut self, name: &str) {
        self.checks.retain(|(rule, _)| rule != name);
        self.replacers.retain(|rule| rule != name);
        self.removed.push(name.to_owned());
    }
}
