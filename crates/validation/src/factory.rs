//! Session factory and extension table.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::data::Dataset;
use crate::error::EngineError;
use crate::registrar::{
    CheckCategory, CheckFn, Extension, ExtensionRegistrar, MessageFn, ReplacerFn,
};
use crate::rules::RuleSpec;
use crate::validator::{SessionHook, SessionParts, Validator};

/// Registered extensions, bucketed by category.
#[derive(Clone, Default)]
pub(crate) struct ExtensionTable {
    buckets: HashMap<CheckCategory, HashMap<String, Extension>>,
    active: HashMap<String, Extension>,
    replacers: HashMap<String, ReplacerFn>,
}

impl ExtensionTable {
    fn insert(&mut self, name: &str, category: CheckCategory, extension: Extension) {
        self.buckets
            .entry(category)
            .or_default()
            .insert(name.to_owned(), extension.clone());
        self.active.insert(name.to_owned(), extension);
    }

    fn remove(&mut self, name: &str) -> bool {
        let mut removed = self.active.remove(name).is_some();
        for bucket in self.buckets.values_mut() {
            removed |= bucket.remove(name).is_some();
        }
        removed |= self.replacers.remove(name).is_some();
        removed
    }

    /// The most recently registered check for `name`.
    pub(crate) fn active(&self, name: &str) -> Option<&Extension> {
        self.active.get(name)
    }

    pub(crate) fn is_implicit(&self, name: &str) -> bool {
        self.in_bucket(name, CheckCategory::Implicit)
    }

    pub(crate) fn replacer(&self, name: &str) -> Option<&ReplacerFn> {
        self.replacers.get(name)
    }

    fn in_bucket(&self, name: &str, category: CheckCategory) -> bool {
        self.buckets
            .get(&category)
            .is_some_and(|bucket| bucket.contains_key(name))
    }

    fn categories(&self, name: &str) -> BTreeSet<CheckCategory> {
        CheckCategory::ALL
            .into_iter()
            .filter(|category| self.in_bucket(name, *category))
            .collect()
    }
}

/// Builds validation sessions and holds the extension registrations they share.
///
/// ```
/// use nebula_validation::{Factory, dataset};
/// use serde_json::json;
///
/// let factory = Factory::new();
/// let validator = factory
///     .make(dataset(json!({"name": ""})), [("name", "required|string")])
///     .unwrap();
///
/// assert!(validator.fails().unwrap());
/// assert_eq!(
///     validator.errors().unwrap().first("name"),
///     Some("The name field is required.")
/// );
/// ```
#[derive(Clone, Default)]
pub struct Factory {
    table: Arc<ExtensionTable>,
    hook: Option<Arc<dyn SessionHook>>,
    messages: HashMap<String, String>,
    attributes: HashMap<String, String>,
    stop_on_first_failure: bool,
}

impl Factory {
    /// Creates a factory with no extensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the hook every new session applies to raw messages.
    pub fn set_session_hook(&mut self, hook: Arc<dyn SessionHook>) {
        self.hook = Some(hook);
    }

    /// Whether a session hook is installed.
    pub fn has_session_hook(&self) -> bool {
        self.hook.is_some()
    }

    /// Stops every session at the first failing attribute.
    pub fn set_stop_on_first_failure(&mut self, stop: bool) {
        self.stop_on_first_failure = stop;
    }

    /// Adds a default custom message, keyed by `rule` or `attribute.rule`.
    pub fn add_message(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.messages.insert(key.into(), text.into());
    }

    /// Adds a default display name for an attribute.
    pub fn add_attribute(&mut self, attribute: impl Into<String>, name: impl Into<String>) {
        self.attributes.insert(attribute.into(), name.into());
    }

    /// Whether an extension check is registered under `name`.
    pub fn has_extension(&self, name: &str) -> bool {
        self.table.active(name).is_some()
    }

    /// Categories `name` is registered in.
    pub fn extension_categories(&self, name: &str) -> BTreeSet<CheckCategory> {
        self.table.categories(name)
    }

    /// Whether a replacer is registered under `name`.
    pub fn has_replacer(&self, name: &str) -> bool {
        self.table.replacer(name).is_some()
    }

    /// Creates a session for `data` with per-attribute `rules`.
    pub fn make<I, K, R>(&self, data: Dataset, rules: I) -> Result<Validator, EngineError>
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Into<RuleSpec>,
    {
        self.make_with(data, rules, HashMap::new(), HashMap::new())
    }

    /// Like [`make`](Self::make), with session-specific custom messages and
    /// attribute names layered over the factory defaults.
    pub fn make_with<I, K, R>(
        &self,
        data: Dataset,
        rules: I,
        messages: HashMap<String, String>,
        attributes: HashMap<String, String>,
    ) -> Result<Validator, EngineError>
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Into<RuleSpec>,
    {
        let mut parsed = IndexMap::new();
        for (attribute, spec) in rules {
            let spec: RuleSpec = spec.into();
            parsed.insert(attribute.into(), spec.parse()?);
        }

        let mut all_messages = self.messages.clone();
        all_messages.extend(messages);
        let mut all_attributes = self.attributes.clone();
        all_attributes.extend(attributes);

        Ok(Validator::from_parts(SessionParts {
            data,
            rules: parsed,
            messages: all_messages,
            attributes: all_attributes,
            table: Arc::clone(&self.table),
            hook: self.hook.clone(),
            stop_on_first_failure: self.stop_on_first_failure,
        }))
    }
}

impl ExtensionRegistrar for Factory {
    fn register_check(
        &mut self,
        name: &str,
        category: CheckCategory,
        check: CheckFn,
        message: MessageFn,
    ) {
        debug!(rule = name, %category, "registering extension check");
        Arc::make_mut(&mut self.table).insert(name, category, Extension { check, message });
    }

    fn register_replacer(&mut self, name: &str, replacer: ReplacerFn) {
        debug!(rule = name, "registering extension replacer");
        Arc::make_mut(&mut self.table)
            .replacers
            .insert(name.to_owned(), replacer);
    }

    fn remove_check(&mut self, name: &str) {
        if Arc::make_mut(&mut self.table).remove(name) {
            debug!(rule = name, "removed extension registrations");
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.table.active.keys().collect();
        names.sort();
        f.debug_struct("Factory")
            .field("extensions", &names)
            .field("has_session_hook", &self.hook.is_some())
            .field("stop_on_first_failure", &self.stop_on_first_failure)
            .finish_non_exhaustive()
    }
}
