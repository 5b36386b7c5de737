//! Message template resolution.
//!
//! A failed rule's message addresses its parameters with `:label` tokens.
//! Labels are positional (`:0`, `:1`, ...) unless the rule declares a
//! [`ReplacerSpec`], whose entries name the parameters in order and may
//! transform the raw value before it is substituted.
//!
//! ```
//! use nebula_ruler::replacer::{self, ReplacerSpec};
//! use nebula_validation::Dataset;
//!
//! let spec = ReplacerSpec::new()
//!     .transform("shouldEqual", |value, _, _, _| match value {
//!         "true" => "should equal".to_owned(),
//!         _ => "should not equal".to_owned(),
//!     })
//!     .label("with");
//! let parameters = ["false".to_owned(), "test".to_owned()];
//!
//! let text = replacer::resolve(
//!     "my attribute :shouldEqual :with",
//!     Some(&spec),
//!     &parameters,
//!     "myAttribute",
//!     &Dataset::new(),
//! );
//! assert_eq!(text, "my attribute should not equal test");
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use nebula_validation::Dataset;

/// Rewrites a raw parameter: `(value, attribute, all parameters, dataset)`.
pub type Transform = Arc<dyn Fn(&str, &str, &[String], &Dataset) -> String + Send + Sync>;

/// One positional label.
#[derive(Clone)]
pub enum Replacer {
    /// Substitutes the raw parameter.
    Label(String),
    /// Substitutes the transformed parameter.
    Transform(String, Transform),
}

impl Replacer {
    /// The label, without the leading `:`.
    pub fn label(&self) -> &str {
        match self {
            Self::Label(label) | Self::Transform(label, _) => label,
        }
    }

    fn apply(&self, value: &str, attribute: &str, parameters: &[String], data: &Dataset) -> String {
        match self {
            Self::Label(_) => value.to_owned(),
            Self::Transform(_, transform) => transform(value, attribute, parameters, data),
        }
    }
}

impl fmt::Debug for Replacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => f.debug_tuple("Label").field(label).finish(),
            Self::Transform(label, _) => f
                .debug_tuple("Transform")
                .field(label)
                .finish_non_exhaustive(),
        }
    }
}

impl From<&str> for Replacer {
    fn from(label: &str) -> Self {
        Self::Label(label.to_owned())
    }
}

impl From<String> for Replacer {
    fn from(label: String) -> Self {
        Self::Label(label)
    }
}

/// Ordered parameter labels declared by a rule type.
#[derive(Debug, Clone, Default)]
pub struct ReplacerSpec(Vec<Replacer>);

impl ReplacerSpec {
    /// An empty spec; parameters stay positional.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bare label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.0.push(Replacer::Label(label.into()));
        self
    }

    /// Appends a label whose value is rewritten by `transform`.
    #[must_use]
    pub fn transform<F>(mut self, label: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&str, &str, &[String], &Dataset) -> String + Send + Sync + 'static,
    {
        self.0.push(Replacer::Transform(label.into(), Arc::new(transform)));
        self
    }

    /// Number of declared labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no labels are declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The declared replacers in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Replacer> {
        self.0.iter()
    }
}

impl FromIterator<Replacer> for ReplacerSpec {
    fn from_iter<I: IntoIterator<Item = Replacer>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[&str; N]> for ReplacerSpec {
    fn from(labels: [&str; N]) -> Self {
        labels.into_iter().map(Replacer::from).collect()
    }
}

/// Maps labels to substitution values.
///
/// Without a spec (or with an empty one) labels are the positions `"0"`,
/// `"1"`, .... Otherwise the spec is truncated to the number of supplied
/// parameters, so trailing optional parameters may be left out, and zipped
/// with them; transforms run on their own value.
pub fn label_parameters(
    spec: Option<&ReplacerSpec>,
    parameters: &[String],
    attribute: &str,
    data: &Dataset,
) -> IndexMap<String, String> {
    match spec {
        Some(spec) if !spec.is_empty() => spec
            .iter()
            .zip(parameters)
            .map(|(replacer, value)| {
                let value = replacer.apply(value, attribute, parameters, data);
                (replacer.label().to_owned(), value)
            })
            .collect(),
        _ => parameters
            .iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), value.clone()))
            .collect(),
    }
}

/// Replaces `:label` tokens in a single left-to-right pass.
///
/// At each `:` the longest matching label wins, so `:10` is not read as `:1`
/// followed by `0`. Substituted values are never scanned again.
pub fn substitute(message: &str, labels: &IndexMap<String, String>) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(position) = rest.find(':') {
        out.push_str(&rest[..position]);
        let after = &rest[position + 1..];

        match longest_label(after, labels) {
            Some((label, value)) => {
                out.push_str(value);
                rest = &after[label.len()..];
            }
            None => {
                out.push(':');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn longest_label<'a>(
    text: &str,
    labels: &'a IndexMap<String, String>,
) -> Option<(&'a str, &'a str)> {
    labels
        .iter()
        .filter(|(label, _)| !label.is_empty() && text.starts_with(label.as_str()))
        .max_by_key(|(label, _)| label.len())
        .map(|(label, value)| (label.as_str(), value.as_str()))
}

/// [`label_parameters`] followed by [`substitute`].
pub fn resolve(
    message: &str,
    spec: Option<&ReplacerSpec>,
    parameters: &[String],
    attribute: &str,
    data: &Dataset,
) -> String {
    let labels = label_parameters(spec, parameters, attribute, data);
    substitute(message, &labels)
}
