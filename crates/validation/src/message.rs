//! Message values produced by rules.
//!
//! A rule reports its failure text as a [`Message`]: a single text, a list of
//! texts (one per violation), or a [`Deferred`] producer whose text is only
//! known once the rule's check has run.

use std::fmt;

/// A failure message as reported by a rule.
pub enum Message {
    /// One failure text.
    Text(String),
    /// Several failure texts for the same attribute, in order.
    List(Vec<String>),
    /// A message computed lazily, at read time.
    Deferred(Deferred),
}

impl Message {
    /// Creates a deferred message from a producer.
    ///
    /// The producer runs at most once.
    pub fn deferred<F, M>(producer: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
        M: Into<Message>,
    {
        Self::Deferred(Deferred::new(move || producer().into()))
    }

    /// Returns `true` for [`Message::Deferred`].
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Evaluates deferred producers until a concrete message remains.
    #[must_use]
    pub fn resolve(self) -> Self {
        let mut message = self;
        while let Self::Deferred(deferred) = message {
            message = deferred.resolve();
        }
        message
    }

    /// Applies `f` to every concrete text. Deferred messages are returned untouched.
    #[must_use]
    pub fn map_texts(self, mut f: impl FnMut(String) -> String) -> Self {
        match self {
            Self::Text(text) => Self::Text(f(text)),
            Self::List(texts) => Self::List(texts.into_iter().map(f).collect()),
            deferred @ Self::Deferred(_) => deferred,
        }
    }

    /// Returns the first concrete text, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            Self::List(texts) => texts.first().map(String::as_str),
            Self::Deferred(_) => None,
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::List(texts) => f.debug_tuple("List").field(texts).finish(),
            Self::Deferred(deferred) => deferred.fmt(f),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for Message {
    fn from(texts: Vec<String>) -> Self {
        Self::List(texts)
    }
}

impl From<Vec<&str>> for Message {
    fn from(texts: Vec<&str>) -> Self {
        Self::List(texts.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Message {
    fn from(texts: [&str; N]) -> Self {
        Self::List(texts.into_iter().map(str::to_owned).collect())
    }
}

impl From<Deferred> for Message {
    fn from(deferred: Deferred) -> Self {
        Self::Deferred(deferred)
    }
}

/// A zero-argument message producer, evaluated once.
pub struct Deferred(Box<dyn FnOnce() -> Message + Send>);

impl Deferred {
    /// Wraps a producer.
    pub fn new(producer: impl FnOnce() -> Message + Send + 'static) -> Self {
        Self(Box::new(producer))
    }

    /// Runs the producer, consuming it.
    pub fn resolve(self) -> Message {
        (self.0)()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn resolve_runs_producer_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let message = Message::deferred(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "computed"
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let resolved = message.resolve();
        assert_eq!(resolved.first(), Some("computed"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn resolve_unwraps_nested_deferred() {
        let message = Message::deferred(|| Message::deferred(|| vec!["a", "b"]));
        match message.resolve() {
            Message::List(texts) => assert_eq!(texts, ["a", "b"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn map_texts_skips_deferred() {
        let message = Message::deferred(|| "x").map_texts(|t| t.to_uppercase());
        assert!(message.is_deferred());

        let message = Message::from(["a", "b"]).map_texts(|t| t.to_uppercase());
        assert_eq!(message.first(), Some("A"));
    }
}
