//! Positional rule parameters.

use std::fmt;
use std::str::FromStr;

use crate::error::ParameterError;

/// The raw parameters of one rule invocation, e.g. `test:true,value` yields
/// `["true", "value"]`.
///
/// Parameters are positional constructor arguments for the rule instance
/// built for that invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<String>);

impl Parameters {
    /// Creates a parameter list.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// Number of supplied parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All parameters in order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// The parameter at `index`, if supplied.
    pub fn optional(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// The parameter at `index`.
    ///
    /// # Errors
    ///
    /// [`ParameterError::Missing`] when fewer parameters were supplied.
    pub fn required(&self, index: usize) -> Result<&str, ParameterError> {
        self.optional(index)
            .ok_or(ParameterError::Missing { index })
    }

    /// Parses the parameter at `index`.
    ///
    /// # Errors
    ///
    /// [`ParameterError::Missing`] or [`ParameterError::Invalid`].
    pub fn parse<T>(&self, index: usize) -> Result<T, ParameterError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.required(index)?;
        parse_at(index, raw)
    }

    /// Parses the parameter at `index`, or returns `default` when absent.
    ///
    /// # Errors
    ///
    /// [`ParameterError::Invalid`] when the parameter is present but malformed.
    pub fn parse_or<T>(&self, index: usize, default: T) -> Result<T, ParameterError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.optional(index) {
            Some(raw) => parse_at(index, raw),
            None => Ok(default),
        }
    }
}

fn parse_at<T>(index: usize, raw: &str) -> Result<T, ParameterError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|err: T::Err| ParameterError::Invalid {
        index,
        value: raw.to_owned(),
        reason: err.to_string(),
    })
}

impl From<&[String]> for Parameters {
    fn from(values: &[String]) -> Self {
        Self(values.to_vec())
    }
}

impl From<Vec<String>> for Parameters {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
