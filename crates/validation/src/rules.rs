//! Rule-string parsing.
//!
//! Rules are declared per attribute as `name:param,param|other`, or as a
//! list of such strings.

use crate::error::EngineError;

/// One parsed rule: its name and raw positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRule {
    /// The rule name, matched exactly against built-ins and extensions.
    pub name: String,
    /// Raw parameters in declaration order (`"true,value"` → `["true", "value"]`).
    pub parameters: Vec<String>,
}

impl ParsedRule {
    /// Parses a single `name[:p1,p2,...]` segment.
    pub fn parse(segment: &str) -> Result<Self, EngineError> {
        let (name, parameters) = match segment.split_once(':') {
            Some((name, raw)) => (name, raw.split(',').map(str::to_owned).collect()),
            None => (segment, Vec::new()),
        };

        if name.is_empty() {
            return Err(EngineError::InvalidRuleString {
                input: segment.to_owned(),
            });
        }

        Ok(Self {
            name: name.to_owned(),
            parameters,
        })
    }
}

/// The rule declaration for one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSpec {
    /// A `|`-separated rule string.
    Pipe(String),
    /// Individual rule strings.
    List(Vec<String>),
}

impl RuleSpec {
    /// Parses the declaration into rules, dropping empty segments.
    pub fn parse(&self) -> Result<Vec<ParsedRule>, EngineError> {
        let segments: Vec<&str> = match self {
            Self::Pipe(raw) => raw.split('|').collect(),
            Self::List(items) => items.iter().map(String::as_str).collect(),
        };

        segments
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(ParsedRule::parse)
            .collect()
    }
}

impl From<&str> for RuleSpec {
    fn from(raw: &str) -> Self {
        Self::Pipe(raw.to_owned())
    }
}

impl From<String> for RuleSpec {
    fn from(raw: String) -> Self {
        Self::Pipe(raw)
    }
}

impl From<Vec<&str>> for RuleSpec {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<String>> for RuleSpec {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl<const N: usize> From<[&str; N]> for RuleSpec {
    fn from(items: [&str; N]) -> Self {
        Self::List(items.into_iter().map(str::to_owned).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("required", "required", &[])]
    #[case("test:true,value", "test", &["true", "value"])]
    #[case("in:a", "in", &["a"])]
    #[case("odd:,x", "odd", &["", "x"])]
    #[case("nested:a:b", "nested", &["a:b"])]
    fn parses_segment(#[case] input: &str, #[case] name: &str, #[case] params: &[&str]) {
        let rule = ParsedRule::parse(input).unwrap();
        assert_eq!(rule.name, name);
        assert_eq!(rule.parameters, params);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = ParsedRule::parse(":x").unwrap_err();
        assert!(matches!(err, EngineError::InvalidRuleString { .. }));
    }

    #[test]
    fn pipe_and_list_agree() {
        let pipe = RuleSpec::from("required|test:1,2").parse().unwrap();
        let list = RuleSpec::from(["required", "test:1,2"]).parse().unwrap();
        assert_eq!(pipe, list);
        assert_eq!(pipe.len(), 2);
    }

    #[test]
    fn empty_segments_are_dropped() {
        let rules = RuleSpec::from("required||string|").parse().unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["required", "string"]);
    }
}
