//! Built-in rules and their default messages.

use serde_json::Value;

use crate::data::{self, Dataset};

/// Rules the engine understands without extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Required,
    Nullable,
    Bail,
    String,
    Numeric,
    In,
    Same,
}

impl Builtin {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "required" => Self::Required,
            "nullable" => Self::Nullable,
            "bail" => Self::Bail,
            "string" => Self::String,
            "numeric" => Self::Numeric,
            "in" => Self::In,
            "same" => Self::Same,
            _ => return None,
        })
    }

    /// Implicit rules run against absent or empty attributes.
    pub(crate) fn is_implicit(self) -> bool {
        matches!(self, Self::Required)
    }

    /// Markers alter evaluation and never fail.
    pub(crate) fn is_marker(self) -> bool {
        matches!(self, Self::Nullable | Self::Bail)
    }

    pub(crate) fn check(self, value: &Value, parameters: &[String], data: &Dataset) -> bool {
        match self {
            Self::Required => !data::is_empty(value),
            Self::Nullable | Self::Bail => true,
            Self::String => value.is_string(),
            Self::Numeric => match value {
                Value::Number(_) => true,
                Value::String(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            Self::In => {
                let candidate = data::display(value);
                parameters.iter().any(|p| *p == candidate)
            }
            Self::Same => parameters
                .first()
                .and_then(|other| data::lookup(data, other))
                .is_some_and(|other| other == value),
        }
    }

    pub(crate) fn default_message(self) -> &'static str {
        match self {
            Self::Required => "The :attribute field is required.",
            Self::Nullable | Self::Bail => "",
            Self::String => "The :attribute must be a string.",
            Self::Numeric => "The :attribute must be a number.",
            Self::In => "The selected :attribute is invalid.",
            Self::Same => "The :attribute and :other must match.",
        }
    }
}
