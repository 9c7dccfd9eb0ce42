//! Declarative field validation
//!
//! Each request type lists its fields together with the rules they must
//! satisfy (see [`Validate::constraints`]). A single routine walks that table
//! and reports the first failing rule of every field as a [`Violation`].

use serde::Serialize;
use uuid::Uuid;

/// Message carried by every aggregated validation failure
pub const INVALID_PAYLOAD: &str = "invalid_payload";

/// A single field rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Text must be non-empty, lists must hold at least one item
    Required,
    /// Minimum length in characters (text) or items (lists)
    Min(usize),
    /// Maximum length in characters (text) or items (lists)
    Max(usize),
    /// Hyphenated UUID; an empty value is accepted
    Uuid,
}

impl Rule {
    pub fn tag(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::Uuid => "uuid",
        }
    }

    pub fn param(&self) -> Option<usize> {
        match self {
            Rule::Min(n) | Rule::Max(n) => Some(*n),
            Rule::Required | Rule::Uuid => None,
        }
    }

    fn holds(&self, value: FieldValue<'_>) -> bool {
        match (self, value) {
            (Rule::Required, FieldValue::Text(text)) => !text.is_empty(),
            (Rule::Required, FieldValue::List(items)) => !items.is_empty(),
            (Rule::Min(min), value) => value.len() >= *min,
            (Rule::Max(max), value) => value.len() <= *max,
            (Rule::Uuid, FieldValue::Text(text)) => {
                text.is_empty() || Uuid::parse_str(text).is_ok()
            }
            (Rule::Uuid, FieldValue::List(_)) => false,
        }
    }
}

/// Borrowed view of a field's value
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
}

impl FieldValue<'_> {
    fn len(&self) -> usize {
        match self {
            FieldValue::Text(text) => text.chars().count(),
            FieldValue::List(items) => items.len(),
        }
    }

    fn to_owned_value(self) -> ViolationValue {
        match self {
            FieldValue::Text(text) => ViolationValue::Text(text.to_string()),
            FieldValue::List(items) => ViolationValue::List(items.to_vec()),
        }
    }
}

/// One row of a request's constraint table
#[derive(Debug, Clone)]
pub struct Constraint<'a> {
    pub field: &'static str,
    pub value: FieldValue<'a>,
    pub rules: &'static [Rule],
}

impl<'a> Constraint<'a> {
    pub fn text(field: &'static str, value: &'a str, rules: &'static [Rule]) -> Self {
        Self {
            field,
            value: FieldValue::Text(value),
            rules,
        }
    }

    pub fn list(field: &'static str, value: &'a [String], rules: &'static [Rule]) -> Self {
        Self {
            field,
            value: FieldValue::List(value),
            rules,
        }
    }
}

/// The offending value, echoed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ViolationValue {
    Text(String),
    List(Vec<String>),
}

/// A failed rule on a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub rule: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<usize>,
    pub value: ViolationValue,
}

/// All violations found in one request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid_payload: {} field(s) rejected", .violations.len())]
pub struct ValidationErrors {
    pub violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.field).collect()
    }
}

/// Evaluate a constraint table
pub fn check(constraints: &[Constraint<'_>]) -> Result<(), ValidationErrors> {
    let violations: Vec<Violation> = constraints
        .iter()
        .filter_map(|constraint| {
            constraint
                .rules
                .iter()
                .find(|rule| !rule.holds(constraint.value))
                .map(|rule| Violation {
                    field: constraint.field,
                    rule: rule.tag(),
                    param: rule.param(),
                    value: constraint.value.to_owned_value(),
                })
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { violations })
    }
}

/// Implemented by request types that carry a constraint table
pub trait Validate {
    fn constraints(&self) -> Vec<Constraint<'_>>;

    fn validate(&self) -> Result<(), ValidationErrors> {
        check(&self.constraints())
    }
}
