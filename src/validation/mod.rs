//! Declarative constraint tables and the interpreter that checks records against them.
//!
//! A [`Schema`] is an ordered list of [`FieldRules`]; each field carries a list
//! of rule/message pairs. Validation never stops at the first failing field:
//! every violated field is reported in one pass, with the message of the
//! first rule it breaks.

use std::collections::HashMap;

use validator::ValidateEmail;

use crate::domain::types::normalize_phone_to_e164;
use crate::formatting::{GROUP_SEPARATOR, strip_formatting};

pub mod schemas;

/// Read access to the string values of a form record by field name.
pub trait FieldSource {
    /// Current value of `field`; unknown fields read as `None`.
    fn field_value(&self, field: &str) -> Option<&str>;
}

impl FieldSource for HashMap<String, String> {
    fn field_value(&self, field: &str) -> Option<&str> {
        self.get(field).map(String::as_str)
    }
}

/// Ordered mapping from field name to a human-readable message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Sets the message for `field`, keeping its position if already present.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = message,
            None => self.entries.push((field, message)),
        }
    }

    /// Clears the message for `field` only.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        let position = self.entries.iter().position(|(name, _)| name == field)?;
        Some(self.entries.remove(position).1)
    }

    /// Copies every entry of `other` over this set.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.entries {
            self.insert(field, message);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// First field of `order` that has an error, falling back to insertion order.
    pub fn first_field<'a>(&'a self, order: &[&'a str]) -> Option<&'a str> {
        order
            .iter()
            .copied()
            .find(|field| self.contains(field))
            .or_else(|| self.entries.first().map(|(field, _)| field.as_str()))
    }

    /// Rewrites every key through `rename`.
    pub fn map_keys(self, rename: impl Fn(&str) -> String) -> Self {
        let mut mapped = FieldErrors::new();
        for (field, message) in self.entries {
            mapped.insert(rename(&field), message);
        }
        mapped
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut errors = FieldErrors::new();
        for (field, message) in iter {
            errors.insert(field, message);
        }
        errors
    }
}

/// One constraint on a string field value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Non-blank after trimming.
    Required,
    /// At least this many characters after trimming.
    MinChars(usize),
    /// At most this many characters after trimming.
    MaxChars(usize),
    /// Digits, optionally grouped with the display separator.
    Numeric,
    /// Digit count after stripping non-digits lies within the bounds.
    DigitCount { min: usize, max: usize },
    /// Numeric value not below the bound.
    MinValue(u64),
    /// Numeric value not above the bound.
    MaxValue(u64),
    /// Well-formed e-mail address.
    Email,
    /// Parses as an international phone number.
    Phone,
    /// Equal to the value of another field.
    Matches(&'static str),
}

impl Rule {
    fn check(&self, value: &str, source: &dyn FieldSource) -> bool {
        let trimmed = value.trim();
        match self {
            Rule::Required => !trimmed.is_empty(),
            Rule::MinChars(min) => trimmed.chars().count() >= *min,
            Rule::MaxChars(max) => trimmed.chars().count() <= *max,
            Rule::Numeric => {
                trimmed.chars().any(|c| c.is_ascii_digit())
                    && trimmed
                        .chars()
                        .all(|c| c.is_ascii_digit() || c == GROUP_SEPARATOR)
            }
            Rule::DigitCount { min, max } => {
                let count = strip_formatting(trimmed).len();
                (*min..=*max).contains(&count)
            }
            Rule::MinValue(min) => numeric_value(trimmed).is_some_and(|v| v >= *min),
            Rule::MaxValue(max) => numeric_value(trimmed).is_some_and(|v| v <= *max),
            Rule::Email => trimmed.validate_email(),
            Rule::Phone => normalize_phone_to_e164(trimmed).is_ok(),
            Rule::Matches(other) => source.field_value(other).unwrap_or_default() == value,
        }
    }
}

fn numeric_value(value: &str) -> Option<u64> {
    strip_formatting(value).parse().ok()
}

/// Rule paired with the message reported when it fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Check {
    pub rule: Rule,
    pub message: String,
}

/// Constraints attached to one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRules {
    pub field: &'static str,
    /// Blank optional values skip every other check.
    pub optional: bool,
    pub checks: Vec<Check>,
}

impl FieldRules {
    /// A field whose blank value is accepted.
    pub fn optional(field: &'static str) -> Self {
        Self {
            field,
            optional: true,
            checks: Vec::new(),
        }
    }

    /// A field that must be filled in.
    pub fn required(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            optional: false,
            checks: vec![Check {
                rule: Rule::Required,
                message: message.into(),
            }],
        }
    }

    /// Appends a rule; rules are checked in the order they are added.
    pub fn rule(mut self, rule: Rule, message: impl Into<String>) -> Self {
        self.checks.push(Check {
            rule,
            message: message.into(),
        });
        self
    }

    fn first_violation(&self, source: &dyn FieldSource) -> Option<&str> {
        let value = source.field_value(self.field).unwrap_or_default();
        if self.optional && value.trim().is_empty() {
            return None;
        }
        self.checks
            .iter()
            .find(|check| !check.rule.check(value, source))
            .map(|check| check.message.as_str())
    }
}

/// Ordered constraint table for one form family.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldRules>,
}

impl Schema {
    pub fn new(fields: Vec<FieldRules>) -> Self {
        Self { fields }
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|rules| rules.field).collect()
    }

    /// Checks every field and reports all violations together.
    pub fn validate(&self, source: &dyn FieldSource) -> Result<(), FieldErrors> {
        let errors: FieldErrors = self
            .fields
            .iter()
            .filter_map(|rules| {
                rules
                    .first_violation(source)
                    .map(|message| (rules.field, message.to_string()))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            log::debug!("Validation failed for {} field(s)", errors.len());
            Err(errors)
        }
    }
}
