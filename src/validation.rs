// ✅ Field Validation - Rules as Data
//
// Each entity kind declares its (field, rule) table once. The engine walks the
// table against current values and reports failures; it never rejects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// VALIDATION RULES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationRule {
    /// Value must be present (non-blank text, parsed number, referenced id)
    Required,
    /// Number present and >= 0
    NonNegative,
    /// Number present and > 0
    Positive,
    /// Reference id present and pointing at an existing entity
    Resolved,
    /// Reference may be absent, but if given it must point somewhere
    ResolvedWhenPresent,
}

/// Current value of a declared field, as seen by the rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Field is not known to the entity kind
    Undeclared,
    Text(Option<&'a str>),
    Number(Option<f64>),
    Reference { id: Option<&'a str>, resolved: bool },
}

impl<'a> FieldValue<'a> {
    fn is_present(&self) -> bool {
        match self {
            FieldValue::Undeclared => false,
            FieldValue::Text(text) => text.is_some_and(|t| !t.trim().is_empty()),
            FieldValue::Number(number) => number.is_some_and(|n| !n.is_nan()),
            FieldValue::Reference { id, .. } => id.is_some_and(|i| !i.trim().is_empty()),
        }
    }
}

impl ValidationRule {
    /// Check one value; `Err` carries the failure reason
    pub fn check(&self, value: &FieldValue<'_>) -> Result<(), String> {
        if !value.is_present() {
            return match self {
                ValidationRule::ResolvedWhenPresent => Ok(()),
                _ => Err("is required".to_string()),
            };
        }

        match (self, value) {
            (ValidationRule::Required, _) => Ok(()),
            (ValidationRule::NonNegative, FieldValue::Number(Some(n))) if *n < 0.0 => {
                Err(format!("must be non-negative, got {}", n))
            }
            (ValidationRule::Positive, FieldValue::Number(Some(n))) if *n <= 0.0 => {
                Err(format!("must be positive, got {}", n))
            }
            (ValidationRule::NonNegative | ValidationRule::Positive, FieldValue::Number(_)) => Ok(()),
            (ValidationRule::NonNegative | ValidationRule::Positive, _) => {
                Err("must be a number".to_string())
            }
            (
                ValidationRule::Resolved | ValidationRule::ResolvedWhenPresent,
                FieldValue::Reference { id, resolved: false },
            ) => Err(format!(
                "references unknown entity '{}'",
                id.unwrap_or_default()
            )),
            (ValidationRule::Resolved | ValidationRule::ResolvedWhenPresent, _) => Ok(()),
        }
    }
}

// ============================================================================
// FIELD ERRORS
// ============================================================================

/// Failing field → reason. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(BTreeMap::new())
    }

    pub fn insert(&mut self, field: &'static str, reason: String) {
        self.0.insert(field, reason);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.0.iter().map(|(field, reason)| (*field, reason.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, reason)| format!("{} {}", field, reason))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

// ============================================================================
// VALIDATE TRAIT
// ============================================================================

/// Declarative validation for an entity kind.
///
/// A new kind only declares `RULES` and exposes its values via
/// `field_value`; the engine itself never changes.
pub trait Validate {
    /// Kind name used in logs
    const KIND: &'static str;

    /// (field, rule) pairs; the first failing rule per field wins
    const RULES: &'static [(&'static str, ValidationRule)];

    fn field_value(&self, field: &str) -> FieldValue<'_>;

    fn errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for &(field, rule) in Self::RULES {
            if errors.contains(field) {
                continue;
            }
            if let Err(reason) = rule.check(&self.field_value(field)) {
                errors.insert(field, reason);
            }
        }

        errors
    }

    fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
