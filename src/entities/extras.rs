// 📎 Value objects without identity
//
// Owned by the offer (Age, Param) or by the shop (DeliveryOption). They are
// never stored in an IndexedCollection since there is no id to key them by.

use crate::record::RawRecord;
use crate::validation::{FieldValue, Validate, ValidationRule};
use serde::{Deserialize, Serialize};

// ============================================================================
// AGE
// ============================================================================

/// Age restriction of an offer (e.g. unit "year", value "18")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Age {
    pub unit: Option<String>,
    pub value: Option<String>,
}

impl From<&RawRecord> for Age {
    fn from(record: &RawRecord) -> Self {
        Age {
            unit: record.text("unit"),
            value: record.text("value"),
        }
    }
}

impl Validate for Age {
    const KIND: &'static str = "age";
    const RULES: &'static [(&'static str, ValidationRule)] = &[
        ("unit", ValidationRule::Required),
        ("value", ValidationRule::Required),
    ];

    fn field_value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "unit" => FieldValue::Text(self.unit.as_deref()),
            "value" => FieldValue::Text(self.value.as_deref()),
            _ => FieldValue::Undeclared,
        }
    }
}

// ============================================================================
// PARAM
// ============================================================================

/// Free-form offer characteristic (name, optional unit, value)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub value: Option<String>,
}

impl From<&RawRecord> for Param {
    fn from(record: &RawRecord) -> Self {
        Param {
            name: record.text("name"),
            unit: record.text("unit"),
            value: record.text("value"),
        }
    }
}

impl Validate for Param {
    const KIND: &'static str = "param";
    const RULES: &'static [(&'static str, ValidationRule)] = &[
        ("name", ValidationRule::Required),
        ("value", ValidationRule::Required),
    ];

    fn field_value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "name" => FieldValue::Text(self.name.as_deref()),
            "unit" => FieldValue::Text(self.unit.as_deref()),
            "value" => FieldValue::Text(self.value.as_deref()),
            _ => FieldValue::Undeclared,
        }
    }
}

// ============================================================================
// DELIVERY OPTION
// ============================================================================

/// Shop-level delivery terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOption {
    pub cost: Option<String>,
    pub days: Option<String>,
    pub order_before: Option<String>,
}

impl From<&RawRecord> for DeliveryOption {
    fn from(record: &RawRecord) -> Self {
        DeliveryOption {
            cost: record.text("cost"),
            days: record.text("days"),
            order_before: record.text("order_before"),
        }
    }
}

impl Validate for DeliveryOption {
    const KIND: &'static str = "delivery_option";
    const RULES: &'static [(&'static str, ValidationRule)] = &[
        ("cost", ValidationRule::Required),
        ("days", ValidationRule::Required),
    ];

    fn field_value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "cost" => FieldValue::Text(self.cost.as_deref()),
            "days" => FieldValue::Text(self.days.as_deref()),
            "order_before" => FieldValue::Text(self.order_before.as_deref()),
            _ => FieldValue::Undeclared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_validation() {
        let age = Age::from(&RawRecord::new().with("unit", "year").with("value", "18"));
        assert!(age.is_valid());

        let no_unit = Age::from(&RawRecord::new().with("value", "18"));
        assert_eq!(no_unit.errors().get("unit"), Some("is required"));
    }

    #[test]
    fn test_param_unit_is_optional() {
        let param = Param::from(&RawRecord::new().with("name", "Weight").with("value", "2"));
        assert!(param.is_valid());
        assert!(param.unit.is_none());

        let nameless = Param::from(&RawRecord::new().with("value", "2"));
        assert!(!nameless.is_valid());
    }

    #[test]
    fn test_delivery_option_validation() {
        let option = DeliveryOption::from(
            &RawRecord::new()
                .with("cost", "300")
                .with("days", "1-3")
                .with("order_before", "14"),
        );
        assert!(option.is_valid());
        assert_eq!(option.order_before.as_deref(), Some("14"));

        let missing_days = DeliveryOption::from(&RawRecord::new().with("cost", "0"));
        assert_eq!(missing_days.errors().fields().collect::<Vec<_>>(), vec!["days"]);
    }
}
