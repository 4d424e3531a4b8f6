// 💱 Currency Entity - exchange rates of one feed
//
// rate: value of one unit in the feed's base currency
// plus: surcharge in percent applied on top of the rate

use crate::collection::{Entity, IndexedCollection};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::record::RawRecord;
use crate::validation::{FieldValue, Validate, ValidationRule};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

pub const DEFAULT_RATE: &str = "1";
pub const DEFAULT_PLUS: &str = "0";

// ============================================================================
// CURRENCY ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: Option<String>,

    /// Rate exactly as written in the feed (may be a non-numeric code)
    pub rate: String,

    pub plus: String,
}

impl Currency {
    pub fn new(id: &str, rate: &str, plus: &str) -> Self {
        Currency {
            id: Some(id.to_string()),
            rate: rate.to_string(),
            plus: plus.to_string(),
        }
    }

    /// Build from an extracted record, filling absent rate/plus with defaults
    pub fn from_record(record: &RawRecord, default_rate: &str, default_plus: &str) -> Self {
        Currency {
            id: record.text("id"),
            rate: record.get("rate").unwrap_or(default_rate).to_string(),
            plus: record.get("plus").unwrap_or(default_plus).to_string(),
        }
    }

    pub fn rate_value(&self) -> Option<Decimal> {
        Decimal::from_str(self.rate.trim()).ok()
    }

    pub fn plus_value(&self) -> Option<Decimal> {
        Decimal::from_str(self.plus.trim()).ok()
    }

    /// rate * (1 + plus / 100); `None` unless numeric, positive and in range
    pub fn effective_rate(&self) -> Option<Decimal> {
        let rate = self.rate_value()?;
        let plus = self.plus_value()?;

        let markup = plus
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|share| Decimal::ONE.checked_add(share))?;
        let effective = rate.checked_mul(markup)?;
        (effective > Decimal::ZERO).then_some(effective)
    }
}

impl From<&RawRecord> for Currency {
    fn from(record: &RawRecord) -> Self {
        Currency::from_record(record, DEFAULT_RATE, DEFAULT_PLUS)
    }
}

impl From<RawRecord> for Currency {
    fn from(record: RawRecord) -> Self {
        Currency::from(&record)
    }
}

impl Validate for Currency {
    const KIND: &'static str = "currency";
    const RULES: &'static [(&'static str, ValidationRule)] = &[
        ("id", ValidationRule::Required),
        ("rate", ValidationRule::Positive),
        ("plus", ValidationRule::NonNegative),
    ];

    fn field_value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "id" => FieldValue::Text(self.id.as_deref()),
            "rate" => numeric_field(&self.rate, self.rate_value()),
            "plus" => numeric_field(&self.plus, self.plus_value()),
            _ => FieldValue::Undeclared,
        }
    }
}

/// Parsed number, or the raw text when it does not parse
fn numeric_field(raw: &str, parsed: Option<Decimal>) -> FieldValue<'_> {
    match parsed.and_then(|value| value.to_f64()) {
        Some(number) => FieldValue::Number(Some(number)),
        None => FieldValue::Text(Some(raw)),
    }
}

impl Entity for Currency {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

// ============================================================================
// CONVERSION RATE
// ============================================================================

/// Multiplier turning an amount in `self` into an amount in `target`
pub trait ConversionRate {
    fn rate_to(&self, target: &Self) -> Result<f64>;
}

impl ConversionRate for Currency {
    /// effective(self) / effective(target)
    fn rate_to(&self, target: &Currency) -> Result<f64> {
        let source_rate = self.effective_rate().ok_or_else(|| invalid_rate(self))?;
        let target_rate = target.effective_rate().ok_or_else(|| invalid_rate(target))?;

        source_rate
            .checked_div(target_rate)
            .and_then(|factor| factor.to_f64())
            .ok_or_else(|| invalid_rate(target))
    }
}

fn invalid_rate(currency: &Currency) -> CatalogError {
    CatalogError::InvalidRate {
        id: currency.key().to_string(),
        rate: currency.rate.clone(),
    }
}

// ============================================================================
// CURRENCY LIST
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CurrencyList {
    items: IndexedCollection<Currency>,
}

impl CurrencyList {
    pub fn new() -> Self {
        CurrencyList {
            items: IndexedCollection::new(),
        }
    }

    pub fn from_records(records: &[RawRecord], config: &CatalogConfig) -> Self {
        let list: CurrencyList = records
            .iter()
            .map(|record| Currency::from_record(record, &config.default_rate, &config.default_plus))
            .collect();

        info!(count = list.len(), "currency list built");
        list
    }

    pub fn add<C: Into<Currency>>(&mut self, item: C) -> &Currency {
        self.items.add(item)
    }

    pub fn find(&self, id: &str) -> Option<&Currency> {
        self.items.find(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Currency> {
        self.items.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.ids()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Currency> for CurrencyList {
    fn from_iter<I: IntoIterator<Item = Currency>>(iter: I) -> Self {
        CurrencyList {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CurrencyList {
    type Item = &'a Currency;
    type IntoIter = std::slice::Iter<'a, Currency>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_rate_and_plus() {
        let currency = Currency::from(&RawRecord::new().with("id", "RUR"));

        assert_eq!(currency.rate, "1");
        assert_eq!(currency.plus, "0");
        assert!(currency.is_valid());
    }

    #[test]
    fn test_config_defaults_applied() {
        let config = CatalogConfig {
            default_rate: "2".to_string(),
            ..CatalogConfig::default()
        };
        let list = CurrencyList::from_records(&[RawRecord::new().with("id", "USD")], &config);

        assert_eq!(list.find("USD").map(|c| c.rate.as_str()), Some("2"));
    }

    #[test]
    fn test_effective_rate_with_surcharge() {
        let currency = Currency::new("USD", "60", "3");

        assert_eq!(currency.effective_rate(), Decimal::from_str("61.8").ok());
    }

    #[test]
    fn test_rate_to() {
        let usd = Currency::new("USD", "1", "0");
        let eur = Currency::new("EUR", "0.9", "0");

        let factor = usd.rate_to(&eur).unwrap();
        assert!((factor - 1.0 / 0.9).abs() < 1e-12);
        assert!((eur.rate_to(&usd).unwrap() - 0.9).abs() < 1e-12);
        assert_eq!(usd.rate_to(&usd).unwrap(), 1.0);
    }

    #[test]
    fn test_non_numeric_rate() {
        let cbrf = Currency::new("USD", "CBRF", "0");
        let rub = Currency::new("RUB", "1", "0");

        assert!(!cbrf.is_valid());
        assert_eq!(cbrf.errors().get("rate"), Some("must be a number"));
        assert_eq!(
            cbrf.rate_to(&rub),
            Err(CatalogError::InvalidRate {
                id: "USD".to_string(),
                rate: "CBRF".to_string(),
            })
        );
    }

    #[test]
    fn test_zero_rate_is_invalid() {
        let zero = Currency::new("XXX", "0", "0");
        let rub = Currency::new("RUB", "1", "0");

        assert!(zero.effective_rate().is_none());
        assert!(rub.rate_to(&zero).is_err());
        assert_eq!(zero.errors().get("rate"), Some("must be positive, got 0"));
    }

    #[test]
    fn test_overflowing_rate_is_unusable() {
        let huge = Currency::new("BIG", "79228162514264337593543950335", "10");
        let rub = Currency::new("RUB", "1", "0");
        let tiny = Currency::new("TINY", "0.0000000000000000000000000001", "0");

        assert!(huge.effective_rate().is_none());
        assert_eq!(
            huge.rate_to(&rub),
            Err(CatalogError::InvalidRate {
                id: "BIG".to_string(),
                rate: "79228162514264337593543950335".to_string(),
            })
        );
        assert!(Currency::new("MAX", "79228162514264337593543950335", "0")
            .rate_to(&tiny)
            .is_err());
    }

    #[test]
    fn test_blank_rate_is_required() {
        let blank = Currency::new("USD", " ", "0");

        assert_eq!(blank.errors().get("rate"), Some("is required"));
    }

    #[test]
    fn test_duplicate_currency_last_wins() {
        let list: CurrencyList = vec![Currency::new("USD", "60", "0"), Currency::new("USD", "62", "0")]
            .into_iter()
            .collect();

        assert_eq!(list.len(), 1);
        assert_eq!(list.find("USD").map(|c| c.rate.as_str()), Some("62"));
    }
}
