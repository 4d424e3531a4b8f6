// 📥 Raw Records - what the extraction layer hands over
//
// The document walker (XML or otherwise) lives outside this crate. It emits
// plain string maps per node; everything typed starts in `entities`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ============================================================================
// RAW RECORD
// ============================================================================

/// Field name → raw string value. `null` values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(BTreeMap<String, Option<String>>);

impl RawRecord {
    pub fn new() -> Self {
        RawRecord(BTreeMap::new())
    }

    /// Builder pattern: set a field
    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: &str) {
        self.0.insert(field.to_string(), Some(value.to_string()));
    }

    /// Trimmed value of a field, if present
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|value| value.as_deref())
            .map(str::trim)
    }

    /// Owned value of a field, if present
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).map(str::to_string)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawRecord(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        )
    }
}

// ============================================================================
// OFFER RECORD
// ============================================================================

/// Flat offer fields plus the nested sub-records an offer node carries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferRecord {
    #[serde(flatten)]
    pub fields: RawRecord,

    #[serde(default)]
    pub age: Option<RawRecord>,

    #[serde(default)]
    pub barcodes: Vec<String>,

    #[serde(default)]
    pub params: Vec<RawRecord>,
}

impl OfferRecord {
    pub fn new(fields: RawRecord) -> Self {
        OfferRecord {
            fields,
            age: None,
            barcodes: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Builder pattern: attach age sub-record
    pub fn with_age(mut self, age: RawRecord) -> Self {
        self.age = Some(age);
        self
    }

    /// Builder pattern: add barcode
    pub fn with_barcode(mut self, barcode: &str) -> Self {
        self.barcodes.push(barcode.to_string());
        self
    }

    /// Builder pattern: add param sub-record
    pub fn with_param(mut self, param: RawRecord) -> Self {
        self.params.push(param);
        self
    }
}

impl From<RawRecord> for OfferRecord {
    fn from(fields: RawRecord) -> Self {
        OfferRecord::new(fields)
    }
}

// ============================================================================
// FEED RECORDS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Everything the extraction layer produced for one feed document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedRecords {
    /// Generation timestamp exactly as written in the feed
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub shop: ShopRecord,

    #[serde(default)]
    pub categories: Vec<RawRecord>,

    #[serde(default)]
    pub currencies: Vec<RawRecord>,

    #[serde(default)]
    pub delivery_options: Vec<RawRecord>,

    #[serde(default)]
    pub offers: Vec<OfferRecord>,
}

impl FeedRecords {
    /// Parse extracted records from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse feed records JSON")
    }

    /// Load extracted records from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read feed records file: {:?}", path.as_ref()))?;

        Self::from_json_str(&content)
    }
}

// ============================================================================
// VALUE PARSING
// ============================================================================

/// Parse a feed price ("1,299.50" → 1299.5). Unparseable values are absent.
pub fn parse_price(raw: Option<&str>) -> Option<f64> {
    let cleaned = raw?.replace(',', "");
    cleaned.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}
