// 🛒 Offer Entity - priced goods that link to a category and a currency
//
// category_id / currency_id are the raw references from the feed; category /
// currency hold the resolved ids and are only set when the target exists.

use crate::collection::{Entity, IndexedCollection};
use crate::config::PrunePolicy;
use crate::entities::category::{Category, CategoryList};
use crate::entities::currency::{ConversionRate, Currency, CurrencyList};
use crate::entities::extras::{Age, Param};
use crate::error::{CatalogError, Result};
use crate::record::{parse_price, OfferRecord};
use crate::validation::{FieldValue, Validate, ValidationRule};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ============================================================================
// OFFER ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: Option<String>,
    pub group_id: Option<String>,
    #[serde(rename = "type")]
    pub offer_type: Option<String>,
    pub available: bool,

    // ========================================================================
    // REFERENCES
    // ========================================================================
    pub category_id: Option<String>,
    pub currency_id: Option<String>,

    /// Resolved category id (present in the catalog's CategoryList)
    pub category: Option<String>,

    /// Resolved currency id (present in the catalog's CurrencyList)
    pub currency: Option<String>,

    // ========================================================================
    // PRICING
    // ========================================================================
    pub price: Option<f64>,

    /// Not from the feed DTD; absent stays absent (never coerced to 0)
    pub oldprice: Option<f64>,

    // ========================================================================
    // DESCRIPTIVE (depends on feed type)
    // ========================================================================
    pub url: Option<String>,
    pub picture: Option<String>,
    pub pickup: Option<String>,
    pub delivery: Option<String>,
    pub type_prefix: Option<String>,
    pub vendor: Option<String>,
    pub vendor_code: Option<String>,
    pub model: Option<String>,
    pub name: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub sales_notes: Option<String>,
    pub adult: Option<String>,

    // ========================================================================
    // NESTED
    // ========================================================================
    pub age: Option<Age>,
    pub barcodes: Vec<String>,
    pub params: Vec<Param>,
}

impl Offer {
    /// Minimal offer; references stay unresolved until admitted to an OfferList
    pub fn new(id: &str, price: f64, category_id: &str, currency_id: &str) -> Self {
        Offer {
            id: Some(id.to_string()),
            group_id: None,
            offer_type: None,
            available: true,
            category_id: Some(category_id.to_string()),
            currency_id: Some(currency_id.to_string()),
            category: None,
            currency: None,
            price: Some(price),
            oldprice: None,
            url: None,
            picture: None,
            pickup: None,
            delivery: None,
            type_prefix: None,
            vendor: None,
            vendor_code: None,
            model: None,
            name: None,
            isbn: None,
            description: None,
            sales_notes: None,
            adult: None,
            age: None,
            barcodes: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn from_record(record: &OfferRecord) -> Self {
        let fields = &record.fields;

        Offer {
            id: fields.text("id"),
            group_id: fields.text("group_id"),
            offer_type: fields.text("type"),
            available: fields.get("available").map_or(true, |v| v == "true"),
            category_id: fields.text("category_id"),
            currency_id: fields.text("currency_id"),
            category: None,
            currency: None,
            price: parse_price(fields.get("price")),
            oldprice: parse_price(fields.get("oldprice")),
            url: fields.text("url"),
            picture: fields.text("picture"),
            pickup: fields.text("pickup"),
            delivery: fields.text("delivery"),
            type_prefix: fields.text("type_prefix"),
            vendor: fields.text("vendor"),
            vendor_code: fields.text("vendor_code"),
            model: fields.text("model"),
            name: fields.text("name"),
            isbn: fields.text("isbn"),
            description: fields.text("description"),
            sales_notes: fields.text("sales_notes"),
            adult: fields.text("adult"),
            age: record.age.as_ref().map(Age::from),
            barcodes: record.barcodes.iter().map(|b| b.trim().to_string()).collect(),
            params: record.params.iter().map(Param::from).collect(),
        }
    }

    /// Point the offer at another category (reference and raw id together)
    pub fn change_category(&mut self, category: &Category) {
        self.category = category.id.clone();
        self.category_id = category.id.clone();
    }

    /// Re-price into `target`; `source` must be the offer's current currency
    ///
    /// Both price and oldprice are multiplied by `source.rate_to(target)`.
    pub fn convert_currency(&mut self, source: &Currency, target: &Currency) -> Result<()> {
        let factor = source.rate_to(target)?;

        self.price = self.price.map(|price| price * factor);
        self.oldprice = self.oldprice.map(|oldprice| oldprice * factor);
        self.currency = target.id.clone();
        self.currency_id = target.id.clone();

        Ok(())
    }
}

impl From<&OfferRecord> for Offer {
    fn from(record: &OfferRecord) -> Self {
        Offer::from_record(record)
    }
}

impl From<OfferRecord> for Offer {
    fn from(record: OfferRecord) -> Self {
        Offer::from_record(&record)
    }
}

impl Validate for Offer {
    const KIND: &'static str = "offer";
    const RULES: &'static [(&'static str, ValidationRule)] = &[
        ("id", ValidationRule::Required),
        ("category_id", ValidationRule::Resolved),
        ("currency_id", ValidationRule::Resolved),
        ("price", ValidationRule::NonNegative),
    ];

    fn field_value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "id" => FieldValue::Text(self.id.as_deref()),
            "category_id" => FieldValue::Reference {
                id: self.category_id.as_deref(),
                resolved: self.category.is_some(),
            },
            "currency_id" => FieldValue::Reference {
                id: self.currency_id.as_deref(),
                resolved: self.currency.is_some(),
            },
            "price" => FieldValue::Number(self.price),
            "oldprice" => FieldValue::Number(self.oldprice),
            "name" => FieldValue::Text(self.name.as_deref()),
            _ => FieldValue::Undeclared,
        }
    }
}

impl Entity for Offer {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

// ============================================================================
// OFFER LIST
// ============================================================================

/// Offers of one catalog, references resolved against its categories and
/// currencies at admission time
#[derive(Debug, Clone, Default)]
pub struct OfferList {
    items: IndexedCollection<Offer>,
}

impl OfferList {
    pub fn new<I, O>(categories: &CategoryList, currencies: &CurrencyList, offers: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<Offer>,
    {
        let mut list = OfferList {
            items: IndexedCollection::new(),
        };
        for offer in offers {
            list.add(categories, currencies, offer);
        }

        info!(
            count = list.len(),
            invalid = list.invalid().count(),
            "offer list built"
        );
        list
    }

    /// Admit an offer, resolving its category and currency references
    ///
    /// A reference that names nothing stays unresolved and shows up in the
    /// offer's errors; the offer is still admitted.
    pub fn add<O: Into<Offer>>(
        &mut self,
        categories: &CategoryList,
        currencies: &CurrencyList,
        item: O,
    ) -> &Offer {
        let mut offer = item.into();

        offer.category = offer
            .category_id
            .as_deref()
            .and_then(|id| categories.find(id))
            .and_then(|category| category.id.clone());
        offer.currency = offer
            .currency_id
            .as_deref()
            .and_then(|id| currencies.find(id))
            .and_then(|currency| currency.id.clone());

        self.items.add(offer)
    }

    pub fn find(&self, id: &str) -> Option<&Offer> {
        self.items.find(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Offer> {
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

    pub fn valid(&self) -> impl Iterator<Item = &Offer> + '_ {
        self.iter().filter(|offer| offer.is_valid())
    }

    pub fn invalid(&self) -> impl Iterator<Item = &Offer> + '_ {
        self.iter().filter(|offer| !offer.is_valid())
    }

    /// Detach offers from categories deeper than `level`
    ///
    /// Must run against the category list BEFORE it is pruned, since it
    /// reads the levels of categories about to be removed. Afterwards no
    /// offer references a category deeper than `level`. Returns how many
    /// offers were moved or removed.
    pub fn prune_categories(
        &mut self,
        categories: &CategoryList,
        level: i64,
        policy: PrunePolicy,
    ) -> Result<usize> {
        if level < 0 {
            return Err(CatalogError::InvalidLevel(level));
        }
        let threshold = level as usize;

        let too_deep = |offer: &Offer| {
            offer
                .category
                .as_deref()
                .and_then(|id| categories.find(id))
                .is_some_and(|category| category.level > threshold)
        };

        let affected = match policy {
            PrunePolicy::Remove => self.items.delete_if(too_deep),
            PrunePolicy::Reassign => {
                let mut moved = 0;
                for offer in self.items.iter_mut() {
                    if !too_deep(&*offer) {
                        continue;
                    }

                    let ancestor = offer
                        .category
                        .as_deref()
                        .and_then(|id| categories.ancestor_at(id, threshold));
                    match ancestor {
                        Some(ancestor) => offer.change_category(ancestor),
                        // Broken parent chain: drop the link rather than keep a pruned one
                        None => offer.category = None,
                    }
                    moved += 1;
                }
                moved
            }
        };

        info!(level, ?policy, affected, "offer categories pruned");
        Ok(affected)
    }

    /// Re-price every offer into `target_id`
    ///
    /// All rates are checked first; on any error no offer is touched.
    /// Offers whose currency never resolved are skipped. Returns how many
    /// offers were converted.
    pub fn convert_currency(&mut self, currencies: &CurrencyList, target_id: &str) -> Result<usize> {
        let target = currencies
            .find(target_id)
            .ok_or_else(|| CatalogError::UnknownCurrency(target_id.to_string()))?;
        target.rate_to(target)?;

        for offer in self.items.iter() {
            if let Some(source) = offer.currency.as_deref().and_then(|id| currencies.find(id)) {
                source.rate_to(target)?;
            }
        }

        let mut converted = 0;
        for offer in self.items.iter_mut() {
            let Some(source) = offer.currency.as_deref().and_then(|id| currencies.find(id)) else {
                warn!(offer = offer.key(), "offer has no resolved currency, skipping conversion");
                continue;
            };

            offer.convert_currency(source, target)?;
            converted += 1;
        }

        info!(target = target_id, converted, "offers converted");
        Ok(converted)
    }
}

impl<'a> IntoIterator for &'a OfferList {
    type Item = &'a Offer;
    type IntoIter = std::slice::Iter<'a, Offer>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// TESTS
// ============================================================================
