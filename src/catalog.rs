// 📚 Catalog - the whole feed as one cross-referenced model
//
// Construction order is fixed: categories → currencies → offers. Offers need
// both lists complete to resolve their references.

use crate::config::CatalogConfig;
use crate::entities::{CategoryList, CurrencyList, DeliveryOption, OfferList};
use crate::error::{CatalogError, Result};
use crate::record::FeedRecords;
use crate::validation::Validate;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cell::OnceCell;
use tracing::{info, warn};

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug)]
pub struct Catalog {
    name: Option<String>,
    company: Option<String>,
    url: Option<String>,

    /// Generation date as written in the feed; parsed lazily by `date()`
    raw_date: Option<String>,
    date: OnceCell<Option<NaiveDateTime>>,

    config: CatalogConfig,

    categories: CategoryList,
    currencies: CurrencyList,
    offers: OfferList,
    delivery_options: Vec<DeliveryOption>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Build with default configuration
    pub fn from_feed(feed: FeedRecords) -> Result<Self> {
        CatalogBuilder::new().feed(feed).build()
    }

    fn build(feed: FeedRecords, config: CatalogConfig) -> Result<Self> {
        let categories = CategoryList::from_records(&feed.categories, &config)?;
        let currencies = CurrencyList::from_records(&feed.currencies, &config);
        let offers = OfferList::new(&categories, &currencies, feed.offers);

        let delivery_options: Vec<DeliveryOption> =
            feed.delivery_options.iter().map(DeliveryOption::from).collect();

        info!(
            shop = feed.shop.name.as_deref().unwrap_or_default(),
            categories = categories.len(),
            currencies = currencies.len(),
            offers = offers.len(),
            delivery_options = delivery_options.len(),
            "catalog built"
        );

        Ok(Catalog {
            name: feed.shop.name,
            company: feed.shop.company,
            url: feed.shop.url,
            raw_date: feed.date,
            date: OnceCell::new(),
            config,
            categories,
            currencies,
            offers,
            delivery_options,
        })
    }

    // ========================================================================
    // METADATA
    // ========================================================================

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Feed generation date, parsed once and cached
    pub fn date(&self) -> Option<NaiveDateTime> {
        *self.date.get_or_init(|| {
            let raw = self.raw_date.as_deref()?;
            let parsed = parse_date(raw, &self.config.date_formats);
            if parsed.is_none() {
                warn!(date = raw, "unrecognized feed generation date");
            }
            parsed
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // ========================================================================
    // COLLECTIONS
    // ========================================================================

    pub fn categories(&self) -> &CategoryList {
        &self.categories
    }

    pub fn currencies(&self) -> &CurrencyList {
        &self.currencies
    }

    pub fn offers(&self) -> &OfferList {
        &self.offers
    }

    pub fn delivery_options(&self) -> &[DeliveryOption] {
        &self.delivery_options
    }

    pub fn invalid_offer_count(&self) -> usize {
        self.offers.iter().filter(|offer| !offer.is_valid()).count()
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    /// Keep only categories up to `level`; offers follow the prune policy
    ///
    /// Offers are pruned first, while the deeper categories still exist.
    pub fn prune(&mut self, level: i64) -> Result<()> {
        if level < 0 {
            return Err(CatalogError::InvalidLevel(level));
        }

        self.offers
            .prune_categories(&self.categories, level, self.config.prune_policy)?;
        self.categories.prune(level)?;
        Ok(())
    }

    /// Re-price every offer into the currency with id `target`
    pub fn convert_currency(&mut self, target: &str) -> Result<()> {
        self.offers.convert_currency(&self.currencies, target)?;
        Ok(())
    }
}

fn parse_date(raw: &str, formats: &[String]) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.naive_local());
    }

    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

// ============================================================================
// BUILDER
// ============================================================================

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    feed: Option<FeedRecords>,
    config: Option<CatalogConfig>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        CatalogBuilder::default()
    }

    /// Builder: extracted feed records (required)
    pub fn feed(mut self, feed: FeedRecords) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Builder: configuration (defaults when omitted)
    pub fn config(mut self, config: CatalogConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<Catalog> {
        let feed = self.feed.ok_or(CatalogError::MissingArgument("feed"))?;
        Catalog::build(feed, self.config.unwrap_or_default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
