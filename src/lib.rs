// Goods Catalog - Core Library
// In-memory model of a product-catalog feed: categories, currencies, offers

pub mod error;
pub mod config;
pub mod record;         // Raw records handed over by the extraction layer
pub mod validation;     // Declarative per-field rules
pub mod collection;     // Id-indexed, insertion-ordered storage
pub mod graph;          // Category tree ordering
pub mod entities;       // Category, Currency, Offer + value objects
pub mod catalog;        // Facade: construction, prune, currency conversion

// Re-export commonly used types
pub use error::{CatalogError, Result};
pub use config::{CatalogConfig, PrunePolicy};
pub use record::{FeedRecords, OfferRecord, RawRecord, ShopRecord};
pub use validation::{FieldErrors, FieldValue, Validate, ValidationRule};
pub use collection::{Entity, IndexedCollection};
pub use graph::CategoryGraph;
pub use entities::{
    Age, Category, CategoryList, ConversionRate, Currency, CurrencyList,
    DeliveryOption, Offer, OfferList, Param,
};
pub use catalog::{Catalog, CatalogBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
