// Entity Models
//
// Identified entities (Category, Currency, Offer) live in their list types,
// each list wrapping one IndexedCollection. Age, Param and DeliveryOption
// have no identity and are owned by whoever holds them.

pub mod category;
pub mod currency;
pub mod extras;
pub mod offer;

pub use category::{Category, CategoryList, ROOT_PARENT_ID};
pub use currency::{ConversionRate, Currency, CurrencyList, DEFAULT_PLUS, DEFAULT_RATE};
pub use extras::{Age, DeliveryOption, Param};
pub use offer::{Offer, OfferList};
