//! Arte do Sabor storefront core
//!
//! Deterministic services behind the bakery's storefront and checkout:
//!
//! ## Features
//! - PIX "copia e cola" payment payload encoding (BR Code / EMV-QR)
//! - Delivery-fee calculation by zone, fixed or haversine-distance priced
//! - Catalog, cart and order domain model
//! - Checkout assembly with WhatsApp order submission links
//!
//! Persistence, authentication, geocoding and push delivery are external
//! collaborators and are deliberately absent here; every operation in this
//! crate is a pure function over its inputs plus static configuration.

pub mod checkout;
pub mod delivery;
pub mod domain;
pub mod pix;

pub use checkout::{Checkout, CheckoutError, CheckoutSummary};
pub use delivery::{DeliveryError, DeliveryZone, FeeQuote, GeoPoint, PricingMode, ZoneCatalog};
pub use domain::aggregates::{Cart, Order, Product};
pub use domain::value_objects::{Money, Quantity, Sku};
pub use pix::{PixCharge, PixError, PixIdentity};
