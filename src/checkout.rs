//! Checkout assembly: cart + delivery quote + PIX charge → order summary and
//! the WhatsApp submission link the storefront opens for the customer.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::delivery::{DeliveryError, FeeQuote, GeoPoint, ZoneCatalog};
use crate::domain::aggregates::cart::Cart;
use crate::domain::value_objects::Money;
use crate::pix::{PixCharge, PixError, PixIdentity};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Pix(#[from] PixError),
}

/// Everything the storefront needs to present the final screen: totals, the
/// PIX code to render as QR/copy-paste, and the order-submission link.
#[derive(Clone, Debug, Serialize)]
pub struct CheckoutSummary {
    pub subtotal: Decimal,
    pub delivery: FeeQuote,
    pub total: Decimal,
    pub pix_payload: String,
    pub whatsapp_url: String,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct Checkout {
    merchant: PixIdentity,
    whatsapp_number: String,
    store_location: GeoPoint,
    zones: ZoneCatalog,
}

impl Checkout {
    pub fn new(
        merchant: PixIdentity,
        whatsapp_number: impl Into<String>,
        store_location: GeoPoint,
        zones: ZoneCatalog,
    ) -> Self {
        Self { merchant, whatsapp_number: whatsapp_number.into(), store_location, zones }
    }

    pub fn zones(&self) -> &ZoneCatalog {
        &self.zones
    }

    pub fn store_location(&self) -> GeoPoint {
        self.store_location
    }

    pub fn merchant(&self) -> &PixIdentity {
        &self.merchant
    }

    /// Prices a delivery to `zone_id`, using the configured store location
    /// for distance-priced zones.
    pub fn quote_delivery(
        &self,
        zone_id: &str,
        destination: Option<GeoPoint>,
    ) -> Result<FeeQuote, DeliveryError> {
        let zone = self.zones.find(zone_id)?;
        zone.quote(Some(self.store_location), destination)
    }

    /// Encodes a PIX charge against the configured merchant identity.
    pub fn pix_charge(&self, amount: Decimal, reference: Option<&str>) -> Result<String, PixError> {
        let charge = PixCharge::new(self.merchant.clone(), amount);
        match reference {
            Some(label) => charge.with_reference(label).encode(),
            None => charge.encode(),
        }
    }

    pub fn summarize(
        &self,
        cart: &Cart,
        zone_id: &str,
        destination: Option<GeoPoint>,
        reference: Option<&str>,
    ) -> Result<CheckoutSummary, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let zone = self.zones.find(zone_id)?;
        let delivery = zone.quote(Some(self.store_location), destination)?;
        let total = cart.subtotal().add(delivery.fee);
        let pix_payload = self.pix_charge(total.amount(), reference)?;
        let message = order_message(cart, &zone.label, delivery.fee, total);
        let whatsapp_url = whatsapp_link(&self.whatsapp_number, &message);
        Ok(CheckoutSummary {
            subtotal: cart.subtotal().amount(),
            delivery,
            total: total.amount(),
            pix_payload,
            whatsapp_url,
            message,
        })
    }
}

/// Human-readable order text the customer sends over WhatsApp.
pub fn order_message(cart: &Cart, zone_label: &str, fee: Money, total: Money) -> String {
    let mut msg = String::from("*Novo pedido - Arte do Sabor*\n\n");
    for item in cart.items() {
        msg.push_str(&format!("{}x {} - {}\n", item.quantity, item.name, item.line_total()));
        for c in &item.complements {
            msg.push_str(&format!("   + {} ({})\n", c.name, c.price));
        }
        if let Some(note) = &item.note {
            msg.push_str(&format!("   obs: {note}\n"));
        }
    }
    msg.push_str(&format!("\nEntrega ({zone_label}): {fee}\n"));
    msg.push_str(&format!("*Total: {total}*\n"));
    msg
}

/// `wa.me` deep link with the message percent-encoded into the query string.
pub fn whatsapp_link(number: &str, message: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    format!(
        "https://wa.me/{digits}?text={}",
        utf8_percent_encode(message, NON_ALPHANUMERIC)
    )
}
