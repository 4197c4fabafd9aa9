//! Shopping cart aggregate.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::Money;

#[derive(Clone, Debug)]
pub struct Cart {
    id: String,
    customer: Option<String>,
    items: Vec<CartItem>,
    subtotal: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// Chosen complements, priced per unit of the item.
    pub complements: Vec<ChosenComplement>,
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChosenComplement {
    pub complement_id: String,
    pub name: String,
    pub price: Money,
}

impl CartItem {
    pub fn unit_total(&self) -> Money {
        self.complements
            .iter()
            .fold(self.unit_price, |acc, c| acc.add(c.price))
    }

    pub fn line_total(&self) -> Money {
        self.unit_total().multiply(self.quantity)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("item not in cart")]
    ItemNotFound,
}

impl Cart {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            customer: None,
            items: vec![],
            subtotal: Money::zero(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn for_customer(customer: impl Into<String>) -> Self {
        let mut cart = Self::new();
        cart.customer = Some(customer.into());
        cart
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer(&self) -> Option<&str> {
        self.customer.as_deref()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds an item, merging with an existing line only when product and
    /// complement selection both match (a plain cake and one with topping are
    /// different lines).
    pub fn add_item(&mut self, item: CartItem) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id && i.complements == item.complements)
        {
            existing.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
        self.recalculate();
    }

    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or(CartError::ItemNotFound)?;
        if quantity == 0 {
            self.items.retain(|i| i.product_id != product_id);
        } else {
            item.quantity = quantity;
        }
        self.recalculate();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return Err(CartError::ItemNotFound);
        }
        self.recalculate();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recalculate();
    }

    fn recalculate(&mut self) {
        self.subtotal = self
            .items
            .iter()
            .fold(Money::zero(), |acc, i| acc.add(i.line_total()));
        self.updated_at = Utc::now();
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn plain(product_id: &str, qty: u32, price: Money) -> CartItem {
        CartItem {
            product_id: product_id.into(),
            name: "Bolo".into(),
            quantity: qty,
            unit_price: price,
            complements: vec![],
            note: None,
        }
    }

    #[test]
    fn merges_identical_lines() {
        let mut cart = Cart::new();
        cart.add_item(plain("P1", 2, Money::brl(dec!(10))));
        cart.add_item(plain("P1", 1, Money::brl(dec!(10))));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.subtotal().amount(), dec!(30));
    }

    #[test]
    fn complement_selection_splits_lines() {
        let mut cart = Cart::new();
        cart.add_item(plain("P1", 1, Money::brl(dec!(10))));
        let mut with_topping = plain("P1", 1, Money::brl(dec!(10)));
        with_topping.complements.push(ChosenComplement {
            complement_id: "C1".into(),
            name: "Granulado".into(),
            price: Money::brl(dec!(2)),
        });
        cart.add_item(with_topping);
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.subtotal().amount(), dec!(22));
    }

    #[test]
    fn quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(plain("P1", 2, Money::brl(dec!(5))));
        cart.update_quantity("P1", 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.update_quantity("P1", 1).unwrap_err(), CartError::ItemNotFound);
    }
}
