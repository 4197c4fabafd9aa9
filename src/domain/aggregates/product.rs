//! Catalog product aggregate.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::{Money, Quantity, Sku};

#[derive(Clone, Debug)]
pub struct Product {
    id: String,
    sku: Sku,
    name: String,
    description: String,
    price: Money,
    category: Option<String>,
    complements: Vec<Complement>,
    inventory: Quantity,
    status: ProductStatus,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

/// Optional extra a customer may add to an item (fillings, toppings, candles).
#[derive(Clone, Debug, PartialEq)]
pub struct Complement {
    pub id: String,
    pub name: String,
    pub price: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ProductStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    #[error("product has no name")]
    MissingName,
    #[error("insufficient inventory")]
    InsufficientInventory,
    #[error("complement not offered for this product: {0}")]
    UnknownComplement(String),
}

impl Product {
    pub fn create(sku: Sku, name: impl Into<String>, price: Money) -> Self {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut product = Self {
            id: id.clone(),
            sku,
            name: name.into(),
            description: String::new(),
            price,
            category: None,
            complements: vec![],
            inventory: Quantity::default(),
            status: ProductStatus::Draft,
            image_url: None,
            created_at: now,
            updated_at: now,
            events: vec![],
        };
        product.raise_event(DomainEvent::Product(ProductEvent::Created { product_id: id }));
        product
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn status(&self) -> &ProductStatus {
        &self.status
    }

    pub fn inventory(&self) -> Quantity {
        self.inventory
    }

    pub fn complements(&self) -> &[Complement] {
        &self.complements
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn is_in_stock(&self) -> bool {
        !self.inventory.is_zero()
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = Some(category.into());
        self.touch();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    pub fn set_image(&mut self, url: impl Into<String>) {
        self.image_url = Some(url.into());
        self.touch();
    }

    /// Registers a new complement and returns its id.
    pub fn offer_complement(&mut self, name: impl Into<String>, price: Money) -> String {
        let id = Uuid::new_v4().to_string();
        self.complements.push(Complement { id: id.clone(), name: name.into(), price });
        self.touch();
        id
    }

    pub fn complement(&self, id: &str) -> Result<&Complement, ProductError> {
        self.complements
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ProductError::UnknownComplement(id.to_string()))
    }

    pub fn publish(&mut self) -> Result<(), ProductError> {
        if self.name.is_empty() {
            return Err(ProductError::MissingName);
        }
        self.status = ProductStatus::Active;
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::Published {
            product_id: self.id.clone(),
        }));
        Ok(())
    }

    pub fn archive(&mut self) {
        self.status = ProductStatus::Archived;
        self.touch();
    }

    pub fn update_price(&mut self, new_price: Money) {
        self.price = new_price;
        self.touch();
    }

    pub fn add_inventory(&mut self, qty: u32) {
        self.inventory = self.inventory.add(qty);
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::InventoryAdded {
            product_id: self.id.clone(),
            quantity: qty,
        }));
    }

    pub fn remove_inventory(&mut self, qty: u32) -> Result<(), ProductError> {
        self.inventory = self
            .inventory
            .subtract(qty)
            .ok_or(ProductError::InsufficientInventory)?;
        self.touch();
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise_event(&mut self, e: DomainEvent) {
        self.events.push(e);
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
