//! Order aggregate with the bakery's fulfillment lifecycle.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::cart::CartItem;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::Money;

#[derive(Clone, Debug)]
pub struct Order {
    id: String,
    order_number: u64,
    customer: String,
    phone: Option<String>,
    status: OrderStatus,
    payment: PaymentStatus,
    payment_method: PaymentMethod,
    items: Vec<CartItem>,
    subtotal: Money,
    delivery_fee: Money,
    total: Money,
    zone_id: Option<String>,
    address: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PaymentMethod {
    #[default]
    Pix,
    Cash,
    Card,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("order has no items")]
    NoItems,
    #[error("order can no longer be cancelled")]
    CannotCancel,
    #[error("invalid status transition")]
    InvalidTransition,
}

impl Order {
    pub fn place(order_number: u64, customer: impl Into<String>) -> Self {
        let id = Uuid::new_v4().to_string();
        let customer = customer.into();
        let now = Utc::now();
        let mut order = Self {
            id: id.clone(),
            order_number,
            customer: customer.clone(),
            phone: None,
            status: OrderStatus::Pending,
            payment: PaymentStatus::Pending,
            payment_method: PaymentMethod::default(),
            items: vec![],
            subtotal: Money::zero(),
            delivery_fee: Money::zero(),
            total: Money::zero(),
            zone_id: None,
            address: None,
            notes: None,
            created_at: now,
            updated_at: now,
            events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed { order_id: id, customer }));
        order
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn order_number(&self) -> u64 {
        self.order_number
    }

    pub fn customer(&self) -> &str {
        &self.customer
    }

    pub fn status(&self) -> &OrderStatus {
        &self.status
    }

    pub fn payment(&self) -> &PaymentStatus {
        &self.payment
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn delivery_fee(&self) -> Money {
        self.delivery_fee
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn zone_id(&self) -> Option<&str> {
        self.zone_id.as_deref()
    }

    pub fn payment_method(&self) -> &PaymentMethod {
        &self.payment_method
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = Some(notes.into());
        self.touch();
    }

    pub fn set_contact_phone(&mut self, phone: impl Into<String>) {
        self.phone = Some(phone.into());
        self.touch();
    }

    pub fn contact_phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn add_item(&mut self, item: CartItem) {
        self.items.push(item);
        self.recalculate();
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
        self.touch();
    }

    pub fn set_delivery(&mut self, zone_id: impl Into<String>, address: Option<String>, fee: Money) {
        self.zone_id = Some(zone_id.into());
        self.address = address;
        self.delivery_fee = fee;
        self.recalculate();
    }

    pub fn confirm(&mut self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::NoItems);
        }
        if self.status != OrderStatus::Pending {
            return Err(OrderError::InvalidTransition);
        }
        self.status = OrderStatus::Confirmed;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Confirmed {
            order_id: self.id.clone(),
            total: self.total.amount(),
        }));
        Ok(())
    }

    pub fn mark_paid(&mut self) {
        self.payment = PaymentStatus::Paid;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Paid { order_id: self.id.clone() }));
    }

    pub fn start_preparing(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Confirmed {
            return Err(OrderError::InvalidTransition);
        }
        self.status = OrderStatus::Preparing;
        self.touch();
        Ok(())
    }

    pub fn dispatch(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Preparing {
            return Err(OrderError::InvalidTransition);
        }
        self.status = OrderStatus::OutForDelivery;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::OutForDelivery {
            order_id: self.id.clone(),
            zone_id: self.zone_id.clone().unwrap_or_default(),
        }));
        Ok(())
    }

    pub fn deliver(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::OutForDelivery {
            return Err(OrderError::InvalidTransition);
        }
        self.status = OrderStatus::Delivered;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Delivered { order_id: self.id.clone() }));
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if matches!(self.status, OrderStatus::Delivered | OrderStatus::Cancelled) {
            return Err(OrderError::CannotCancel);
        }
        self.status = OrderStatus::Cancelled;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Cancelled { order_id: self.id.clone() }));
        Ok(())
    }

    fn recalculate(&mut self) {
        self.subtotal = self
            .items
            .iter()
            .fold(Money::zero(), |acc, i| acc.add(i.line_total()));
        self.total = self.subtotal.add(self.delivery_fee);
        self.touch();
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

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(price: Money, qty: u32) -> CartItem {
        CartItem {
            product_id: "P1".into(),
            name: "Bolo de Pote".into(),
            quantity: qty,
            unit_price: price,
            complements: vec![],
            note: None,
        }
    }

    #[test]
    fn full_lifecycle() {
        let mut order = Order::place(1001, "Maria");
        order.add_item(item(Money::brl(dec!(12.50)), 2));
        order.set_delivery("centro", Some("Rua 1, Qd 2".into()), Money::brl(dec!(8.00)));
        assert_eq!(order.total().amount(), dec!(33.00));
        order.confirm().unwrap();
        order.mark_paid();
        order.start_preparing().unwrap();
        order.dispatch().unwrap();
        order.deliver().unwrap();
        assert_eq!(order.status(), &OrderStatus::Delivered);
    }

    #[test]
    fn confirm_requires_items() {
        let mut order = Order::place(1, "Ana");
        assert_eq!(order.confirm().unwrap_err(), OrderError::NoItems);
    }

    #[test]
    fn cannot_cancel_after_delivery() {
        let mut order = Order::place(2, "João");
        order.add_item(item(Money::brl(dec!(10)), 1));
        order.confirm().unwrap();
        order.start_preparing().unwrap();
        order.dispatch().unwrap();
        order.deliver().unwrap();
        assert_eq!(order.cancel().unwrap_err(), OrderError::CannotCancel);
    }

    #[test]
    fn out_of_order_transitions_rejected() {
        let mut order = Order::place(3, "Rita");
        order.add_item(item(Money::brl(dec!(10)), 1));
        assert_eq!(order.dispatch().unwrap_err(), OrderError::InvalidTransition);
        order.confirm().unwrap();
        assert_eq!(order.deliver().unwrap_err(), OrderError::InvalidTransition);
    }
}
