//! Domain events raised by aggregates and drained by the caller.

use rust_decimal::Decimal;

#[derive(Clone, Debug)]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug)]
pub enum ProductEvent {
    Created { product_id: String },
    Published { product_id: String },
    InventoryAdded { product_id: String, quantity: u32 },
}

#[derive(Clone, Debug)]
pub enum OrderEvent {
    Placed { order_id: String, customer: String },
    Confirmed { order_id: String, total: Decimal },
    Paid { order_id: String },
    OutForDelivery { order_id: String, zone_id: String },
    Delivered { order_id: String },
    Cancelled { order_id: String },
}
