//! Aggregates module
pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartError, CartItem, ChosenComplement};
pub use order::{Order, OrderError, OrderStatus, PaymentMethod, PaymentStatus};
pub use product::{Complement, Product, ProductError, ProductStatus};
