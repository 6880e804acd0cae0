//! Domain models backing the database rows.

pub mod member;
pub mod order;
pub mod product;

pub use member::Member;
pub use order::{Order, OrderContact, OrderItem, OrderOwner};
pub use product::Product;
