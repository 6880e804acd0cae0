//! Order aggregate model.
//!
//! Member and guest orders are structurally identical; the [`OrderOwner`]
//! tag is what selects the backing table and the column the window
//! uniqueness constraint hangs off. Line items are plain values owned by
//! their order and reference products by id only.

use chrono::NaiveDateTime;

use beanhouse_core::{Email, MemberId, OrderId, ProductId};

/// Who an order window belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOwner {
    /// A resolved, registered member.
    Member(MemberId),
    /// An unregistered customer, keyed by raw email.
    Guest(Email),
}

impl OrderOwner {
    /// Whether this is a guest order.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }
}

/// A persisted order aggregate with its line items.
///
/// `status` is the label written at creation time; display status is
/// always recomputed from `created_at`, never read back from here.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub owner: OrderOwner,
    pub window_start: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub status: String,
    pub items: Vec<OrderItem>,
}

/// A line item, joined with the catalog data needed for display.
///
/// At most one line exists per distinct product within an order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_price: i64,
    pub quantity: i64,
}

/// Contact details attached to an order for listing purposes.
///
/// For member orders these come from the member row; guest orders carry
/// them inline.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderContact {
    pub email: String,
    pub address: String,
    pub postal_code: String,
}
