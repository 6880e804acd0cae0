//! Catalog product model.

use chrono::NaiveDateTime;

use beanhouse_core::ProductId;

/// A catalog product. Prices are integer won.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub product_name: String,
    pub product_price: i64,
    pub product_origin: String,
    pub product_stock: i64,
    pub image_url: String,
    pub created_at: NaiveDateTime,
}
