//! Product catalog repository.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use beanhouse_core::ProductId;

use super::{RepositoryError, conflict_on_unique};
use crate::models::Product;

const PRODUCT_COLUMNS: &str =
    "id, product_name, product_price, product_origin, product_stock, image_url, created_at";

/// Fields for creating or replacing a product.
#[derive(Debug)]
pub struct NewProduct<'a> {
    pub product_name: &'a str,
    pub product_price: i64,
    pub product_origin: &'a str,
    pub product_stock: i64,
    pub image_url: &'a str,
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// List the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY id");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken,
    /// `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        new_product: &NewProduct<'_>,
        now: NaiveDateTime,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO product (product_name, product_price, product_origin, product_stock, image_url, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(new_product.product_name)
            .bind(new_product.product_price)
            .bind(new_product.product_origin)
            .bind(new_product.product_stock)
            .bind(new_product.image_url)
            .bind(now)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "product name already exists"))
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn update(
        &self,
        id: ProductId,
        new_product: &NewProduct<'_>,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE product SET \
                product_name = ?1, product_price = ?2, product_origin = ?3, \
                product_stock = ?4, image_url = ?5 \
             WHERE id = ?6 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(new_product.product_name)
            .bind(new_product.product_price)
            .bind(new_product.product_origin)
            .bind(new_product.product_stock)
            .bind(new_product.image_url)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Delete a product.
    ///
    /// Returns `true` if a row was deleted, `false` if the id was unknown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = ?1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    const ETHIOPIA: NewProduct<'static> = NewProduct {
        product_name: "Ethiopia Sidamo",
        product_price: 12000,
        product_origin: "Ethiopia",
        product_stock: 50,
        image_url: "",
    };

    #[tokio::test]
    async fn crud_roundtrip() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);

        let created = repo.create(&ETHIOPIA, now()).await.unwrap();
        assert_eq!(created.product_name, "Ethiopia Sidamo");

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.product_price, 12000);

        let updated = repo
            .update(
                created.id,
                &NewProduct {
                    product_price: 13000,
                    ..ETHIOPIA
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.product_price, 13000);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get(created.id).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn update_of_missing_product_is_not_found() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);
        let err = repo.update(ProductId::new(7), &ETHIOPIA).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
