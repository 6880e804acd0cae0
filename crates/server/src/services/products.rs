//! Product catalog service.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use thiserror::Error;

use beanhouse_core::ProductId;

use crate::db::products::NewProduct;
use crate::db::{ProductRepository, RepositoryError};
use crate::models::Product;

/// Errors from catalog workflows.
#[derive(Debug, Error)]
pub enum ProductError {
    /// The product id is not in the catalog.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// Another product already uses this name.
    #[error("product name already exists")]
    NameTaken,

    /// Repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Product catalog service.
pub struct ProductService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> ProductService<'a> {
    /// Create a new product service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// Look up a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NotFound`] for an unknown id.
    pub async fn get(&self, id: ProductId) -> Result<Product, ProductError> {
        self.products
            .get(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// List the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::Repository`] on storage failure.
    pub async fn list(&self) -> Result<Vec<Product>, ProductError> {
        Ok(self.products.list().await?)
    }

    /// Add a product.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NameTaken`] if the name is in use.
    pub async fn create(
        &self,
        new_product: &NewProduct<'_>,
        now: NaiveDateTime,
    ) -> Result<Product, ProductError> {
        self.products
            .create(new_product, now)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ProductError::NameTaken,
                other => ProductError::Repository(other),
            })
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NotFound`] for an unknown id.
    pub async fn update(
        &self,
        id: ProductId,
        new_product: &NewProduct<'_>,
    ) -> Result<Product, ProductError> {
        self.products
            .update(id, new_product)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ProductError::NotFound(id),
                other => ProductError::Repository(other),
            })
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::NotFound`] for an unknown id.
    pub async fn delete(&self, id: ProductId) -> Result<(), ProductError> {
        if self.products.delete(id).await? {
            Ok(())
        } else {
            Err(ProductError::NotFound(id))
        }
    }
}
