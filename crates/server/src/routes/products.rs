//! Product catalog handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use beanhouse_core::ProductId;

use crate::db::products::NewProduct;
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::services::ProductService;
use crate::state::AppState;

/// Request body for product create and update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub product_name: String,
    pub product_price: i64,
    #[serde(default)]
    pub product_origin: String,
    #[serde(default)]
    pub product_stock: i64,
    #[serde(default)]
    pub image_url: String,
}

impl ProductBody {
    fn validate(&self) -> Result<NewProduct<'_>> {
        if self.product_name.trim().is_empty() {
            return Err(AppError::Validation(
                "productName must not be empty".to_owned(),
            ));
        }
        if self.product_price < 0 {
            return Err(AppError::Validation(
                "productPrice must not be negative".to_owned(),
            ));
        }
        if self.product_stock < 0 {
            return Err(AppError::Validation(
                "productStock must not be negative".to_owned(),
            ));
        }
        Ok(NewProduct {
            product_name: &self.product_name,
            product_price: self.product_price,
            product_origin: &self.product_origin,
            product_stock: self.product_stock,
            image_url: &self.image_url,
        })
    }
}

/// Catalog entry as served to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: ProductId,
    pub product_name: String,
    pub product_price: i64,
    pub product_origin: String,
    pub product_stock: i64,
    pub image_url: String,
    pub created_at: NaiveDateTime,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            product_name: p.product_name,
            product_price: p.product_price,
            product_origin: p.product_origin,
            product_stock: p.product_stock,
            image_url: p.image_url,
            created_at: p.created_at,
        }
    }
}

/// `GET /products`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductDto>>> {
    let products = ProductService::new(state.pool()).list().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// `GET /products/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductDto>> {
    let product = ProductService::new(state.pool())
        .get(ProductId::new(id))
        .await?;
    Ok(Json(product.into()))
}

/// `POST /products`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<ProductBody>,
) -> Result<(StatusCode, Json<ProductDto>)> {
    let new_product = body.validate()?;
    let now = Local::now().naive_local();
    let product = ProductService::new(state.pool())
        .create(&new_product, now)
        .await?;
    tracing::info!(product_id = %product.id, name = %product.product_name, "product added");
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `PUT /products/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ProductBody>,
) -> Result<Json<ProductDto>> {
    let new_product = body.validate()?;
    let product = ProductService::new(state.pool())
        .update(ProductId::new(id), &new_product)
        .await?;
    Ok(Json(product.into()))
}

/// `DELETE /products/{id}`
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    ProductService::new(state.pool())
        .delete(ProductId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
