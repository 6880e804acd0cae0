//! Order placement and listing handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Local;
use serde::Deserialize;

use beanhouse_core::{Email, PostalCode, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::MaybeApiKey;
use crate::services::orders::{OrderDetails, OrderReceipt, OrderSummary};
use crate::services::{OrderRequest, OrderService, RequestedItem};
use crate::state::AppState;

/// Request body for `POST /orders`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    pub email: String,
    pub address: String,
    pub postal_code: String,
    #[serde(default)]
    pub items: Vec<CreateOrderItem>,
}

/// One line item in a `POST /orders` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    pub product_id: i64,
    pub quantity: i64,
}

impl CreateOrderBody {
    fn validate(self) -> Result<OrderRequest> {
        let email = Email::parse(&self.email)
            .map_err(|e| AppError::Validation(format!("email: {e}")))?;
        let postal_code = PostalCode::parse(&self.postal_code)
            .map_err(|e| AppError::Validation(format!("postalCode: {e}")))?;
        if self.address.trim().is_empty() {
            return Err(AppError::Validation("address must not be empty".to_owned()));
        }
        if self.items.is_empty() {
            return Err(AppError::Validation("items must not be empty".to_owned()));
        }

        let items = self
            .items
            .into_iter()
            .map(|item| {
                if item.quantity < 1 {
                    return Err(AppError::Validation(
                        "quantity must be at least 1".to_owned(),
                    ));
                }
                Ok(RequestedItem {
                    product_id: ProductId::new(item.product_id),
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(OrderRequest {
            email,
            address: self.address,
            postal_code,
            items,
        })
    }
}

/// `POST /orders`
pub async fn create(
    State(state): State<AppState>,
    MaybeApiKey(api_key): MaybeApiKey,
    Json(body): Json<CreateOrderBody>,
) -> Result<Json<OrderReceipt>> {
    let req = body.validate()?;
    let now = Local::now().naive_local();
    let receipt = OrderService::new(state.pool())
        .create_order(&req, api_key.as_ref(), now)
        .await?;
    tracing::info!(order_id = %receipt.id, lines = receipt.items.len(), "order placed");
    Ok(Json(receipt))
}

/// Query parameters for `GET /orders`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub email: Option<String>,
}

/// `GET /orders`
///
/// A bearer key lists the caller's member orders. Without one, `?email=`
/// lists that email's orders (member orders if registered, guest orders
/// otherwise).
pub async fn list(
    State(state): State<AppState>,
    MaybeApiKey(api_key): MaybeApiKey,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<OrderDetails>>> {
    let service = OrderService::new(state.pool());
    let now = Local::now().naive_local();

    let orders = match (api_key, query.email) {
        (Some(key), _) => service.orders_for_member(&key, now).await?,
        (None, Some(raw)) => {
            let email =
                Email::parse(&raw).map_err(|e| AppError::Validation(format!("email: {e}")))?;
            service.orders_for_email(&email, now).await?
        }
        (None, None) => {
            return Err(AppError::Validation(
                "supply a bearer API key or an email query parameter".to_owned(),
            ));
        }
    };
    Ok(Json(orders))
}

/// `GET /orders/all`
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<OrderSummary>>> {
    let now = Local::now().naive_local();
    let orders = OrderService::new(state.pool()).all_orders(now).await?;
    Ok(Json(orders))
}
