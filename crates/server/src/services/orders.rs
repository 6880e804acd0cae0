//! Order assembly: resolving who is ordering, finding or opening the
//! right delivery-window order, and merging line items into it.
//!
//! All entry points take `now` as a parameter; nothing in here reads a
//! clock, so tests can place orders at any instant they like.

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;

use beanhouse_core::{ApiKey, DeliveryStatus, Email, OrderId, OrderWindow, ProductId};

use crate::db::orders::{NewOrder, OrderLine};
use crate::db::{MemberRepository, OrderRepository, ProductRepository, RepositoryError};
use crate::models::{Order, OrderItem, OrderOwner};

/// Errors from the order workflows.
#[derive(Debug, Error)]
pub enum OrderError {
    /// An API key was supplied but resolves to no member.
    #[error("invalid API key")]
    InvalidApiKey,

    /// The authenticated member's email differs from the order email.
    #[error("order email does not match the authenticated member")]
    EmailMismatch,

    /// A requested product id is not in the catalog.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A validated order request, as produced by the HTTP layer.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub email: Email,
    pub address: String,
    pub postal_code: beanhouse_core::PostalCode,
    pub items: Vec<RequestedItem>,
}

/// One requested line item. Quantity is validated (≥ 1) upstream.
#[derive(Debug, Clone)]
pub struct RequestedItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Response projection for a created or merged order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub id: OrderId,
    pub email: String,
    pub address: String,
    pub postal_code: String,
    pub created_at: NaiveDateTime,
    pub status: DeliveryStatus,
    pub items: Vec<ReceiptItem>,
}

/// One projected line item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i64,
}

impl From<OrderItem> for ReceiptItem {
    fn from(item: OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            product_name: item.product_name,
            unit_price: item.product_price,
            quantity: item.quantity,
        }
    }
}

/// An order in a per-identity listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub order_id: OrderId,
    pub order_time: NaiveDateTime,
    pub status: DeliveryStatus,
    pub items: Vec<ReceiptItem>,
}

/// An order in the all-orders listing, with owner contact details.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub email: String,
    pub address: String,
    pub postal_code: String,
    pub order_time: NaiveDateTime,
    pub status: DeliveryStatus,
    pub items: Vec<ReceiptItem>,
}

/// Order assembly and query service.
pub struct OrderService<'a> {
    members: MemberRepository<'a>,
    products: ProductRepository<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            members: MemberRepository::new(pool),
            products: ProductRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order: merge into the owner's open window order if one
    /// exists, open a new one otherwise.
    ///
    /// # Errors
    ///
    /// - [`OrderError::InvalidApiKey`] if a key is supplied but unknown.
    /// - [`OrderError::EmailMismatch`] if the key's member email differs
    ///   from the request email.
    /// - [`OrderError::ProductNotFound`] if any requested product id is
    ///   unknown; nothing is persisted in that case.
    /// - [`OrderError::Repository`] for storage failures. A lost create
    ///   race is not an error: it is retried once as a merge.
    pub async fn create_order(
        &self,
        req: &OrderRequest,
        api_key: Option<&ApiKey>,
        now: NaiveDateTime,
    ) -> Result<OrderReceipt, OrderError> {
        let owner = self.resolve_owner(&req.email, api_key).await?;
        let window = OrderWindow::containing(now);
        let lines = self.resolve_lines(&req.items).await?;

        let order = match self.orders.find_open_order(&owner, window).await? {
            Some(existing) => self.orders.merge(&existing, now, &lines).await?,
            None => {
                let new_order = NewOrder {
                    owner: &owner,
                    address: &req.address,
                    postal_code: req.postal_code.as_str(),
                    window,
                    created_at: now,
                    status: DeliveryStatus::Preparing,
                    lines: &lines,
                };
                match self.orders.create(&new_order).await {
                    Ok(order) => order,
                    Err(RepositoryError::Conflict(_)) => {
                        // Lost the create race; the winner holds the
                        // window now, so merge into it.
                        let existing = self
                            .orders
                            .find_open_order(&owner, window)
                            .await?
                            .ok_or_else(|| {
                                RepositoryError::DataCorruption(
                                    "window order vanished after create conflict".to_owned(),
                                )
                            })?;
                        self.orders.merge(&existing, now, &lines).await?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        Ok(project_receipt(order, req, now))
    }

    /// All orders belonging to the member behind `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidApiKey`] if the key is unknown.
    pub async fn orders_for_member(
        &self,
        api_key: &ApiKey,
        now: NaiveDateTime,
    ) -> Result<Vec<OrderDetails>, OrderError> {
        let member = self
            .members
            .find_by_api_key(api_key)
            .await?
            .ok_or(OrderError::InvalidApiKey)?;

        let orders = self.orders.list_for_member(member.id).await?;
        Ok(orders.into_iter().map(|o| project_details(o, now)).collect())
    }

    /// All orders for an email: the member's orders if the email is
    /// registered, that email's guest orders otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Repository`] on storage failure.
    pub async fn orders_for_email(
        &self,
        email: &Email,
        now: NaiveDateTime,
    ) -> Result<Vec<OrderDetails>, OrderError> {
        let orders = match self.members.find_by_email(email).await? {
            Some(member) => self.orders.list_for_member(member.id).await?,
            None => self.orders.list_for_guest(email).await?,
        };
        Ok(orders.into_iter().map(|o| project_details(o, now)).collect())
    }

    /// Every order in the system with owner contact details.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Repository`] on storage failure.
    pub async fn all_orders(&self, now: NaiveDateTime) -> Result<Vec<OrderSummary>, OrderError> {
        let all = self.orders.list_all().await?;
        Ok(all
            .into_iter()
            .map(|(order, contact)| OrderSummary {
                email: contact.email,
                address: contact.address,
                postal_code: contact.postal_code,
                order_time: order.created_at,
                status: DeliveryStatus::at(order.created_at, now),
                items: order.items.into_iter().map(ReceiptItem::from).collect(),
            })
            .collect())
    }

    /// Decide whose order this is.
    ///
    /// A supplied key must resolve and match the request email. Without a
    /// key, a registered email still gets a member order; anything else
    /// is a guest order.
    async fn resolve_owner(
        &self,
        email: &Email,
        api_key: Option<&ApiKey>,
    ) -> Result<OrderOwner, OrderError> {
        match api_key {
            Some(key) => {
                let member = self
                    .members
                    .find_by_api_key(key)
                    .await?
                    .ok_or(OrderError::InvalidApiKey)?;
                if member.email != *email {
                    return Err(OrderError::EmailMismatch);
                }
                Ok(OrderOwner::Member(member.id))
            }
            None => Ok(match self.members.find_by_email(email).await? {
                Some(member) => OrderOwner::Member(member.id),
                None => OrderOwner::Guest(email.clone()),
            }),
        }
    }

    /// Check every requested product against the catalog and coalesce
    /// duplicate product ids into single lines, preserving request order.
    ///
    /// Failing any lookup aborts the whole order before a write happens.
    async fn resolve_lines(&self, items: &[RequestedItem]) -> Result<Vec<OrderLine>, OrderError> {
        let mut lines: Vec<OrderLine> = Vec::with_capacity(items.len());
        for item in items {
            if self.products.get(item.product_id).await?.is_none() {
                return Err(OrderError::ProductNotFound(item.product_id));
            }
            match lines.iter_mut().find(|l| l.product_id == item.product_id) {
                Some(line) => line.quantity += item.quantity,
                None => lines.push(OrderLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                }),
            }
        }
        Ok(lines)
    }
}

fn project_receipt(order: Order, req: &OrderRequest, now: NaiveDateTime) -> OrderReceipt {
    OrderReceipt {
        id: order.id,
        // Contact details echo the request, not the stored member row.
        email: req.email.to_string(),
        address: req.address.clone(),
        postal_code: req.postal_code.to_string(),
        created_at: order.created_at,
        status: DeliveryStatus::at(order.created_at, now),
        items: order.items.into_iter().map(ReceiptItem::from).collect(),
    }
}

fn project_details(order: Order, now: NaiveDateTime) -> OrderDetails {
    OrderDetails {
        order_id: order.id,
        order_time: order.created_at,
        status: DeliveryStatus::at(order.created_at, now),
        items: order.items.into_iter().map(ReceiptItem::from).collect(),
    }
}
