//! Order window store.
//!
//! One repository serves both member and guest orders; the
//! [`OrderOwner`] tag picks the table pair and the owner column. The
//! member/guest schemas are deliberately parallel so every routine here
//! is written once against the tag instead of twice per entity.
//!
//! Creation is optimistic: the caller first looks up the open window
//! order, and if a concurrent request wins the insert race the UNIQUE
//! `(owner, window_start)` index turns the second insert into
//! [`RepositoryError::Conflict`], which the service layer retries as a
//! merge.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use beanhouse_core::{DeliveryStatus, Email, MemberId, OrderId, OrderWindow, ProductId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{Order, OrderContact, OrderItem, OrderOwner};

/// A requested line after catalog resolution: one entry per distinct
/// product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Everything needed to open a new window order.
///
/// `address` and `postal_code` are persisted for guest orders only;
/// member orders resolve contact data through the member row.
#[derive(Debug)]
pub struct NewOrder<'a> {
    pub owner: &'a OrderOwner,
    pub address: &'a str,
    pub postal_code: &'a str,
    pub window: OrderWindow,
    pub created_at: NaiveDateTime,
    pub status: DeliveryStatus,
    pub lines: &'a [OrderLine],
}

/// Order header row shared by both tables.
#[derive(sqlx::FromRow)]
struct HeadRow {
    id: OrderId,
    window_start: NaiveDateTime,
    created_at: NaiveDateTime,
    status: String,
}

impl HeadRow {
    fn into_order(self, owner: OrderOwner, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            owner,
            window_start: self.window_start,
            created_at: self.created_at,
            status: self.status,
            items,
        }
    }
}

/// Member order joined with its owner's contact columns.
#[derive(sqlx::FromRow)]
struct MemberListRow {
    id: OrderId,
    member_id: MemberId,
    window_start: NaiveDateTime,
    created_at: NaiveDateTime,
    status: String,
    email: String,
    address: String,
    postal_code: String,
}

/// Guest order with its inline contact columns.
#[derive(sqlx::FromRow)]
struct GuestListRow {
    id: OrderId,
    window_start: NaiveDateTime,
    created_at: NaiveDateTime,
    status: String,
    email: String,
    address: String,
    postal_code: String,
}

/// Repository for order window storage.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Find the owner's open order for the given window, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_open_order(
        &self,
        owner: &OrderOwner,
        window: OrderWindow,
    ) -> Result<Option<Order>, RepositoryError> {
        let head = match owner {
            OrderOwner::Member(member_id) => {
                sqlx::query_as::<_, HeadRow>(
                    "SELECT id, window_start, created_at, status FROM member_order \
                     WHERE member_id = ?1 AND window_start = ?2",
                )
                .bind(*member_id)
                .bind(window.start())
                .fetch_optional(self.pool)
                .await?
            }
            OrderOwner::Guest(email) => {
                sqlx::query_as::<_, HeadRow>(
                    "SELECT id, window_start, created_at, status FROM guest_order \
                     WHERE email = ?1 AND window_start = ?2",
                )
                .bind(email.as_str())
                .bind(window.start())
                .fetch_optional(self.pool)
                .await?
            }
        };

        match head {
            None => Ok(None),
            Some(head) => {
                let items = self.load_items(owner, head.id).await?;
                Ok(Some(head.into_order(owner.clone(), items)))
            }
        }
    }

    /// Open a new window order with its line items, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another order already holds
    /// this `(owner, window_start)` slot — the caller lost a create race
    /// and should merge instead. Returns `RepositoryError::Database` for
    /// other failures.
    pub async fn create(&self, new_order: &NewOrder<'_>) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = match new_order.owner {
            OrderOwner::Member(member_id) => {
                sqlx::query_scalar::<_, OrderId>(
                    "INSERT INTO member_order (member_id, window_start, created_at, status) \
                     VALUES (?1, ?2, ?3, ?4) RETURNING id",
                )
                .bind(*member_id)
                .bind(new_order.window.start())
                .bind(new_order.created_at)
                .bind(new_order.status.as_str())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| conflict_on_unique(e, "order window already open"))?
            }
            OrderOwner::Guest(email) => {
                sqlx::query_scalar::<_, OrderId>(
                    "INSERT INTO guest_order (email, address, postal_code, window_start, created_at, status) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
                )
                .bind(email.as_str())
                .bind(new_order.address)
                .bind(new_order.postal_code)
                .bind(new_order.window.start())
                .bind(new_order.created_at)
                .bind(new_order.status.as_str())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| conflict_on_unique(e, "order window already open"))?
            }
        };

        let item_sql = match new_order.owner {
            OrderOwner::Member(_) => {
                "INSERT INTO member_order_item (order_id, product_id, quantity) VALUES (?1, ?2, ?3)"
            }
            OrderOwner::Guest(_) => {
                "INSERT INTO guest_order_item (order_id, product_id, quantity) VALUES (?1, ?2, ?3)"
            }
        };
        for line in new_order.lines {
            sqlx::query(item_sql)
                .bind(id)
                .bind(line.product_id)
                .bind(line.quantity)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let items = self.load_items(new_order.owner, id).await?;
        Ok(Order {
            id,
            owner: new_order.owner.clone(),
            window_start: new_order.window.start(),
            created_at: new_order.created_at,
            status: new_order.status.as_str().to_owned(),
            items,
        })
    }

    /// Merge requested lines into an existing order, atomically.
    ///
    /// Bumps the order's `created_at` to `now` (a later request in the
    /// same window refreshes the marker) and increments the quantity of
    /// any line that already exists for the product, appending the rest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn merge(
        &self,
        order: &Order,
        now: NaiveDateTime,
        lines: &[OrderLine],
    ) -> Result<Order, RepositoryError> {
        let (head_sql, item_sql) = match order.owner {
            OrderOwner::Member(_) => (
                "UPDATE member_order SET created_at = ?1 WHERE id = ?2",
                "INSERT INTO member_order_item (order_id, product_id, quantity) VALUES (?1, ?2, ?3) \
                 ON CONFLICT (order_id, product_id) DO UPDATE SET quantity = quantity + excluded.quantity",
            ),
            OrderOwner::Guest(_) => (
                "UPDATE guest_order SET created_at = ?1 WHERE id = ?2",
                "INSERT INTO guest_order_item (order_id, product_id, quantity) VALUES (?1, ?2, ?3) \
                 ON CONFLICT (order_id, product_id) DO UPDATE SET quantity = quantity + excluded.quantity",
            ),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(head_sql)
            .bind(now)
            .bind(order.id)
            .execute(&mut *tx)
            .await?;

        for line in lines {
            sqlx::query(item_sql)
                .bind(order.id)
                .bind(line.product_id)
                .bind(line.quantity)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let items = self.load_items(&order.owner, order.id).await?;
        Ok(Order {
            created_at: now,
            items,
            ..order.clone()
        })
    }

    /// All orders for a member, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_member(
        &self,
        member_id: MemberId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let heads = sqlx::query_as::<_, HeadRow>(
            "SELECT id, window_start, created_at, status FROM member_order \
             WHERE member_id = ?1 ORDER BY created_at DESC",
        )
        .bind(member_id)
        .fetch_all(self.pool)
        .await?;

        let owner = OrderOwner::Member(member_id);
        let mut orders = Vec::with_capacity(heads.len());
        for head in heads {
            let items = self.load_items(&owner, head.id).await?;
            orders.push(head.into_order(owner.clone(), items));
        }
        Ok(orders)
    }

    /// All guest orders for an email, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_guest(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        let heads = sqlx::query_as::<_, HeadRow>(
            "SELECT id, window_start, created_at, status FROM guest_order \
             WHERE email = ?1 ORDER BY created_at DESC",
        )
        .bind(email.as_str())
        .fetch_all(self.pool)
        .await?;

        let owner = OrderOwner::Guest(email.clone());
        let mut orders = Vec::with_capacity(heads.len());
        for head in heads {
            let items = self.load_items(&owner, head.id).await?;
            orders.push(head.into_order(owner.clone(), items));
        }
        Ok(orders)
    }

    /// Every order in the system — member and guest — with the contact
    /// details to display next to it, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` or `DataCorruption` if member
    /// rows hold an invalid email.
    pub async fn list_all(&self) -> Result<Vec<(Order, OrderContact)>, RepositoryError> {
        let member_rows = sqlx::query_as::<_, MemberListRow>(
            "SELECT o.id, o.member_id, o.window_start, o.created_at, o.status, \
                    m.email, m.address, m.postal_code \
             FROM member_order o JOIN member m ON m.id = o.member_id",
        )
        .fetch_all(self.pool)
        .await?;

        let guest_rows = sqlx::query_as::<_, GuestListRow>(
            "SELECT id, window_start, created_at, status, email, address, postal_code \
             FROM guest_order",
        )
        .fetch_all(self.pool)
        .await?;

        let mut all = Vec::with_capacity(member_rows.len() + guest_rows.len());

        for row in member_rows {
            let owner = OrderOwner::Member(row.member_id);
            let items = self.load_items(&owner, row.id).await?;
            let contact = OrderContact {
                email: row.email,
                address: row.address,
                postal_code: row.postal_code,
            };
            let order = Order {
                id: row.id,
                owner,
                window_start: row.window_start,
                created_at: row.created_at,
                status: row.status,
                items,
            };
            all.push((order, contact));
        }

        for row in guest_rows {
            let email = Email::parse(&row.email).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid guest email in database: {e}"))
            })?;
            let owner = OrderOwner::Guest(email);
            let items = self.load_items(&owner, row.id).await?;
            let contact = OrderContact {
                email: row.email,
                address: row.address,
                postal_code: row.postal_code,
            };
            let order = Order {
                id: row.id,
                owner,
                window_start: row.window_start,
                created_at: row.created_at,
                status: row.status,
                items,
            };
            all.push((order, contact));
        }

        all.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));
        Ok(all)
    }

    /// Load an order's line items joined with catalog display data.
    async fn load_items(
        &self,
        owner: &OrderOwner,
        order_id: OrderId,
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let sql = match owner {
            OrderOwner::Member(_) => {
                "SELECT i.product_id, p.product_name, p.product_price, i.quantity \
                 FROM member_order_item i JOIN product p ON p.id = i.product_id \
                 WHERE i.order_id = ?1 ORDER BY i.id"
            }
            OrderOwner::Guest(_) => {
                "SELECT i.product_id, p.product_name, p.product_price, i.quantity \
                 FROM guest_order_item i JOIN product p ON p.id = i.product_id \
                 WHERE i.order_id = ?1 ORDER BY i.id"
            }
        };

        let items = sqlx::query_as::<_, OrderItem>(sql)
            .bind(order_id)
            .fetch_all(self.pool)
            .await?;
        Ok(items)
    }
}
