//! # Order Repository
//!
//! The checkout transaction and order administration.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(request)                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CheckoutValidator::validate        (no storage touched yet)           │
//! │       │                                                                 │
//! │  BEGIN ─────────────────────────────────────────────────────────────┐  │
//! │  │ 1. INSERT order (processing, total 0)   ← takes the write lock   │  │
//! │  │ 2. for each line, in submitted order:                            │  │
//! │  │      SELECT offer  ──► missing?        OfferNotFound             │  │
//! │  │      CheckoutPlan::add_line ──► short? InsufficientStock         │  │
//! │  │ 3. INSERT order_items (unit price snapshot, subtotal)            │  │
//! │  │ 4. UPDATE offers SET quantity = quantity - n                     │  │
//! │  │       WHERE id = ? AND quantity >= n                             │  │
//! │  │       0 rows? ──► InsufficientStock                              │  │
//! │  │ 5. UPDATE order total                                            │  │
//! │  COMMIT ────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Any `?` before COMMIT drops the transaction, which rolls back.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrent Checkouts
//! The first statement is a write, so the transaction holds SQLite's write
//! lock before it reads any stock; a second checkout waits on the busy
//! timeout and then validates against the committed quantities. The guarded
//! decrement and the `CHECK (quantity >= 0)` column constraint still refuse
//! any decrement that would oversell.

use std::collections::HashMap;

use chrono::Utc;
use newworld_core::checkout::{
    CheckoutPlan, CheckoutRequest, CheckoutValidator, StandardCheckoutValidator,
};
use newworld_core::{
    CoreError, Money, Offer, Order, OrderItem, OrderStatus, OrderWithItems, StatusPolicy,
};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbResult, OrderError};
use crate::repository::offer::OFFER_COLUMNS;

const ORDER_COLUMNS: &str = "id, status, total_cents, created_at, updated_at";
const ITEM_COLUMNS: &str =
    "id, order_id, offer_id, quantity, unit_price_cents, subtotal_cents, created_at";

/// Result of a successful checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub order_id: i64,
    pub total: Money,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Runs a checkout with the standard cart rules.
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutReceipt, OrderError> {
        self.checkout_with(request, &StandardCheckoutValidator).await
    }

    /// Runs a checkout, validating the cart with `validator` first.
    ///
    /// ## Errors
    /// - `OrderError::Rejected(Validation)` for an empty cart or bad quantity
    /// - `OrderError::Rejected(OfferNotFound)` for an unknown or deleted offer
    /// - `OrderError::Rejected(InsufficientStock)` when stock is short
    /// - `OrderError::Db` when the store fails
    ///
    /// On every error path no order, item or stock change is persisted.
    pub async fn checkout_with(
        &self,
        request: &CheckoutRequest,
        validator: &dyn CheckoutValidator,
    ) -> Result<CheckoutReceipt, OrderError> {
        validator.validate(request)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (status, total_cents, created_at, updated_at)
             VALUES (?1, 0, ?2, ?2)
             RETURNING id",
        )
        .bind(OrderStatus::Processing)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        debug!(order_id, lines = request.items.len(), "Checkout started");

        let offer_sql =
            format!("SELECT {OFFER_COLUMNS} FROM offers WHERE id = ?1 AND deleted_at IS NULL");
        let mut plan = CheckoutPlan::new();

        for line in &request.items {
            let offer = sqlx::query_as::<_, Offer>(&offer_sql)
                .bind(line.offer_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(CoreError::OfferNotFound(line.offer_id))?;

            plan.add_line(line, offer.quantity, offer.price())?;
        }

        for priced in plan.lines() {
            sqlx::query(
                "INSERT INTO order_items (
                    order_id, offer_id, quantity, unit_price_cents, subtotal_cents,
                    created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            )
            .bind(order_id)
            .bind(priced.offer_id)
            .bind(priced.quantity)
            .bind(priced.unit_price.cents())
            .bind(priced.subtotal.cents())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        for (offer_id, quantity) in plan.reservations() {
            let result = sqlx::query(
                "UPDATE offers SET quantity = quantity - ?2, updated_at = ?3
                 WHERE id = ?1 AND quantity >= ?2 AND deleted_at IS NULL",
            )
            .bind(offer_id)
            .bind(quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let available: i64 = sqlx::query_scalar(
                    "SELECT COALESCE(
                        (SELECT quantity FROM offers WHERE id = ?1 AND deleted_at IS NULL), 0)",
                )
                .bind(offer_id)
                .fetch_one(&mut *tx)
                .await?;

                warn!(order_id, offer_id, available, requested = quantity, "Stock changed during checkout");
                return Err(CoreError::InsufficientStock {
                    offer_id,
                    available,
                    requested: quantity,
                }
                .into());
            }
        }

        sqlx::query("UPDATE orders SET total_cents = ?2 WHERE id = ?1")
            .bind(order_id)
            .bind(plan.total().cents())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(order_id, total = %plan.total(), "Order created");

        Ok(CheckoutReceipt {
            order_id,
            total: plan.total(),
        })
    }

    /// Gets a live order by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1 AND deleted_at IS NULL");

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets the lines of an order, in insertion order.
    pub async fn get_items(&self, order_id: i64) -> DbResult<Vec<OrderItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items
             WHERE order_id = ?1 AND deleted_at IS NULL
             ORDER BY id"
        );

        let items = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Lists every live order with its lines (admin dashboard).
    pub async fn list_with_items(&self) -> DbResult<Vec<OrderWithItems>> {
        let order_sql =
            format!("SELECT {ORDER_COLUMNS} FROM orders WHERE deleted_at IS NULL ORDER BY id");
        let orders = sqlx::query_as::<_, Order>(&order_sql)
            .fetch_all(&self.pool)
            .await?;

        let item_sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE deleted_at IS NULL ORDER BY id"
        );
        let items = sqlx::query_as::<_, OrderItem>(&item_sql)
            .fetch_all(&self.pool)
            .await?;

        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect())
    }

    /// Changes an order's status, subject to `policy`.
    ///
    /// ## Errors
    /// - `OrderError::Rejected(OrderNotFound)` for an unknown or deleted order
    /// - `OrderError::Rejected(InvalidStatusTransition)` when `policy` refuses
    pub async fn update_status(
        &self,
        id: i64,
        status: OrderStatus,
        policy: StatusPolicy,
    ) -> Result<Order, OrderError> {
        let current = self
            .get_by_id(id)
            .await?
            .ok_or(CoreError::OrderNotFound(id))?;

        policy.check(current.status, status)?;

        let sql = format!(
            "UPDATE orders SET status = ?2, updated_at = ?3
             WHERE id = ?1 AND deleted_at IS NULL
             RETURNING {ORDER_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(CoreError::OrderNotFound(id))?;

        info!(order_id = id, from = %current.status, to = %status, "Order status updated");
        Ok(updated)
    }

    /// Counts live orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use newworld_core::checkout::CartLine;
    use newworld_core::NewOffer;

    async fn db_with_offer(quantity: i64, price_cents: i64) -> (Database, Offer) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let offer = db
            .offers()
            .create(&NewOffer::new(
                "water",
                quantity,
                Money::from_cents(price_cents),
                "drink",
            ))
            .await
            .unwrap();
        (db, offer)
    }

    #[tokio::test]
    async fn test_checkout_persists_items_with_price_snapshot() {
        let (db, offer) = db_with_offer(10, 150).await;

        let receipt = db
            .orders()
            .checkout(&CheckoutRequest::new(vec![CartLine::new(offer.id, 4)]))
            .await
            .unwrap();
        assert_eq!(receipt.total.cents(), 600);

        let order = db.orders().get_by_id(receipt.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.total_cents, 600);

        let items = db.orders().get_items(receipt.order_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price_cents, 150);
        assert_eq!(items[0].subtotal_cents, 600);
    }

    #[tokio::test]
    async fn test_update_status_unknown_order() {
        let (db, _) = db_with_offer(1, 100).await;
        let err = db
            .orders()
            .update_status(99, OrderStatus::Shipped, StatusPolicy::Unrestricted)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::Rejected(CoreError::OrderNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_update_status_forward_only() {
        let (db, offer) = db_with_offer(5, 100).await;
        let receipt = db
            .orders()
            .checkout(&CheckoutRequest::new(vec![CartLine::new(offer.id, 1)]))
            .await
            .unwrap();

        let orders = db.orders();
        orders
            .update_status(receipt.order_id, OrderStatus::Shipped, StatusPolicy::ForwardOnly)
            .await
            .unwrap();

        let err = orders
            .update_status(
                receipt.order_id,
                OrderStatus::Processing,
                StatusPolicy::ForwardOnly,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::Rejected(CoreError::InvalidStatusTransition { .. })
        ));

        // Unrestricted allows moving back.
        let order = orders
            .update_status(
                receipt.order_id,
                OrderStatus::Processing,
                StatusPolicy::Unrestricted,
            )
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
    }
}
