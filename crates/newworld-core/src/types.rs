//! # Domain Types
//!
//! Core domain types used throughout the New World store.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Offer       │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  username  (U)  │   │  name      (U)  │   │  status         │       │
//! │  │  email     (U)  │   │  quantity ≥ 0   │   │  total_cents    │       │
//! │  │  role           │   │  price_cents    │   │                 │       │
//! │  └─────────────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │                                 │ (lookup only)       │ (owns)          │
//! │                                 │   ┌─────────────────▼────────┐       │
//! │                                 └──►│        OrderItem         │       │
//! │                                     │  offer_id, quantity      │       │
//! │                                     │  unit_price_cents (snap) │       │
//! │                                     │  subtotal_cents          │       │
//! │                                     └──────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `(U)` marks globally unique columns. Ids are database-assigned integers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// Authorization role carried by every user and every bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account.
///
/// The password hash never leaves the server: it is skipped by serde and by
/// the generated TypeScript bindings.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,

    /// PHC-formatted salted hash.
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,

    pub role: Role,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Offer
// =============================================================================

/// A purchasable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Offer {
    pub id: i64,

    /// Unique catalog name; the supplies sync upserts by it.
    pub name: String,

    /// Quantity on hand. Never negative.
    pub quantity: i64,

    /// Unit price in cents.
    pub price_cents: i64,

    pub category: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Input for creating or upserting an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOffer {
    pub name: String,
    pub quantity: i64,
    pub price_cents: i64,
    pub category: String,
}

impl NewOffer {
    pub fn new(
        name: impl Into<String>,
        quantity: i64,
        price: Money,
        category: impl Into<String>,
    ) -> Self {
        NewOffer {
            name: name.into(),
            quantity,
            price_cents: price.cents(),
            category: category.into(),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment status of an order.
///
/// ```text
/// processing ──► preparing ──► shipped ──► delivered
/// ```
///
/// New orders always start in `processing`. Which moves are allowed is
/// decided by [`StatusPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Preparing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Every accepted status, in fulfilment order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Processing,
        OrderStatus::Preparing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Processing
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Status Policy
// =============================================================================

/// Rule applied when an admin changes an order's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Any status in the fixed set is accepted from any current status.
    #[default]
    Unrestricted,
    /// The target must not be earlier than the current status.
    ForwardOnly,
}

impl StatusPolicy {
    pub fn from_forward_only(forward_only: bool) -> Self {
        if forward_only {
            StatusPolicy::ForwardOnly
        } else {
            StatusPolicy::Unrestricted
        }
    }

    /// Checks a transition from `current` to `target`.
    pub fn check(&self, current: OrderStatus, target: OrderStatus) -> CoreResult<()> {
        match self {
            StatusPolicy::Unrestricted => Ok(()),
            StatusPolicy::ForwardOnly if target >= current => Ok(()),
            StatusPolicy::ForwardOnly => Err(CoreError::InvalidStatusTransition {
                from: current.to_string(),
                to: target.to_string(),
            }),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A committed purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    pub status: OrderStatus,
    /// Sum of the line subtotals, in cents.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// One line of an order.
/// Uses the snapshot pattern: the unit price is frozen at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub offer_id: i64,
    pub quantity: i64,
    /// Unit price in cents at time of purchase (frozen).
    pub unit_price_cents: i64,
    /// unit_price × quantity.
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// An order together with its lines, as shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderWithItems {
    #[serde(flatten)]
    #[ts(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Processing);
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!("shipped".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
        assert_eq!(
            "processing".parse::<OrderStatus>(),
            Ok(OrderStatus::Processing)
        );

        let err = "cancelled".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
        // Matching is exact.
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_serde() {
        let json = serde_json::to_string(&OrderStatus::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");
    }

    #[test]
    fn test_unrestricted_policy_accepts_any_move() {
        let policy = StatusPolicy::default();
        assert!(policy
            .check(OrderStatus::Processing, OrderStatus::Delivered)
            .is_ok());
        assert!(policy
            .check(OrderStatus::Delivered, OrderStatus::Processing)
            .is_ok());
    }

    #[test]
    fn test_forward_only_policy() {
        let policy = StatusPolicy::from_forward_only(true);
        assert!(policy
            .check(OrderStatus::Processing, OrderStatus::Shipped)
            .is_ok());
        assert!(policy
            .check(OrderStatus::Shipped, OrderStatus::Shipped)
            .is_ok());

        let err = policy
            .check(OrderStatus::Shipped, OrderStatus::Preparing)
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidStatusTransition {
                from: "shipped".to_string(),
                to: "preparing".to_string(),
            }
        );
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let now = Utc::now();
        let user = User {
            id: 1,
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::User,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password_hash"));
    }
}
