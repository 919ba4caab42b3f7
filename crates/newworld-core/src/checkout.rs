//! # Checkout Module
//!
//! Pure part of the checkout engine: cart validation and pricing.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout Flow                                   │
//! │                                                                         │
//! │  CheckoutRequest { items: [CartLine, ...] }                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CheckoutValidator::validate  (non-empty, quantity >= 1)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌── inside the database transaction (newworld-db) ──────────────┐     │
//! │  │  for each line, in submitted order:                           │     │
//! │  │     read offer ──► CheckoutPlan::add_line(line, stock, price) │     │
//! │  │                     ├── OfferNotFound    → rollback           │     │
//! │  │                     └── InsufficientStock → rollback          │     │
//! │  │  insert order + items, guarded stock decrements, commit       │     │
//! │  └───────────────────────────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`CheckoutPlan`] never touches storage; the repository feeds it the
//! offers it read and persists what the plan computed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{validate_quantity, ValidationResult};

// =============================================================================
// Cart Input
// =============================================================================

/// One requested line of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub offer_id: i64,
    pub quantity: i64,
}

impl CartLine {
    pub const fn new(offer_id: i64, quantity: i64) -> Self {
        CartLine { offer_id, quantity }
    }
}

/// Body of `POST /auth/checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CartLine>,
}

impl CheckoutRequest {
    pub fn new(items: Vec<CartLine>) -> Self {
        CheckoutRequest { items }
    }
}

// =============================================================================
// Validator Capability
// =============================================================================

/// Shape checks run on a cart before any storage is touched.
///
/// Injected into the checkout service so alternative rules can be swapped in
/// without touching shared state.
pub trait CheckoutValidator: Send + Sync {
    fn validate(&self, request: &CheckoutRequest) -> ValidationResult<()>;
}

/// Default rules: the cart is non-empty and every quantity is at least 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCheckoutValidator;

impl CheckoutValidator for StandardCheckoutValidator {
    fn validate(&self, request: &CheckoutRequest) -> ValidationResult<()> {
        if request.items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            });
        }

        for line in &request.items {
            if line.offer_id <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "offer_id".to_string(),
                });
            }
            validate_quantity(line.quantity)?;
        }

        Ok(())
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// A validated, priced cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub offer_id: i64,
    pub quantity: i64,
    /// Price read at validation time; copied onto the order item.
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Prices a single line against the stock and price read for its offer.
///
/// ## Example
/// ```rust
/// use newworld_core::checkout::{price_line, CartLine};
/// use newworld_core::{CoreError, Money};
///
/// let ok = price_line(&CartLine::new(1, 10), 10, Money::from_cents(100)).unwrap();
/// assert_eq!(ok.subtotal.cents(), 1000);
///
/// let err = price_line(&CartLine::new(1, 11), 10, Money::from_cents(100)).unwrap_err();
/// assert!(matches!(err, CoreError::InsufficientStock { offer_id: 1, .. }));
/// ```
pub fn price_line(line: &CartLine, available: i64, unit_price: Money) -> CoreResult<PricedLine> {
    if line.quantity > available {
        return Err(CoreError::InsufficientStock {
            offer_id: line.offer_id,
            available,
            requested: line.quantity,
        });
    }

    let subtotal = unit_price
        .checked_mul_quantity(line.quantity)
        .ok_or(CoreError::AmountOverflow {
            offer_id: line.offer_id,
        })?;

    Ok(PricedLine {
        offer_id: line.offer_id,
        quantity: line.quantity,
        unit_price,
        subtotal,
    })
}

// =============================================================================
// Checkout Plan
// =============================================================================

/// Accumulates priced lines and the order total for one checkout.
///
/// Repeated lines for the same offer are checked cumulatively: the plan
/// remembers how much of each offer earlier lines already reserved.
#[derive(Debug, Clone, Default)]
pub struct CheckoutPlan {
    lines: Vec<PricedLine>,
    reserved: HashMap<i64, i64>,
    order: Vec<i64>,
    total: Money,
}

impl CheckoutPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a line priced against `available` units at `unit_price`.
    ///
    /// On error the plan is left unchanged.
    pub fn add_line(
        &mut self,
        line: &CartLine,
        available: i64,
        unit_price: Money,
    ) -> CoreResult<&PricedLine> {
        let already = self.reserved.get(&line.offer_id).copied().unwrap_or(0);
        let remaining = available - already;

        let priced = price_line(line, remaining, unit_price).map_err(|err| match err {
            CoreError::InsufficientStock { offer_id, .. } => CoreError::InsufficientStock {
                offer_id,
                available,
                requested: already.saturating_add(line.quantity),
            },
            other => other,
        })?;

        let total = self
            .total
            .checked_add(priced.subtotal)
            .ok_or(CoreError::AmountOverflow {
                offer_id: line.offer_id,
            })?;

        if already == 0 {
            self.order.push(line.offer_id);
        }
        self.reserved.insert(line.offer_id, already + line.quantity);
        self.total = total;
        self.lines.push(priced);

        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Priced lines, in submitted order.
    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    /// Sum of all line subtotals.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Total quantity to take from each offer, in first-seen order.
    pub fn reservations(&self) -> Vec<(i64, i64)> {
        self.order
            .iter()
            .map(|id| (*id, self.reserved.get(id).copied().unwrap_or(0)))
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_rejects_empty_cart() {
        let err = StandardCheckoutValidator
            .validate(&CheckoutRequest::default())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Required {
                field: "items".to_string()
            }
        );
    }

    #[test]
    fn test_validator_rejects_non_positive_quantity() {
        let req = CheckoutRequest::new(vec![CartLine::new(1, 2), CartLine::new(2, 0)]);
        assert!(matches!(
            StandardCheckoutValidator.validate(&req),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_validator_accepts_valid_cart() {
        let req = CheckoutRequest::new(vec![CartLine::new(1, 1), CartLine::new(7, 3)]);
        assert!(StandardCheckoutValidator.validate(&req).is_ok());
    }

    #[test]
    fn test_price_line_exact_stock() {
        let line = price_line(&CartLine::new(1, 10), 10, Money::from_cents(200)).unwrap();
        assert_eq!(line.subtotal.cents(), 2000);
        assert_eq!(line.unit_price.cents(), 200);
    }

    #[test]
    fn test_price_line_insufficient_stock() {
        let err = price_line(&CartLine::new(1, 11), 10, Money::from_cents(200)).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                offer_id: 1,
                available: 10,
                requested: 11
            }
        );
    }

    #[test]
    fn test_price_line_overflow() {
        let err = price_line(&CartLine::new(3, 2), 10, Money::from_cents(i64::MAX)).unwrap_err();
        assert_eq!(err, CoreError::AmountOverflow { offer_id: 3 });
    }

    #[test]
    fn test_plan_total_is_sum_of_subtotals() {
        let mut plan = CheckoutPlan::new();
        plan.add_line(&CartLine::new(1, 2), 10, Money::from_cents(200))
            .unwrap();
        plan.add_line(&CartLine::new(2, 3), 5, Money::from_cents(900))
            .unwrap();

        let expected: Money = plan.lines().iter().map(|l| l.subtotal).sum();
        assert_eq!(plan.total(), expected);
        assert_eq!(plan.total().cents(), 400 + 2700);
    }

    #[test]
    fn test_plan_repeated_offer_is_cumulative() {
        let mut plan = CheckoutPlan::new();
        plan.add_line(&CartLine::new(1, 6), 10, Money::from_cents(100))
            .unwrap();

        let err = plan
            .add_line(&CartLine::new(1, 6), 10, Money::from_cents(100))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                offer_id: 1,
                available: 10,
                requested: 12
            }
        );

        // Failed line left no trace.
        assert_eq!(plan.lines().len(), 1);
        assert_eq!(plan.total().cents(), 600);
        assert_eq!(plan.reservations(), vec![(1, 6)]);
    }

    #[test]
    fn test_plan_repeated_offer_with_huge_quantity_is_short_not_overflow() {
        let mut plan = CheckoutPlan::new();
        plan.add_line(&CartLine::new(1, 1), 10, Money::from_cents(100))
            .unwrap();

        let err = plan
            .add_line(&CartLine::new(1, i64::MAX), 10, Money::from_cents(100))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                offer_id: 1,
                available: 10,
                requested: i64::MAX
            }
        );
        assert_eq!(plan.reservations(), vec![(1, 1)]);
    }

    #[test]
    fn test_plan_reservations_aggregate_in_first_seen_order() {
        let mut plan = CheckoutPlan::new();
        plan.add_line(&CartLine::new(5, 1), 10, Money::zero()).unwrap();
        plan.add_line(&CartLine::new(2, 2), 10, Money::zero()).unwrap();
        plan.add_line(&CartLine::new(5, 3), 10, Money::zero()).unwrap();

        assert_eq!(plan.reservations(), vec![(5, 4), (2, 2)]);
        assert_eq!(plan.lines().len(), 3);
    }
}
