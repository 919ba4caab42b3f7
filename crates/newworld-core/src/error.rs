//! # Error Types
//!
//! Domain-specific error types for newworld-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  newworld-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations (stock, status)       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  newworld-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── OrderError       - Rejected order change OR failed transaction    │
//! │                                                                         │
//! │  API errors (apps/api)                                                 │
//! │  └── ApiError         - What HTTP clients see: {code, message}         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant names the offending entity so the client can tell which
/// line of a cart (or which order) caused the rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Offer cannot be found.
    ///
    /// ## When This Occurs
    /// - Offer ID doesn't exist in the catalog
    /// - Offer was soft deleted
    #[error("offer {0} not found")]
    OfferNotFound(i64),

    /// Insufficient stock to complete a checkout.
    ///
    /// ## When This Occurs
    /// - A cart line asks for more than the quantity on hand
    /// - Several lines for the same offer add up to more than on hand
    /// - A concurrent checkout consumed the stock after this one validated
    ///
    /// ## User Workflow
    /// ```text
    /// POST /auth/checkout [{offer_id: 1, quantity: 11}]
    ///      │
    ///      ▼
    /// Check stock: available=10
    ///      │
    ///      ▼
    /// InsufficientStock { offer_id: 1, available: 10, requested: 11 }
    ///      │
    ///      ▼
    /// 400 {code: 400, message: "insufficient stock for offer 1: ..."}
    /// ```
    #[error("insufficient stock for offer {offer_id}: available {available}, requested {requested}")]
    InsufficientStock {
        offer_id: i64,
        available: i64,
        requested: i64,
    },

    /// Order not found.
    #[error("order {0} not found")]
    OrderNotFound(i64),

    /// The status change is refused by the active status policy.
    ///
    /// ## When This Occurs
    /// - Forward-only mode is enabled and the target status is earlier than
    ///   the current one (e.g., `shipped` → `processing`)
    #[error("order status cannot move from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Monetary arithmetic overflowed.
    #[error("amount overflow while pricing offer {offer_id}")]
    AmountOverflow { offer_id: i64 },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., e-mail address).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {}", allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            offer_id: 1,
            available: 10,
            requested: 11,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for offer 1: available 10, requested 11"
        );
        assert_eq!(CoreError::OfferNotFound(42).to_string(), "offer 42 not found");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::NotAllowed {
            field: "status".to_string(),
            allowed: vec!["processing".to_string(), "shipped".to_string()],
        };
        assert_eq!(err.to_string(), "status must be one of: processing, shipped");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "items is required");
    }
}
