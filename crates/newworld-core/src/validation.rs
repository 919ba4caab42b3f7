//! # Validation Module
//!
//! Input validation rules for registration, catalog entries and carts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (axum)                                       │
//! │  └── Type validation (JSON deserialization, path ids)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Required fields, lengths, e-mail pattern                          │
//! │  └── Cart shape (non-empty, quantity >= 1)                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (username, email, offer name)                              │
//! │  └── CHECK (quantity >= 0, status in set)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Uniqueness is deliberately NOT checked here: the insert itself is the
//! check, and the database constraint error is translated upstream.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::{MAX_CATEGORY_LENGTH, MAX_OFFER_NAME_LENGTH, MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid regex")
});

// =============================================================================
// String Validators
// =============================================================================

/// Fails with `Required` when `value` is empty or whitespace.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an e-mail address against the standard address pattern.
///
/// ## Example
/// ```rust
/// use newworld_core::validation::validate_email;
///
/// assert!(validate_email("ana@example.com").is_ok());
/// assert!(validate_email("ana@example").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_required("email", email)?;

    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must be a valid e-mail address".to_string(),
        });
    }

    Ok(())
}

/// Validates a plaintext password before hashing.
///
/// Only the length is checked (in characters, not bytes).
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

pub fn validate_username(username: &str) -> ValidationResult<()> {
    validate_required("username", username)?;

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a registration request.
///
/// ## Order of Checks
/// ```text
/// all fields present? ──► e-mail pattern ──► password length
/// ```
/// The first failure wins, so a request missing everything reports the
/// username first.
pub fn validate_registration(username: &str, email: &str, password: &str) -> ValidationResult<()> {
    validate_required("username", username)?;
    validate_required("email", email)?;
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    validate_email(email)?;
    validate_password(password)?;
    validate_username(username)
}

pub fn validate_offer_name(name: &str) -> ValidationResult<()> {
    validate_required("name", name)?;

    if name.chars().count() > MAX_OFFER_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_OFFER_NAME_LENGTH,
        });
    }

    Ok(())
}

pub fn validate_category(category: &str) -> ValidationResult<()> {
    validate_required("category", category)?;

    if category.chars().count() > MAX_CATEGORY_LENGTH {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: MAX_CATEGORY_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /auth/checkout  {items: [{offer_id: 1, quantity: 0}]}            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(0) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → 400 "quantity must be positive"                  │
/// │       │                                                                 │
/// │       └── OK → continue to stock checks                                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates stock on hand (zero allowed).
pub fn validate_stock(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a price in cents. Zero is allowed.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
