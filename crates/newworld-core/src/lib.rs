//! # newworld-core: Pure Business Logic for the New World store
//!
//! This crate is the **heart** of the store backend. It contains the domain
//! types and every rule with a correctness requirement, as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      New World Store Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (axum)                              │   │
//! │  │   /auth/register  /auth/login  /auth/checkout  /admin/...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ newworld-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │ validation│  │   │
//! │  │   │  Offer    │  │   Money   │  │ CartLine  │  │   rules   │  │   │
//! │  │   │  Order    │  │           │  │ Plan      │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  newworld-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, checkout transaction         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Offer, Order, OrderItem, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//! - [`checkout`] - Cart validation and checkout pricing
//! - [`supplies`] - Mapping of the external supplies feed onto catalog offers
//!
//! ## Example Usage
//!
//! ```rust
//! use newworld_core::checkout::{CartLine, CheckoutPlan};
//! use newworld_core::Money;
//!
//! let mut plan = CheckoutPlan::new();
//! // Offer 1: 10 units on hand at $2.00
//! plan.add_line(&CartLine::new(1, 3), 10, Money::from_cents(200)).unwrap();
//!
//! assert_eq!(plan.total().cents(), 600);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod supplies;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of a username.
pub const MAX_USERNAME_LENGTH: usize = 100;

/// Maximum length of an offer name (matches the catalog column width).
pub const MAX_OFFER_NAME_LENGTH: usize = 100;

/// Maximum length of an offer category.
pub const MAX_CATEGORY_LENGTH: usize = 50;
