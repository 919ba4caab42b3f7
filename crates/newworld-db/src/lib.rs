//! # newworld-db: Database Layer for the New World store
//!
//! This crate provides database access for the store backend.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Store Data Flow                                  │
//! │                                                                         │
//! │  HTTP handler (POST /auth/checkout)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   newworld-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ OfferRepo     │    │ 001_init.sql │  │   │
//! │  │   │               │    │ OrderRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (./newworld.db)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (user, offer, order)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use newworld_core::checkout::{CartLine, CheckoutRequest};
//! use newworld_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./newworld.db")).await?;
//!
//! let receipt = db
//!     .orders()
//!     .checkout(&CheckoutRequest::new(vec![CartLine::new(1, 2)]))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, OrderError};
pub use pool::{Database, DbConfig};

pub use repository::offer::OfferRepository;
pub use repository::order::{CheckoutReceipt, OrderRepository};
pub use repository::user::{NewUser, UserRepository};
