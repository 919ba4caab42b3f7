//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.orders().checkout(&request)                                │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── checkout(&self, request)        (one transaction)                 │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_with_items(&self)                                            │
//! │  └── update_status(&self, id, status, policy)                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every read filters out soft-deleted rows (`deleted_at IS NULL`).
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Registration, lookup, admin listing and deletion
//! - [`offer::OfferRepository`] - Catalog listing and supplies upserts
//! - [`order::OrderRepository`] - Checkout transaction and order administration

pub mod offer;
pub mod order;
pub mod user;
