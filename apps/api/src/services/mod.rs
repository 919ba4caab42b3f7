//! Services behind the HTTP handlers.
//!
//! - [`auth_service`]: registration, login, the `Authenticator` capability
//! - [`supplies`]: the periodic supplies feed sync

pub mod auth_service;
pub mod supplies;

pub use auth_service::{AuthService, Authenticator, DbAuthenticator};
pub use supplies::{SuppliesSync, SuppliesSyncHandle, SyncError};
