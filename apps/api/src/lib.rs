//! # New World API
//!
//! HTTP/JSON server for the New World store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          API Services                                   │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /auth         │  │  /auth (user)  │  │  /admin (admin)            ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • offers       │  │ • dashboard                ││
//! │  │ • login        │  │ • checkout     │  │ • orders/{id} status       ││
//! │  │                │  │ • orders/{id}  │  │ • users, delete user       ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │  SQLite      │  │ SuppliesSync │  │    JWT Auth              ││  │
//! │  │  │ (newworld-db)│  │              │  │                          ││  │
//! │  │  │ Primary data │  │ Hourly feed  │  │ HS256 bearer tokens      ││  │
//! │  │  │ store        │  │ → catalog    │  │ Argon2id passwords       ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (a `.env` file is read first if present):
//! - `DATABASE_PATH` - SQLite file (default: ./newworld.db)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `PORT` - HTTP port (default: 3000)
//! - `JWT_SECRET_KEY` - secret for token signing (required)
//! - `JWT_LIFETIME_SECS` - token lifetime (default: 86400)
//! - `SUPPLIES_URL` - supplies feed; sync disabled when unset
//! - `SUPPLIES_SYNC_INTERVAL_SECS` - sync period (default: 3600)
//! - `ORDER_STATUS_FORWARD_ONLY` - refuse backwards status moves (default: false)

pub mod auth;
pub mod config;
pub mod error;
pub mod password;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use newworld_core::checkout::{CheckoutValidator, StandardCheckoutValidator};
use newworld_core::StatusPolicy;
use newworld_db::Database;
use tower_http::trace::TraceLayer;

// Re-exports
pub use auth::JwtManager;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use services::{AuthService, Authenticator, DbAuthenticator};

/// Shared application state.
///
/// Everything a handler needs is constructed once and injected here; there
/// is no global store handle.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub auth: AuthService,
    pub validator: Arc<dyn CheckoutValidator>,
    pub status_policy: StatusPolicy,
}

impl AppState {
    /// State with the default capabilities: database-backed login and the
    /// standard cart rules.
    pub fn new(db: Database, config: &ApiConfig) -> Self {
        let jwt = Arc::new(JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs));
        let authenticator: Arc<dyn Authenticator> = Arc::new(DbAuthenticator::new(db.clone()));

        AppState {
            auth: AuthService::new(db.clone(), Arc::clone(&jwt), authenticator),
            db,
            jwt,
            validator: Arc::new(StandardCheckoutValidator),
            status_policy: StatusPolicy::from_forward_only(config.order_status_forward_only),
        }
    }

    /// Replaces the login backend.
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.auth = AuthService::new(self.db.clone(), Arc::clone(&self.jwt), authenticator);
        self
    }

    /// Replaces the cart rules applied before checkout.
    pub fn with_validator(mut self, validator: Arc<dyn CheckoutValidator>) -> Self {
        self.validator = validator;
        self
    }
}

/// Builds the full router.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/offers", get(routes::auth::list_offers))
        .route("/checkout", post(routes::auth::checkout))
        .route("/orders/{id}", get(routes::auth::order_status));

    let admin_routes = Router::new()
        .route("/dashboard", get(routes::admin::dashboard))
        .route("/orders/{id}", patch(routes::admin::update_order_status))
        .route("/users", get(routes::admin::list_users))
        .route("/users/{id}", delete(routes::admin::delete_user));

    Router::new()
        .route("/health", get(routes::health))
        .route("/health/ready", get(routes::ready))
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
