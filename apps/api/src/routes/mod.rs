//! HTTP routes.
//!
//! ```text
//! /auth/register, /auth/login        public
//! /auth/offers, /auth/checkout,
//! /auth/orders/{id}                  AuthUser
//! /admin/...                         AdminUser
//! /health, /health/ready             public
//! ```

pub mod admin;
pub mod auth;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::AppState;

/// The `{code, message}` envelope most successful responses use.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub code: u16,
    pub message: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(status: StatusCode, message: T) -> Self {
        Envelope {
            code: status.as_u16(),
            message,
        }
    }

    pub fn ok(message: T) -> Self {
        Self::new(StatusCode::OK, message)
    }
}

/// Liveness.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness: the database answers a query.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
    }
}
