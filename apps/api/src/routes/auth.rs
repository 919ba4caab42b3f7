//! Shopper routes under `/auth`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use newworld_core::checkout::CheckoutRequest;
use newworld_core::{Offer, OrderStatus};
use serde::Serialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::Envelope;
use crate::services::auth_service::{LoginRequest, RegisterRequest};
use crate::AppState;

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<&'static str>>)> {
    let Json(request) = payload?;
    state.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(StatusCode::CREATED, "user registered")),
    ))
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `POST /auth/login`
///
/// The token is returned in the body and echoed in the `Authorization`
/// response header.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let token = state.auth.login(request).await?;

    let header = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ApiError::internal(format!("Token is not a valid header: {}", e)))?;

    Ok(([(AUTHORIZATION, header)], Json(TokenResponse { token })).into_response())
}

/// `GET /auth/offers`
pub async fn list_offers(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<Offer>>>> {
    let offers = state.db.offers().list().await?;
    Ok(Json(Envelope::ok(offers)))
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub code: u16,
    pub message: &'static str,
    pub order_id: i64,
    pub total_cents: i64,
}

/// `POST /auth/checkout`
pub async fn checkout(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<Json<CheckoutResponse>> {
    let Json(request) = payload?;

    let receipt = state
        .db
        .orders()
        .checkout_with(&request, state.validator.as_ref())
        .await?;

    info!(
        order_id = receipt.order_id,
        total = %receipt.total,
        email = %user.email,
        "Order placed"
    );

    Ok(Json(CheckoutResponse {
        code: StatusCode::OK.as_u16(),
        message: "order placed",
        order_id: receipt.order_id,
        total_cents: receipt.total.cents(),
    }))
}

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: OrderStatus,
}

/// `GET /auth/orders/{id}`
pub async fn order_status(
    _user: AuthUser,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<StatusBody>>> {
    let Path(id) = id?;

    let order = state
        .db
        .orders()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("order {} not found", id)))?;

    Ok(Json(Envelope::ok(StatusBody {
        status: order.status,
    })))
}
