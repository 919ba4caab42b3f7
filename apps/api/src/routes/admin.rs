//! Administration routes under `/admin`. Every handler takes [`AdminUser`].

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use newworld_core::{OrderStatus, OrderWithItems, Role, User};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::routes::Envelope;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardItem {
    pub offer_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub sub_total_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardOrder {
    pub id: i64,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub items: Vec<DashboardItem>,
}

impl From<OrderWithItems> for DashboardOrder {
    fn from(entry: OrderWithItems) -> Self {
        DashboardOrder {
            id: entry.order.id,
            status: entry.order.status,
            total_cents: entry.order.total_cents,
            items: entry
                .items
                .into_iter()
                .map(|item| DashboardItem {
                    offer_id: item.offer_id,
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price_cents,
                    sub_total_cents: item.subtotal_cents,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub orders: Vec<DashboardOrder>,
}

/// `GET /admin/dashboard`
pub async fn dashboard(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> ApiResult<Json<DashboardResponse>> {
    let orders = state.db.orders().list_with_items().await?;

    Ok(Json(DashboardResponse {
        status: "success",
        message: "orders retrieved",
        orders: orders.into_iter().map(DashboardOrder::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub code: u16,
    pub message: &'static str,
    pub status: OrderStatus,
}

/// `PATCH /admin/orders/{id}`
pub async fn update_order_status(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<Json<StatusUpdateResponse>> {
    let Path(id) = id?;
    let Json(update) = payload?;

    let status: OrderStatus = update.status.parse()?;

    let order = state
        .db
        .orders()
        .update_status(id, status, state.status_policy)
        .await?;

    info!(order_id = id, status = %order.status, admin = %admin.email, "Status changed by admin");

    Ok(Json(StatusUpdateResponse {
        code: StatusCode::OK.as_u16(),
        message: "order status updated",
        status: order.status,
    }))
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// `GET /admin/users` (accounts with role `user` only)
pub async fn list_users(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<UserSummary>>>> {
    let users = state.db.users().list_by_role(Role::User).await?;
    Ok(Json(Envelope::ok(
        users.into_iter().map(UserSummary::from).collect(),
    )))
}

/// `DELETE /admin/users/{id}`
pub async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<&'static str>>> {
    let Path(id) = id?;

    state.db.users().soft_delete(id).await?;

    info!(user_id = id, admin = %admin.email, "User deleted");
    Ok(Json(Envelope::ok("user deleted")))
}
