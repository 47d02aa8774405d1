//! Kitchen endpoints: board listing and status changes (staff only)

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::order::{KitchenOrders, UpdateOrderStatusRequest, UpdateOrderStatusResponse};
use uuid::Uuid;

use crate::auth::StaffIdentity;
use crate::orders::{board, status};
use crate::state::AppState;

use super::ApiResult;
use super::extract::JsonBody;

#[derive(Deserialize)]
pub struct KitchenQuery {
    pub store_id: Option<Uuid>,
}

/// GET /api/kitchen/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<StaffIdentity>,
    Query(query): Query<KitchenQuery>,
) -> ApiResult<KitchenOrders> {
    let orders =
        board::kitchen_orders(state.store.as_ref(), identity.tenant_id, query.store_id).await?;
    Ok(Json(orders))
}

/// PATCH /api/kitchen/orders/{order_id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(identity): Extension<StaffIdentity>,
    Path(order_id): Path<Uuid>,
    JsonBody(req): JsonBody<UpdateOrderStatusRequest>,
) -> ApiResult<UpdateOrderStatusResponse> {
    tracing::debug!(user_id = %identity.user_id, role = %identity.role, order_id = %order_id, to = %req.status, "Status change requested");
    let resp = status::transition(
        state.store.as_ref(),
        &state.kitchen_hub,
        identity.tenant_id,
        order_id,
        req.status,
    )
    .await?;
    Ok(Json(resp))
}
