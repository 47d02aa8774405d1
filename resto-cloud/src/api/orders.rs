//! Storefront order placement
//!
//! POST /api/stores/{store_id}/orders: guests allowed

use axum::{
    Json,
    extract::{Path, State},
};
use shared::order::{PlaceOrderRequest, PlaceOrderResponse};

use crate::auth::OptionalCustomer;
use crate::orders::placement;
use crate::state::AppState;

use super::ApiResult;
use super::extract::JsonBody;

pub async fn place_order(
    State(state): State<AppState>,
    OptionalCustomer(customer_id): OptionalCustomer,
    Path(store_id): Path<String>,
    JsonBody(req): JsonBody<PlaceOrderRequest>,
) -> ApiResult<PlaceOrderResponse> {
    let resp = placement::place_order(
        state.store.as_ref(),
        &state.kitchen_hub,
        &store_id,
        customer_id,
        req,
    )
    .await?;
    Ok(Json(resp))
}
