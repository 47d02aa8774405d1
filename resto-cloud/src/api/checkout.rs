//! Payment session creation
//!
//! POST /api/checkout: returns the hosted payment page URL

use axum::{Json, extract::State};
use shared::order::{CheckoutRequest, CheckoutResponse};

use crate::payments;
use crate::state::AppState;

use super::ApiResult;
use super::extract::JsonBody;

pub async fn create_checkout(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CheckoutRequest>,
) -> ApiResult<CheckoutResponse> {
    let resp = payments::create_payment_session(
        state.store.as_ref(),
        state.payments.as_ref(),
        &state.payment_settings,
        req,
    )
    .await?;
    Ok(Json(resp))
}
