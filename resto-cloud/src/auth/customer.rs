//! Optional customer identity for order placement
//!
//! Guests send no Authorization header and order with a null customer. A
//! header that is present but invalid is rejected rather than downgraded to
//! guest, so a signed-in customer never silently loses their identity.
//! Staff tokens are valid but order as guests: only customer accounts are
//! recorded on the order.

use axum::extract::FromRequestParts;
use http::request::Parts;
use shared::error::AppError;
use uuid::Uuid;

use super::staff_auth::{CUSTOMER_ROLE, bearer_token, decode_token};
use crate::state::AppState;

/// `Some(user_id)` for a signed-in customer, `None` for a guest
#[derive(Debug, Clone, Copy)]
pub struct OptionalCustomer(pub Option<Uuid>);

impl FromRequestParts<AppState> for OptionalCustomer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(http::header::AUTHORIZATION) else {
            return Ok(OptionalCustomer(None));
        };
        let token = header
            .to_str()
            .ok()
            .and_then(bearer_token)
            .ok_or_else(|| AppError::invalid_token("Invalid Authorization format"))?;
        let claims = decode_token(token, &state.jwt_secret)?;
        if claims.role != CUSTOMER_ROLE {
            tracing::debug!(user_id = %claims.sub, role = %claims.role, "Non-customer token, ordering as guest");
            return Ok(OptionalCustomer(None));
        }
        Ok(OptionalCustomer(Some(claims.sub)))
    }
}
