//! HTTP status per error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::ValidationFailed | Self::WebhookSignatureInvalid => StatusCode::BAD_REQUEST,
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::OrderNotFound => StatusCode::NOT_FOUND,
            Self::InvalidStatusTransition => StatusCode::CONFLICT,
            // Well-formed cart, nothing orderable left in it
            Self::OrderEmpty => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ResourceLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::PaymentSessionFailed => StatusCode::BAD_GATEWAY,
            Self::TenantNotFound | Self::OrderItemsNotSaved | Self::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
