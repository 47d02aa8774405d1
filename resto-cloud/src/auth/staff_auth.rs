//! Staff JWT authentication for the kitchen API

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use uuid::Uuid;

use crate::state::AppState;

/// Role claim carried by customer tokens; never grants kitchen access
pub const CUSTOMER_ROLE: &str = "customer";

/// JWT claims shared by staff and customer tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Tenant the staff member works for (absent for customers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    /// owner | staff | customer
    pub role: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated kitchen staff member
#[derive(Debug, Clone)]
pub struct StaffIdentity {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: String,
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a JWT. Tokens are normally issued by the identity provider; this
/// exists for tooling and tests.
pub fn create_token(
    user_id: Uuid,
    tenant_id: Option<Uuid>,
    role: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id,
        tenant_id,
        role: role.to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token and return its claims
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid or expired token"),
        }
    })
}

/// Verify a staff token (header or WebSocket query)
pub fn verify_staff_token(token: &str, secret: &str) -> Result<StaffIdentity, AppError> {
    let claims = decode_token(token, secret)?;
    match claims.tenant_id {
        Some(tenant_id) if claims.role != CUSTOMER_ROLE => Ok(StaffIdentity {
            user_id: claims.sub,
            tenant_id,
            role: claims.role,
        }),
        _ => Err(AppError::permission_denied("Kitchen access requires a staff account")),
    }
}

/// Pull the bearer token out of an Authorization header value
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

/// Middleware that verifies the staff JWT and inserts [`StaffIdentity`]
pub async fn staff_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let token = bearer_token(auth_header).ok_or_else(|| {
        AppError::invalid_token("Invalid Authorization format").into_response()
    })?;

    let identity =
        verify_staff_token(token, &state.jwt_secret).map_err(IntoResponse::into_response)?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
