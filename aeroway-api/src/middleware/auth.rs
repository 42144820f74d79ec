use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use aeroway_core::models::User;

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub staff: bool,
    pub exp: usize,
}

/// The authenticated actor, injected into request extensions by the auth
/// middleware and read by every handler that needs to know who is asking.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub is_staff: bool,
}

pub fn create_token(auth: &AuthConfig, user: &User) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        staff: user.is_staff,
        exp: (Utc::now().timestamp() as usize) + auth.expiration as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.secret.as_bytes()),
    )
    .map_err(|err| AppError::Internal(err.into()))
}

// ============================================================================
// Authentication Middleware
// ============================================================================

/// Missing, malformed, and expired tokens all get the same 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let unauthorized = || AppError::Unauthorized("authentication required".to_string());

    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(unauthorized)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| unauthorized())?;

    req.extensions_mut().insert(CurrentUser {
        id: token_data.claims.sub,
        email: token_data.claims.email,
        is_staff: token_data.claims.staff,
    });

    Ok(next.run(req).await)
}

/// Reference-data writes are staff-only.
pub fn require_staff(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_staff {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "staff permissions required".to_string(),
        ))
    }
}
