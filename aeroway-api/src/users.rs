//! Registration, token login, and the authenticated profile endpoint.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use aeroway_core::models::{NewUser, User};

use crate::error::AppError;
use crate::middleware::auth::{create_token, require_auth, CurrentUser};
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
struct CredentialsRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    id: i64,
    email: String,
    is_staff: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            is_staff: user.is_staff,
        }
    }
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access: String,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(token))
        .route(
            "/me",
            get(me).layer(middleware::from_fn_with_state(state, require_auth)),
        )
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::Internal(anyhow::anyhow!(err)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    if req.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let user = state
        .users
        .create(NewUser {
            email: req.email,
            password_hash: hash_password(&req.password)?,
            is_staff: false,
        })
        .await?;

    info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn token(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .filter(|user| verify_password(&req.password, &user.password_hash))
        .ok_or_else(|| AppError::Unauthorized("invalid email or password".to_string()))?;

    let access = create_token(&state.auth, &user)?;
    Ok(Json(TokenResponse { access }))
}

async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.get(current.id).await?;
    Ok(Json(user.into()))
}
