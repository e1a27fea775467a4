//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, and logout, plus the
//! signed-in profile view.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::domain::AuthUser;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::middleware::session_id_from_headers;
use crate::web::respond::ApiFailure;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

fn session_cookie(session_id: &str, max_age_seconds: i64) -> String {
    format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        session_id, max_age_seconds
    )
}

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let email = req
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiFailure::bad_request("Missing email"))?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiFailure::bad_request("Missing password"))?;

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiFailure::internal("Failed to hash password")
        })?
        .to_string();

    // 2. Create user in database (role defaults to customer)
    let user = state
        .store
        .create_user(&email, req.name.as_deref(), &password_hash)
        .await
        .map_err(|e| {
            error!("Failed to create user: {:?}", e);
            ApiFailure::bad_request("Could not create account")
        })?;

    // 3. Create auth session and cookie
    let session_id = Uuid::new_v4().to_string();
    let ttl = Duration::days(state.config.session_ttl_days);
    let expires_at = Utc::now() + ttl;

    state
        .store
        .create_auth_session(&session_id, user.id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            ApiFailure::internal("Failed to create session")
        })?;

    let cookie = session_cookie(&session_id, ttl.num_seconds());
    let response = AuthResponse {
        user_id: user.id,
        email: user.email,
        role: user.role.as_str().to_string(),
    };

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let email = req
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiFailure::bad_request("Missing email"))?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiFailure::bad_request("Missing password"))?;

    // 1. Get user by email
    let creds = state.store.get_user_by_email(&email).await.map_err(|e| {
        error!("Failed to get user: {:?}", e);
        ApiFailure::new(StatusCode::UNAUTHORIZED, "Invalid email or password")
    })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ApiFailure::internal("Authentication error")
    })?;

    let valid = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err(ApiFailure::new(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        ));
    }

    // 3. Create auth session and cookie
    let session_id = Uuid::new_v4().to_string();
    let ttl = Duration::days(state.config.session_ttl_days);
    let expires_at = Utc::now() + ttl;

    state
        .store
        .create_auth_session(&session_id, creds.user_id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            ApiFailure::internal("Failed to create session")
        })?;

    let cookie = session_cookie(&session_id, ttl.num_seconds());
    let response = AuthResponse {
        user_id: creds.user_id,
        email: creds.email,
        role: creds.role.as_str().to_string(),
    };

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiFailure> {
    let session_id = session_id_from_headers(&headers).ok_or_else(ApiFailure::unauthorized)?;

    state
        .store
        .delete_auth_session(session_id)
        .await
        .map_err(|e| {
            error!("Failed to delete auth session: {:?}", e);
            ApiFailure::internal("Failed to logout")
        })?;

    // Clear the cookie
    let cookie = session_cookie("", 0);
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}

/// GET /profile - The signed-in user's account details
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Profile of the signed-in user", body = ProfileResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let user = state.store.get_user(auth.user_id).await?;
    Ok(Json(ProfileResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role.as_str().to_string(),
    }))
}
