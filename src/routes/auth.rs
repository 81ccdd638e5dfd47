//! Authentication route handlers
//!
//! Login and registration. Both answer with a `LoginResult` envelope; only
//! malformed input is reported as an HTTP error.

use crate::auth::{hash_password, verify_password};
use crate::error::{validation_error, ApiResult};
use crate::state::SharedState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

// ============================================
// Request/Response Types
// ============================================

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(alias = "confirmpwd")]
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_bearer: Option<String>,
}

impl LoginResult {
    fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            email: None,
            jwt_bearer: None,
        }
    }

    fn accepted(message: &str, email: &str, token: String) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            email: Some(email.to_string()),
            jwt_bearer: Some(token),
        }
    }
}

// ============================================
// Route Handlers
// ============================================

/// POST /api/auth/register
pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<LoginResult>> {
    req.validate().map_err(|e| validation_error(e.to_string()))?;

    if req.password != req.confirm_password {
        return Ok(Json(LoginResult::rejected(
            "Password and confirm password do not match.",
        )));
    }

    if state.users.find_by_email(&req.email).await?.is_some() {
        return Ok(Json(LoginResult::rejected("User already exists.")));
    }

    let password_hash = hash_password(&req.password)?;
    let Some(user) = state.users.create(&req.email, &password_hash).await? else {
        return Ok(Json(LoginResult::rejected("User already exists.")));
    };

    let token = state.tokens.create_token(&user.email)?;
    info!(user_id = user.id, "Registered portal user {}", user.email);

    Ok(Json(LoginResult::accepted("Registration successful.", &req.email, token)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResult>> {
    req.validate().map_err(|e| validation_error(e.to_string()))?;

    let user = match state.users.find_by_email(&req.email).await? {
        Some(user) if verify_password(&req.password, &user.password_hash)? => user,
        _ => {
            warn!("Failed login attempt for {}", req.email);
            return Ok(Json(LoginResult::rejected("User/password not found.")));
        }
    };

    let token = state.tokens.create_token(&user.email)?;
    info!(user_id = user.id, "User logged in: {}", user.email);

    Ok(Json(LoginResult::accepted("Login successful.", &req.email, token)))
}
