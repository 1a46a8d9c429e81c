// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, ClientIp, ValidatedJson};
use crate::response::AuthResponse;
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /api/v1/auth/login
///
/// Authenticates a user and starts a new session family.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let pair = state
        .sessions()
        .login(&request.email, &request.password, client_ip)
        .await?;

    Ok(Json(AuthResponse::from_pair(pair)))
}

// =============================================================================
// Refresh Token
// =============================================================================

/// POST /api/v1/auth/refresh
///
/// Rotates a refresh token, supplied as the bearer token, into a new pair.
pub async fn refresh_token(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let Some(raw) = bearer_from_headers(&headers) else {
        return Err(ApiError::unauthorized("No refresh token provided"));
    };

    let pair = state.sessions().refresh(&raw, client_ip).await?;

    Ok(Json(AuthResponse::from_pair(pair)))
}

fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/v1/auth/logout
///
/// Terminates every session family of the current user. Idempotent.
pub async fn logout(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Auth(auth_ctx): Auth,
) -> ApiResult<impl IntoResponse> {
    let user_id = auth_ctx.require_user_id().map_err(ApiError::from)?;

    state.sessions().logout(user_id, client_ip).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Logged out successfully"
    })))
}

// =============================================================================
// Current User
// =============================================================================

/// Current user response.
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    /// User ID.
    pub user_id: String,
    /// User's email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Permissions granted to the user, as embedded in the access token.
    pub permissions: Vec<String>,
}

/// GET /api/v1/auth/me
///
/// Returns information about the currently authenticated user.
pub async fn current_user(Auth(auth_ctx): Auth) -> ApiResult<impl IntoResponse> {
    let user_id = auth_ctx.require_user_id().map_err(ApiError::from)?;

    Ok(Json(CurrentUserResponse {
        user_id: user_id.to_string(),
        email: auth_ctx.email.clone(),
        permissions: auth_ctx.permissions.to_strings(),
    }))
}

// =============================================================================
// Tests
// =============================================================================
