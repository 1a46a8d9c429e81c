// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{response::IntoResponse, Json};

use crate::error::ApiResult;
use crate::response::HealthResponse;

/// GET /health
///
/// Liveness probe.
pub async fn health() -> ApiResult<impl IntoResponse> {
    Ok(Json(HealthResponse::healthy()))
}

/// GET /ready
///
/// Readiness probe. The in-process stores have no external dependencies, so
/// readiness follows liveness.
pub async fn ready() -> ApiResult<impl IntoResponse> {
    Ok(Json(serde_json::json!({ "ready": true })))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_returns_ok() {
        assert!(health().await.is_ok());
        assert!(ready().await.is_ok());
    }
}
