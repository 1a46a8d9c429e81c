// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::handlers;
use crate::middleware::AuthLayer;
use crate::policy::{self, TaskOperation};
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates the router with all routes and middleware.
    ///
    /// Pipeline order per request: trace → timeout → cors → authentication;
    /// then the route's declared RBAC layer; ABAC runs inside the handlers
    /// after the resource is resolved.
    pub fn router(&self) -> Router {
        let cors = create_cors_layer(&self.config);
        let auth = AuthLayer::new(self.state.codec.clone()).with_default_public_paths();

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(self.config.request_timeout))
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .layer(cors)
            .layer(auth);

        Router::new()
            // Health endpoints (public)
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            // Auth endpoints
            .route("/api/v1/auth/login", post(handlers::login))
            .route("/api/v1/auth/refresh", post(handlers::refresh_token))
            .route("/api/v1/auth/logout", post(handlers::logout))
            .route("/api/v1/auth/me", get(handlers::current_user))
            // Task endpoints; each method carries the RBAC layer its
            // operation declares in the policy table
            .route(
                "/api/v1/tasks",
                post(handlers::create_task).layer(policy::rbac_layer(TaskOperation::Create)),
            )
            .route(
                "/api/v1/tasks",
                get(handlers::list_tasks).layer(policy::rbac_layer(TaskOperation::List)),
            )
            .route(
                "/api/v1/tasks/{task_id}",
                get(handlers::get_task).layer(policy::rbac_layer(TaskOperation::Get)),
            )
            .route(
                "/api/v1/tasks/{task_id}",
                put(handlers::update_task).layer(policy::rbac_layer(TaskOperation::Update)),
            )
            .route(
                "/api/v1/tasks/{task_id}",
                axum::routing::delete(handlers::delete_task)
                    .layer(policy::rbac_layer(TaskOperation::Delete)),
            )
            .route(
                "/api/v1/tasks/{task_id}/assign",
                post(handlers::assign_task).layer(policy::rbac_layer(TaskOperation::Assign)),
            )
            .route(
                "/api/v1/tasks/{task_id}/unassign",
                post(handlers::unassign_task).layer(policy::rbac_layer(TaskOperation::Unassign)),
            )
            .route(
                "/api/v1/tasks/{task_id}/complete",
                post(handlers::toggle_complete)
                    .layer(policy::rbac_layer(TaskOperation::ToggleComplete)),
            )
            // Apply middleware and state
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::ApiError::internal(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| crate::error::ApiError::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::ApiError::internal(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| crate::error::ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }

    /// Returns the application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = &config.cors;

    let mut layer = CorsLayer::new().max_age(Duration::from_secs(cors.max_age));

    if cors.allowed_origins.contains(&"*".to_string()) {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<axum::http::HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
            .collect();
        layer = layer.allow_origin(tower_http::cors::AllowOrigin::list(origins));
    }

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    layer = layer.allow_methods(methods);

    if cors.allowed_headers.contains(&"*".to_string()) {
        layer = layer.allow_headers(Any);
    } else {
        layer = layer.allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);
    }

    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
pub struct ApiServerBuilder {
    state_builder: crate::state::AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self {
            state_builder: AppState::builder(),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the RBAC policy.
    pub fn rbac_policy(mut self, policy: Arc<crate::auth::RbacPolicy>) -> Self {
        self.state_builder = self.state_builder.rbac_policy(policy);
        self
    }

    /// Sets the user store.
    pub fn users(mut self, users: Arc<dyn latch_core::store::UserStore>) -> Self {
        self.state_builder = self.state_builder.users(users);
        self
    }

    /// Sets the refresh token store.
    pub fn refresh_tokens(
        mut self,
        store: Arc<dyn latch_core::store::RefreshTokenStore>,
    ) -> Self {
        self.state_builder = self.state_builder.refresh_tokens(store);
        self
    }

    /// Sets the task store.
    pub fn tasks(mut self, tasks: Arc<dyn latch_core::store::TaskStore>) -> Self {
        self.state_builder = self.state_builder.tasks(tasks);
        self
    }

    /// Sets the audit logger.
    pub fn audit_logger(mut self, logger: Arc<dyn latch_core::audit::AuditLogger>) -> Self {
        self.state_builder = self.state_builder.audit_logger(logger);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

impl Default for ApiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;

    fn test_config() -> ApiConfig {
        let mut config = ApiConfig::default();
        config.jwt = JwtConfig::new(
            "access-secret-key-that-is-long-enough-for-tests",
            "refresh-secret-key-that-is-long-enough-for-tests",
        );
        config
    }

    #[test]
    fn test_server_builder() {
        let server = ApiServerBuilder::new().config(test_config()).build().unwrap();

        assert_eq!(server.addr().port(), 8080);
    }

    #[test]
    fn test_router_creation() {
        let server = ApiServerBuilder::new().config(test_config()).build().unwrap();

        let _router = server.router();
        // If we get here, all routes and layers composed successfully.
    }

    #[tokio::test]
    async fn test_cors_layer() {
        let config = test_config();
        let _layer = create_cors_layer(&config);
    }
}
