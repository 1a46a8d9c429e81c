// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Task handlers.
//!
//! The bodies here are deliberately thin; what matters is the pipeline every
//! mutation passes through. RBAC runs in middleware (declared per route from
//! the policy table); the existence check and the attribute stage run here,
//! in that order, before anything is mutated.

use std::net::IpAddr;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use latch_core::audit::{AuditAction, AuditLog};
use latch_core::types::{TaskAttributes, TaskId, TaskRecord, UserId};
use latch_core::AuthError;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, ClientIp, Pagination, TaskIdPath, ValidatedJson};
use crate::policy::{self, TaskOperation};
use crate::response::{ApiResponse, ResponseMeta};
use crate::state::AppState;

// =============================================================================
// Guard Helper
// =============================================================================

/// Resolves a task's attributes and applies the operation's attribute check.
///
/// The existence check comes first: a missing task is 404 regardless of what
/// the requester would or would not have been allowed to do to it.
async fn guarded_attributes(
    state: &AppState,
    op: TaskOperation,
    requester: UserId,
    task_id: TaskId,
    client_ip: Option<IpAddr>,
) -> ApiResult<TaskAttributes> {
    let Some(attrs) = state.tasks().attributes(task_id).await? else {
        return Err(AuthError::ResourceNotFound.into());
    };

    if let Err(denied) = policy::enforce_abac(op, requester, &attrs) {
        tracing::warn!(
            user_id = %requester,
            task_id = %task_id,
            operation = op.as_str(),
            reason = %denied,
            "Attribute check denied request"
        );
        audit_in_background(
            state,
            AuditLog::access_denied(requester, client_ip, op.as_str()),
        );
        return Err(denied.into());
    }

    Ok(attrs)
}

fn audit_in_background(state: &AppState, entry: AuditLog) {
    let logger = state.audit().clone();
    tokio::spawn(async move {
        if let Err(e) = logger.log(entry).await {
            tracing::warn!(error = %e, "Failed to write audit entry");
        }
    });
}

fn audit_mutation(
    state: &AppState,
    action: AuditAction,
    task_id: TaskId,
    user_id: UserId,
    client_ip: Option<IpAddr>,
) {
    audit_in_background(state, AuditLog::task_mutated(action, task_id, user_id, client_ip));
}

// =============================================================================
// Create
// =============================================================================

/// Create task request body.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
}

/// POST /api/v1/tasks
pub async fn create_task(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Auth(auth_ctx): Auth,
    ValidatedJson(request): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = auth_ctx.require_user_id().map_err(ApiError::from)?;

    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Title must not be empty"));
    }

    let mut task = TaskRecord::new(user_id, title);
    if let Some(description) = request.description {
        task = task.with_description(description);
    }
    let created = task.clone();
    state.tasks().insert(task).await?;

    audit_mutation(&state, AuditAction::TaskCreate, created.id, user_id, client_ip);
    tracing::info!(user_id = %user_id, task_id = %created.id, "Task created");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

// =============================================================================
// List / Get
// =============================================================================

/// GET /api/v1/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Pagination(params): Pagination,
) -> ApiResult<impl IntoResponse> {
    let tasks = state.tasks().list(params.offset(), params.limit()).await?;
    let count = tasks.len();

    Ok(Json(
        ApiResponse::success(tasks).with_meta(ResponseMeta::pagination(
            params.page,
            params.per_page,
            count,
        )),
    ))
}

/// GET /api/v1/tasks/{task_id}
pub async fn get_task(
    State(state): State<AppState>,
    TaskIdPath(task_id): TaskIdPath,
) -> ApiResult<impl IntoResponse> {
    let Some(task) = state.tasks().get(task_id).await? else {
        return Err(AuthError::ResourceNotFound.into());
    };

    Ok(Json(ApiResponse::success(task)))
}

// =============================================================================
// Update / Delete
// =============================================================================

/// Update task request body.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// New title, if changing.
    pub title: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
}

/// PUT /api/v1/tasks/{task_id}
///
/// Only the task's creator may update it.
pub async fn update_task(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Auth(auth_ctx): Auth,
    TaskIdPath(task_id): TaskIdPath,
    ValidatedJson(request): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = auth_ctx.require_user_id().map_err(ApiError::from)?;

    if let Some(title) = request.title.as_deref() {
        if title.trim().is_empty() {
            return Err(ApiError::validation("Title must not be empty"));
        }
    }

    guarded_attributes(&state, TaskOperation::Update, user_id, task_id, client_ip).await?;

    let Some(updated) = state
        .tasks()
        .update_details(task_id, request.title, request.description)
        .await?
    else {
        return Err(AuthError::ResourceNotFound.into());
    };

    audit_mutation(&state, AuditAction::TaskUpdate, task_id, user_id, client_ip);

    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /api/v1/tasks/{task_id}
///
/// Only the task's creator may delete it.
pub async fn delete_task(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Auth(auth_ctx): Auth,
    TaskIdPath(task_id): TaskIdPath,
) -> ApiResult<impl IntoResponse> {
    let user_id = auth_ctx.require_user_id().map_err(ApiError::from)?;

    guarded_attributes(&state, TaskOperation::Delete, user_id, task_id, client_ip).await?;

    if !state.tasks().remove(task_id).await? {
        return Err(AuthError::ResourceNotFound.into());
    }

    audit_mutation(&state, AuditAction::TaskDelete, task_id, user_id, client_ip);
    tracing::info!(user_id = %user_id, task_id = %task_id, "Task deleted");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Task deleted"
    })))
}

// =============================================================================
// Assignment
// =============================================================================

/// Assign task request body.
#[derive(Debug, Default, Deserialize)]
pub struct AssignTaskRequest {
    /// The user to assign. Defaults to the requester.
    pub user_id: Option<UserId>,
}

/// POST /api/v1/tasks/{task_id}/assign
///
/// The task must currently be unassigned.
pub async fn assign_task(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Auth(auth_ctx): Auth,
    TaskIdPath(task_id): TaskIdPath,
    ValidatedJson(request): ValidatedJson<AssignTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = auth_ctx.require_user_id().map_err(ApiError::from)?;
    let assignee = request.user_id.unwrap_or(user_id);

    guarded_attributes(&state, TaskOperation::Assign, user_id, task_id, client_ip).await?;

    let Some(updated) = state.tasks().set_assignee(task_id, Some(assignee)).await? else {
        return Err(AuthError::ResourceNotFound.into());
    };

    audit_mutation(&state, AuditAction::TaskAssign, task_id, user_id, client_ip);
    tracing::info!(user_id = %user_id, task_id = %task_id, assignee = %assignee, "Task assigned");

    Ok(Json(ApiResponse::success(updated)))
}

/// POST /api/v1/tasks/{task_id}/unassign
///
/// The task must currently be assigned.
pub async fn unassign_task(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Auth(auth_ctx): Auth,
    TaskIdPath(task_id): TaskIdPath,
) -> ApiResult<impl IntoResponse> {
    let user_id = auth_ctx.require_user_id().map_err(ApiError::from)?;

    guarded_attributes(&state, TaskOperation::Unassign, user_id, task_id, client_ip).await?;

    let Some(updated) = state.tasks().set_assignee(task_id, None).await? else {
        return Err(AuthError::ResourceNotFound.into());
    };

    audit_mutation(&state, AuditAction::TaskAssign, task_id, user_id, client_ip);
    tracing::info!(user_id = %user_id, task_id = %task_id, "Task unassigned");

    Ok(Json(ApiResponse::success(updated)))
}

// =============================================================================
// Completion
// =============================================================================

/// POST /api/v1/tasks/{task_id}/complete
///
/// Toggles the completion flag. Only the current assignee may do this.
pub async fn toggle_complete(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Auth(auth_ctx): Auth,
    TaskIdPath(task_id): TaskIdPath,
) -> ApiResult<impl IntoResponse> {
    let user_id = auth_ctx.require_user_id().map_err(ApiError::from)?;

    let attrs =
        guarded_attributes(&state, TaskOperation::ToggleComplete, user_id, task_id, client_ip)
            .await?;

    let Some(updated) = state
        .tasks()
        .set_completed(task_id, !attrs.is_completed)
        .await?
    else {
        return Err(AuthError::ResourceNotFound.into());
    };

    audit_mutation(&state, AuditAction::TaskComplete, task_id, user_id, client_ip);
    tracing::info!(
        user_id = %user_id,
        task_id = %task_id,
        is_completed = updated.attributes.is_completed,
        "Task completion toggled"
    );

    Ok(Json(ApiResponse::success(updated)))
}
