// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Authorization Pipeline Integration Tests
//!
//! Exercises the ordered guard chain through the HTTP surface:
//!
//! - RBAC boundaries (declared permission sets per operation)
//! - ABAC ownership, assignment-state and assignee-identity checks
//! - Existence (404) taking priority over attribute comparisons

use axum::http::StatusCode;

use latch_tests::common::{self, harness, TestEnv};

// =============================================================================
// RBAC Boundaries
// =============================================================================

#[tokio::test]
async fn test_viewer_can_read_but_not_create() {
    common::init_test_logging();
    let env = TestEnv::new().await;
    let viewer = harness::login(&env, &env.viewer.email).await;

    harness::get(&env.router, "/api/v1/tasks", Some(&viewer.access_token))
        .await
        .assert_status(StatusCode::OK);

    let denied = harness::post(
        &env.router,
        "/api/v1/tasks",
        Some(&viewer.access_token),
        Some(serde_json::json!({ "title": "not allowed" })),
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_editor_can_create() {
    common::init_test_logging();
    let env = TestEnv::new().await;
    let editor = harness::login(&env, &env.editor_a.email).await;

    let task_id = harness::create_task(&env, &editor, "write the brief").await;
    assert!(!task_id.is_empty());
}

#[tokio::test]
async fn test_editor_cannot_delete_even_own_task() {
    common::init_test_logging();
    let env = TestEnv::new().await;
    let editor = harness::login(&env, &env.editor_a.email).await;

    let task_id = harness::create_task(&env, &editor, "own but undeletable").await;

    // RBAC stage rejects before ownership is ever considered: editors do
    // not hold delete:tasks.
    let denied = harness::delete(
        &env.router,
        &format!("/api/v1/tasks/{task_id}"),
        Some(&editor.access_token),
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}

// =============================================================================
// ABAC: Ownership
// =============================================================================

#[tokio::test]
async fn test_only_the_owner_may_update() {
    common::init_test_logging();
    let env = TestEnv::new().await;
    let owner = harness::login(&env, &env.editor_a.email).await;
    let other = harness::login(&env, &env.editor_b.email).await;

    let task_id = harness::create_task(&env, &owner, "owned by A").await;
    let uri = format!("/api/v1/tasks/{task_id}");

    // B holds update:tasks but is not the creator.
    let denied = harness::put(
        &env.router,
        &uri,
        Some(&other.access_token),
        Some(serde_json::json!({ "title": "hijacked" })),
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    // A succeeds.
    let updated = harness::put(
        &env.router,
        &uri,
        Some(&owner.access_token),
        Some(serde_json::json!({ "title": "still A's task" })),
    )
    .await
    .assert_status(StatusCode::OK);
    assert_eq!(updated.string_field("/data/title"), "still A's task");
}

#[tokio::test]
async fn test_only_the_owner_may_delete() {
    common::init_test_logging();
    let env = TestEnv::new().await;
    let manager = harness::login(&env, &env.manager.email).await;
    let editor = harness::login(&env, &env.editor_a.email).await;

    // The manager holds delete:tasks, but the editor owns this task.
    let task_id = harness::create_task(&env, &editor, "editor's task").await;
    let denied = harness::delete(
        &env.router,
        &format!("/api/v1/tasks/{task_id}"),
        Some(&manager.access_token),
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    // A task the manager owns deletes fine.
    let own_task = harness::create_task(&env, &manager, "manager's task").await;
    harness::delete(
        &env.router,
        &format!("/api/v1/tasks/{own_task}"),
        Some(&manager.access_token),
    )
    .await
    .assert_status(StatusCode::OK);
}

// =============================================================================
// ABAC: Assignment State
// =============================================================================

#[tokio::test]
async fn test_assignment_state_transitions() {
    common::init_test_logging();
    let env = TestEnv::new().await;
    let editor = harness::login(&env, &env.editor_a.email).await;

    let task_id = harness::create_task(&env, &editor, "assignable").await;
    let assign_uri = format!("/api/v1/tasks/{task_id}/assign");
    let unassign_uri = format!("/api/v1/tasks/{task_id}/unassign");

    // Unassigning an unassigned task violates the state check.
    let denied = harness::post(&env.router, &unassign_uri, Some(&editor.access_token), Some(serde_json::json!({}))).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    // Assigning it succeeds.
    harness::post(
        &env.router,
        &assign_uri,
        Some(&editor.access_token),
        Some(serde_json::json!({})),
    )
    .await
    .assert_status(StatusCode::OK);

    // Assigning an already-assigned task violates the state check.
    let denied = harness::post(
        &env.router,
        &assign_uri,
        Some(&editor.access_token),
        Some(serde_json::json!({})),
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    // Unassigning the assigned task succeeds.
    harness::post(
        &env.router,
        &unassign_uri,
        Some(&editor.access_token),
        Some(serde_json::json!({})),
    )
    .await
    .assert_status(StatusCode::OK);
}

// =============================================================================
// ABAC: Assignee Identity
// =============================================================================

#[tokio::test]
async fn test_only_the_assignee_may_toggle_completion() {
    common::init_test_logging();
    let env = TestEnv::new().await;
    let creator = harness::login(&env, &env.editor_a.email).await;
    let assignee = harness::login(&env, &env.editor_b.email).await;

    let task_id = harness::create_task(&env, &creator, "B's work item").await;

    // Creator assigns the task to B.
    harness::post(
        &env.router,
        &format!("/api/v1/tasks/{task_id}/assign"),
        Some(&creator.access_token),
        Some(serde_json::json!({ "user_id": env.editor_b.user_id })),
    )
    .await
    .assert_status(StatusCode::OK);

    let complete_uri = format!("/api/v1/tasks/{task_id}/complete");

    // The creator holds complete:tasks but is not the assignee.
    let denied = harness::post(
        &env.router,
        &complete_uri,
        Some(&creator.access_token),
        None,
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    // The assignee toggles completion on...
    let completed = harness::post(
        &env.router,
        &complete_uri,
        Some(&assignee.access_token),
        None,
    )
    .await
    .assert_status(StatusCode::OK);
    assert_eq!(completed.body["data"]["is_completed"], true);

    // ...and off again.
    let reopened = harness::post(
        &env.router,
        &complete_uri,
        Some(&assignee.access_token),
        None,
    )
    .await
    .assert_status(StatusCode::OK);
    assert_eq!(reopened.body["data"]["is_completed"], false);
}

// =============================================================================
// Existence Before Attributes
// =============================================================================

#[tokio::test]
async fn test_missing_task_is_404_before_any_attribute_check() {
    common::init_test_logging();
    let env = TestEnv::new().await;
    let editor = harness::login(&env, &env.editor_a.email).await;

    let ghost = uuid::Uuid::now_v7();

    let response = harness::put(
        &env.router,
        &format!("/api/v1/tasks/{ghost}"),
        Some(&editor.access_token),
        Some(serde_json::json!({ "title": "anything" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = harness::post(
        &env.router,
        &format!("/api/v1/tasks/{ghost}/assign"),
        Some(&editor.access_token),
        Some(serde_json::json!({})),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_task_id_is_bad_request() {
    common::init_test_logging();
    let env = TestEnv::new().await;
    let editor = harness::login(&env, &env.editor_a.email).await;

    let response = harness::get(
        &env.router,
        "/api/v1/tasks/not-a-uuid",
        Some(&editor.access_token),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_list_pagination() {
    common::init_test_logging();
    let env = TestEnv::new().await;
    let editor = harness::login(&env, &env.editor_a.email).await;

    for i in 0..5 {
        harness::create_task(&env, &editor, &format!("task {i}")).await;
    }

    let page = harness::get(
        &env.router,
        "/api/v1/tasks?page=1&per_page=2",
        Some(&editor.access_token),
    )
    .await
    .assert_status(StatusCode::OK);

    assert_eq!(page.body["data"].as_array().unwrap().len(), 2);
    assert_eq!(page.body["meta"]["per_page"], 2);

    let bad = harness::get(
        &env.router,
        "/api/v1/tasks?page=0",
        Some(&editor.access_token),
    )
    .await;
    assert_eq!(bad.status, StatusCode::UNPROCESSABLE_ENTITY);
}
