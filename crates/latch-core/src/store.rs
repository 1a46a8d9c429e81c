// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Store seams consumed by the authentication core.
//!
//! The persistence layer is an external collaborator: the core only needs
//! lookup-by-id, lookup-by-hash and update-by-id, so those operations are
//! expressed as async traits here. In-memory reference implementations back
//! the binary and the test suites; a database-backed deployment implements
//! the same traits.
//!
//! # Concurrency
//!
//! [`RefreshTokenStore::validate_and_revoke`] is the one operation with a
//! hard atomicity requirement: the lookup and the revocation flip must be a
//! single unit so that two concurrent refreshes using the same token cannot
//! both observe "not revoked". The in-memory implementation holds one mutex
//! across the whole read-check-write.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::types::{TaskAttributes, TaskId, TaskRecord, UserId, UserRecord};

// =============================================================================
// Token Digests
// =============================================================================

/// Computes the storage digest of a raw refresh token.
///
/// Raw token values never reach a store; only this SHA-256 hex digest does.
pub fn hash_refresh_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

// =============================================================================
// UserStore
// =============================================================================

/// Lookup seam for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by email (the login name).
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Finds a user by ID.
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>>;

    /// Inserts a new user. Fails on a duplicate email.
    async fn insert(&self, user: UserRecord) -> StoreResult<()>;
}

/// In-memory user store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store wrapped for shared use.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        let users = self.users.lock().await;
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, user: UserRecord) -> StoreResult<()> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::duplicate_key(user.email));
        }
        users.insert(user.id, user);
        Ok(())
    }
}

// =============================================================================
// RefreshTokenStore
// =============================================================================

/// A persisted refresh-token record.
///
/// Holds the digest of the raw token, never the raw value. Records are
/// soft-revoked and retained as a rotation trail; hard deletion is a
/// maintenance concern outside the hot path.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    /// Owning user.
    pub user_id: UserId,
    /// SHA-256 hex digest of the raw token.
    pub token_hash: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Revocation flag; once set it never clears.
    pub revoked: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Returns `true` if this record can still validate a presented token.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

/// Outcome of a validate-and-revoke attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshValidation {
    /// The token matched an active record; the record is now revoked and a
    /// replacement may be issued.
    Rotated,
    /// No matching active record. Covers unknown hashes and expired records.
    NotFound,
    /// The token matched a record that was already revoked: a rotated token
    /// has been presented again, which means a leaked copy is in
    /// circulation.
    ReuseDetected,
}

/// Persistence seam for refresh tokens.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persists a new refresh-token digest for a user.
    async fn create(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Validates a presented token digest and, if it is active, revokes it.
    ///
    /// The lookup and the revocation flip MUST happen atomically: under
    /// concurrent presentation of the same token exactly one caller may see
    /// [`RefreshValidation::Rotated`].
    async fn validate_and_revoke(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> StoreResult<RefreshValidation>;

    /// Revokes every non-revoked record for a user. Returns the number of
    /// records revoked; revoking an empty set is a successful no-op.
    async fn revoke_all_for_user(&self, user_id: UserId) -> StoreResult<usize>;
}

/// In-memory refresh-token store.
///
/// A single mutex guards the record map, which serializes
/// `validate_and_revoke` and gives it the required atomicity.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    records: Mutex<HashMap<UserId, Vec<RefreshTokenRecord>>>,
}

impl InMemoryRefreshTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store wrapped for shared use.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns the number of active (non-revoked, unexpired) records for a
    /// user. Test/diagnostic helper; not part of the store seam.
    pub async fn active_count_for_user(&self, user_id: UserId) -> usize {
        let now = Utc::now();
        let records = self.records.lock().await;
        records
            .get(&user_id)
            .map(|list| list.iter().filter(|r| r.is_active(now)).count())
            .unwrap_or(0)
    }

    /// Returns the total number of records kept for a user, including the
    /// revoked rotation trail.
    pub async fn record_count_for_user(&self, user_id: UserId) -> usize {
        let records = self.records.lock().await;
        records.get(&user_id).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn create(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut records = self.records.lock().await;
        records.entry(user_id).or_default().push(RefreshTokenRecord {
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            revoked: false,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn validate_and_revoke(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> StoreResult<RefreshValidation> {
        let now = Utc::now();
        // The lock is held across lookup and flip; concurrent callers with
        // the same token serialize here and exactly one wins.
        let mut records = self.records.lock().await;
        let Some(list) = records.get_mut(&user_id) else {
            return Ok(RefreshValidation::NotFound);
        };
        let Some(record) = list.iter_mut().find(|r| r.token_hash == token_hash) else {
            return Ok(RefreshValidation::NotFound);
        };

        // A revoked record takes precedence over expiry: replaying a rotated
        // token is theft evidence whether or not the token has since aged
        // out.
        if record.revoked {
            return Ok(RefreshValidation::ReuseDetected);
        }
        if record.expires_at <= now {
            return Ok(RefreshValidation::NotFound);
        }

        record.revoked = true;
        Ok(RefreshValidation::Rotated)
    }

    async fn revoke_all_for_user(&self, user_id: UserId) -> StoreResult<usize> {
        let mut records = self.records.lock().await;
        let Some(list) = records.get_mut(&user_id) else {
            return Ok(0);
        };
        let mut revoked = 0;
        for record in list.iter_mut().filter(|r| !r.revoked) {
            record.revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }
}

// =============================================================================
// TaskStore
// =============================================================================

/// Persistence seam for tasks.
///
/// The authorization core only reads [`TaskAttributes`]; the remaining
/// operations exist so the guarded handlers have something to mutate.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns the authorization-relevant attributes of a task.
    async fn attributes(&self, id: TaskId) -> StoreResult<Option<TaskAttributes>>;

    /// Returns the full task record.
    async fn get(&self, id: TaskId) -> StoreResult<Option<TaskRecord>>;

    /// Inserts a new task.
    async fn insert(&self, task: TaskRecord) -> StoreResult<()>;

    /// Lists tasks, newest first.
    async fn list(&self, offset: usize, limit: usize) -> StoreResult<Vec<TaskRecord>>;

    /// Updates title/description. Returns the updated record, or `None` if
    /// the task does not exist.
    async fn update_details(
        &self,
        id: TaskId,
        title: Option<String>,
        description: Option<String>,
    ) -> StoreResult<Option<TaskRecord>>;

    /// Sets or clears the assignee.
    async fn set_assignee(
        &self,
        id: TaskId,
        assignee: Option<UserId>,
    ) -> StoreResult<Option<TaskRecord>>;

    /// Sets the completion flag.
    async fn set_completed(
        &self,
        id: TaskId,
        is_completed: bool,
    ) -> StoreResult<Option<TaskRecord>>;

    /// Removes a task. Returns `true` if it existed.
    async fn remove(&self, id: TaskId) -> StoreResult<bool>;
}

/// In-memory task store.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: Mutex<HashMap<TaskId, TaskRecord>>,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store wrapped for shared use.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn attributes(&self, id: TaskId) -> StoreResult<Option<TaskAttributes>> {
        let tasks = self.tasks.lock().await;
        Ok(tasks.get(&id).map(|t| t.attributes))
    }

    async fn get(&self, id: TaskId) -> StoreResult<Option<TaskRecord>> {
        let tasks = self.tasks.lock().await;
        Ok(tasks.get(&id).cloned())
    }

    async fn insert(&self, task: TaskRecord) -> StoreResult<()> {
        let mut tasks = self.tasks.lock().await;
        tasks.insert(task.id, task);
        Ok(())
    }

    async fn list(&self, offset: usize, limit: usize) -> StoreResult<Vec<TaskRecord>> {
        let tasks = self.tasks.lock().await;
        let mut all: Vec<TaskRecord> = tasks.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    async fn update_details(
        &self,
        id: TaskId,
        title: Option<String>,
        description: Option<String>,
    ) -> StoreResult<Option<TaskRecord>> {
        let mut tasks = self.tasks.lock().await;
        let Some(task) = tasks.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = description {
            task.description = Some(description);
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn set_assignee(
        &self,
        id: TaskId,
        assignee: Option<UserId>,
    ) -> StoreResult<Option<TaskRecord>> {
        let mut tasks = self.tasks.lock().await;
        let Some(task) = tasks.get_mut(&id) else {
            return Ok(None);
        };
        task.attributes.assigned_user_id = assignee;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn set_completed(
        &self,
        id: TaskId,
        is_completed: bool,
    ) -> StoreResult<Option<TaskRecord>> {
        let mut tasks = self.tasks.lock().await;
        let Some(task) = tasks.get_mut(&id) else {
            return Ok(None);
        };
        task.attributes.is_completed = is_completed;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn remove(&self, id: TaskId) -> StoreResult<bool> {
        let mut tasks = self.tasks.lock().await;
        Ok(tasks.remove(&id).is_some())
    }
}

// =============================================================================
// Tests
// =============================================================================
