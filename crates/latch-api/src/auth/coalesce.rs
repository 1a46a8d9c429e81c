// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client-side refresh coalescing.
//!
//! A client with several in-flight requests that all see a 401 must not
//! spend several refresh tokens: refresh tokens are single-use, so the
//! second spend would trip reuse detection and burn the session. This
//! utility funnels concurrent callers behind one in-flight refresh and
//! releases them all with its result.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

/// Coalesces concurrent refresh attempts into a single in-flight operation.
///
/// Callers that arrive while a refresh is running wait for it and reuse its
/// result; callers that arrive after it completed start a fresh one.
///
/// # Example
///
/// ```rust,ignore
/// let coalescer = RefreshCoalescer::new();
/// let pair = coalescer
///     .run(|| async { client.refresh(&refresh_token).await })
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct RefreshCoalescer<T> {
    generation: AtomicU64,
    inner: Mutex<Option<T>>,
}

impl<T: Clone> RefreshCoalescer<T> {
    /// Creates a new coalescer.
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            inner: Mutex::new(None),
        }
    }

    /// Runs `refresh`, or reuses the result of a refresh that completed
    /// while this caller was waiting for its turn.
    ///
    /// Failed refreshes are not cached; the next caller retries.
    pub async fn run<F, Fut, E>(&self, refresh: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let observed = self.generation.load(Ordering::Acquire);
        let mut slot = self.inner.lock().await;

        // Somebody completed a refresh between our snapshot and acquiring
        // the lock: they refreshed on our behalf.
        if self.generation.load(Ordering::Acquire) != observed {
            if let Some(value) = slot.as_ref() {
                return Ok(value.clone());
            }
        }

        let value = refresh().await?;
        *slot = Some(value.clone());
        self.generation.fetch_add(1, Ordering::Release);
        Ok(value)
    }

    /// Returns how many refreshes have completed.
    pub fn completed(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

// =============================================================================
// Tests
// =============================================================================
