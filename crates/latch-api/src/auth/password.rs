// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password hashing and credential verification.
//!
//! Passwords are stored as Argon2id PHC strings. Verification failure is
//! uniform: a caller can never learn whether the email or the password was
//! wrong.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use latch_core::store::UserStore;
use latch_core::types::UserRecord;
use latch_core::AuthError;

use crate::error::{ApiError, ApiResult};

// =============================================================================
// Hashing
// =============================================================================

/// Hashes a plaintext password into an Argon2id PHC string.
pub fn hash_password(plain: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))
}

/// Verifies a plaintext password against a stored PHC string.
///
/// Returns `false` for both a mismatch and an unparseable stored hash; a
/// corrupt record must not become a login bypass.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        tracing::error!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// CredentialVerifier
// =============================================================================

/// Verifies email/password pairs against the user store.
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
}

impl CredentialVerifier {
    /// Creates a new verifier over a user store.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Verifies credentials and returns the matching user.
    ///
    /// Unknown email and wrong password produce the identical
    /// [`AuthError::InvalidCredentials`].
    pub async fn verify(&self, email: &str, password: &str) -> ApiResult<UserRecord> {
        let user = self.users.find_by_email(email).await?;

        let Some(user) = user else {
            tracing::debug!(email = %email, "Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "Password verification failed");
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user)
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier").finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
