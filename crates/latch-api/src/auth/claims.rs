// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use latch_core::types::UserId;
use latch_core::AuthError;

use super::permission::PermissionSet;

/// JWT claims for LATCH tokens.
///
/// The same structure serves both token kinds. Access tokens carry the
/// resolved permission strings in `perms`; refresh tokens leave that list
/// empty and are recognized by their audience instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject - the user ID.
    pub sub: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    /// JWT ID; unique per issued token.
    pub jti: String,

    // =========================================================================
    // Custom Claims
    // =========================================================================
    /// User's email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Serialized permission set (access tokens only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub perms: Vec<String>,
}

impl Claims {
    /// Creates new claims for a user.
    pub fn new(user_id: UserId, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: user_id.to_string(),
            exp: now + expires_in_secs,
            iat: now,
            iss: None,
            aud: None,
            jti: Uuid::now_v7().to_string(),
            email: None,
            perms: Vec::new(),
        }
    }

    /// Parses the subject into a [`UserId`].
    ///
    /// A token whose subject is not a valid user ID is malformed.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        UserId::parse(&self.sub).ok_or(AuthError::ClaimsMalformed)
    }

    /// Rebuilds the permission set embedded in the claims.
    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::from_strings(&self.perms)
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Returns the expiration time as a `DateTime`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Sets the audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.aud = Some(audience.into());
        self
    }

    /// Sets the user's email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Embeds a resolved permission set.
    pub fn with_permissions(mut self, permissions: &PermissionSet) -> Self {
        self.perms = permissions.to_strings();
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
