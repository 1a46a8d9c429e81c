// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT token codec.
//!
//! Access and refresh tokens are signed with independent secrets and carry
//! distinct audiences, so possession of one kind never grants forgeability
//! of the other. Verification fails closed and distinguishes expiry (the
//! client may refresh) from invalidity (the client must re-authenticate).

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use latch_core::types::UserId;
use latch_core::AuthError;

use super::claims::Claims;
use super::permission::PermissionSet;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// TokenKind
// =============================================================================

/// The two token kinds issued by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived bearer token presented on every request.
    Access,
    /// Long-lived, single-use token exchanged for a new pair.
    Refresh,
}

impl TokenKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

// =============================================================================
// JwtConfig
// =============================================================================

/// JWT codec configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing access tokens.
    #[serde(skip_serializing)]
    pub access_secret: String,
    /// Secret key for signing refresh tokens. Must differ from the access
    /// secret.
    #[serde(skip_serializing)]
    pub refresh_secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Audience stamped into access tokens.
    pub access_audience: String,
    /// Audience stamped into refresh tokens.
    pub refresh_audience: String,
    /// Access token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: i64,
    /// Signing algorithm.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),  // Must be set by the operator
            refresh_secret: String::new(), // Must be set by the operator
            issuer: "latch".to_string(),
            access_audience: "latch:access".to_string(),
            refresh_audience: "latch:refresh".to_string(),
            access_ttl_secs: 900,              // 15 minutes
            refresh_ttl_secs: 86400 * 7,       // 7 days
            algorithm: Algorithm::HS256,
            leeway_secs: 30,
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secrets.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the access token lifetime.
    pub fn with_access_ttl_secs(mut self, secs: i64) -> Self {
        self.access_ttl_secs = secs;
        self
    }

    /// Sets the refresh token lifetime.
    pub fn with_refresh_ttl_secs(mut self, secs: i64) -> Self {
        self.refresh_ttl_secs = secs;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err(ApiError::internal("JWT secrets are not configured"));
        }
        if self.access_secret == self.refresh_secret {
            return Err(ApiError::internal(
                "access and refresh secrets must be distinct",
            ));
        }
        if self.access_secret.len() < 32 || self.refresh_secret.len() < 32 {
            tracing::warn!("JWT secret is shorter than recommended (32 bytes)");
        }
        if self.access_audience == self.refresh_audience {
            return Err(ApiError::internal(
                "access and refresh audiences must be distinct",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TokenCodec
// =============================================================================

/// Signs and verifies access/refresh bearer tokens.
///
/// Created once at startup and shared across all requests.
#[derive(Clone)]
pub struct TokenCodec {
    config: Arc<JwtConfig>,
    access_encoding: Arc<EncodingKey>,
    access_decoding: Arc<DecodingKey>,
    access_validation: Arc<Validation>,
    refresh_encoding: Arc<EncodingKey>,
    refresh_decoding: Arc<DecodingKey>,
    refresh_validation: Arc<Validation>,
}

impl TokenCodec {
    /// Creates a new codec with the given configuration.
    pub fn new(config: JwtConfig) -> ApiResult<Self> {
        config.validate()?;

        let build_validation = |audience: &str| {
            let mut validation = Validation::new(config.algorithm);
            validation.set_issuer(&[&config.issuer]);
            validation.set_audience(&[audience]);
            validation.leeway = config.leeway_secs;
            validation
        };

        let access_validation = build_validation(&config.access_audience);
        let refresh_validation = build_validation(&config.refresh_audience);

        Ok(Self {
            access_encoding: Arc::new(EncodingKey::from_secret(config.access_secret.as_bytes())),
            access_decoding: Arc::new(DecodingKey::from_secret(config.access_secret.as_bytes())),
            access_validation: Arc::new(access_validation),
            refresh_encoding: Arc::new(EncodingKey::from_secret(config.refresh_secret.as_bytes())),
            refresh_decoding: Arc::new(DecodingKey::from_secret(config.refresh_secret.as_bytes())),
            refresh_validation: Arc::new(refresh_validation),
            config: Arc::new(config),
        })
    }

    /// Signs claims as the given token kind.
    pub fn sign(&self, kind: TokenKind, claims: &Claims) -> ApiResult<String> {
        let header = Header::new(self.config.algorithm);
        let key = match kind {
            TokenKind::Access => &self.access_encoding,
            TokenKind::Refresh => &self.refresh_encoding,
        };

        encode(&header, claims, key)
            .map_err(|e| ApiError::internal(format!("Failed to sign {} token: {}", kind.as_str(), e)))
    }

    /// Mints an access token embedding the resolved permission set.
    pub fn sign_access(
        &self,
        user_id: UserId,
        email: &str,
        permissions: &PermissionSet,
    ) -> ApiResult<String> {
        let claims = Claims::new(user_id, self.config.access_ttl_secs)
            .with_issuer(&self.config.issuer)
            .with_audience(&self.config.access_audience)
            .with_email(email)
            .with_permissions(permissions);

        self.sign(TokenKind::Access, &claims)
    }

    /// Mints a refresh token for a user.
    pub fn sign_refresh(&self, user_id: UserId, email: &str) -> ApiResult<String> {
        let claims = Claims::new(user_id, self.config.refresh_ttl_secs)
            .with_issuer(&self.config.issuer)
            .with_audience(&self.config.refresh_audience)
            .with_email(email);

        self.sign(TokenKind::Refresh, &claims)
    }

    /// Verifies a token of the given kind and returns its claims.
    ///
    /// Failure modes, in taxonomy order: `TokenExpired` for a structurally
    /// valid token past its expiry, `ClaimsMalformed` for undecodable or
    /// incomplete claims, `TokenInvalid` for everything else (bad signature,
    /// wrong audience or issuer, wrong kind).
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<Claims, AuthError> {
        let (key, validation) = match kind {
            TokenKind::Access => (&self.access_decoding, &self.access_validation),
            TokenKind::Refresh => (&self.refresh_decoding, &self.refresh_validation),
        };

        let data = decode::<Claims>(token, key, validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::Json(_)
            | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_) => {
                AuthError::ClaimsMalformed
            }
            _ => AuthError::TokenInvalid,
        })?;

        // The subject must be a parseable user ID before anything downstream
        // trusts the claims.
        data.claims.user_id()?;

        Ok(data.claims)
    }

    /// Returns the access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.config.access_ttl_secs
    }

    /// Returns the refresh token lifetime in seconds.
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.config.refresh_ttl_secs
    }

    /// Returns the configured issuer.
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &self.config.algorithm)
            .field("access_ttl_secs", &self.config.access_ttl_secs)
            .field("refresh_ttl_secs", &self.config.refresh_ttl_secs)
            .finish()
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            other => {
                return Err(serde::ser::Error::custom(format!(
                    "unsupported algorithm: {other:?}"
                )))
            }
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(serde::de::Error::custom(format!(
                "Unknown or unsupported algorithm: {}",
                s
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Permission;

    fn test_config() -> JwtConfig {
        JwtConfig::new(
            "access-secret-key-that-is-long-enough-for-tests",
            "refresh-secret-key-that-is-long-enough-for-tests",
        )
    }

    #[test]
    fn test_rejects_missing_secrets() {
        assert!(TokenCodec::new(JwtConfig::default()).is_err());
    }

    #[test]
    fn test_rejects_identical_secrets() {
        let config = JwtConfig::new("same-secret-value-for-both-kinds!", "same-secret-value-for-both-kinds!");
        assert!(TokenCodec::new(config).is_err());
    }

    #[test]
    fn test_access_round_trip() {
        let codec = TokenCodec::new(test_config()).unwrap();
        let user = UserId::generate();
        let perms = PermissionSet::from_permissions([Permission::TaskRead]);

        let token = codec.sign_access(user, "a@example.com", &perms).unwrap();
        let claims = codec.verify(TokenKind::Access, &token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user);
        assert_eq!(claims.email.as_deref(), Some("a@example.com"));
        assert!(claims.permission_set().contains(Permission::TaskRead));
    }

    #[test]
    fn test_refresh_round_trip() {
        let codec = TokenCodec::new(test_config()).unwrap();
        let user = UserId::generate();

        let token = codec.sign_refresh(user, "a@example.com").unwrap();
        let claims = codec.verify(TokenKind::Refresh, &token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user);
        assert!(claims.perms.is_empty());
    }

    #[test]
    fn test_cross_kind_verification_fails() {
        let codec = TokenCodec::new(test_config()).unwrap();
        let user = UserId::generate();
        let perms = PermissionSet::new();

        let access = codec.sign_access(user, "a@example.com", &perms).unwrap();
        let refresh = codec.sign_refresh(user, "a@example.com").unwrap();

        // A token of one kind must never verify as the other.
        assert_eq!(
            codec.verify(TokenKind::Refresh, &access),
            Err(AuthError::TokenInvalid)
        );
        assert_eq!(
            codec.verify(TokenKind::Access, &refresh),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn test_expired_token_is_distinguished() {
        let config = JwtConfig {
            access_ttl_secs: -120,
            leeway_secs: 0,
            ..test_config()
        };
        let codec = TokenCodec::new(config).unwrap();

        let token = codec
            .sign_access(UserId::generate(), "a@example.com", &PermissionSet::new())
            .unwrap();

        assert_eq!(
            codec.verify(TokenKind::Access, &token),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let codec = TokenCodec::new(test_config()).unwrap();
        let token = codec
            .sign_access(UserId::generate(), "a@example.com", &PermissionSet::new())
            .unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let tampered = format!("{}.e30.{}", parts[0], parts[2]);

        assert_eq!(
            codec.verify(TokenKind::Access, &tampered),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn test_wrong_issuer_is_invalid() {
        let codec = TokenCodec::new(test_config()).unwrap();
        let other = TokenCodec::new(test_config().with_issuer("someone-else")).unwrap();

        let token = other
            .sign_access(UserId::generate(), "a@example.com", &PermissionSet::new())
            .unwrap();

        assert_eq!(
            codec.verify(TokenKind::Access, &token),
            Err(AuthError::TokenInvalid)
        );
    }
}
