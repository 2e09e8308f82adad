//! Access and refresh token domain types.
//!
//! # Security
//!
//! - Token values are returned to the client exactly once and stored only as
//!   SHA-256 hashes
//! - An access token records the hash of the refresh token it was minted
//!   with, so rotating the refresh token can cascade to it

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::types::scope::Scope;

/// Token type reported for every access token.
pub const BEARER_TOKEN_TYPE: &str = "bearer";

/// Hash a token value using SHA-256.
///
/// This is used both when storing new tokens and when looking up tokens for
/// validation.
#[must_use]
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a cryptographically secure random token.
///
/// Returns a 256-bit random value encoded as base64url (43 characters).
#[must_use]
pub fn generate_token() -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// =============================================================================
// Refresh Token
// =============================================================================

/// Stored refresh token.
///
/// Refresh tokens never expire on their own; they are replaced on every use.
/// At most one exists per user and client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// SHA-256 hash of the token value.
    pub token_hash: String,

    /// Client the token was issued to.
    pub client_id: String,

    /// Resource owner that approved the grant.
    pub user_id: String,

    /// Scope carried over from the original approval.
    pub scope: Scope,

    /// When the token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl RefreshToken {
    /// Mints a new refresh token, returning the record to store and the
    /// plaintext value for the client.
    #[must_use]
    pub fn mint(
        client_id: impl Into<String>,
        user_id: impl Into<String>,
        scope: Scope,
        now: OffsetDateTime,
    ) -> (Self, String) {
        let value = generate_token();
        let token = Self {
            token_hash: hash_token(&value),
            client_id: client_id.into(),
            user_id: user_id.into(),
            scope,
            created_at: now,
        };
        (token, value)
    }
}

// =============================================================================
// Access Token
// =============================================================================

/// Stored access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// SHA-256 hash of the token value.
    pub token_hash: String,

    /// Hash of the refresh token minted alongside this access token.
    pub refresh_token_hash: String,

    /// Client the token was issued to.
    pub client_id: String,

    /// Resource owner that approved the grant.
    pub user_id: String,

    /// Always [`BEARER_TOKEN_TYPE`].
    pub token_type: String,

    /// Granted scope.
    pub scope: Scope,

    /// When the token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the token stops being accepted.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AccessToken {
    /// Mints a new access token bound to `refresh`, returning the record to
    /// store and the plaintext value for the client.
    #[must_use]
    pub fn mint(refresh: &RefreshToken, now: OffsetDateTime, lifetime: Duration) -> (Self, String) {
        let value = generate_token();
        let token = Self {
            token_hash: hash_token(&value),
            refresh_token_hash: refresh.token_hash.clone(),
            client_id: refresh.client_id.clone(),
            user_id: refresh.user_id.clone(),
            token_type: BEARER_TOKEN_TYPE.to_string(),
            scope: refresh.scope,
            created_at: now,
            expires_at: now + lifetime,
        };
        (token, value)
    }

    /// Returns `true` if the token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

// =============================================================================
// Granted Tokens
// =============================================================================

/// Result of a successful grant: the plaintext credentials for the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantedTokens {
    /// Access token value.
    pub access_token: String,
    /// Refresh token value.
    pub refresh_token: String,
    /// Always [`BEARER_TOKEN_TYPE`].
    pub token_type: String,
    /// Access token expiry.
    pub expires_at: OffsetDateTime,
    /// Seconds until expiry at issuance.
    pub expires_in: u64,
    /// Granted scope.
    pub scope: Scope,
}
