//! Refresh token storage trait.
//!
//! Tokens are stored as SHA-256 hashes only. Rotation happens through
//! [`TokenPairStorage`](super::TokenPairStorage).

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::RefreshToken;

/// Storage trait for refresh tokens.
///
/// At most one refresh token may exist per user and client.
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Finds a refresh token by its hash.
    ///
    /// # Arguments
    ///
    /// * `token_hash` - SHA-256 hash of the token to find
    ///
    /// # Returns
    ///
    /// Returns `Some(token)` if found, `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;
}
