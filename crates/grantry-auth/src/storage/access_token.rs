//! Access token storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AccessToken;

/// Storage trait for access tokens.
///
/// Tokens are written through [`TokenPairStorage`](super::TokenPairStorage).
/// Like codes, expired tokens must read as absent.
#[async_trait]
pub trait AccessTokenStorage: Send + Sync {
    /// Finds a live access token by its hash.
    ///
    /// # Returns
    ///
    /// Returns `None` if the token is unknown or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<AccessToken>>;

    /// Deletes expired access tokens.
    ///
    /// # Returns
    ///
    /// Returns the number of tokens deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn purge_expired(&self) -> AuthResult<u64>;
}
