//! Token pair storage trait.
//!
//! # Security Considerations
//!
//! - A presented refresh token is removed in the same step that installs its
//!   successor, so a rotated token can never be used again
//! - Readers never observe a pair with a refresh token but no access token,
//!   or the other way around

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{AccessToken, RefreshToken};

/// Counts of the tokens a replacement revoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplacedPair {
    /// Refresh tokens removed, including the presented one.
    pub revoked_refresh: u64,
    /// Access tokens removed.
    pub revoked_access: u64,
}

/// Storage trait for the token pair of a user and client.
#[async_trait]
pub trait TokenPairStorage: Send + Sync {
    /// Installs `refresh` and `access` as the only tokens of their pair.
    ///
    /// # Atomicity
    ///
    /// The whole call is one step. When `presented_refresh_hash` is given it
    /// must still be stored; it is removed together with every access token
    /// minted from it. Whatever else the pair holds is dropped, then the new
    /// tokens are inserted. When several callers present the same hash
    /// concurrently, exactly one receives `Some`. A failed call changes
    /// nothing.
    ///
    /// # Returns
    ///
    /// Returns `None` if the presented refresh token is no longer stored.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityViolation` if `access` was not minted from
    /// `refresh` or either hash is already stored, or a storage error if the
    /// write fails.
    async fn replace_pair(
        &self,
        presented_refresh_hash: Option<&str>,
        refresh: &RefreshToken,
        access: &AccessToken,
    ) -> AuthResult<Option<ReplacedPair>>;
}
