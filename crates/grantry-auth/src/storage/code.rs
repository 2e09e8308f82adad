//! Authorization code storage trait.
//!
//! # Security Considerations
//!
//! - Never log authorization codes
//! - Consumption must be atomic to prevent replay
//! - Consuming one code must void every other code of the same user and
//!   client in the same step

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AuthorizationCode;

/// Outcome of a successful code consumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumedCode {
    /// The code that was presented.
    pub code: AuthorizationCode,
    /// Number of sibling codes (same user and client) voided with it.
    pub voided: usize,
}

/// Storage trait for authorization codes.
///
/// Implementations own expiry: a code whose `expires_at` has passed must be
/// reported as absent by every method, and may be purged when observed.
///
/// # Implementations
///
/// - `grantry-auth-memory` - in-memory backend
#[async_trait]
pub trait AuthorizationCodeStorage: Send + Sync {
    /// Stores a new authorization code.
    ///
    /// Multiple live codes for the same user and client are allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the code value already exists or the storage is
    /// unavailable.
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()>;

    /// Finds a live code without consuming it.
    ///
    /// # Returns
    ///
    /// Returns `None` if the code is unknown, consumed, or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Atomically removes `code` and every other code issued to the same user
    /// and client.
    ///
    /// # Atomicity
    ///
    /// Exactly one caller can observe `Some` for a given code. Concurrent
    /// callers racing on the same code (or on two sibling codes) see `None`.
    /// Backends without multi-row transactions cannot offer the sibling part
    /// of this guarantee and must document it.
    ///
    /// # Returns
    ///
    /// Returns `None` if the code was unknown, expired, or already consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn consume_with_siblings(&self, code: &str) -> AuthResult<Option<ConsumedCode>>;

    /// Deletes expired codes.
    ///
    /// # Returns
    ///
    /// Returns the number of codes deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn purge_expired(&self) -> AuthResult<u64>;
}
