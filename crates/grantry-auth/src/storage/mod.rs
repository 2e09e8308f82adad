//! Storage traits for the credential store and client registry.
//!
//! This module defines storage interfaces for:
//!
//! - Client registrations
//! - Authorization codes
//! - Access and refresh tokens
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `grantry-auth-memory` - in-memory backend with TTL expiry

pub mod access_token;
pub mod client;
pub mod code;
pub mod refresh_token;
pub mod token_pair;

use std::sync::Arc;

pub use access_token::AccessTokenStorage;
pub use client::ClientStorage;
pub use code::{AuthorizationCodeStorage, ConsumedCode};
pub use refresh_token::RefreshTokenStorage;
pub use token_pair::{ReplacedPair, TokenPairStorage};

/// Handles to the credential collections the grant engine works on.
#[derive(Clone)]
pub struct CredentialStore {
    /// Authorization codes.
    pub codes: Arc<dyn AuthorizationCodeStorage>,
    /// Access tokens.
    pub access_tokens: Arc<dyn AccessTokenStorage>,
    /// Refresh tokens.
    pub refresh_tokens: Arc<dyn RefreshTokenStorage>,
    /// Atomic replacement of a user and client's token pair.
    pub token_pairs: Arc<dyn TokenPairStorage>,
}

impl CredentialStore {
    /// Bundles the storages.
    #[must_use]
    pub fn new(
        codes: Arc<dyn AuthorizationCodeStorage>,
        access_tokens: Arc<dyn AccessTokenStorage>,
        refresh_tokens: Arc<dyn RefreshTokenStorage>,
        token_pairs: Arc<dyn TokenPairStorage>,
    ) -> Self {
        Self {
            codes,
            access_tokens,
            refresh_tokens,
            token_pairs,
        }
    }
}
