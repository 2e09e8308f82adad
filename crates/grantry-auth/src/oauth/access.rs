//! Bearer access checks for protected resources.

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::AccessTokenStorage;
use crate::types::{Scope, hash_token};

/// Who a bearer token acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessContext {
    /// The approving user.
    pub user_id: String,
    /// The client holding the token.
    pub client_id: String,
    /// Scope granted to the token.
    pub scope: Scope,
    /// When the token stops being accepted.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Resolves presented access tokens.
#[derive(Clone)]
pub struct AccessValidator {
    access_tokens: Arc<dyn AccessTokenStorage>,
}

impl AccessValidator {
    /// Creates a validator over the access token storage.
    #[must_use]
    pub fn new(access_tokens: Arc<dyn AccessTokenStorage>) -> Self {
        Self { access_tokens }
    }

    /// Resolves a raw access token to its context.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` if the token is unknown or expired
    /// - Storage errors from the backend
    pub async fn validate(&self, token: &str) -> AuthResult<AccessContext> {
        let Some(stored) = self.access_tokens.find_by_hash(&hash_token(token)).await? else {
            debug!("Bearer token rejected: unknown or expired");
            return Err(AuthError::invalid_token("access token is invalid or expired"));
        };

        Ok(AccessContext {
            user_id: stored.user_id,
            client_id: stored.client_id,
            scope: stored.scope,
            expires_at: stored.expires_at,
        })
    }
}
