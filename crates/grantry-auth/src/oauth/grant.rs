//! Token grant engine.
//!
//! The state machine behind the token endpoint. Per (user, client) pair:
//!
//! ```text
//! NoGrant --issue--> CodeIssued --exchange--> Authorized --refresh--> Authorized'
//! ```
//!
//! Every successful exchange leaves exactly one access token and one refresh
//! token for the pair. Codes are consumed together with their siblings, and
//! the new pair replaces the old one in a single store step that also
//! retires the presented refresh token. Two racing exchanges of the same
//! credential cannot both succeed, and a code exchange racing a refresh for
//! the same pair leaves the later winner's tokens in place.

use time::Duration;
use tracing::{debug, info, warn};

use crate::AuthResult;
use crate::clock::DynClock;
use crate::config::OAuthConfig;
use crate::error::AuthError;
use crate::oauth::issuer::AuthorizationCodeIssuer;
use crate::oauth::registry::ClientRegistry;
use crate::oauth::token::{ClientCredentials, GrantRequest};
use crate::storage::CredentialStore;
use crate::types::{
    AccessToken, BEARER_TOKEN_TYPE, Client, GrantedTokens, RefreshToken, Scope, hash_token,
};

/// Configuration for the grant engine.
#[derive(Debug, Clone)]
pub struct GrantConfig {
    /// Access token lifetime.
    /// Default: 3 minutes.
    pub access_token_lifetime: Duration,
}

impl Default for GrantConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::minutes(3),
        }
    }
}

impl GrantConfig {
    /// Builds the engine configuration from OAuth settings.
    #[must_use]
    pub fn from_oauth(config: &OAuthConfig) -> Self {
        Self {
            access_token_lifetime: config.access_lifetime(),
        }
    }
}

/// Exchanges codes and refresh tokens for token pairs.
#[derive(Clone)]
pub struct TokenGrantEngine {
    registry: ClientRegistry,
    issuer: AuthorizationCodeIssuer,
    store: CredentialStore,
    clock: DynClock,
    config: GrantConfig,
}

impl TokenGrantEngine {
    /// Creates a new engine.
    #[must_use]
    pub fn new(
        registry: ClientRegistry,
        issuer: AuthorizationCodeIssuer,
        store: CredentialStore,
        clock: DynClock,
        config: GrantConfig,
    ) -> Self {
        Self {
            registry,
            issuer,
            store,
            clock,
            config,
        }
    }

    /// Dispatches a validated token request to the matching grant.
    ///
    /// # Errors
    ///
    /// See [`exchange_code`](Self::exchange_code) and
    /// [`refresh`](Self::refresh).
    pub async fn exchange(&self, request: GrantRequest) -> AuthResult<GrantedTokens> {
        match request {
            GrantRequest::AuthorizationCode { code, credentials } => {
                self.exchange_code(&code, &credentials).await
            }
            GrantRequest::RefreshToken {
                refresh_token,
                credentials,
            } => self.refresh(&refresh_token, &credentials).await,
        }
    }

    /// Exchanges an authorization code.
    ///
    /// # Errors
    ///
    /// - `InvalidGrant` if the code is unknown, expired, bound to another
    ///   client, or consumed by a concurrent exchange
    /// - `InvalidClient` if the credentials do not resolve
    /// - Storage errors from the grant step
    pub async fn exchange_code(
        &self,
        code: &str,
        credentials: &ClientCredentials,
    ) -> AuthResult<GrantedTokens> {
        // 1. Look up the code without consuming it
        let Some(authorization) = self.issuer.validate_and_peek(code).await? else {
            warn!(client_id = %credentials.client_id, "Code exchange rejected: unknown or expired code");
            return Err(AuthError::invalid_grant(
                "authorization code is invalid or expired",
            ));
        };

        // 2. Code must belong to the presenting client
        if authorization.client_id != credentials.client_id {
            warn!(
                client_id = %credentials.client_id,
                "Code exchange rejected: code issued to a different client"
            );
            return Err(AuthError::invalid_grant(
                "authorization code was issued to a different client",
            ));
        }

        // 3. Authenticate the client
        let client = self.authenticate(credentials).await?;

        // 4. Consume the code and every sibling in one step
        let Some(consumed) = self.store.codes.consume_with_siblings(code).await? else {
            warn!(client_id = %client.client_id, "Code exchange rejected: code already consumed");
            return Err(AuthError::invalid_grant(
                "authorization code is invalid or expired",
            ));
        };

        debug!(
            client_id = %client.client_id,
            user_id = %consumed.code.user_id,
            voided = consumed.voided,
            "Authorization code consumed"
        );

        // 5. Mint tokens
        self.grant_access_token(&client, &consumed.code.user_id, consumed.code.scope, None)
            .await
    }

    /// Exchanges a refresh token, rotating it.
    ///
    /// # Errors
    ///
    /// - `InvalidGrant` if the token is unknown, bound to another client, or
    ///   rotated away by a concurrent exchange
    /// - `InvalidClient` if the credentials do not resolve
    /// - Storage errors from the grant step
    pub async fn refresh(
        &self,
        refresh_token: &str,
        credentials: &ClientCredentials,
    ) -> AuthResult<GrantedTokens> {
        // 1. Look up the token
        let token_hash = hash_token(refresh_token);
        let Some(existing) = self.store.refresh_tokens.find_by_hash(&token_hash).await? else {
            warn!(client_id = %credentials.client_id, "Refresh rejected: unknown refresh token");
            return Err(AuthError::invalid_grant("refresh token is invalid"));
        };

        // 2. Authenticate the client
        let client = self.authenticate(credentials).await?;

        // 3. Token must belong to the authenticated client
        if existing.client_id != client.client_id {
            warn!(
                client_id = %client.client_id,
                "Refresh rejected: token issued to a different client"
            );
            return Err(AuthError::invalid_grant(
                "refresh token was issued to a different client",
            ));
        }

        // 4. Rotate and mint
        let user_id = existing.user_id.clone();
        let scope = existing.scope;
        self.grant_access_token(&client, &user_id, scope, Some(existing))
            .await
    }

    /// Mints a fresh token pair for `user_id` and `client`.
    ///
    /// When `existing` is given it is the refresh token being rotated. The
    /// store retires it in the same step that installs the new pair, and
    /// losing that race means another exchange already used it. A failed
    /// write persists neither token.
    ///
    /// # Errors
    ///
    /// - `InvalidGrant` if `existing` was already rotated away
    /// - Storage errors from the pair write
    pub async fn grant_access_token(
        &self,
        client: &Client,
        user_id: &str,
        scope: Scope,
        existing: Option<RefreshToken>,
    ) -> AuthResult<GrantedTokens> {
        let client_id = client.client_id.as_str();

        // 1. Mint both tokens
        let now = self.clock.now();
        let lifetime = self.config.access_token_lifetime;
        let (refresh, refresh_value) = RefreshToken::mint(client_id, user_id, scope, now);
        let (access, access_value) = AccessToken::mint(&refresh, now, lifetime);

        // 2. Replace the pair, retiring the presented refresh token
        let presented = existing.as_ref().map(|t| t.token_hash.as_str());
        let Some(replaced) = self
            .store
            .token_pairs
            .replace_pair(presented, &refresh, &access)
            .await?
        else {
            warn!(
                client_id = %client_id,
                user_id = %user_id,
                "Refresh rejected: token already rotated"
            );
            return Err(AuthError::invalid_grant("refresh token is invalid"));
        };

        debug!(
            client_id = %client_id,
            user_id = %user_id,
            revoked_refresh = replaced.revoked_refresh,
            revoked_access = replaced.revoked_access,
            "Previous tokens revoked"
        );
        info!(
            client_id = %client_id,
            user_id = %user_id,
            scope = %scope,
            expires_at = %access.expires_at,
            "Tokens granted"
        );

        Ok(GrantedTokens {
            access_token: access_value,
            refresh_token: refresh_value,
            token_type: BEARER_TOKEN_TYPE.to_string(),
            expires_at: access.expires_at,
            expires_in: u64::try_from(lifetime.whole_seconds()).unwrap_or(0),
            scope,
        })
    }

    async fn authenticate(&self, credentials: &ClientCredentials) -> AuthResult<Client> {
        self.registry
            .find_by_id_and_secret(&credentials.client_id, &credentials.client_secret)
            .await?
            .ok_or_else(|| {
                warn!(client_id = %credentials.client_id, "Client authentication failed");
                AuthError::invalid_client("client authentication failed")
            })
    }
}
