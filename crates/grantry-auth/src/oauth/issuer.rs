//! Authorization code issuer.
//!
//! Issues short-lived codes once a resource owner has approved a client, and
//! offers a non-consuming lookup for the token endpoint.
//!
//! # Usage
//!
//! ```ignore
//! use grantry_auth::oauth::{AuthorizationCodeIssuer, IssuerConfig};
//!
//! let issuer = AuthorizationCodeIssuer::new(registry, codes, clock, IssuerConfig::default());
//! let outcome = issuer.authorize(&request, Some("user-1")).await?;
//! ```

use std::sync::Arc;

use time::Duration;
use tracing::{debug, info, warn};

use crate::AuthResult;
use crate::clock::DynClock;
use crate::config::OAuthConfig;
use crate::error::AuthError;
use crate::oauth::authorize::{AuthorizationOutcome, AuthorizationRequest};
use crate::oauth::registry::ClientRegistry;
use crate::storage::AuthorizationCodeStorage;
use crate::types::{AuthorizationCode, Client, Scope};

/// Configuration for the code issuer.
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    /// Authorization code lifetime.
    /// Default: 10 minutes.
    pub code_lifetime: Duration,

    /// Fall back to the client's registering user when no resource owner
    /// is attached to the request.
    /// Default: false.
    pub implicit_owner_approval: bool,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            code_lifetime: Duration::minutes(10),
            implicit_owner_approval: false,
        }
    }
}

impl IssuerConfig {
    /// Builds the issuer configuration from OAuth settings.
    #[must_use]
    pub fn from_oauth(config: &OAuthConfig) -> Self {
        Self {
            code_lifetime: config.code_lifetime(),
            implicit_owner_approval: config.implicit_owner_approval,
        }
    }

    /// Enables the owner fallback.
    #[must_use]
    pub fn with_implicit_owner_approval(mut self) -> Self {
        self.implicit_owner_approval = true;
        self
    }
}

/// Issues and inspects authorization codes.
#[derive(Clone)]
pub struct AuthorizationCodeIssuer {
    registry: ClientRegistry,
    codes: Arc<dyn AuthorizationCodeStorage>,
    clock: DynClock,
    config: IssuerConfig,
}

impl AuthorizationCodeIssuer {
    /// Creates a new issuer.
    #[must_use]
    pub fn new(
        registry: ClientRegistry,
        codes: Arc<dyn AuthorizationCodeStorage>,
        clock: DynClock,
        config: IssuerConfig,
    ) -> Self {
        Self {
            registry,
            codes,
            clock,
            config,
        }
    }

    /// Issues a new code for an already resolved client.
    ///
    /// A new code is created on every call, even if other live codes exist
    /// for the same user and client.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the code cannot be persisted.
    pub async fn issue(
        &self,
        client: &Client,
        user_id: &str,
        scope: Scope,
    ) -> AuthResult<AuthorizationCode> {
        let code = AuthorizationCode::new(
            client.client_id.clone(),
            user_id,
            scope,
            self.clock.now(),
            self.config.code_lifetime,
        );

        self.codes.create(&code).await?;

        info!(
            client_id = %code.client_id,
            user_id = %code.user_id,
            scope = %code.scope,
            expires_at = %code.expires_at,
            "Authorization code issued"
        );

        Ok(code)
    }

    /// Resolves `client_id` and issues a code for it.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the client does not exist
    /// - Storage errors from the backend
    pub async fn issue_for(
        &self,
        client_id: &str,
        user_id: &str,
        scope: Scope,
    ) -> AuthResult<AuthorizationCode> {
        let client = self
            .registry
            .find_by_id(client_id)
            .await?
            .ok_or_else(|| AuthError::not_found(format!("unknown client '{client_id}'")))?;

        self.issue(&client, user_id, scope).await
    }

    /// Looks up a live code without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage operation fails; unknown and
    /// expired codes are `Ok(None)`.
    pub async fn validate_and_peek(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        self.codes.find(code).await
    }

    /// Handles an authorization request approved by `resource_owner`.
    ///
    /// Steps:
    /// 1. Validate request parameters
    /// 2. Resolve the client
    /// 3. Check the redirect target against the client's domain
    /// 4. Determine the approving user
    /// 5. Issue the code and format the response
    ///
    /// # Errors
    ///
    /// - `InvalidRequest`, `UnsupportedResponseType`, `InvalidScope` for bad
    ///   parameters
    /// - `NotFound` for an unknown client
    /// - `InvalidRequest` for a redirect URI outside the client's domain
    /// - `Unauthorized` if no resource owner approved the request
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
        resource_owner: Option<&str>,
    ) -> AuthResult<AuthorizationOutcome> {
        // 1. Parameters
        let validated = request.validate()?;

        // 2. Client
        let client = self
            .registry
            .find_by_id(&validated.client_id)
            .await?
            .ok_or_else(|| {
                debug!(client_id = %validated.client_id, "Authorization request for unknown client");
                AuthError::not_found(format!("unknown client '{}'", validated.client_id))
            })?;

        // 3. Redirect target
        if let Some(ref redirect_uri) = validated.redirect_uri
            && !self
                .registry
                .is_redirect_allowed(&client, redirect_uri.as_str())
        {
            warn!(
                client_id = %client.client_id,
                redirect_host = redirect_uri.host_str().unwrap_or_default(),
                domain = %client.redirect_domain,
                "Redirect URI outside client domain"
            );
            return Err(AuthError::invalid_request(
                "redirect_uri is not within the client's registered domain",
            ));
        }

        // 4. Approving user
        let user_id = match resource_owner {
            Some(user) if !user.is_empty() => user.to_string(),
            _ if self.config.implicit_owner_approval => client.owner_user_id.clone(),
            _ => {
                return Err(AuthError::unauthorized(
                    "authorization requires an authenticated resource owner",
                ));
            }
        };

        // 5. Issue
        let code = self.issue(&client, &user_id, validated.scope).await?;

        Ok(AuthorizationOutcome::format(
            &code,
            validated.redirect_uri.as_ref(),
            validated.state.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::DescriptionSanitizer;
    use crate::testing::{MockStore, test_client, test_clock};
    use crate::clock::ManualClock;

    fn build_issuer(config: IssuerConfig) -> (AuthorizationCodeIssuer, Arc<MockStore>, ManualClock) {
        let clock = test_clock();
        let store = MockStore::with_clients(
            clock.clone(),
            vec![test_client("c1", "s1", "example.com")],
        );
        let registry = ClientRegistry::new(
            store.clone(),
            DescriptionSanitizer::default(),
            Arc::new(clock.clone()),
        );
        let issuer =
            AuthorizationCodeIssuer::new(registry, store.clone(), Arc::new(clock.clone()), config);
        (issuer, store, clock)
    }

    fn request(redirect_uri: Option<&str>) -> AuthorizationRequest {
        AuthorizationRequest {
            response_type: Some("code".to_string()),
            client_id: Some("c1".to_string()),
            redirect_uri: redirect_uri.map(str::to_string),
            scope: Some("private".to_string()),
            state: Some("st".to_string()),
        }
    }

    #[tokio::test]
    async fn test_issue_always_creates_new_code() {
        let (issuer, store, _) = build_issuer(IssuerConfig::default());

        let a = issuer.issue_for("c1", "u1", Scope::Public).await.unwrap();
        let b = issuer.issue_for("c1", "u1", Scope::Public).await.unwrap();

        assert_ne!(a.code, b.code);
        assert_eq!(store.code_count(), 2);
        assert_eq!(a.expires_at - a.created_at, Duration::minutes(10));
    }

    #[tokio::test]
    async fn test_issue_for_unknown_client() {
        let (issuer, store, _) = build_issuer(IssuerConfig::default());

        let err = issuer
            .issue_for("missing", "u1", Scope::Public)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound { .. }));
        assert_eq!(err.http_status(), 404);
        assert_eq!(store.code_count(), 0);
    }

    #[tokio::test]
    async fn test_peek_does_not_consume_and_honours_expiry() {
        let (issuer, _, clock) = build_issuer(IssuerConfig::default());
        let code = issuer.issue_for("c1", "u1", Scope::Write).await.unwrap();

        let peeked = issuer.validate_and_peek(&code.code).await.unwrap();
        assert_eq!(peeked.as_ref(), Some(&code));
        assert!(issuer.validate_and_peek(&code.code).await.unwrap().is_some());

        clock.advance(Duration::minutes(10));
        assert!(issuer.validate_and_peek(&code.code).await.unwrap().is_none());
        assert!(issuer.validate_and_peek("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authorize_redirects_with_code_and_state() {
        let (issuer, store, _) = build_issuer(IssuerConfig::default());

        let outcome = issuer
            .authorize(&request(Some("https://app.example.com/cb")), Some("u1"))
            .await
            .unwrap();

        let AuthorizationOutcome::Redirect(location) = outcome else {
            panic!("expected redirect");
        };
        assert!(location.starts_with("https://app.example.com/cb?code="));
        assert!(location.ends_with("&state=st"));

        let stored: Vec<AuthorizationCode> = store.codes.lock().unwrap().values().cloned().collect();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_id, "u1");
        assert_eq!(stored[0].scope, Scope::Private);
    }

    #[tokio::test]
    async fn test_authorize_json_without_redirect() {
        let (issuer, _, _) = build_issuer(IssuerConfig::default());

        let outcome = issuer.authorize(&request(None), Some("u1")).await.unwrap();
        let AuthorizationOutcome::Json(body) = outcome else {
            panic!("expected json");
        };
        assert_eq!(body.state.as_deref(), Some("st"));
        assert!(!body.code.is_empty());
    }

    #[tokio::test]
    async fn test_authorize_rejects_foreign_redirect() {
        let (issuer, store, _) = build_issuer(IssuerConfig::default());

        let err = issuer
            .authorize(&request(Some("https://evil.com/cb")), Some("u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
        assert_eq!(store.code_count(), 0);
    }

    #[tokio::test]
    async fn test_authorize_unknown_client() {
        let (issuer, _, _) = build_issuer(IssuerConfig::default());
        let mut req = request(None);
        req.client_id = Some("nope".to_string());

        let err = issuer.authorize(&req, Some("u1")).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_authorize_requires_owner() {
        let (issuer, _, _) = build_issuer(IssuerConfig::default());
        let err = issuer.authorize(&request(None), None).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { .. }));

        let (issuer, store, _) = build_issuer(IssuerConfig::default().with_implicit_owner_approval());
        issuer.authorize(&request(None), None).await.unwrap();
        let stored: Vec<AuthorizationCode> = store.codes.lock().unwrap().values().cloned().collect();
        assert_eq!(stored[0].user_id, "owner-of-c1");
    }
}
