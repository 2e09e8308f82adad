//! Axum HTTP handlers for the grant endpoints.
//!
//! - `POST /clients` - register a client
//! - `GET /clients` - list clients without secrets
//! - `GET /oauth2/authorize` - issue an authorization code
//! - `POST /oauth2/token` - exchange a code or refresh token
//! - `GET /me/grant` - describe the presented bearer token

pub mod authorize;
pub mod bearer;
pub mod clients;
pub mod error;
pub mod token;

use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    http::{HeaderMap, header::AUTHORIZATION},
    routing::{get, post},
};

use crate::clock::DynClock;
use crate::config::AuthConfig;
use crate::oauth::{
    AccessValidator, AuthorizationCodeIssuer, ClientRegistry, GrantConfig, IssuerConfig,
    TokenGrantEngine,
};
use crate::sanitize::DescriptionSanitizer;
use crate::storage::{ClientStorage, CredentialStore};

pub use authorize::{ApprovingOwner, ResourceOwner, authorize_handler};
pub use bearer::{BearerAuth, grant_info_handler};
pub use clients::{ListClientsParams, list_clients_handler, register_client_handler};
pub use error::ErrorResponse;
pub use token::{basic_credentials, token_handler};

/// State shared by the grant endpoints.
#[derive(Clone)]
pub struct GrantState {
    /// Client registry.
    pub registry: ClientRegistry,
    /// Authorization code issuer.
    pub issuer: AuthorizationCodeIssuer,
    /// Token grant engine.
    pub engine: TokenGrantEngine,
    /// Bearer token checks.
    pub access: AccessValidator,
}

impl GrantState {
    /// Wires the grant services over the given storages.
    #[must_use]
    pub fn new(
        clients: Arc<dyn ClientStorage>,
        credentials: CredentialStore,
        clock: DynClock,
        config: &AuthConfig,
    ) -> Self {
        let registry = ClientRegistry::new(
            clients,
            DescriptionSanitizer::from_config(&config.registration),
            clock.clone(),
        );
        let issuer = AuthorizationCodeIssuer::new(
            registry.clone(),
            credentials.codes.clone(),
            clock.clone(),
            IssuerConfig::from_oauth(&config.oauth),
        );
        let access = AccessValidator::new(credentials.access_tokens.clone());
        let engine = TokenGrantEngine::new(
            registry.clone(),
            issuer.clone(),
            credentials,
            clock,
            GrantConfig::from_oauth(&config.oauth),
        );

        Self {
            registry,
            issuer,
            engine,
            access,
        }
    }
}

impl FromRef<GrantState> for AccessValidator {
    fn from_ref(state: &GrantState) -> Self {
        state.access.clone()
    }
}

/// Returns the credentials of an `Authorization` header using `scheme`.
///
/// Scheme names compare case-insensitively.
pub(crate) fn authorization_credentials<'a>(
    headers: &'a HeaderMap,
    scheme: &str,
) -> Option<&'a str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (name, credentials) = value.trim_start().split_once(' ')?;
    name.eq_ignore_ascii_case(scheme)
        .then_some(credentials.trim())
        .filter(|c| !c.is_empty())
}

/// Routes for every grant endpoint.
pub fn routes() -> Router<GrantState> {
    Router::new()
        .route(
            "/clients",
            post(register_client_handler).get(list_clients_handler),
        )
        .route("/oauth2/authorize", get(authorize_handler))
        .route("/oauth2/token", post(token_handler))
        .route("/me/grant", get(grant_info_handler))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{Router, body::Body, http::Response};
    use serde_json::Value;

    use super::*;
    use crate::clock::ManualClock;
    use crate::testing::{MockStore, test_client, test_clock};

    pub struct TestApp {
        pub router: Router,
        pub store: Arc<MockStore>,
        pub state: GrantState,
        pub clock: ManualClock,
    }

    pub fn test_app() -> TestApp {
        let clock = test_clock();
        let store = MockStore::with_clients(
            clock.clone(),
            vec![test_client("c1", "s1", "example.com")],
        );
        let state = GrantState::new(
            store.clone(),
            store.credentials(),
            Arc::new(clock.clone()),
            &AuthConfig::default(),
        );
        TestApp {
            router: routes().with_state(state.clone()),
            store,
            state,
            clock,
        }
    }

    pub async fn json_body(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
