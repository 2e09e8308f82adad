//! Client registry.
//!
//! Resolves clients by id, authenticates them by id and secret, decides which
//! redirect targets a client may use, and registers new clients.

use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::AuthResult;
use crate::clock::DynClock;
use crate::error::AuthError;
use crate::sanitize::DescriptionSanitizer;
use crate::storage::ClientStorage;
use crate::types::{
    Client, ClientView, LOOPBACK_HOSTS, NewClient, RedirectDomain, RegisteredClient,
};

/// Read side and registration of client applications.
#[derive(Clone)]
pub struct ClientRegistry {
    storage: Arc<dyn ClientStorage>,
    sanitizer: DescriptionSanitizer,
    clock: DynClock,
}

impl ClientRegistry {
    /// Creates a registry over `storage`.
    #[must_use]
    pub fn new(
        storage: Arc<dyn ClientStorage>,
        sanitizer: DescriptionSanitizer,
        clock: DynClock,
    ) -> Self {
        Self {
            storage,
            sanitizer,
            clock,
        }
    }

    /// Finds a client by id.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage operation fails; an unknown id
    /// is `Ok(None)`.
    pub async fn find_by_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        self.storage.find_by_client_id(client_id).await
    }

    /// Finds a client by id and secret.
    ///
    /// The secret is compared in constant time. An unknown id and a wrong
    /// secret both yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage operation fails.
    pub async fn find_by_id_and_secret(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> AuthResult<Option<Client>> {
        let Some(client) = self.storage.find_by_client_id(client_id).await? else {
            debug!(client_id = %client_id, "Client lookup failed: unknown client");
            return Ok(None);
        };

        let matches: bool = client
            .client_secret
            .as_bytes()
            .ct_eq(client_secret.as_bytes())
            .into();

        if matches {
            Ok(Some(client))
        } else {
            debug!(client_id = %client_id, "Client lookup failed: secret mismatch");
            Ok(None)
        }
    }

    /// Returns `true` if `candidate` is an acceptable redirect target for
    /// `client`.
    ///
    /// `candidate` may be a full http(s) URL or a bare `host[:port]`. It is
    /// accepted when its host is the client's domain or a subdomain of it
    /// (with a matching port if the domain registered one), or when its host
    /// is `localhost`/`127.0.0.1` on any port.
    #[must_use]
    pub fn is_redirect_allowed(&self, client: &Client, candidate: &str) -> bool {
        let Some((host, port)) = candidate_host_port(candidate) else {
            return false;
        };

        if LOOPBACK_HOSTS.contains(&host.as_str()) {
            return true;
        }

        let Some(domain) = client.redirect_domain() else {
            return false;
        };

        if !domain.covers_host(&host) {
            return false;
        }

        match domain.port {
            Some(required) => port == Some(required),
            None => true,
        }
    }

    /// Registers a new client.
    ///
    /// Generates the client id and secret, sanitizes the description and
    /// stores the client. The returned value is the only place the secret is
    /// ever exposed.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the name or user id is empty, the domain is not
    ///   a bare `host[:port]`, or the name is taken
    /// - Storage errors from the backend
    pub async fn register(&self, request: NewClient) -> AuthResult<RegisteredClient> {
        let name = request.client_name.trim().to_string();
        let owner_user_id = request.user_id.trim().to_string();
        let domain = RedirectDomain::parse(request.domain.trim())
            .map_err(|e| AuthError::invalid_request(e.to_string()))?;

        let description = request
            .description
            .as_deref()
            .map(|d| self.sanitizer.sanitize(d))
            .filter(|d| !d.trim().is_empty());

        let client = Client {
            client_id: Uuid::new_v4().to_string(),
            client_secret: Uuid::new_v4().to_string(),
            owner_user_id,
            name,
            redirect_domain: domain.to_string(),
            description,
            created_at: self.clock.now(),
        };

        client
            .validate()
            .map_err(|e| AuthError::invalid_request(e.to_string()))?;

        self.storage.create(&client).await?;

        info!(
            client_id = %client.client_id,
            owner = %client.owner_user_id,
            domain = %client.redirect_domain,
            "Client registered"
        );

        Ok(RegisteredClient {
            client: client.view(),
            client_secret: client.client_secret,
        })
    }

    /// Lists registered clients without their secrets.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn list(&self, limit: usize, offset: usize) -> AuthResult<Vec<ClientView>> {
        let clients = self.storage.list(limit, offset).await?;
        Ok(clients.iter().map(Client::view).collect())
    }
}

/// Extracts a lowercased host and optional port from a URL or `host[:port]`.
fn candidate_host_port(candidate: &str) -> Option<(String, Option<u16>)> {
    let candidate = candidate.trim();
    if candidate.contains("://") {
        let url = Url::parse(candidate).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = url.host_str()?.to_ascii_lowercase();
        return Some((host, url.port_or_known_default()));
    }

    if candidate.is_empty() || candidate.contains(['/', '?', '#', '@']) {
        return None;
    }
    match candidate.rsplit_once(':') {
        Some((host, port)) => Some((host.to_ascii_lowercase(), Some(port.parse().ok()?))),
        None => Some((candidate.to_ascii_lowercase(), None)),
    }
}
