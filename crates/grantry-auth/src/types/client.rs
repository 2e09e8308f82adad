//! Client application domain types.
//!
//! A client is an application acting on behalf of a resource owner. It is
//! registered once and never modified afterwards.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// =============================================================================
// Redirect Domain
// =============================================================================

/// Hosts that are accepted as redirect targets for every client, on any port.
pub const LOOPBACK_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

/// One DNS label, optionally punycoded.
static DOMAIN_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(xn--)?[a-z0-9]+(-[a-z0-9]+)*$").expect("Invalid domain label regex")
});

/// Alphabetic top-level label.
static TOP_LEVEL_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z]{2,63}$").expect("Invalid top-level label regex"));

/// A registered redirect domain: a host name with an optional port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDomain {
    /// Lowercased host name.
    pub host: String,
    /// Port the redirect must use, if one was registered.
    pub port: Option<u16>,
}

impl RedirectDomain {
    /// Parses a `host[:port]` string.
    ///
    /// The host must be a fully qualified domain name or one of
    /// [`LOOPBACK_HOSTS`]. URIs (anything with a scheme or a path) are
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns `ClientValidationError::InvalidDomain` if the value is not a
    /// bare domain.
    pub fn parse(value: &str) -> Result<Self, ClientValidationError> {
        let invalid = || ClientValidationError::InvalidDomain(value.to_string());

        if value.is_empty() || value.contains(['/', '?', '#', '@']) {
            return Err(invalid());
        }

        let (host, port) = match value.rsplit_once(':') {
            Some((host, port)) => {
                let port: u16 = port.parse().map_err(|_| invalid())?;
                if port == 0 {
                    return Err(invalid());
                }
                (host, Some(port))
            }
            None => (value, None),
        };

        let host = host.to_ascii_lowercase();
        if !LOOPBACK_HOSTS.contains(&host.as_str()) && !is_fqdn(&host) {
            return Err(invalid());
        }

        Ok(Self { host, port })
    }

    /// Returns `true` if `host` equals this domain or is a subdomain of it.
    #[must_use]
    pub fn covers_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        host == self.host
            || host
                .strip_suffix(self.host.as_str())
                .is_some_and(|prefix| prefix.ends_with('.') && prefix.len() > 1)
    }
}

impl std::fmt::Display for RedirectDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => f.write_str(&self.host),
        }
    }
}

fn is_fqdn(host: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };
    TOP_LEVEL_LABEL.is_match(tld)
        && rest
            .iter()
            .all(|label| label.len() <= 63 && DOMAIN_LABEL.is_match(label))
}

// =============================================================================
// Client
// =============================================================================

/// Registered client application.
///
/// The secret is held verbatim so it can be compared in constant time; it is
/// never serialized into listings or responses (see [`ClientView`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Client secret presented at the token endpoint.
    pub client_secret: String,

    /// User that registered the client.
    pub owner_user_id: String,

    /// Globally unique display name.
    pub name: String,

    /// Domain redirect URIs must fall within.
    pub redirect_domain: String,

    /// Sanitized description shown on the approval page.
    pub description: Option<String>,

    /// When the client was registered.
    pub created_at: OffsetDateTime,
}

impl Client {
    /// Validates the client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is empty or the redirect
    /// domain is malformed.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.client_secret.is_empty() {
            return Err(ClientValidationError::EmptySecret);
        }

        if self.name.trim().is_empty() {
            return Err(ClientValidationError::EmptyName);
        }

        if self.owner_user_id.trim().is_empty() {
            return Err(ClientValidationError::EmptyOwner);
        }

        RedirectDomain::parse(&self.redirect_domain)?;

        Ok(())
    }

    /// Returns the parsed redirect domain, or `None` if the stored value is
    /// malformed.
    #[must_use]
    pub fn redirect_domain(&self) -> Option<RedirectDomain> {
        RedirectDomain::parse(&self.redirect_domain).ok()
    }

    /// Returns the public projection of this client.
    #[must_use]
    pub fn view(&self) -> ClientView {
        ClientView::from(self)
    }
}

/// Client as exposed to callers: everything except the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientView {
    /// Client identifier.
    pub client_id: String,
    /// Display name.
    pub name: String,
    /// Owning user.
    pub owner_user_id: String,
    /// Redirect domain.
    pub redirect_domain: String,
    /// Sanitized description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Registration time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&Client> for ClientView {
    fn from(client: &Client) -> Self {
        Self {
            client_id: client.client_id.clone(),
            name: client.name.clone(),
            owner_user_id: client.owner_user_id.clone(),
            redirect_domain: client.redirect_domain.clone(),
            description: client.description.clone(),
            created_at: client.created_at,
        }
    }
}

/// Registration input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewClient {
    /// Display name, unique across all clients.
    pub client_name: String,
    /// Registering user.
    pub user_id: String,
    /// Redirect domain as `host[:port]`.
    pub domain: String,
    /// Optional description; limited markup is allowed.
    #[serde(default)]
    pub description: Option<String>,
}

/// Registration result. The only place the client secret is ever returned.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredClient {
    /// Public view of the stored client.
    #[serde(flatten)]
    pub client: ClientView,
    /// Client secret, shown once.
    pub client_secret: String,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors that can occur during client validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientValidationError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// Client secret cannot be empty.
    #[error("Client secret cannot be empty")]
    EmptySecret,

    /// Client name cannot be empty.
    #[error("Client name cannot be empty")]
    EmptyName,

    /// Owner user id cannot be empty.
    #[error("Client owner user id cannot be empty")]
    EmptyOwner,

    /// Domain is not a bare `host[:port]`.
    #[error("Invalid redirect domain: {0}")]
    InvalidDomain(String),
}
