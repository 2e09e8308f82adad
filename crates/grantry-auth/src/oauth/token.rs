//! Token endpoint types.
//!
//! A raw [`TokenRequest`] (form fields as sent by the client) is turned into
//! a typed [`GrantRequest`] before anything touches the credential store, so
//! malformed requests fail with `invalid_request` without side effects.
//!
//! # Supported Grant Types
//!
//! - `authorization_code` - Exchange an authorization code for tokens
//! - `refresh_token` - Rotate a refresh token into a new token pair

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;
use crate::types::{GrantType, GrantedTokens, Scope};

/// Token request parameters.
///
/// - `authorization_code`: code, client credentials
/// - `refresh_token`: refresh_token, client credentials
///
/// Client credentials come either from the body (`client_id` +
/// `client_secret`) or from an HTTP Basic header (not in this struct).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type.
    #[serde(default)]
    pub grant_type: Option<String>,

    /// Authorization code (for authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Refresh token (for refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Client ID (client_secret_post).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (client_secret_post).
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Client id and secret presented with a token request.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Client identifier.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
}

impl ClientCredentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// A validated token request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantRequest {
    /// Exchange an authorization code.
    AuthorizationCode {
        /// The presented code.
        code: String,
        /// Client credentials.
        credentials: ClientCredentials,
    },
    /// Exchange a refresh token.
    RefreshToken {
        /// The presented refresh token value.
        refresh_token: String,
        /// Client credentials.
        credentials: ClientCredentials,
    },
}

impl GrantRequest {
    /// Validates a raw token request.
    ///
    /// `header_credentials` are credentials taken from an HTTP Basic header;
    /// when present they win over body credentials, and a body `client_id`
    /// naming a different client is rejected.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if a required field is missing or credentials
    ///   conflict
    /// - `UnsupportedGrantType` for any grant type other than
    ///   `authorization_code` and `refresh_token`
    pub fn from_request(
        request: TokenRequest,
        header_credentials: Option<ClientCredentials>,
    ) -> AuthResult<Self> {
        let grant_type: GrantType = non_empty(request.grant_type)
            .ok_or_else(|| AuthError::invalid_request("missing grant_type"))?
            .parse()?;

        let credentials = match header_credentials {
            Some(credentials) => {
                if let Some(body_id) = non_empty(request.client_id)
                    && body_id != credentials.client_id
                {
                    return Err(AuthError::invalid_request(
                        "client_id does not match the Authorization header",
                    ));
                }
                credentials
            }
            None => {
                let client_id = non_empty(request.client_id)
                    .ok_or_else(|| AuthError::invalid_request("missing client_id"))?;
                let client_secret = non_empty(request.client_secret)
                    .ok_or_else(|| AuthError::invalid_request("missing client_secret"))?;
                ClientCredentials::new(client_id, client_secret)
            }
        };

        match grant_type {
            GrantType::AuthorizationCode => {
                let code = non_empty(request.code)
                    .ok_or_else(|| AuthError::invalid_request("missing code"))?;
                Ok(Self::AuthorizationCode { code, credentials })
            }
            GrantType::RefreshToken => {
                let refresh_token = non_empty(request.refresh_token)
                    .ok_or_else(|| AuthError::invalid_request("missing refresh_token"))?;
                Ok(Self::RefreshToken {
                    refresh_token,
                    credentials,
                })
            }
        }
    }

    /// Returns the grant type of this request.
    #[must_use]
    pub fn grant_type(&self) -> GrantType {
        match self {
            Self::AuthorizationCode { .. } => GrantType::AuthorizationCode,
            Self::RefreshToken { .. } => GrantType::RefreshToken,
        }
    }

    /// Returns the client credentials of this request.
    #[must_use]
    pub fn credentials(&self) -> &ClientCredentials {
        match self {
            Self::AuthorizationCode { credentials, .. } | Self::RefreshToken { credentials, .. } => {
                credentials
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Successful token response.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "gX3s...",
///   "refresh_token": "q9Lk...",
///   "token_type": "bearer",
///   "expires_in": 180,
///   "expires_at": "2025-01-01T00:03:00Z",
///   "scope": "public"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,

    /// The rotated refresh token.
    pub refresh_token: String,

    /// Token type, always "bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Access token expiry.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: time::OffsetDateTime,

    /// Granted scope.
    pub scope: Scope,
}

impl From<GrantedTokens> for TokenResponse {
    fn from(tokens: GrantedTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
            expires_at: tokens.expires_at,
            scope: tokens.scope,
        }
    }
}
