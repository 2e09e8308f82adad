//! Authorization endpoint types and response formatting.
//!
//! The authorization endpoint is the first step of the flow:
//!
//! 1. Client sends the user to the authorization endpoint
//! 2. User authenticates and approves the request
//! 3. Server answers with an authorization code, either by redirecting back to
//!    the client or as JSON when no redirect URI was given
//! 4. Client exchanges the code at the token endpoint

use serde::{Deserialize, Serialize};
use url::Url;

use crate::AuthResult;
use crate::error::AuthError;
use crate::types::{AuthorizationCode, Scope};

/// Authorization request parameters, as received on the query string.
///
/// # Example
///
/// ```ignore
/// GET /oauth2/authorize?
///   response_type=code
///   &client_id=5b1e...
///   &redirect_uri=https://app.example.com/callback
///   &scope=private
///   &state=xyz
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizationRequest {
    /// Must be `code`.
    #[serde(default)]
    pub response_type: Option<String>,

    /// Client requesting access.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Where to send the code. Must fall within the client's domain.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Requested scope; defaults to `public`.
    #[serde(default)]
    pub scope: Option<String>,

    /// Opaque client state, echoed back unchanged.
    #[serde(default)]
    pub state: Option<String>,
}

/// Authorization request after parameter validation.
///
/// The redirect URI is syntactically valid here but not yet checked against
/// the client's domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAuthorizationRequest {
    /// Client requesting access.
    pub client_id: String,
    /// Parsed redirect target.
    pub redirect_uri: Option<Url>,
    /// Requested scope.
    pub scope: Scope,
    /// Opaque client state.
    pub state: Option<String>,
}

impl AuthorizationRequest {
    /// Validates parameters that do not need the store.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if `response_type` or `client_id` is missing, or
    ///   the redirect URI is not an absolute http(s) URL
    /// - `UnsupportedResponseType` if `response_type` is not `code`
    /// - `InvalidScope` if the scope is not in the catalog
    pub fn validate(&self) -> AuthResult<ValidatedAuthorizationRequest> {
        let response_type = present(&self.response_type)
            .ok_or_else(|| AuthError::invalid_request("missing response_type"))?;
        if response_type != "code" {
            return Err(AuthError::unsupported_response_type(response_type));
        }

        let client_id = present(&self.client_id)
            .ok_or_else(|| AuthError::invalid_request("missing client_id"))?;

        let redirect_uri = match present(&self.redirect_uri) {
            Some(raw) => Some(parse_redirect_uri(raw)?),
            None => None,
        };

        let scope = Scope::parse_or_default(self.scope.as_deref())?;

        Ok(ValidatedAuthorizationRequest {
            client_id: client_id.to_string(),
            redirect_uri,
            scope,
            state: self.state.clone().filter(|s| !s.is_empty()),
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_redirect_uri(raw: &str) -> AuthResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| AuthError::invalid_request(format!("invalid redirect_uri: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(AuthError::invalid_request(
            "redirect_uri must be an absolute http or https URL",
        ));
    }
    if url.fragment().is_some() {
        return Err(AuthError::invalid_request(
            "redirect_uri must not contain a fragment",
        ));
    }
    Ok(url)
}

/// JSON body returned when the request carried no redirect URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCodeResponse {
    /// The issued code.
    pub code: String,
    /// Client state, if one was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// How the issued code is delivered to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    /// Redirect the user agent to this URL.
    Redirect(String),
    /// Respond with a JSON body.
    Json(AuthorizationCodeResponse),
}

impl AuthorizationOutcome {
    /// Formats an issued code for delivery.
    ///
    /// The code and state are appended to the redirect URI's existing query
    /// (url-encoded). Only the code value leaves the server; client and user
    /// identifiers stay internal.
    #[must_use]
    pub fn format(
        code: &AuthorizationCode,
        redirect_uri: Option<&Url>,
        state: Option<&str>,
    ) -> Self {
        match redirect_uri {
            Some(uri) => {
                let mut url = uri.clone();
                {
                    let mut pairs = url.query_pairs_mut();
                    pairs.append_pair("code", &code.code);
                    if let Some(state) = state {
                        pairs.append_pair("state", state);
                    }
                }
                Self::Redirect(url.to_string())
            }
            None => Self::Json(AuthorizationCodeResponse {
                code: code.code.clone(),
                state: state.map(str::to_string),
            }),
        }
    }
}
