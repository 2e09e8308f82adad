//! Token endpoint handler.
//!
//! ```ignore
//! POST /oauth2/token
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=authorization_code
//! &code=0b5f2f3c-...
//! &client_id=5b1e...
//! &client_secret=9c2a...
//! ```
//!
//! Client credentials may also be sent as `Authorization: Basic`.

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::{debug, info, warn};

use super::{GrantState, authorization_credentials};
use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::{ClientCredentials, GrantRequest, TokenRequest, TokenResponse};

/// `POST /oauth2/token`
pub async fn token_handler(
    State(state): State<GrantState>,
    headers: HeaderMap,
    Form(request): Form<TokenRequest>,
) -> Response {
    debug!(
        grant_type = ?request.grant_type,
        client_id = ?request.client_id,
        "Processing token request"
    );

    let grant = match basic_credentials(&headers)
        .and_then(|credentials| GrantRequest::from_request(request, credentials))
    {
        Ok(grant) => grant,
        Err(e) => {
            debug!(error = %e, "Token request rejected before exchange");
            return e.into_response();
        }
    };

    let grant_type = grant.grant_type();
    let client_id = grant.credentials().client_id.clone();

    match state.engine.exchange(grant).await {
        Ok(tokens) => {
            info!(client_id = %client_id, grant_type = %grant_type, "Token issued");
            token_success_response(TokenResponse::from(tokens))
        }
        Err(e) => {
            warn!(
                client_id = %client_id,
                grant_type = %grant_type,
                error = %e,
                "Token request failed"
            );
            e.into_response()
        }
    }
}

/// Reads client credentials from an `Authorization: Basic` header.
///
/// Returns `Ok(None)` when there is no Basic header.
///
/// # Errors
///
/// Returns `InvalidRequest` if the header is not valid base64 of
/// `client_id:client_secret`.
pub fn basic_credentials(headers: &HeaderMap) -> AuthResult<Option<ClientCredentials>> {
    let Some(encoded) = authorization_credentials(headers, "Basic") else {
        return Ok(None);
    };

    let decoded = STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| AuthError::invalid_request("malformed Basic credentials"))?;

    match decoded.split_once(':') {
        Some((id, secret)) if !id.is_empty() && !secret.is_empty() => {
            Ok(Some(ClientCredentials::new(id, secret)))
        }
        _ => Err(AuthError::invalid_request("malformed Basic credentials")),
    }
}

fn token_success_response(response: TokenResponse) -> Response {
    (
        StatusCode::OK,
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(response),
    )
        .into_response()
}
