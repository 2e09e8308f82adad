//! Error responses.
//!
//! Every [`AuthError`] becomes a JSON body of the form
//! `{"error": "...", "error_description": "..."}` with the status from
//! [`AuthError::http_status`]. Server-side failures are logged here and
//! reported with a generic description.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Wire shape of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code, e.g. `invalid_grant`.
    pub error: String,
    /// Human-readable description.
    pub error_description: String,
}

impl From<&AuthError> for ErrorResponse {
    fn from(error: &AuthError) -> Self {
        Self {
            error: error.oauth_error_code().to_string(),
            error_description: error.public_description(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                category = %self.category(),
                "Request failed with server error"
            );
        }

        let body = ErrorResponse::from(&self);

        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        if status == StatusCode::UNAUTHORIZED {
            let challenge = build_www_authenticate_header(&body.error, &body.error_description);
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        (status, headers, Json(body)).into_response()
    }
}

/// Builds the `WWW-Authenticate` challenge for 401 responses.
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped = description.replace('"', "\\\"");
    format!("Bearer realm=\"grantry\", error=\"{error}\", error_description=\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body(response: Response) -> ErrorResponse {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unauthorized_carries_bearer_challenge() {
        let response = AuthError::unauthorized("missing bearer token").into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let challenge = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(challenge.starts_with("Bearer "));
        assert!(challenge.contains("realm=\"grantry\""));
        assert!(challenge.contains("error=\"unauthorized\""));
    }

    #[tokio::test]
    async fn test_invalid_token_is_forbidden_without_challenge() {
        let response = AuthError::invalid_token("expired").into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
        assert_eq!(body(response).await.error, "invalid_token");
    }

    #[tokio::test]
    async fn test_grant_errors_are_bad_request() {
        for (error, code) in [
            (AuthError::invalid_grant("used"), "invalid_grant"),
            (AuthError::invalid_client("bad secret"), "invalid_client"),
            (AuthError::invalid_request("missing code"), "invalid_request"),
            (AuthError::unsupported_grant_type("password"), "unsupported_grant_type"),
        ] {
            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body(response).await.error, code);
        }
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response = AuthError::storage("disk on fire at /var/lib/x").into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body(response).await;
        assert_eq!(body.error, "server_error");
        assert!(!body.error_description.contains("/var/lib/x"));
    }

    #[test]
    fn test_www_authenticate_header_escaping() {
        let header = build_www_authenticate_header("unauthorized", "say \"hi\"");
        assert!(header.contains("\\\"hi\\\""));
    }
}
