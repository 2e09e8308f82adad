//! Authorization endpoint handler.
//!
//! User authentication and the consent screen are handled by an outer layer,
//! which records the approving user as a [`ResourceOwner`] request extension.

use std::convert::Infallible;

use axum::{
    Json,
    extract::{FromRequestParts, Query, State},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use super::GrantState;
use crate::error::AuthError;
use crate::oauth::{AuthorizationOutcome, AuthorizationRequest};

/// The authenticated user who approved the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOwner(pub String);

/// Extracts the [`ResourceOwner`] extension, if the login layer set one.
#[derive(Debug, Clone)]
pub struct ApprovingOwner(pub Option<String>);

impl<S> FromRequestParts<S> for ApprovingOwner
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<ResourceOwner>()
                .map(|owner| owner.0.clone()),
        ))
    }
}

/// `GET /oauth2/authorize`
///
/// Responds with `302 Found` to the redirect URI carrying `code` and `state`,
/// or with a JSON body when no redirect URI was given.
pub async fn authorize_handler(
    State(state): State<GrantState>,
    ApprovingOwner(owner): ApprovingOwner,
    Query(request): Query<AuthorizationRequest>,
) -> Result<Response, AuthError> {
    tracing::debug!(
        client_id = ?request.client_id,
        has_owner = owner.is_some(),
        "Processing authorization request"
    );

    let outcome = state.issuer.authorize(&request, owner.as_deref()).await?;

    Ok(match outcome {
        AuthorizationOutcome::Redirect(location) => {
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        AuthorizationOutcome::Json(body) => (StatusCode::OK, Json(body)).into_response(),
    })
}

#[cfg(test)]
mod tests {
    use axum::{Extension, body::Body, http::Request};
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::http::test_support::{json_body, test_app};

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_redirects_with_code() {
        let app = test_app();
        let router = app.router.layer(Extension(ResourceOwner("u1".to_string())));

        let response = router
            .oneshot(get(
                "/oauth2/authorize?response_type=code&client_id=c1\
                 &redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb&state=xyz",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        let url = Url::parse(location).unwrap();
        assert_eq!(url.host_str(), Some("app.example.com"));
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(params[0].0, "code");
        assert_eq!(params[1], ("state".to_string(), "xyz".to_string()));
        assert_eq!(app.store.code_count(), 1);
    }

    #[tokio::test]
    async fn test_json_without_redirect_uri() {
        let app = test_app();
        let router = app.router.layer(Extension(ResourceOwner("u1".to_string())));

        let response = router
            .oneshot(get("/oauth2/authorize?response_type=code&client_id=c1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["code"].is_string());
        assert!(body.get("state").is_none());
    }

    #[tokio::test]
    async fn test_missing_owner_is_unauthorized() {
        let app = test_app();

        let response = app
            .router
            .oneshot(get("/oauth2/authorize?response_type=code&client_id=c1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(app.store.code_count(), 0);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let app = test_app();
        let router = app.router.layer(Extension(ResourceOwner("u1".to_string())));

        let cases = [
            ("/oauth2/authorize?client_id=c1", StatusCode::BAD_REQUEST),
            (
                "/oauth2/authorize?response_type=token&client_id=c1",
                StatusCode::BAD_REQUEST,
            ),
            (
                "/oauth2/authorize?response_type=code&client_id=zz",
                StatusCode::NOT_FOUND,
            ),
            (
                "/oauth2/authorize?response_type=code&client_id=c1&scope=admin",
                StatusCode::BAD_REQUEST,
            ),
            (
                "/oauth2/authorize?response_type=code&client_id=c1\
                 &redirect_uri=https%3A%2F%2Fevil.com%2Fcb",
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (uri, status) in cases {
            let response = router.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), status, "{uri}");
        }
        assert_eq!(app.store.code_count(), 0);
    }
}
