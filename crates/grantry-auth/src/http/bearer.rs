//! Bearer token extractor for protected routes.
//!
//! ```ignore
//! async fn protected(BearerAuth(access): BearerAuth) -> String {
//!     format!("acting for {}", access.user_id)
//! }
//! ```

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::error::AuthError;
use crate::http::authorization_credentials;
use crate::oauth::{AccessContext, AccessValidator};

/// Validated bearer access.
///
/// The token is read from `Authorization: Bearer <token>` (scheme in any
/// case), falling back to
/// an `access_token` query parameter. A missing token is rejected with 401
/// and an unknown or expired one with 403.
pub struct BearerAuth(pub AccessContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AccessValidator: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let validator = AccessValidator::from_ref(state);

        let token = header_token(parts)
            .or_else(|| query_token(parts))
            .ok_or_else(|| AuthError::unauthorized("missing bearer token"))?;

        let access = validator.validate(&token).await?;

        tracing::debug!(
            client_id = %access.client_id,
            user_id = %access.user_id,
            "Bearer token validated"
        );

        Ok(Self(access))
    }
}

fn header_token(parts: &Parts) -> Option<String> {
    authorization_credentials(&parts.headers, "Bearer").map(ToString::to_string)
}

fn query_token(parts: &Parts) -> Option<String> {
    let query = parts.uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// `GET /me/grant`
///
/// Describes the grant behind the presented token.
pub async fn grant_info_handler(BearerAuth(access): BearerAuth) -> Json<AccessContext> {
    Json(access)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use time::Duration;
    use tower::ServiceExt;

    use super::*;
    use crate::http::test_support::{json_body, test_app};
    use crate::oauth::ClientCredentials;
    use crate::types::Scope;

    async fn access_token(app: &crate::http::test_support::TestApp) -> String {
        let code = app
            .state
            .issuer
            .issue_for("c1", "u1", Scope::Write)
            .await
            .unwrap();
        app.state
            .engine
            .exchange_code(&code.code, &ClientCredentials::new("c1", "s1"))
            .await
            .unwrap()
            .access_token
    }

    #[tokio::test]
    async fn test_header_token() {
        let app = test_app();
        let token = access_token(&app).await;

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .uri("/me/grant")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["user_id"], "u1");
        assert_eq!(body["client_id"], "c1");
        assert_eq!(body["scope"], "write");
    }

    #[tokio::test]
    async fn test_scheme_is_case_insensitive() {
        let app = test_app();
        let token = access_token(&app).await;

        for scheme in ["bearer", "BEARER"] {
            let response = app
                .router
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/me/grant")
                        .header(header::AUTHORIZATION, format!("{scheme} {token}"))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{scheme}");
        }
    }

    #[tokio::test]
    async fn test_query_token() {
        let app = test_app();
        let token = access_token(&app).await;

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .uri(format!("/me/grant?access_token={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = test_app();

        let response = app
            .router
            .oneshot(Request::builder().uri("/me/grant").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn test_expired_token_is_forbidden() {
        let app = test_app();
        let token = access_token(&app).await;
        app.clock.advance(Duration::minutes(4));

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .uri("/me/grant")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["error"], "invalid_token");
    }
}
