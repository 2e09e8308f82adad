//! # grantry-auth
//!
//! Authorization-code grant core for the Grantry server.
//!
//! This crate provides:
//! - A flat scope catalog
//! - Client registration with redirect-domain checks
//! - Single-use authorization codes
//! - Code exchange and refresh token rotation with one live token pair per
//!   user and client
//! - Bearer token checks for protected routes
//! - Axum handlers for all of the above
//!
//! ## Modules
//!
//! - [`config`] - Lifetimes and registration options
//! - [`types`] - Domain types (scopes, clients, codes, tokens)
//! - [`storage`] - Storage traits implemented by backend crates
//! - [`oauth`] - Registry, issuer and grant engine
//! - [`http`] - Axum handlers and error responses
//! - [`clock`] - Time source used for every expiry decision

pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod sanitize;
pub mod storage;
pub mod types;

#[cfg(test)]
mod testing;

pub use clock::{Clock, DynClock, ManualClock, SystemClock};
pub use config::{AuthConfig, ConfigError, OAuthConfig, RegistrationConfig};
pub use error::{AuthError, ErrorCategory};
pub use http::{BearerAuth, GrantState, ResourceOwner};
pub use oauth::{
    AccessContext, AccessValidator, AuthorizationCodeIssuer, ClientRegistry, TokenGrantEngine,
};
pub use storage::{
    AccessTokenStorage, AuthorizationCodeStorage, ClientStorage, CredentialStore,
    RefreshTokenStorage, TokenPairStorage,
};
pub use types::{
    AccessToken, AuthorizationCode, Client, GrantType, GrantedTokens, RefreshToken, Scope,
};

/// Type alias for grant core results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use grantry_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::clock::{Clock, DynClock, SystemClock};
    pub use crate::config::AuthConfig;
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::http::{BearerAuth, GrantState, ResourceOwner};
    pub use crate::oauth::{AccessContext, AuthorizationCodeIssuer, TokenGrantEngine};
    pub use crate::storage::{
        AccessTokenStorage, AuthorizationCodeStorage, ClientStorage, CredentialStore,
        RefreshTokenStorage, TokenPairStorage,
    };
    pub use crate::types::{Client, GrantedTokens, Scope};
}
