//! Domain types shared across the grant core.
//!
//! ## Domain Types
//!
//! - [`Scope`] - Flat permission catalog
//! - [`GrantType`] - Grant types accepted at the token endpoint
//! - [`Client`] - Registered client application
//! - [`AuthorizationCode`] - Single-use code issued after approval
//! - [`AccessToken`] / [`RefreshToken`] - Stored token records

pub mod client;
pub mod code;
pub mod grant;
pub mod scope;
pub mod token;

pub use client::{
    Client, ClientValidationError, ClientView, LOOPBACK_HOSTS, NewClient, RedirectDomain,
    RegisteredClient,
};
pub use code::AuthorizationCode;
pub use grant::GrantType;
pub use scope::Scope;
pub use token::{
    AccessToken, BEARER_TOKEN_TYPE, GrantedTokens, RefreshToken, generate_token, hash_token,
};
