//! Authorization-code grant flow.
//!
//! - [`registry`] - Client lookup, authentication and registration
//! - [`authorize`] - Authorization request validation and response formatting
//! - [`issuer`] - Authorization code issuance
//! - [`token`] - Token endpoint request and response types
//! - [`grant`] - Code exchange and refresh token rotation
//! - [`access`] - Bearer token checks for protected resources

pub mod access;
pub mod authorize;
pub mod grant;
pub mod issuer;
pub mod registry;
pub mod token;

pub use access::{AccessContext, AccessValidator};
pub use authorize::{
    AuthorizationCodeResponse, AuthorizationOutcome, AuthorizationRequest,
    ValidatedAuthorizationRequest,
};
pub use grant::{GrantConfig, TokenGrantEngine};
pub use issuer::{AuthorizationCodeIssuer, IssuerConfig};
pub use registry::ClientRegistry;
pub use token::{ClientCredentials, GrantRequest, TokenRequest, TokenResponse};
