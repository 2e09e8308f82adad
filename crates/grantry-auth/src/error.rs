//! Authorization error types.
//!
//! Every failure the grant core can report is an [`AuthError`]. The variants
//! split into request validation, grant rejection, bearer access failures and
//! server-side faults; [`AuthError::oauth_error_code`] maps each one onto the
//! wire error code returned to clients.

use std::fmt;

/// Errors that can occur while issuing codes, exchanging grants or checking
/// bearer access.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request is missing a parameter or carries a malformed one.
    ///
    /// Raised before any store access.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// The grant type is not `authorization_code` or `refresh_token`.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType {
        /// The unsupported grant type.
        grant_type: String,
    },

    /// The authorization endpoint was asked for something other than a code.
    #[error("Unsupported response type: {response_type}")]
    UnsupportedResponseType {
        /// The unsupported response type.
        response_type: String,
    },

    /// The requested scope is not part of the scope catalog.
    #[error("Invalid scope: {message}")]
    InvalidScope {
        /// Description of why the scope is invalid.
        message: String,
    },

    /// The code or refresh token is unknown, expired, already used, or bound
    /// to another client.
    #[error("Invalid grant: {message}")]
    InvalidGrant {
        /// Description of why the grant is invalid.
        message: String,
    },

    /// The client id and secret do not resolve to a registered client.
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client is invalid.
        message: String,
    },

    /// A referenced resource (usually a client) does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Description of what was not found.
        message: String,
    },

    /// No bearer credential was presented.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of why the request is unauthorized.
        message: String,
    },

    /// The presented bearer token is unknown or expired.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The credential store failed to read or write.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// A store uniqueness rule was violated, e.g. a second active token for
    /// the same user and client.
    #[error("Integrity violation: {message}")]
    IntegrityViolation {
        /// Description of the violated rule.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedGrantType` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `UnsupportedResponseType` error.
    #[must_use]
    pub fn unsupported_response_type(response_type: impl Into<String>) -> Self {
        Self::UnsupportedResponseType {
            response_type: response_type.into(),
        }
    }

    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::InvalidScope {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidGrant` error.
    #[must_use]
    pub fn invalid_grant(message: impl Into<String>) -> Self {
        Self::InvalidGrant {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `IntegrityViolation` error.
    #[must_use]
    pub fn integrity_violation(message: impl Into<String>) -> Self {
        Self::IntegrityViolation {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. }
                | Self::UnsupportedGrantType { .. }
                | Self::UnsupportedResponseType { .. }
                | Self::InvalidScope { .. }
                | Self::InvalidGrant { .. }
                | Self::InvalidClient { .. }
                | Self::NotFound { .. }
                | Self::Unauthorized { .. }
                | Self::InvalidToken { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. }
                | Self::IntegrityViolation { .. }
                | Self::Configuration { .. }
                | Self::Internal { .. }
        )
    }

    /// Returns `true` if this error rejects a presented code or refresh token.
    #[must_use]
    pub fn is_grant_error(&self) -> bool {
        matches!(self, Self::InvalidGrant { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::UnsupportedGrantType { .. } => ErrorCategory::Validation,
            Self::UnsupportedResponseType { .. } => ErrorCategory::Validation,
            Self::InvalidScope { .. } => ErrorCategory::Validation,
            Self::InvalidGrant { .. } => ErrorCategory::Grant,
            Self::InvalidClient { .. } => ErrorCategory::Authentication,
            Self::NotFound { .. } => ErrorCategory::Lookup,
            Self::Unauthorized { .. } => ErrorCategory::Authentication,
            Self::InvalidToken { .. } => ErrorCategory::Token,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::IntegrityViolation { .. } => ErrorCategory::Integrity,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    ///
    /// Server-side faults collapse to `server_error` so store details never
    /// leak to the caller.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::UnsupportedResponseType { .. } => "unsupported_response_type",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::InvalidGrant { .. } => "invalid_grant",
            Self::InvalidClient { .. } => "invalid_client",
            Self::NotFound { .. } => "not_found",
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidToken { .. } => "invalid_token",
            Self::Storage { .. } => "server_error",
            Self::IntegrityViolation { .. } => "server_error",
            Self::Configuration { .. } => "server_error",
            Self::Internal { .. } => "server_error",
        }
    }

    /// Returns the HTTP status code this error maps to at the boundary.
    ///
    /// `invalid_client` is a 400 here: client credentials travel in the
    /// request body, so there is no authentication challenge to answer.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. }
            | Self::UnsupportedGrantType { .. }
            | Self::UnsupportedResponseType { .. }
            | Self::InvalidScope { .. }
            | Self::InvalidGrant { .. }
            | Self::InvalidClient { .. } => 400,
            Self::Unauthorized { .. } => 401,
            Self::InvalidToken { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Storage { .. }
            | Self::IntegrityViolation { .. }
            | Self::Configuration { .. }
            | Self::Internal { .. } => 500,
        }
    }

    /// Returns a description that is safe to send to the caller.
    ///
    /// Client errors carry their own message; server errors are replaced by a
    /// generic text.
    #[must_use]
    pub fn public_description(&self) -> String {
        if self.is_server_error() {
            "The server encountered an unexpected condition".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Categories of authorization errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed or unsupported request parameters.
    Validation,
    /// Rejected authorization code or refresh token.
    Grant,
    /// Client or bearer identity could not be established.
    Authentication,
    /// Bearer token errors.
    Token,
    /// Missing referenced resource.
    Lookup,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Store invariant violations.
    Integrity,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Grant => write!(f, "grant"),
            Self::Authentication => write!(f, "authentication"),
            Self::Token => write!(f, "token"),
            Self::Lookup => write!(f, "lookup"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Integrity => write!(f, "integrity"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
