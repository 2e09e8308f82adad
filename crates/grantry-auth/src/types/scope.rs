//! Scope catalog.
//!
//! Scopes are a closed, flat set of labels. No scope implies another, so the
//! type carries equality only and no ordering.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Permission level attached to a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scope {
    /// Access to public data. Applied when a request names no scope.
    #[default]
    #[serde(rename = "public")]
    Public,
    /// Read access to private data.
    #[serde(rename = "private")]
    Private,
    /// Write access to public data.
    #[serde(rename = "write")]
    Write,
    /// Write access to private data.
    #[serde(rename = "writePrivate")]
    WritePrivate,
}

impl Scope {
    /// Every scope in the catalog.
    pub const ALL: [Scope; 4] = [
        Scope::Public,
        Scope::Private,
        Scope::Write,
        Scope::WritePrivate,
    ];

    /// Returns the wire value of this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Write => "write",
            Self::WritePrivate => "writePrivate",
        }
    }

    /// Returns `true` if `value` names a scope in the catalog.
    ///
    /// Matching is exact and case-sensitive.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        Self::ALL.iter().any(|scope| scope.as_str() == value)
    }

    /// Parses a scope from its wire value.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidScope` if the value is not in the catalog.
    pub fn parse(value: &str) -> Result<Self, AuthError> {
        Self::ALL
            .into_iter()
            .find(|scope| scope.as_str() == value)
            .ok_or_else(|| AuthError::invalid_scope(format!("unknown scope '{value}'")))
    }

    /// Parses an optional scope parameter, falling back to the default scope
    /// when the parameter is absent or empty.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidScope` if a non-empty value is not in the
    /// catalog.
    pub fn parse_or_default(value: Option<&str>) -> Result<Self, AuthError> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(value) => Self::parse(value),
        }
    }
}

impl FromStr for Scope {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
