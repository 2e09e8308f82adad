//! Authorization code domain type.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::types::scope::Scope;

/// Short-lived, single-use proof that a resource owner approved a client.
///
/// Several codes may exist for the same user and client at once. Exchanging
/// any one of them voids all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// Opaque code value handed to the client.
    pub code: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Resource owner that approved the request.
    pub user_id: String,

    /// Scope approved for the grant.
    pub scope: Scope,

    /// When the code was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the code stops being exchangeable.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AuthorizationCode {
    /// Creates a new code with a fresh random value.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        user_id: impl Into<String>,
        scope: Scope,
        now: OffsetDateTime,
        lifetime: Duration,
    ) -> Self {
        Self {
            code: Self::generate_code(),
            client_id: client_id.into(),
            user_id: user_id.into(),
            scope,
            created_at: now,
            expires_at: now + lifetime,
        }
    }

    /// Generates an opaque code value.
    #[must_use]
    pub fn generate_code() -> String {
        Uuid::new_v4().to_string()
    }

    /// Returns `true` if the code has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    /// Returns `true` if this code belongs to the given user and client.
    #[must_use]
    pub fn is_for_pair(&self, user_id: &str, client_id: &str) -> bool {
        self.user_id == user_id && self.client_id == client_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_new_code_expiry() {
        let now = datetime!(2025-01-01 00:00 UTC);
        let code = AuthorizationCode::new("c1", "u1", Scope::Public, now, Duration::minutes(10));

        assert_eq!(code.expires_at, datetime!(2025-01-01 00:10 UTC));
        assert!(!code.is_expired_at(now));
        assert!(!code.is_expired_at(datetime!(2025-01-01 00:09:59 UTC)));
        assert!(code.is_expired_at(datetime!(2025-01-01 00:10 UTC)));
    }

    #[test]
    fn test_codes_are_unique() {
        let now = OffsetDateTime::now_utc();
        let a = AuthorizationCode::new("c1", "u1", Scope::Public, now, Duration::minutes(10));
        let b = AuthorizationCode::new("c1", "u1", Scope::Public, now, Duration::minutes(10));
        assert_ne!(a.code, b.code);
        assert!(a.is_for_pair("u1", "c1"));
        assert!(!a.is_for_pair("u1", "c2"));
    }
}
