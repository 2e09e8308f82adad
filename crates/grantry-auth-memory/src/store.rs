use std::sync::{Arc, Mutex, MutexGuard};

use grantry_auth::{AuthError, AuthResult, CredentialStore, DynClock};

use crate::codes::CodeTable;
use crate::tokens::TokenTables;

/// User id and client id.
pub(crate) type PairKey = (String, String);

pub(crate) fn pair_key(user_id: &str, client_id: &str) -> PairKey {
    (user_id.to_string(), client_id.to_string())
}

/// Codes, access tokens and refresh tokens held in process memory.
///
/// Every trait method takes the relevant mutex once and releases it before
/// returning, so no lock is ever held across an await point.
pub struct InMemoryCredentialStore {
    pub(crate) clock: DynClock,
    pub(crate) codes: Mutex<CodeTable>,
    pub(crate) tokens: Mutex<TokenTables>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store reading time from `clock`.
    #[must_use]
    pub fn new(clock: DynClock) -> Self {
        Self {
            clock,
            codes: Mutex::new(CodeTable::default()),
            tokens: Mutex::new(TokenTables::default()),
        }
    }

    /// Hands out the store as the trait objects the grant engine uses.
    #[must_use]
    pub fn credentials(self: &Arc<Self>) -> CredentialStore {
        CredentialStore::new(self.clone(), self.clone(), self.clone(), self.clone())
    }

    /// Number of stored access and refresh tokens, expired ones included.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the token table lock is poisoned.
    pub fn token_counts(&self) -> AuthResult<(usize, usize)> {
        let tables = self.lock_tokens()?;
        Ok((tables.access_len(), tables.refresh_len()))
    }

    pub(crate) fn lock_codes(&self) -> AuthResult<MutexGuard<'_, CodeTable>> {
        self.codes
            .lock()
            .map_err(|_| AuthError::storage("authorization code table lock poisoned"))
    }

    pub(crate) fn lock_tokens(&self) -> AuthResult<MutexGuard<'_, TokenTables>> {
        self.tokens
            .lock()
            .map_err(|_| AuthError::storage("token table lock poisoned"))
    }
}

impl std::fmt::Debug for InMemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCredentialStore").finish_non_exhaustive()
    }
}
