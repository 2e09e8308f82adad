use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use time::OffsetDateTime;

use grantry_auth::storage::ConsumedCode;
use grantry_auth::{AuthError, AuthResult, AuthorizationCode, AuthorizationCodeStorage};

use crate::store::{InMemoryCredentialStore, PairKey, pair_key};

/// Codes by value, plus the codes of each user and client.
#[derive(Debug, Default)]
pub(crate) struct CodeTable {
    by_code: HashMap<String, AuthorizationCode>,
    by_pair: HashMap<PairKey, HashSet<String>>,
}

impl CodeTable {
    fn insert(&mut self, code: AuthorizationCode) {
        self.by_pair
            .entry(pair_key(&code.user_id, &code.client_id))
            .or_default()
            .insert(code.code.clone());
        self.by_code.insert(code.code.clone(), code);
    }

    fn remove(&mut self, code: &str) -> Option<AuthorizationCode> {
        let removed = self.by_code.remove(code)?;
        let key = pair_key(&removed.user_id, &removed.client_id);
        if let Some(siblings) = self.by_pair.get_mut(&key) {
            siblings.remove(code);
            if siblings.is_empty() {
                self.by_pair.remove(&key);
            }
        }
        Some(removed)
    }

    /// Removes every code of the pair, returning how many there were.
    fn remove_pair(&mut self, key: &PairKey) -> usize {
        let Some(codes) = self.by_pair.remove(key) else {
            return 0;
        };
        codes
            .iter()
            .filter(|code| self.by_code.remove(code.as_str()).is_some())
            .count()
    }

    pub(crate) fn purge_expired(&mut self, now: OffsetDateTime) -> u64 {
        let expired: Vec<String> = self
            .by_code
            .values()
            .filter(|c| c.is_expired_at(now))
            .map(|c| c.code.clone())
            .collect();
        for code in &expired {
            self.remove(code);
        }
        expired.len() as u64
    }

    pub(crate) fn len(&self) -> usize {
        self.by_code.len()
    }
}

#[async_trait]
impl AuthorizationCodeStorage for InMemoryCredentialStore {
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()> {
        let mut table = self.lock_codes()?;
        if table.by_code.contains_key(&code.code) {
            return Err(AuthError::integrity_violation(
                "authorization code value already exists",
            ));
        }
        table.insert(code.clone());
        Ok(())
    }

    async fn find(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        let now = self.clock.now();
        let mut table = self.lock_codes()?;
        match table.by_code.get(code) {
            None => return Ok(None),
            Some(found) if !found.is_expired_at(now) => return Ok(Some(found.clone())),
            Some(_) => {}
        }
        table.remove(code);
        Ok(None)
    }

    async fn consume_with_siblings(&self, code: &str) -> AuthResult<Option<ConsumedCode>> {
        let now = self.clock.now();
        let mut table = self.lock_codes()?;

        let Some(presented) = table.remove(code) else {
            return Ok(None);
        };
        if presented.is_expired_at(now) {
            return Ok(None);
        }

        let voided = table.remove_pair(&pair_key(&presented.user_id, &presented.client_id));
        Ok(Some(ConsumedCode {
            code: presented,
            voided,
        }))
    }

    async fn purge_expired(&self) -> AuthResult<u64> {
        let now = self.clock.now();
        Ok(self.lock_codes()?.purge_expired(now))
    }
}
