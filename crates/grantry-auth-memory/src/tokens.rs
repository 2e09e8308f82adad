use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;

use grantry_auth::storage::ReplacedPair;
use grantry_auth::{
    AccessToken, AccessTokenStorage, AuthError, AuthResult, RefreshToken, RefreshTokenStorage,
    TokenPairStorage,
};

use crate::store::{InMemoryCredentialStore, PairKey, pair_key};

/// Access and refresh tokens by hash, each with a one-per-pair index.
#[derive(Debug, Default)]
pub(crate) struct TokenTables {
    access: HashMap<String, AccessToken>,
    access_by_pair: HashMap<PairKey, String>,
    refresh: HashMap<String, RefreshToken>,
    refresh_by_pair: HashMap<PairKey, String>,
}

impl TokenTables {
    fn remove_access(&mut self, token_hash: &str) -> Option<AccessToken> {
        let removed = self.access.remove(token_hash)?;
        let key = pair_key(&removed.user_id, &removed.client_id);
        if self.access_by_pair.get(&key).is_some_and(|h| h == token_hash) {
            self.access_by_pair.remove(&key);
        }
        Some(removed)
    }

    fn remove_refresh(&mut self, token_hash: &str) -> Option<RefreshToken> {
        let removed = self.refresh.remove(token_hash)?;
        let key = pair_key(&removed.user_id, &removed.client_id);
        if self.refresh_by_pair.get(&key).is_some_and(|h| h == token_hash) {
            self.refresh_by_pair.remove(&key);
        }
        Some(removed)
    }

    fn remove_access_minted_by(&mut self, refresh_token_hash: &str) -> u64 {
        let minted: Vec<String> = self
            .access
            .values()
            .filter(|t| t.refresh_token_hash == refresh_token_hash)
            .map(|t| t.token_hash.clone())
            .collect();
        for hash in &minted {
            self.remove_access(hash);
        }
        minted.len() as u64
    }

    fn insert_pair(&mut self, refresh: &RefreshToken, access: &AccessToken) {
        let key = pair_key(&refresh.user_id, &refresh.client_id);
        self.refresh_by_pair.insert(key.clone(), refresh.token_hash.clone());
        self.refresh.insert(refresh.token_hash.clone(), refresh.clone());
        self.access_by_pair.insert(key, access.token_hash.clone());
        self.access.insert(access.token_hash.clone(), access.clone());
    }

    pub(crate) fn purge_expired_access(&mut self, now: OffsetDateTime) -> u64 {
        let expired: Vec<String> = self
            .access
            .values()
            .filter(|t| t.is_expired_at(now))
            .map(|t| t.token_hash.clone())
            .collect();
        for hash in &expired {
            self.remove_access(hash);
        }
        expired.len() as u64
    }

    pub(crate) fn access_len(&self) -> usize {
        self.access.len()
    }

    pub(crate) fn refresh_len(&self) -> usize {
        self.refresh.len()
    }
}

#[async_trait]
impl AccessTokenStorage for InMemoryCredentialStore {
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<AccessToken>> {
        let now = self.clock.now();
        let mut tables = self.lock_tokens()?;
        match tables.access.get(token_hash) {
            None => return Ok(None),
            Some(found) if !found.is_expired_at(now) => return Ok(Some(found.clone())),
            Some(_) => {}
        }
        tables.remove_access(token_hash);
        Ok(None)
    }

    async fn purge_expired(&self) -> AuthResult<u64> {
        let now = self.clock.now();
        Ok(self.lock_tokens()?.purge_expired_access(now))
    }
}

#[async_trait]
impl RefreshTokenStorage for InMemoryCredentialStore {
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.lock_tokens()?.refresh.get(token_hash).cloned())
    }
}

#[async_trait]
impl TokenPairStorage for InMemoryCredentialStore {
    async fn replace_pair(
        &self,
        presented_refresh_hash: Option<&str>,
        refresh: &RefreshToken,
        access: &AccessToken,
    ) -> AuthResult<Option<ReplacedPair>> {
        if access.refresh_token_hash != refresh.token_hash
            || access.user_id != refresh.user_id
            || access.client_id != refresh.client_id
        {
            return Err(AuthError::integrity_violation(
                "access token was not minted from the refresh token",
            ));
        }

        let mut tables = self.lock_tokens()?;

        if presented_refresh_hash.is_some_and(|hash| !tables.refresh.contains_key(hash)) {
            return Ok(None);
        }
        if tables.refresh.contains_key(&refresh.token_hash) {
            return Err(AuthError::integrity_violation("refresh token hash collision"));
        }
        if tables.access.contains_key(&access.token_hash) {
            return Err(AuthError::integrity_violation("access token hash collision"));
        }

        let mut replaced = ReplacedPair::default();
        if let Some(presented) = presented_refresh_hash {
            replaced.revoked_refresh += u64::from(tables.remove_refresh(presented).is_some());
            replaced.revoked_access += tables.remove_access_minted_by(presented);
        }

        let key = pair_key(&refresh.user_id, &refresh.client_id);
        if let Some(hash) = tables.refresh_by_pair.get(&key).cloned() {
            replaced.revoked_refresh += u64::from(tables.remove_refresh(&hash).is_some());
        }
        if let Some(hash) = tables.access_by_pair.get(&key).cloned() {
            replaced.revoked_access += u64::from(tables.remove_access(&hash).is_some());
        }

        tables.insert_pair(refresh, access);
        Ok(Some(replaced))
    }
}
