//! Mock storages shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::macros::datetime;

use crate::AuthResult;
use crate::clock::{Clock, ManualClock};
use crate::error::AuthError;
use crate::storage::{
    AccessTokenStorage, AuthorizationCodeStorage, ClientStorage, ConsumedCode, CredentialStore,
    RefreshTokenStorage, ReplacedPair, TokenPairStorage,
};
use crate::types::{AccessToken, AuthorizationCode, Client, RefreshToken};

pub(crate) fn test_clock() -> ManualClock {
    ManualClock::new(datetime!(2025-01-01 00:00 UTC))
}

pub(crate) fn test_client(id: &str, secret: &str, domain: &str) -> Client {
    Client {
        client_id: id.to_string(),
        client_secret: secret.to_string(),
        owner_user_id: format!("owner-of-{id}"),
        name: format!("client {id}"),
        redirect_domain: domain.to_string(),
        description: None,
        created_at: datetime!(2024-12-01 00:00 UTC),
    }
}

/// One mock behind every storage trait.
pub(crate) struct MockStore {
    pub clock: ManualClock,
    pub clients: Mutex<Vec<Client>>,
    pub codes: Mutex<HashMap<String, AuthorizationCode>>,
    pub access: Mutex<HashMap<String, AccessToken>>,
    pub refresh: Mutex<HashMap<String, RefreshToken>>,
    pub fail_pair_write: AtomicBool,
}

impl MockStore {
    pub fn new(clock: ManualClock) -> Arc<Self> {
        Arc::new(Self {
            clock,
            clients: Mutex::new(Vec::new()),
            codes: Mutex::new(HashMap::new()),
            access: Mutex::new(HashMap::new()),
            refresh: Mutex::new(HashMap::new()),
            fail_pair_write: AtomicBool::new(false),
        })
    }

    pub fn with_clients(clock: ManualClock, clients: Vec<Client>) -> Arc<Self> {
        let store = Self::new(clock);
        *store.clients.lock().unwrap() = clients;
        store
    }

    pub fn credentials(self: &Arc<Self>) -> CredentialStore {
        CredentialStore::new(self.clone(), self.clone(), self.clone(), self.clone())
    }

    pub fn code_count(&self) -> usize {
        self.codes.lock().unwrap().len()
    }

    pub fn access_for_pair(&self, user_id: &str, client_id: &str) -> Vec<AccessToken> {
        self.access
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.user_id == user_id && t.client_id == client_id)
            .cloned()
            .collect()
    }

    pub fn refresh_for_pair(&self, user_id: &str, client_id: &str) -> Vec<RefreshToken> {
        self.refresh
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.user_id == user_id && t.client_id == client_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ClientStorage for MockStore {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self
            .clients
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.client_id == client_id)
            .cloned())
    }

    async fn create(&self, client: &Client) -> AuthResult<()> {
        let mut clients = self.clients.lock().unwrap();
        if clients.iter().any(|c| c.name == client.name) {
            return Err(AuthError::invalid_request("client name exists already"));
        }
        clients.push(client.clone());
        Ok(())
    }

    async fn list(&self, limit: usize, offset: usize) -> AuthResult<Vec<Client>> {
        Ok(self
            .clients
            .lock()
            .unwrap()
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuthorizationCodeStorage for MockStore {
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()> {
        self.codes
            .lock()
            .unwrap()
            .insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn find(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        let now = self.clock.now();
        Ok(self
            .codes
            .lock()
            .unwrap()
            .get(code)
            .filter(|c| !c.is_expired_at(now))
            .cloned())
    }

    async fn consume_with_siblings(&self, code: &str) -> AuthResult<Option<ConsumedCode>> {
        let now = self.clock.now();
        let mut codes = self.codes.lock().unwrap();
        let Some(presented) = codes.remove(code) else {
            return Ok(None);
        };
        if presented.is_expired_at(now) {
            return Ok(None);
        }
        let before = codes.len();
        codes.retain(|_, c| !c.is_for_pair(&presented.user_id, &presented.client_id));
        let voided = before - codes.len();
        Ok(Some(ConsumedCode {
            code: presented,
            voided,
        }))
    }

    async fn purge_expired(&self) -> AuthResult<u64> {
        let now = self.clock.now();
        let mut codes = self.codes.lock().unwrap();
        let before = codes.len();
        codes.retain(|_, c| !c.is_expired_at(now));
        Ok((before - codes.len()) as u64)
    }
}

#[async_trait]
impl AccessTokenStorage for MockStore {
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<AccessToken>> {
        let now = self.clock.now();
        Ok(self
            .access
            .lock()
            .unwrap()
            .get(token_hash)
            .filter(|t| !t.is_expired_at(now))
            .cloned())
    }

    async fn purge_expired(&self) -> AuthResult<u64> {
        let now = self.clock.now();
        let mut access = self.access.lock().unwrap();
        let before = access.len();
        access.retain(|_, t| !t.is_expired_at(now));
        Ok((before - access.len()) as u64)
    }
}

#[async_trait]
impl RefreshTokenStorage for MockStore {
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.refresh.lock().unwrap().get(token_hash).cloned())
    }
}

#[async_trait]
impl TokenPairStorage for MockStore {
    async fn replace_pair(
        &self,
        presented_refresh_hash: Option<&str>,
        refresh: &RefreshToken,
        access: &AccessToken,
    ) -> AuthResult<Option<ReplacedPair>> {
        let mut refresh_tokens = self.refresh.lock().unwrap();
        let mut access_tokens = self.access.lock().unwrap();

        if presented_refresh_hash.is_some_and(|hash| !refresh_tokens.contains_key(hash)) {
            return Ok(None);
        }
        if access.refresh_token_hash != refresh.token_hash {
            return Err(AuthError::integrity_violation("mismatched token pair"));
        }
        if self.fail_pair_write.load(Ordering::SeqCst) {
            return Err(AuthError::storage("injected token pair failure"));
        }

        let in_pair = |user_id: &str, client_id: &str| {
            user_id == refresh.user_id && client_id == refresh.client_id
        };
        let presented = presented_refresh_hash.unwrap_or_default();

        let refresh_before = refresh_tokens.len();
        refresh_tokens
            .retain(|hash, t| hash.as_str() != presented && !in_pair(&t.user_id, &t.client_id));
        let access_before = access_tokens.len();
        access_tokens.retain(|_, t| {
            t.refresh_token_hash != presented && !in_pair(&t.user_id, &t.client_id)
        });
        let replaced = ReplacedPair {
            revoked_refresh: (refresh_before - refresh_tokens.len()) as u64,
            revoked_access: (access_before - access_tokens.len()) as u64,
        };

        refresh_tokens.insert(refresh.token_hash.clone(), refresh.clone());
        access_tokens.insert(access.token_hash.clone(), access.clone());
        Ok(Some(replaced))
    }
}
