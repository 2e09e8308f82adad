use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use grantry_auth::{AuthError, AuthResult, Client, ClientStorage};

/// Client registrations keyed by client id.
#[derive(Debug, Default)]
pub struct InMemoryClientStorage {
    clients: DashMap<String, Client>,
    /// Client name to client id.
    names: DashMap<String, String>,
}

impl InMemoryClientStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns `true` if no client is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[async_trait]
impl ClientStorage for InMemoryClientStorage {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.get(client_id).map(|c| c.value().clone()))
    }

    async fn create(&self, client: &Client) -> AuthResult<()> {
        if self.clients.contains_key(&client.client_id) {
            return Err(AuthError::integrity_violation(format!(
                "client id '{}' already exists",
                client.client_id
            )));
        }

        // The name entry is the uniqueness gate; it is claimed before the
        // client becomes visible.
        match self.names.entry(client.name.clone()) {
            Entry::Occupied(_) => {
                debug!(name = %client.name, "Client name already taken");
                Err(AuthError::invalid_request(format!(
                    "client name '{}' is already taken",
                    client.name
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(client.client_id.clone());
                self.clients.insert(client.client_id.clone(), client.clone());
                Ok(())
            }
        }
    }

    async fn list(&self, limit: usize, offset: usize) -> AuthResult<Vec<Client>> {
        let mut clients: Vec<Client> = self.clients.iter().map(|c| c.value().clone()).collect();
        clients.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.client_id.cmp(&b.client_id))
        });
        Ok(clients.into_iter().skip(offset).take(limit).collect())
    }
}
