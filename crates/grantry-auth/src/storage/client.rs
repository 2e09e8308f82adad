//! Client storage trait.
//!
//! Defines the interface for client registration persistence. Clients are
//! immutable once stored, so there is no update or delete.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

// =============================================================================
// Client Storage Trait
// =============================================================================

/// Storage operations for registered clients.
///
/// # Example
///
/// ```ignore
/// use grantry_auth::storage::ClientStorage;
///
/// async fn example(storage: &impl ClientStorage) {
///     if let Some(client) = storage.find_by_client_id("my-app").await? {
///         println!("Found client: {}", client.name);
///     }
/// }
/// ```
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Find a client by its OAuth client_id.
    ///
    /// Returns `None` if the client doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Store a new client.
    ///
    /// Names, client ids and secrets are unique. Checking and inserting must
    /// happen as one step so two concurrent registrations of the same name
    /// cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A client with the same name exists (`InvalidRequest`)
    /// - The client id or secret collides with an existing one
    ///   (`IntegrityViolation`)
    /// - The storage operation fails
    async fn create(&self, client: &Client) -> AuthResult<()>;

    /// List registered clients ordered by registration time.
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of clients to return
    /// * `offset` - Number of clients to skip for pagination
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list(&self, limit: usize, offset: usize) -> AuthResult<Vec<Client>>;
}
