//! In-memory storage backend for the Grantry grant core.
//!
//! This crate implements the storage traits from `grantry-auth`:
//!
//! - [`InMemoryClientStorage`] - client registrations in a `DashMap`, with a
//!   name index for uniqueness
//! - [`InMemoryCredentialStore`] - codes, access tokens and refresh tokens,
//!   each collection behind one mutex held for a single primitive
//!
//! Expired entries read as absent and are dropped when observed;
//! [`spawn_reaper`] purges the rest in the background.
//!
//! # Example
//!
//! ```ignore
//! use grantry_auth::SystemClock;
//! use grantry_auth_memory::{InMemoryClientStorage, InMemoryCredentialStore, spawn_reaper};
//!
//! let clients = Arc::new(InMemoryClientStorage::new());
//! let store = Arc::new(InMemoryCredentialStore::new(SystemClock::shared()));
//! let reaper = spawn_reaper(store.clone(), Duration::from_secs(30));
//! let credentials = store.credentials();
//! ```

mod clients;
mod codes;
mod reaper;
mod store;
mod tokens;

pub use clients::InMemoryClientStorage;
pub use reaper::spawn_reaper;
pub use store::InMemoryCredentialStore;
