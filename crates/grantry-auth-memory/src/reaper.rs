use std::sync::Arc;
use std::time::Duration;

use grantry_auth::{AccessTokenStorage, AuthorizationCodeStorage};
use tokio::task::JoinHandle;

use crate::store::InMemoryCredentialStore;

/// Spawns a task that purges expired codes and access tokens every
/// `interval`.
///
/// Refresh tokens do not expire and are left alone. Abort the returned
/// handle to stop the task.
pub fn spawn_reaper(store: Arc<InMemoryCredentialStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let codes = AuthorizationCodeStorage::purge_expired(&*store).await;
            let tokens = AccessTokenStorage::purge_expired(&*store).await;

            match (codes, tokens) {
                (Ok(0), Ok(0)) => {}
                (Ok(codes), Ok(tokens)) => {
                    let (access_left, refresh_left) = store.token_counts().unwrap_or_default();
                    tracing::debug!(
                        codes,
                        tokens,
                        access_left,
                        refresh_left,
                        "Expired credentials purged"
                    );
                }
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!(error = %e, "Credential purge failed");
                }
            }
        }
    })
}
