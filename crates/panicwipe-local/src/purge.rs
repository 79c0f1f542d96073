//! Namespace-scoped purge of the secure credential store.

use async_trait::async_trait;
use panicwipe_core::{StageOutcome, WipeStage};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::store::{CredentialCategory, SecureStore};

/// Result of a full purge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Entries successfully deleted
    pub deleted: u64,
    /// One entry per failed enumeration or deletion
    pub errors: Vec<String>,
}

/// Deletes every credential this application owns.
#[derive(Clone)]
pub struct SecureStorageClient {
    store: Arc<dyn SecureStore>,
    namespaces: Vec<String>,
    network_credentials: bool,
}

impl SecureStorageClient {
    /// Purge `namespaces` in `store`, followed by the network-credential category
    #[must_use]
    pub fn new(store: Arc<dyn SecureStore>, namespaces: Vec<String>) -> Self {
        Self {
            store,
            namespaces,
            network_credentials: true,
        }
    }

    /// Enable or disable the trailing network-credential bulk deletion
    #[must_use]
    pub const fn network_credentials(mut self, enabled: bool) -> Self {
        self.network_credentials = enabled;
        self
    }

    /// Delete every account in every namespace, then the network credentials.
    ///
    /// One failure never stops the rest. Entries that vanish between
    /// enumeration and deletion are treated as already deleted.
    pub async fn purge_all(&self) -> PurgeOutcome {
        let mut outcome = PurgeOutcome::default();

        for namespace in &self.namespaces {
            let accounts = match self.store.accounts(namespace).await {
                Ok(accounts) => accounts,
                Err(e) => {
                    warn!(namespace = %namespace, error = %e, "enumeration failed");
                    outcome.errors.push(format!("{namespace}: enumeration failed: {e}"));
                    continue;
                }
            };

            debug!(namespace = %namespace, count = accounts.len(), "purging namespace");
            for account in &accounts {
                match self.store.delete(namespace, account).await {
                    Ok(()) => outcome.deleted += 1,
                    Err(StoreError::NotFound) => {
                        debug!(namespace = %namespace, account = %account, "already gone");
                    }
                    Err(e) => {
                        warn!(namespace = %namespace, account = %account, error = %e, "delete failed");
                        outcome
                            .errors
                            .push(format!("{namespace}/{account}: delete failed: {e}"));
                    }
                }
            }
        }

        if self.network_credentials {
            match self
                .store
                .delete_category(CredentialCategory::NetworkPassword)
                .await
            {
                Ok(count) => outcome.deleted += count,
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    warn!(error = %e, "network credential deletion failed");
                    outcome
                        .errors
                        .push(format!("{}: delete failed: {e}", CredentialCategory::NetworkPassword));
                }
            }
        }

        info!(
            deleted = outcome.deleted,
            errors = outcome.errors.len(),
            "secure storage purge finished"
        );
        outcome
    }

    /// List `namespace/account` pairs without deleting anything.
    pub async fn enumerate_all(&self) -> (Vec<String>, Vec<String>) {
        let mut identified = Vec::new();
        let mut errors = Vec::new();

        for namespace in &self.namespaces {
            match self.store.accounts(namespace).await {
                Ok(accounts) => {
                    identified.extend(accounts.into_iter().map(|a| format!("{namespace}/{a}")));
                }
                Err(e) => errors.push(format!("{namespace}: enumeration failed: {e}")),
            }
        }

        if self.network_credentials {
            match self
                .store
                .count_category(CredentialCategory::NetworkPassword)
                .await
            {
                Ok(0) => {}
                Ok(count) => identified.push(format!(
                    "{}: {count} entries",
                    CredentialCategory::NetworkPassword
                )),
                Err(e) if e.is_not_found() => {}
                Err(e) => errors.push(format!(
                    "{}: enumeration failed: {e}",
                    CredentialCategory::NetworkPassword
                )),
            }
        }

        (identified, errors)
    }
}

#[async_trait]
impl WipeStage for SecureStorageClient {
    fn name(&self) -> &'static str {
        "secure storage"
    }

    async fn destroy(&self) -> StageOutcome {
        let purge = self.purge_all().await;
        StageOutcome {
            units: purge.deleted,
            errors: purge.errors,
            ..StageOutcome::default()
        }
    }

    async fn survey(&self) -> StageOutcome {
        let (identified, errors) = self.enumerate_all().await;
        StageOutcome {
            errors,
            identified,
            ..StageOutcome::default()
        }
    }
}
