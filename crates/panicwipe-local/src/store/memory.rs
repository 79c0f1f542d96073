use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::{CredentialCategory, SecureStore};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct Entries {
    namespaced: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    network: Vec<(String, String)>,
}

/// In-process credential store.
///
/// Used for dry runs and tests, and as a holding area for credentials an
/// application keeps only for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a secret under `(namespace, account)`, replacing any previous one
    pub async fn insert(&self, namespace: &str, account: &str, secret: impl Into<Vec<u8>>) {
        self.entries
            .lock()
            .await
            .namespaced
            .entry(namespace.to_string())
            .or_default()
            .insert(account.to_string(), secret.into());
    }

    /// Store a network credential for `host`
    pub async fn insert_network(&self, host: &str, account: &str) {
        self.entries
            .lock()
            .await
            .network
            .push((host.to_string(), account.to_string()));
    }

    /// Total number of stored entries across namespaces and categories
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.namespaced.values().map(BTreeMap::len).sum::<usize>() + entries.network.len()
    }

    /// Returns true if nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SecureStore for MemoryStore {
    async fn accounts(&self, namespace: &str) -> StoreResult<Vec<String>> {
        let entries = self.entries.lock().await;
        Ok(entries
            .namespaced
            .get(namespace)
            .map(|accounts| accounts.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, namespace: &str, account: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().await;
        let accounts = entries
            .namespaced
            .get_mut(namespace)
            .ok_or(StoreError::NotFound)?;
        let mut secret = accounts.remove(account).ok_or(StoreError::NotFound)?;
        secret.fill(0);
        if accounts.is_empty() {
            entries.namespaced.remove(namespace);
        }
        Ok(())
    }

    async fn delete_category(&self, category: CredentialCategory) -> StoreResult<u64> {
        match category {
            CredentialCategory::NetworkPassword => {
                let mut entries = self.entries.lock().await;
                if entries.network.is_empty() {
                    return Err(StoreError::NotFound);
                }
                let removed = entries.network.len() as u64;
                entries.network.clear();
                Ok(removed)
            }
        }
    }

    async fn count_category(&self, category: CredentialCategory) -> StoreResult<u64> {
        match category {
            CredentialCategory::NetworkPassword => {
                Ok(self.entries.lock().await.network.len() as u64)
            }
        }
    }
}
