//! Secure credential storage collaborators.

mod memory;
mod secret_tool;

pub use memory::MemoryStore;
pub use secret_tool::SecretToolStore;

use async_trait::async_trait;

use crate::error::StoreResult;

/// Storage categories that are not scoped to a single namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialCategory {
    /// Saved network / internet passwords
    NetworkPassword,
}

impl std::fmt::Display for CredentialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkPassword => write!(f, "network passwords"),
        }
    }
}

/// The platform's protected key/value credential store.
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// List account identifiers stored under `namespace`.
    ///
    /// An empty namespace yields an empty list, not an error.
    async fn accounts(&self, namespace: &str) -> StoreResult<Vec<String>>;

    /// Delete one `(namespace, account)` entry.
    async fn delete(&self, namespace: &str, account: &str) -> StoreResult<()>;

    /// Delete every entry of a category, returning how many were removed.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) when the
    /// category holds nothing.
    async fn delete_category(&self, category: CredentialCategory) -> StoreResult<u64>;

    /// Count the entries of a category without deleting them.
    async fn count_category(&self, category: CredentialCategory) -> StoreResult<u64>;
}
