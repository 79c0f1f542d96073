//! Local cleanup stages for emergency data destruction.
//!
//! Everything here acts on state owned by this machine:
//!
//! - [`SecureStorageClient`] purges credentials from a [`SecureStore`]
//! - [`volatile`] holds the memory, clipboard, network cache and model
//!   cache stages
//! - [`shred`] provides the overwrite passes they share
//!
//! Every stage implements [`panicwipe_core::WipeStage`] and never fails as a
//! whole; problems are returned inside its [`panicwipe_core::StageOutcome`].

#![doc(html_root_url = "https://docs.rs/panicwipe-local/0.3.0")]

mod error;
mod purge;
pub mod shred;
pub mod store;
pub mod volatile;

pub use error::{LocalError, LocalResult, StoreError, StoreResult};
pub use purge::{PurgeOutcome, SecureStorageClient};
pub use store::{CredentialCategory, MemoryStore, SecretToolStore, SecureStore};
pub use volatile::{
    Clipboard, ClipboardClear, CommandClipboard, MemoryClipboard, MemoryZeroing,
    ModelCacheRemoval, NetworkCacheClear, SecretPool, VolatileStateCleaner,
};
