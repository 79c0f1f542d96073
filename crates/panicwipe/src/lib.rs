//! Emergency data destruction with an auditable report.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use panicwipe::{Orchestrator, SecretPool, TriggerContext, TriggerMethod, WipeConfig};
//!
//! #[tokio::main]
//! async fn main() -> panicwipe::Result<()> {
//!     let config = WipeConfig::load("config.toml".as_ref())?;
//!     let orchestrator = Orchestrator::from_config(&config, SecretPool::new())?;
//!
//!     // The trigger layer checks the confirmation first
//!     let trigger = config
//!         .trigger_policy()
//!         .validate(TriggerMethod::TextConfirmation, TriggerContext::with_phrase("DESTROY ALL DATA"))?;
//!
//!     let report = orchestrator.begin_wipe(&trigger).await?;
//!     println!("success: {}", report.success());
//!     for error in report.errors() {
//!         println!("  {error}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/panicwipe/0.3.0")]

mod config;
mod orchestrator;
mod runner;

pub use config::{
    expand_path, PathsSection, RemoteSection, SecureStorageSection, TriggerSection, WipeConfig,
    WipeSection,
};
pub use orchestrator::{
    Orchestrator, OrchestratorBuilder, WipeSettings, DEFAULT_PASSES, DEFAULT_STAGE_DEADLINE,
};

// Re-export core types
pub use panicwipe_core::*;

// Re-export stage crates
pub use panicwipe_local as local;
pub use panicwipe_local::SecretPool;
pub use panicwipe_remote::{RemoteWipeClient, RemoteWipeClientBuilder};

// Re-export runtime for convenience
pub use tokio;
