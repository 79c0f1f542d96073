//! Core types and traits for emergency data destruction.
//!
//! This crate provides the foundational types shared by every panicwipe crate:
//!
//! - **Report**: [`WipeReport`] and its in-flight form [`ReportDraft`]
//! - **Triggers**: [`TriggerMethod`], [`TriggerPolicy`] and the
//!   [`ValidatedTrigger`] token the orchestrator requires
//! - **Stages**: the [`WipeStage`] trait every cleanup step implements
//! - **Errors**: [`WipeError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use panicwipe_core::{ReportDraft, StageOutcome, TriggerMethod};
//!
//! let mut draft = ReportDraft::start(TriggerMethod::PanicButton, false, 3);
//! draft.record("clipboard clear", StageOutcome::done(1));
//! let report = draft.finish();
//! assert!(report.success());
//! ```

#![doc(html_root_url = "https://docs.rs/panicwipe-core/0.3.0")]

mod error;
pub mod types;

pub use error::{Result, WipeError};
pub use types::*;
