//! # panicwipe-cli
//!
//! Command-line trigger for emergency data destruction.
//!
//! ## Features
//!
//! - **Wipe**: validate a trigger, run every stage, print the report
//! - **Audit**: simulated run listing what a wipe would destroy
//! - **Config**: show, set and initialise the TOML config
//! - **Multiple output formats**: Pretty, JSON, YAML
//! - **Audit log**: every report appended as one JSON line

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
