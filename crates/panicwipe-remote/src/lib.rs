//! HTTP client for the backend emergency wipe endpoint.
//!
//! This crate provides [`RemoteWipeClient`], which asks the authenticated
//! backend to destroy its copy of the user's data and maps every failure
//! into a [`RemoteWipeOutcome`] instead of an error.

#![doc(html_root_url = "https://docs.rs/panicwipe-remote/0.3.0")]

mod client;

pub use client::{RemoteWipeClient, RemoteWipeClientBuilder, DEFAULT_WIPE_PATH};
pub use panicwipe_core::{RemoteWipeOutcome, Result, WipeError};
