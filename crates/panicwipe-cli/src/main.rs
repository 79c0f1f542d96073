//! pwipe - emergency data destruction
//!
//! Exits non-zero whenever the wipe report contains an error.

use anyhow::Result;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    panicwipe_cli::run().await
}
