//! Freedesktop Secret Service backend driven through `secret-tool`.

use async_trait::async_trait;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

use super::{CredentialCategory, SecureStore};
use crate::error::{StoreError, StoreResult};

/// Schema libsecret uses for saved network passwords.
const NETWORK_PASSWORD_SCHEMA: &str = "org.gnome.keyring.NetworkPassword";

/// Secret Service store (GNOME Keyring, KWallet via its bridge, KeePassXC).
///
/// Items are addressed by two lookup attributes: one naming the namespace
/// (default `service`) and one naming the account (default `account`).
#[derive(Debug, Clone)]
pub struct SecretToolStore {
    program: String,
    namespace_attr: String,
    account_attr: String,
}

impl Default for SecretToolStore {
    fn default() -> Self {
        Self {
            program: "secret-tool".to_string(),
            namespace_attr: "service".to_string(),
            account_attr: "account".to_string(),
        }
    }
}

impl SecretToolStore {
    /// Create a store using the default attribute names
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different helper binary
    #[must_use]
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Use different lookup attribute names
    #[must_use]
    pub fn attributes(mut self, namespace: impl Into<String>, account: impl Into<String>) -> Self {
        self.namespace_attr = namespace.into();
        self.account_attr = account.into();
        self
    }

    async fn run(&self, args: &[&str]) -> StoreResult<Output> {
        debug!(program = %self.program, command = args.first().copied().unwrap_or(""), "secret-tool");
        Command::new(&self.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| StoreError::Backend(format!("cannot run {}: {e}", self.program)))
    }

    async fn search(&self, attrs: &[&str]) -> StoreResult<String> {
        let mut args = vec!["search", "--all", "--unlock"];
        args.extend_from_slice(attrs);
        let output = self.run(&args).await?;

        // Item headers and attributes are split across stdout and stderr.
        let text = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        if output.status.success() || text.contains("attribute.") {
            Ok(text)
        } else if text.trim().is_empty() {
            // Non-zero exit with no output means "no matches".
            Ok(String::new())
        } else {
            Err(classify_failure(&text))
        }
    }
}

#[async_trait]
impl SecureStore for SecretToolStore {
    async fn accounts(&self, namespace: &str) -> StoreResult<Vec<String>> {
        let text = self.search(&[self.namespace_attr.as_str(), namespace]).await?;
        Ok(parse_accounts(&text, &self.account_attr))
    }

    async fn delete(&self, namespace: &str, account: &str) -> StoreResult<()> {
        let output = self
            .run(&[
                "clear",
                self.namespace_attr.as_str(),
                namespace,
                self.account_attr.as_str(),
                account,
            ])
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.trim().is_empty() {
                Err(StoreError::NotFound)
            } else {
                Err(classify_failure(&stderr))
            }
        }
    }

    async fn delete_category(&self, category: CredentialCategory) -> StoreResult<u64> {
        let count = self.count_category(category).await?;
        if count == 0 {
            return Err(StoreError::NotFound);
        }

        let output = match category {
            CredentialCategory::NetworkPassword => {
                self.run(&["clear", "xdg:schema", NETWORK_PASSWORD_SCHEMA])
                    .await?
            }
        };

        if output.status.success() {
            Ok(count)
        } else {
            Err(classify_failure(&String::from_utf8_lossy(&output.stderr)))
        }
    }

    async fn count_category(&self, category: CredentialCategory) -> StoreResult<u64> {
        let text = match category {
            CredentialCategory::NetworkPassword => {
                self.search(&["xdg:schema", NETWORK_PASSWORD_SCHEMA]).await?
            }
        };
        Ok(count_items(&text))
    }
}

/// Extract account attribute values from `secret-tool search` output.
fn parse_accounts(text: &str, account_attr: &str) -> Vec<String> {
    let prefix = format!("attribute.{account_attr} = ");
    let mut accounts: Vec<String> = text
        .lines()
        .filter_map(|line| line.trim().strip_prefix(prefix.as_str()))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    accounts.sort_unstable();
    accounts.dedup();
    accounts
}

/// Count item headers (`[/org/freedesktop/secrets/...]`).
fn count_items(text: &str) -> u64 {
    text.lines()
        .filter(|line| line.trim_start().starts_with("[/"))
        .count() as u64
}

fn classify_failure(text: &str) -> StoreError {
    let summary = text.trim().lines().next().unwrap_or("").to_string();
    let lower = summary.to_lowercase();
    if lower.contains("locked") || lower.contains("denied") || lower.contains("dismissed") {
        StoreError::AccessDenied(summary)
    } else if lower.contains("no such") || lower.contains("not found") {
        StoreError::NotFound
    } else {
        StoreError::Backend(summary)
    }
}
