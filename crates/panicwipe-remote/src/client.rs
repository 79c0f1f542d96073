//! Backend emergency wipe client implementation.

use async_trait::async_trait;
use panicwipe_core::{
    RemoteWipeOutcome, Result, StageOutcome, WipeError, WipeStage, REMOTE_WIPE_FAILED,
};
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Default wipe endpoint path
pub const DEFAULT_WIPE_PATH: &str = "/api/v1/emergency/wipe";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the authenticated backend wipe endpoint
#[derive(Clone)]
pub struct RemoteWipeClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    token: String,
    endpoint: Url,
    timeout: Duration,
}

impl RemoteWipeClient {
    /// Create a builder for `base_url`, authenticating with a bearer `token`
    #[must_use]
    pub fn builder(base_url: impl Into<String>, token: impl Into<String>) -> RemoteWipeClientBuilder {
        RemoteWipeClientBuilder::new(base_url, token)
    }

    /// The fully resolved wipe endpoint
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Ask the backend to destroy its copy of this user's data.
    ///
    /// Never fails: any transport, status or decoding problem becomes a
    /// failed outcome carrying one error string. There is no retry.
    pub async fn request_remote_wipe(&self) -> RemoteWipeOutcome {
        match self.try_request_remote_wipe().await {
            Ok(outcome) => {
                info!(
                    success = outcome.success,
                    items = outcome.items_destroyed,
                    "backend wipe finished"
                );
                outcome
            }
            Err(e) => {
                warn!(error = %e, "backend wipe failed");
                RemoteWipeOutcome::failed(format!("{REMOTE_WIPE_FAILED}: {e}"))
            }
        }
    }

    /// Same as [`request_remote_wipe`](Self::request_remote_wipe) but
    /// surfaces the transport error
    pub async fn try_request_remote_wipe(&self) -> Result<RemoteWipeOutcome> {
        let url = self.inner.endpoint.as_str();
        debug!(url = %url, "POST request");

        let response = self
            .inner
            .http
            .post(url)
            .bearer_auth(&self.inner.token)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.handle_response(response).await
    }

    fn transport_error(&self, e: &reqwest::Error) -> WipeError {
        if e.is_timeout() {
            WipeError::Timeout(self.inner.timeout.as_secs())
        } else {
            WipeError::Http(e.to_string())
        }
    }

    /// Decode a JSON outcome, or convert the error status
    async fn handle_response(&self, response: reqwest::Response) -> Result<RemoteWipeOutcome> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await.map_err(|e| self.transport_error(&e))?;
            serde_json::from_str(&body).map_err(WipeError::Json)
        } else {
            Err(Self::handle_error(status.as_u16(), response).await)
        }
    }

    /// Convert an error response to a [`WipeError`]
    async fn handle_error(status: u16, response: reqwest::Response) -> WipeError {
        let body = response.text().await.unwrap_or_default();

        // Try to parse error message from JSON
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("detail"))
                    .and_then(|e| e.as_str())
                    .map(String::from)
            })
            .unwrap_or(body);

        match status {
            401 | 403 => WipeError::Unauthorized,
            _ => WipeError::Api {
                code: status,
                message,
            },
        }
    }
}

#[async_trait]
impl WipeStage for RemoteWipeClient {
    fn name(&self) -> &'static str {
        "remote wipe"
    }

    async fn destroy(&self) -> StageOutcome {
        self.request_remote_wipe().await.into()
    }

    async fn survey(&self) -> StageOutcome {
        StageOutcome::surveyed(vec![format!("remote: POST {}", self.inner.endpoint)])
    }
}

/// Builder for configuring a [`RemoteWipeClient`]
pub struct RemoteWipeClientBuilder {
    base_url: String,
    token: String,
    path: String,
    timeout: Duration,
    user_agent: String,
}

impl RemoteWipeClientBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            path: DEFAULT_WIPE_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("panicwipe/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the endpoint path (relative to the base URL)
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<RemoteWipeClient> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| WipeError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        let endpoint = base
            .join(&self.path)
            .map_err(|e| WipeError::InvalidUrl(format!("{}: {e}", self.path)))?;

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| WipeError::Http(e.to_string()))?;

        Ok(RemoteWipeClient {
            inner: Arc::new(ClientInner {
                http,
                token: self.token,
                endpoint,
                timeout: self.timeout,
            }),
        })
    }
}
