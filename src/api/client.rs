use crate::config::ClientConfig;
use crate::error::ClientError;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the Celestia backend
///
/// Every call is a single request: nothing is retried and nothing is cached.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    probe_timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeouts(base_url, DEFAULT_TIMEOUT, DEFAULT_PROBE_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        timeout: Duration,
        probe_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("celestia-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            probe_timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_timeouts(
            config.resolved_base_url(),
            config.request_timeout(),
            config.probe_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    pub(crate) fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode its JSON body. Non-success statuses become
    /// `StatusError` carrying `context`.
    pub(crate) async fn json(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<Value, ClientError> {
        let response = ensure_success(request.send().await?, context)?;
        let body: Value = response.json().await?;
        debug!("{} response: {}", context, body);
        Ok(body)
    }

    /// Send a request whose body the caller does not need
    pub(crate) async fn send(&self, request: RequestBuilder, context: &str) -> Result<(), ClientError> {
        ensure_success(request.send().await?, context)?;
        Ok(())
    }
}

pub(crate) fn ensure_success(response: Response, context: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!("{} ({}): {}", context, response.url(), status);
        Err(ClientError::status(context, status))
    }
}
