use std::path::PathBuf;
use std::time::Duration;

use crate::{
    api::ApiClient,
    app::App,
    config::ClientConfig,
    store::{AppStore, SessionStorage},
    ClientError,
};

/// Where the session keys are kept between runs
#[derive(Debug, Clone, Default)]
enum Storage {
    /// Use `storage_path` from the configuration
    #[default]
    Configured,
    Path(PathBuf),
    /// Keep nothing between runs
    Memory,
}

/// Builder for configuring an [`App`]
#[derive(Debug, Default)]
pub struct AppBuilder {
    config: Option<ClientConfig>,
    base_url: Option<String>,
    host: Option<String>,
    timeout: Option<Duration>,
    storage: Storage,
}

impl AppBuilder {
    /// Start from an already loaded configuration instead of the defaults
    ///
    /// # Example
    /// ```
    /// use celestia_client::{App, ClientConfig};
    ///
    /// let builder = App::builder().config(ClientConfig::default());
    /// ```
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Talk to the backend at `url`, bypassing host-based selection
    ///
    /// # Example
    /// ```
    /// use celestia_client::App;
    ///
    /// let builder = App::builder().base_url("http://localhost:8000");
    /// ```
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Pick the backend the same way the web client does: `localhost` maps to
    /// `http://localhost:8000`, anything else to `http://127.0.0.1:8000`.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set a timeout for HTTP requests
    ///
    /// # Example
    /// ```
    /// use celestia_client::App;
    /// use std::time::Duration;
    ///
    /// let builder = App::builder().timeout(Duration::from_secs(60));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Persist `sessionId` / `userId` in this JSON file
    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage = Storage::Path(path.into());
        self
    }

    /// Do not persist anything between runs
    pub fn in_memory(mut self) -> Self {
        self.storage = Storage::Memory;
        self
    }

    /// Build the application handle
    ///
    /// Nothing is sent to the backend yet; call [`App::start`] to probe the
    /// connection and restore the stored session.
    ///
    /// # Errors
    /// Returns `ClientError::FetchError` if the HTTP client cannot be created.
    ///
    /// # Example
    /// ```
    /// # use celestia_client::App;
    /// let app = App::builder()
    ///     .base_url("http://localhost:8000")
    ///     .in_memory()
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(app.api().base_url(), "http://localhost:8000");
    /// ```
    pub fn build(self) -> Result<App, ClientError> {
        let mut config = self.config.unwrap_or_default();
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(url) = self.base_url {
            config.base_url = Some(url);
        }
        if let Some(timeout) = self.timeout {
            // Whole seconds, rounded up so a sub-second timeout never reads as 0
            config.timeout = timeout.as_millis().div_ceil(1000) as u64;
        }

        let storage = match self.storage {
            Storage::Configured => Some(SessionStorage::new(&config.storage_path)),
            Storage::Path(path) => Some(SessionStorage::new(path)),
            Storage::Memory => None,
        };

        let api = ApiClient::with_timeouts(
            config.resolved_base_url(),
            self.timeout.unwrap_or_else(|| config.request_timeout()),
            config.probe_timeout(),
        )?;
        Ok(App::new(api, AppStore::new(storage), config))
    }
}
