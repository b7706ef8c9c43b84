use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Explicit backend base URL. When unset it is derived from `host`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Host name the client believes it runs on, used to pick the backend address
    #[serde(default = "default_host")]
    pub host: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Timeout of the `/health` connectivity probe in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout: u64,
    /// File holding the persisted `sessionId` / `userId` keys
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Largest image accepted for upload, in bytes
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            host: default_host(),
            timeout: default_timeout(),
            probe_timeout: default_probe_timeout(),
            storage_path: default_storage_path(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "localhost".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".celestia").join("session.json")
}

fn default_max_image_bytes() -> u64 {
    10 * 1024 * 1024
}

/// Pick the backend address the same way the web front end does: a client
/// served from `localhost` talks to `localhost:8000`, anything else to the
/// loopback IP.
pub fn base_url_for_host(host: &str) -> &'static str {
    if host == "localhost" {
        "http://localhost:8000"
    } else {
        "http://127.0.0.1:8000"
    }
}

impl ClientConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with CELESTIA__ prefix
    /// 2. celestia.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: CELESTIA__BASE_URL, CELESTIA__TIMEOUT
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| base_url_for_host(&self.host).to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout)
    }
}

/// Load configuration from `celestia.toml` and `CELESTIA__*` environment variables
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("celestia").required(false))
        // Use double underscore for nested keys: CELESTIA__BASE_URL
        .add_source(
            Environment::with_prefix("CELESTIA")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
