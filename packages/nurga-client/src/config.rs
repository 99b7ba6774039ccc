use crate::error::{ConfigError, ConfigResult};
use reqwest::Url;
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 300; // 5 minutes for large uploads
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 512;
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] =
    &[".mp3", ".wav", ".mp4", ".avi", ".m4a", ".flac", ".ogg"];

/// Client configuration, passed explicitly to everything that talks to the backend
#[derive(Clone)]
pub struct ClientConfig {
    /// Base address of the backend (http or https)
    pub api_base_url: String,
    /// Credential sent with every request and connection
    pub api_key: String,
    /// Interval between status requests once the channel falls back to polling
    pub poll_interval: Duration,
    /// Timeout for the upload request (and the HTTP client in general)
    pub upload_timeout: Duration,
    /// Timeout for short requests: health probe, API info, status polls
    pub request_timeout: Duration,
    /// Maximum accepted media file size in megabytes
    pub max_file_size_mb: u64,
    /// Accepted media extensions, including the leading dot
    pub allowed_extensions: Vec<String>,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            api_key: api_key.into(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();

        let api_base_url =
            env::var("NURGAVOICE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_key = env::var("NURGAVOICE_API_KEY").unwrap_or_default();

        let poll_interval_ms = env_u64("NURGAVOICE_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        if poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                name: "NURGAVOICE_POLL_INTERVAL_MS".to_string(),
                value: "0".to_string(),
            });
        }

        let upload_timeout_secs =
            env_u64("NURGAVOICE_UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT_SECS)?;
        let max_file_size_mb = env_u64("NURGAVOICE_MAX_FILE_SIZE_MB", DEFAULT_MAX_FILE_SIZE_MB)?;

        Ok(Self::new(api_base_url, api_key)
            .with_poll_interval(Duration::from_millis(poll_interval_ms))
            .with_upload_timeout(Duration::from_secs(upload_timeout_secs))
            .with_max_file_size_mb(max_file_size_mb))
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_file_size_mb(mut self, size_mb: u64) -> Self {
        self.max_file_size_mb = size_mb;
        self
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Build an HTTP endpoint URL from path segments. Segments are percent-encoded.
    pub fn api_url(&self, segments: &[&str]) -> ConfigResult<Url> {
        let mut url = self.base_url()?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| self.invalid_url("URL cannot be used as a base"))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Build a WebSocket endpoint URL (http -> ws, https -> wss)
    pub fn websocket_url(&self, segments: &[&str]) -> ConfigResult<Url> {
        let mut url = self.api_url(segments)?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| self.invalid_url("cannot convert to a WebSocket URL"))?;
        Ok(url)
    }

    fn base_url(&self) -> ConfigResult<Url> {
        let trimmed = self.api_base_url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }

        let url = Url::parse(trimmed).map_err(|e| self.invalid_url(&e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(self.invalid_url(&format!("unsupported scheme '{}'", other))),
        }
    }

    fn invalid_url(&self, reason: &str) -> ConfigError {
        ConfigError::InvalidApiUrl {
            url: self.api_base_url.clone(),
            reason: reason.to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, "")
    }
}

// Never print the credential
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field(
                "api_key",
                &if self.api_key.is_empty() { "[NOT SET]" } else { "[SET]" },
            )
            .field("poll_interval", &self.poll_interval)
            .field("upload_timeout", &self.upload_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("max_file_size_mb", &self.max_file_size_mb)
            .field("allowed_extensions", &self.allowed_extensions)
            .finish()
    }
}

fn env_u64(name: &str, default: u64) -> ConfigResult<u64> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// URL without its query string, for logging (the query carries the credential)
pub(crate) fn redact(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}
