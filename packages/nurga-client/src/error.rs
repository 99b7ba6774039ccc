// Error types for the NurgaVoice client
//
// ChannelError covers everything that can go wrong while observing a task.
// Inside the Task Channel these never propagate as Err values; they are turned
// into ProgressEvent::ChannelError (or swallowed by the polling fallback).
// ApiError is the error type of the one-shot HTTP calls made by ApiClient.

use thiserror::Error;

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Result type for backend API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while observing a backend task
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Invalid task handle: {0}")]
    InvalidHandle(String),

    #[error("No async runtime available: {0}")]
    Runtime(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Authentication failed during polling. Please check your API key.")]
    Unauthorized,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid status response: {0}")]
    Decode(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ApiError> for ChannelError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => ChannelError::Unauthorized,
            ApiError::Http { status, message } => ChannelError::Http { status, message },
            ApiError::Decode(msg) => ChannelError::Decode(msg),
            ApiError::Config(e) => ChannelError::Config(e),
            other => ChannelError::Request(other.to_string()),
        }
    }
}

/// Errors returned by the backend HTTP API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed (401). Please check your API key.")]
    Unauthorized,

    #[error("Access forbidden (403). Your API key may not have the required permissions.")]
    Forbidden,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API URL not configured. Set NURGAVOICE_API_URL or pass --api-url.")]
    MissingApiUrl,

    #[error("Invalid API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}
