pub mod api;
pub mod channel;
pub mod config;
pub mod error;

pub use api::ApiClient;
pub use channel::{ChannelRef, ProgressEvent, TaskChannel, TaskHandle};
pub use config::ClientConfig;
pub use error::{ApiError, ChannelError, ConfigError};
