use nurga_client::{ApiError, ChannelError, ConfigError};

pub const SUCCESS: i32 = 0;
/// The backend reported the job itself as failed
pub const TASK_FAILED: i32 = 1;
pub const INPUT_ERROR: i32 = 2;
/// Server unreachable, rejected the credential, or the channel died
pub const CONNECTION_ERROR: i32 = 3;
pub const IO_ERROR: i32 = 4;
pub const INTERRUPTED: i32 = 130;

/// Exit code for an error bubbled up from a command body
pub fn for_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(api) = cause.downcast_ref::<ApiError>() {
            return match api {
                ApiError::InvalidFile(_) => INPUT_ERROR,
                ApiError::Io(_) => IO_ERROR,
                ApiError::Config(_) => INPUT_ERROR,
                _ => CONNECTION_ERROR,
            };
        }
        if let Some(channel) = cause.downcast_ref::<ChannelError>() {
            return match channel {
                ChannelError::InvalidHandle(_) | ChannelError::Config(_) => INPUT_ERROR,
                _ => CONNECTION_ERROR,
            };
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return INPUT_ERROR;
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return IO_ERROR;
        }
    }
    CONNECTION_ERROR
}
