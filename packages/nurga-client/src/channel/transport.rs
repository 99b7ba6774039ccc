// Transport seam of the Task Channel
//
// The channel never touches sockets or HTTP directly. It is handed one
// RealtimeConnector and one StatusSource; production code uses the WebSocket
// and HTTP implementations, tests plug in scripted ones.

use super::types::TaskHandle;
use crate::error::ChannelResult;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde_json::Value;

/// Text frames of an established real-time connection.
/// An `Err` item is a runtime transport error; the end of the stream is a close.
pub type FrameStream = BoxStream<'static, ChannelResult<String>>;

#[async_trait]
pub trait RealtimeConnector: Send + Sync {
    /// Open the real-time connection for this task, passing the credential as a connection parameter
    async fn connect(&self, handle: &TaskHandle) -> ChannelResult<FrameStream>;
}

#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the task's current status document (one request/response round-trip)
    async fn fetch_status(&self, handle: &TaskHandle) -> ChannelResult<Value>;
}
