// Task Channel: observe one backend task until it reaches a terminal state
//
// Real-time updates arrive over a WebSocket; if that connection cannot be
// established or drops before the task finishes, the channel switches to
// HTTP status polling without telling the consumer. Exactly one terminal
// event (Success, Failure or ChannelError) is delivered, unless the consumer
// closes the channel first.

mod machine;
mod poller;
mod task_channel;
mod transport;
mod types;
mod websocket;

pub use machine::{ChannelMachine, Command, Step};
pub use poller::{HttpStatusSource, StatusPoller};
pub use task_channel::{ChannelRef, TaskChannel};
pub use transport::{FrameStream, RealtimeConnector, StatusSource};
pub use types::{ChannelPhase, ChannelState, ProgressEvent, StatusPayload, TaskHandle, TaskState};
pub use websocket::WebSocketConnector;
