// Task Channel state machine
//
// Pure transition table, free of any I/O. The driver in task_channel.rs feeds
// it transport inputs and acts on the returned Command; everything that decides
// *whether* an event reaches the consumer lives here.
//
//   Idle --begin--> Connecting --realtime_opened--> Streaming
//   Connecting|Streaming --realtime_failed--> Streaming (using_polling)
//   any --Success|Failure|poll_failed|close--> Terminated
//
// Inputs from the transport that is not currently active are stale and dropped,
// as is everything after Terminated.

use super::types::{ChannelPhase, ChannelState, ProgressEvent, StatusPayload};
use serde_json::Value;

/// What the driver must do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Keep going with the current transport
    Continue,
    /// Tear down the real-time transport and start polling
    SwitchToPolling,
    /// Tear down whatever is active and stop
    Shutdown,
}

/// Outcome of one transition: at most one event for the consumer plus a command
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub event: Option<ProgressEvent>,
    pub command: Command,
}

impl Step {
    fn idle() -> Self {
        Self {
            event: None,
            command: Command::Continue,
        }
    }

    fn command(command: Command) -> Self {
        Self {
            event: None,
            command,
        }
    }

    fn emit(event: ProgressEvent, command: Command) -> Self {
        Self {
            event: Some(event),
            command,
        }
    }
}

#[derive(Debug, Default)]
pub struct ChannelMachine {
    state: ChannelState,
    task_id: String,
}

impl ChannelMachine {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            state: ChannelState::default(),
            task_id: task_id.into(),
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }

    pub fn begin(&mut self) -> Step {
        if self.state.phase == ChannelPhase::Idle {
            self.state.phase = ChannelPhase::Connecting;
            log::debug!("Task {}: connecting", self.task_id);
        }
        Step::idle()
    }

    pub fn realtime_opened(&mut self) -> Step {
        if self.realtime_active() && self.state.phase == ChannelPhase::Connecting {
            self.state.phase = ChannelPhase::Streaming;
            log::info!("Task {}: real-time channel established", self.task_id);
        }
        Step::idle()
    }

    /// A text frame from the real-time transport. Malformed frames are dropped.
    pub fn realtime_message(&mut self, text: &str) -> Step {
        if !self.realtime_active() {
            log::debug!("Task {}: dropping stale real-time frame", self.task_id);
            return Step::idle();
        }
        self.state.phase = ChannelPhase::Streaming;

        match StatusPayload::parse(text) {
            Some(payload) => self.accept(payload),
            None => {
                log::warn!("Task {}: ignoring malformed real-time message", self.task_id);
                Step::idle()
            }
        }
    }

    /// The real-time transport could not be established, errored, or closed.
    /// Switches to polling exactly once; emits nothing.
    pub fn realtime_failed(&mut self, reason: &str) -> Step {
        if !self.realtime_active() {
            return Step::idle();
        }

        log::info!(
            "Task {}: real-time channel unavailable ({}), falling back to polling",
            self.task_id,
            reason
        );
        self.state.using_polling = true;
        self.state.phase = ChannelPhase::Streaming;
        Step::command(Command::SwitchToPolling)
    }

    /// One successful status response from the polling transport
    pub fn poll_response(&mut self, document: Value) -> Step {
        if !self.polling_active() {
            log::debug!("Task {}: dropping stale poll response", self.task_id);
            return Step::idle();
        }

        match StatusPayload::from_value(document) {
            Some(payload) => self.accept(payload),
            None => {
                log::warn!("Task {}: ignoring malformed status response", self.task_id);
                Step::idle()
            }
        }
    }

    /// A polling request failed. Polling does not retry: the channel ends here.
    pub fn poll_failed(&mut self, reason: &str) -> Step {
        if !self.polling_active() {
            return Step::idle();
        }

        log::error!("Task {}: polling failed: {}", self.task_id, reason);
        self.terminate();
        Step::emit(
            ProgressEvent::ChannelError {
                reason: reason.to_string(),
            },
            Command::Shutdown,
        )
    }

    /// Consumer-initiated teardown. Idempotent.
    pub fn close(&mut self) -> Step {
        if !self.is_terminated() {
            log::info!("Task {}: channel closed by consumer", self.task_id);
            self.terminate();
        }
        Step::command(Command::Shutdown)
    }

    fn accept(&mut self, payload: StatusPayload) -> Step {
        let Some(event) = payload.into_event() else {
            return Step::idle();
        };

        if event.is_terminal() {
            log::info!("Task {}: terminal event received", self.task_id);
            self.terminate();
            Step::emit(event, Command::Shutdown)
        } else {
            Step::emit(event, Command::Continue)
        }
    }

    fn terminate(&mut self) {
        self.state.phase = ChannelPhase::Terminated;
    }

    fn realtime_active(&self) -> bool {
        !self.state.using_polling
            && matches!(
                self.state.phase,
                ChannelPhase::Connecting | ChannelPhase::Streaming
            )
    }

    fn polling_active(&self) -> bool {
        self.state.using_polling && self.state.phase == ChannelPhase::Streaming
    }
}
