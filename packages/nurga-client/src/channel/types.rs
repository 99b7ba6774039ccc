// Types shared by the Task Channel, its transports and its consumers

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const DEFAULT_PROGRESS_LABEL: &str = "Processing...";
const DEFAULT_FAILURE_REASON: &str = "Unknown error";

/// Identifies one backend job. Immutable once created.
#[derive(Clone, PartialEq, Eq)]
pub struct TaskHandle {
    task_id: String,
    credential: String,
}

impl TaskHandle {
    pub fn new(task_id: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            credential: credential.into(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("task_id", &self.task_id)
            .field("credential", &"[REDACTED]")
            .finish()
    }
}

/// Event delivered to the consumer of a Task Channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Intermediate progress. Percentages are forwarded as reported, not forced monotonic.
    Progress { percent: u8, label: String },

    /// The job finished; `result` is the backend's job payload
    Success { result: Value },

    /// The backend reported that the job failed
    Failure { reason: String },

    /// Transport-level problem that could not be recovered from
    ChannelError { reason: String },
}

impl ProgressEvent {
    /// Success and Failure end the job's lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Success { .. } | ProgressEvent::Failure { .. })
    }
}

/// Lifecycle phase of a Task Channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPhase {
    #[default]
    Idle,
    Connecting,
    Streaming,
    Terminated,
}

impl fmt::Display for ChannelPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelPhase::Idle => write!(f, "idle"),
            ChannelPhase::Connecting => write!(f, "connecting"),
            ChannelPhase::Streaming => write!(f, "streaming"),
            ChannelPhase::Terminated => write!(f, "terminated"),
        }
    }
}

/// Snapshot of a channel's state: the phase plus the orthogonal fallback flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChannelState {
    pub phase: ChannelPhase,
    pub using_polling: bool,
}

impl ChannelState {
    pub fn is_terminated(&self) -> bool {
        self.phase == ChannelPhase::Terminated
    }
}

/// Job state as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Progress,
    Success,
    Failure,
    /// PENDING, CONNECTED, ERROR or anything the server adds later
    Other(String),
}

impl From<&str> for TaskState {
    fn from(state: &str) -> Self {
        match state {
            "PROGRESS" => TaskState::Progress,
            "SUCCESS" => TaskState::Success,
            "FAILURE" => TaskState::Failure,
            other => TaskState::Other(other.to_string()),
        }
    }
}

/// One status document, as sent over the real-time channel or returned by `/status`
///
/// ```json
/// { "state": "PROGRESS", "progress": 40, "step": "Transcribing audio..." }
/// { "state": "SUCCESS", "result": { "summary": "...", "transcription": { ... } } }
/// { "state": "FAILURE", "error": "Out of memory" }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPayload {
    pub state: TaskState,
    raw: Value,
}

impl StatusPayload {
    /// Parse a text frame. Returns None for anything that is not a status object.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str::<Value>(text)
            .ok()
            .and_then(Self::from_value)
    }

    /// Interpret an already decoded JSON document. Requires an object with a string `state`.
    pub fn from_value(raw: Value) -> Option<Self> {
        let state = TaskState::from(raw.as_object()?.get("state")?.as_str()?);
        Some(Self { state, raw })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Map to the consumer-facing event. Unrecognized states produce no event.
    pub fn into_event(self) -> Option<ProgressEvent> {
        match self.state {
            TaskState::Progress => {
                let percent = self
                    .raw
                    .get("progress")
                    .and_then(Value::as_f64)
                    .map(|p| p.clamp(0.0, 100.0).round() as u8)
                    .unwrap_or(0);
                let label = self
                    .raw
                    .get("step")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PROGRESS_LABEL)
                    .to_string();
                Some(ProgressEvent::Progress { percent, label })
            }
            TaskState::Success => {
                let result = match self.raw.get("result") {
                    Some(result) if !result.is_null() => result.clone(),
                    _ => self.raw,
                };
                Some(ProgressEvent::Success { result })
            }
            TaskState::Failure => {
                let reason = match self.raw.get("error") {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Null) | None => DEFAULT_FAILURE_REASON.to_string(),
                    Some(other) => other.to_string(),
                };
                Some(ProgressEvent::Failure { reason })
            }
            TaskState::Other(_) => None,
        }
    }
}
