// Task Channel driver
//
// One tokio task per opened channel. It feeds transport inputs into the
// ChannelMachine and hands any resulting event to the consumer callback while
// holding the machine lock, so:
// - deliveries are serialized,
// - close() from another thread waits for an in-flight delivery and then wins,
// - close() from inside the callback re-enters the (reentrant) lock.

use super::machine::{ChannelMachine, Command, Step};
use super::poller::{HttpStatusSource, StatusPoller};
use super::transport::{RealtimeConnector, StatusSource};
use super::types::{ChannelState, ProgressEvent, TaskHandle};
use super::websocket::WebSocketConnector;
use crate::api::ApiClient;
use crate::config::{ClientConfig, DEFAULT_POLL_INTERVAL_MS};
use crate::error::{ChannelError, ChannelResult};
use futures_util::StreamExt;
use parking_lot::{Mutex, ReentrantMutex};
use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

type EventCallback = Box<dyn FnMut(ProgressEvent) + Send>;

/// Factory for Task Channels: holds the transports and the polling interval
#[derive(Clone)]
pub struct TaskChannel {
    connector: Arc<dyn RealtimeConnector>,
    status: Arc<dyn StatusSource>,
    poll_interval: Duration,
}

impl TaskChannel {
    /// WebSocket + HTTP polling against the configured backend
    pub fn new(config: &ClientConfig) -> ChannelResult<Self> {
        let client = ApiClient::new(config.clone())?;
        Ok(Self::from_client(Arc::new(client)))
    }

    pub fn from_client(client: Arc<ApiClient>) -> Self {
        let config = client.config().clone();
        Self {
            connector: Arc::new(WebSocketConnector::new(config.clone())),
            status: Arc::new(HttpStatusSource::new(client)),
            poll_interval: config.poll_interval,
        }
    }

    pub fn with_transports(
        connector: Arc<dyn RealtimeConnector>,
        status: Arc<dyn StatusSource>,
    ) -> Self {
        Self {
            connector,
            status,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Start observing a task. `on_event` receives every event, one at a time.
    ///
    /// Fails synchronously only for an empty task id (or when called outside a
    /// tokio runtime); transport problems are reported through `on_event`.
    pub fn open<F>(&self, handle: TaskHandle, on_event: F) -> ChannelResult<ChannelRef>
    where
        F: FnMut(ProgressEvent) + Send + 'static,
    {
        if handle.task_id().is_empty() {
            return Err(ChannelError::InvalidHandle("task id is empty".to_string()));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ChannelError::Runtime(e.to_string()))?;

        let shared = Arc::new(Shared {
            machine: ReentrantMutex::new(RefCell::new(ChannelMachine::new(handle.task_id()))),
            on_event: Mutex::new(Box::new(on_event)),
            cancel: CancellationToken::new(),
            done: CancellationToken::new(),
        });

        let channel = ChannelRef {
            task_id: handle.task_id().to_string(),
            shared: shared.clone(),
        };

        let driver = Driver {
            shared,
            handle,
            connector: self.connector.clone(),
            status: self.status.clone(),
            poll_interval: self.poll_interval,
        };

        runtime.spawn(async move {
            let _done = driver.shared.done.clone().drop_guard();
            driver.run().await;
        });

        Ok(channel)
    }

    /// Like `open`, but delivers events through an unbounded channel
    pub fn open_stream(
        &self,
        handle: TaskHandle,
    ) -> ChannelResult<(ChannelRef, mpsc::UnboundedReceiver<ProgressEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let channel = self.open(handle, move |event| {
            // Receiver gone means nobody is listening any more
            let _ = tx.send(event);
        })?;
        Ok((channel, rx))
    }
}

/// Handle to one open channel. Clones refer to the same channel.
#[derive(Clone)]
pub struct ChannelRef {
    task_id: String,
    shared: Arc<Shared>,
}

impl ChannelRef {
    /// Terminate the channel and tear down its transport. Safe from any state,
    /// any number of times, including from inside the event callback.
    pub fn close(&self) {
        self.shared.dispatch(|machine| machine.close());
        self.shared.cancel.cancel();
    }

    pub fn state(&self) -> ChannelState {
        self.shared.machine.lock().borrow().state()
    }

    pub fn is_terminated(&self) -> bool {
        self.state().is_terminated()
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Resolves once the driver has released all transports
    pub async fn finished(&self) {
        self.shared.done.cancelled().await;
    }
}

impl std::fmt::Debug for ChannelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRef")
            .field("task_id", &self.task_id)
            .field("state", &self.state())
            .finish()
    }
}

struct Shared {
    machine: ReentrantMutex<RefCell<ChannelMachine>>,
    on_event: Mutex<EventCallback>,
    cancel: CancellationToken,
    done: CancellationToken,
}

impl Shared {
    /// Run one transition and deliver its event, if any, under the machine lock
    fn dispatch(&self, transition: impl FnOnce(&mut ChannelMachine) -> Step) -> Command {
        let machine = self.machine.lock();
        let step = transition(&mut machine.borrow_mut());

        if let Some(event) = step.event {
            let mut on_event = self.on_event.lock();
            (*on_event)(event);
        }

        step.command
    }
}

struct Driver {
    shared: Arc<Shared>,
    handle: TaskHandle,
    connector: Arc<dyn RealtimeConnector>,
    status: Arc<dyn StatusSource>,
    poll_interval: Duration,
}

impl Driver {
    async fn run(&self) {
        let cancel = self.shared.cancel.clone();
        self.shared.dispatch(|machine| machine.begin());

        if self.stream_realtime(&cancel).await == Command::SwitchToPolling {
            self.poll_status(&cancel).await;
        }

        // Release whatever the consumer captured (e.g. the open_stream sender)
        *self.shared.on_event.lock() = Box::new(|_| {});
        log::debug!("Task {}: channel driver stopped", self.handle.task_id());
    }

    /// Returns SwitchToPolling when the real-time transport is gone; the
    /// frame stream is dropped before this returns.
    async fn stream_realtime(&self, cancel: &CancellationToken) -> Command {
        let connected = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Command::Shutdown,
            result = self.connector.connect(&self.handle) => result,
        };

        let mut frames = match connected {
            Ok(frames) => frames,
            Err(e) => return self.shared.dispatch(|m| m.realtime_failed(&e.to_string())),
        };

        self.shared.dispatch(|m| m.realtime_opened());

        loop {
            let command = tokio::select! {
                biased;
                _ = cancel.cancelled() => Command::Shutdown,
                frame = frames.next() => match frame {
                    Some(Ok(text)) => self.shared.dispatch(|m| m.realtime_message(&text)),
                    Some(Err(e)) => self.shared.dispatch(|m| m.realtime_failed(&e.to_string())),
                    None => self.shared.dispatch(|m| m.realtime_failed("connection closed")),
                },
            };

            match command {
                Command::Continue if !cancel.is_cancelled() => continue,
                Command::Continue => return Command::Shutdown,
                other => return other,
            }
        }
    }

    async fn poll_status(&self, cancel: &CancellationToken) {
        let mut poller = StatusPoller::start(self.status.clone(), self.poll_interval);

        loop {
            // Dropping the in-flight request on cancel discards its response
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                response = poller.poll(&self.handle) => response,
            };

            let command = match response {
                Ok(document) => self.shared.dispatch(|m| m.poll_response(document)),
                Err(e) => self.shared.dispatch(|m| m.poll_failed(&e.to_string())),
            };

            if command == Command::Shutdown || cancel.is_cancelled() {
                log::debug!(
                    "Task {}: polling stopped after {} requests",
                    self.handle.task_id(),
                    poller.requests_issued()
                );
                return;
            }
        }
    }
}
