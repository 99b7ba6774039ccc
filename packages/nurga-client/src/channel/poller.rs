use super::transport::StatusSource;
use super::types::TaskHandle;
use crate::api::ApiClient;
use crate::error::{ChannelError, ChannelResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Polling fallback: one status request per interval, first one an interval after start
pub struct StatusPoller {
    source: Arc<dyn StatusSource>,
    interval: Interval,
    period: Duration,
    requests_issued: u64,
}

impl StatusPoller {
    pub fn start(source: Arc<dyn StatusSource>, period: Duration) -> Self {
        let period = period.max(MIN_POLL_INTERVAL);
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!("Starting status polling (interval: {}ms)", period.as_millis());

        Self {
            source,
            interval,
            period,
            requests_issued: 0,
        }
    }

    /// Wait for the next tick, then issue one status request
    pub async fn poll(&mut self, handle: &TaskHandle) -> ChannelResult<Value> {
        self.interval.tick().await;
        self.requests_issued += 1;
        log::debug!(
            "Polling status for task {} (request #{})",
            handle.task_id(),
            self.requests_issued
        );
        self.source.fetch_status(handle).await
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }
}

/// StatusSource backed by `GET /status/{task_id}`
pub struct HttpStatusSource {
    client: Arc<ApiClient>,
}

impl HttpStatusSource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch_status(&self, handle: &TaskHandle) -> ChannelResult<Value> {
        self.client
            .task_status(handle)
            .await
            .map_err(ChannelError::from)
    }
}
