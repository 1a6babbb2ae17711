use std::sync::Arc;
use std::time::Duration;

use monitor_logging::monitor_debug;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::fetch::EventSink;
use crate::EngineEvent;

pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

pub fn clamp_interval(interval: Duration) -> Duration {
    interval.clamp(MIN_REFRESH_INTERVAL, MAX_REFRESH_INTERVAL)
}

struct Timer {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Periodic [`EngineEvent::RefreshTick`] source; at most one timer runs at a time.
pub struct AutoRefresh {
    sink: Arc<dyn EventSink>,
    runtime: Handle,
    timer: Option<Timer>,
}

impl AutoRefresh {
    pub fn new(sink: Arc<dyn EventSink>, runtime: Handle) -> Self {
        Self {
            sink,
            runtime,
            timer: None,
        }
    }

    /// (Re)starts the timer and returns the interval actually used.
    pub fn enable(&mut self, interval: Duration) -> Duration {
        self.disable();
        let period = clamp_interval(interval);
        let token = CancellationToken::new();
        let task = self
            .runtime
            .spawn(tick_loop(self.sink.clone(), period, token.clone()));
        monitor_debug!("auto-refresh every {}s", period.as_secs());
        self.timer = Some(Timer { token, task });
        period
    }

    pub fn disable(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.token.cancel();
            timer.task.abort();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.timer.is_some()
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.disable();
    }
}

async fn tick_loop(sink: Arc<dyn EventSink>, period: Duration, token: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => sink.emit(EngineEvent::RefreshTick),
        }
    }
}
