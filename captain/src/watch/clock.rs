//! Clocks driving the poll loop

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

/// Monotonic time source with the ability to wait
#[async_trait]
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock was created
    fn elapsed(&self) -> Duration;

    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer
#[derive(Debug, Clone)]
pub struct TokioClock {
    started: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            started: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock: sleeping advances time instantly
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward without sleeping
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += duration;
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
