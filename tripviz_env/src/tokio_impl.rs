//! Production implementations backed by Tokio and the local filesystem.

use crate::{DatasetKind, DatasetSource, EnvError, FrameContext};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::task::JoinHandle;
use tracing::debug;

/// Refresh interval of a 60 Hz display.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Production context backed by Tokio and the system clock.
///
/// `next_frame()` sleeps one frame interval. Sleep overshoot does not
/// accumulate into the animation because logical time is always re-derived
/// from the wall clock.
pub struct TokioContext {
    /// Start time for monotonic duration calculations
    start: Instant,

    /// Time between two display refreshes
    frame_interval: Duration,
}

impl TokioContext {
    /// Creates a new TokioContext pacing frames at 60 Hz.
    pub fn new() -> Self {
        Self::with_frame_interval(DEFAULT_FRAME_INTERVAL)
    }

    /// Creates a context with a custom refresh interval.
    pub fn with_frame_interval(frame_interval: Duration) -> Self {
        Self {
            start: Instant::now(),
            frame_interval,
        }
    }

    /// Creates an Arc-wrapped context for sharing across tasks.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns the refresh interval.
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }
}

impl Default for TokioContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameContext for TokioContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn next_frame(&self) {
        tokio::time::sleep(self.frame_interval).await;
    }

    fn spawn<F>(&self, name: &str, future: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        debug!(task = name, "spawning task");
        tokio::spawn(future)
    }

    fn seed(&self) -> u64 {
        // Production is not seeded
        0
    }
}

/// Dataset source reading JSON files from the local filesystem.
///
/// Locations are file paths. Remote URLs are not fetched here; a host that
/// needs HTTP plugs in its own `DatasetSource`.
#[derive(Debug, Clone, Default)]
pub struct FileSource;

impl FileSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    async fn fetch(&self, dataset: DatasetKind, location: &str) -> Result<Vec<u8>, EnvError> {
        debug!(%dataset, location, "reading dataset file");
        if location.contains("://") {
            return Err(EnvError::unavailable(format!(
                "{location} is a remote URL; FileSource only reads local paths"
            )));
        }
        Ok(tokio::fs::read(location).await?)
    }
}
