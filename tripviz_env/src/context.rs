//! Core environment context trait for the TripViz viewer.

use async_trait::async_trait;
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

/// The central interface for Environment Interaction.
///
/// This trait abstracts the "real world" so that the viewer's frame loop
/// can run in both production (tokio) and simulation (virtual clock).
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time` and the system clock
/// - **Simulation**: `SimContext` - virtual clock with seeded frame jitter
///
/// # Determinism
///
/// The animation clock is a pure function of `wall_clock_secs()`, so
/// controlling that one value makes every frame reproducible.
#[async_trait]
pub trait FrameContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    ///
    /// Used for measuring load latency and frame pacing statistics.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time.
    ///
    /// In simulation, this is derived from virtual clock + epoch offset.
    fn system_time(&self) -> SystemTime;

    /// Wall-clock time as fractional seconds since the Unix epoch.
    ///
    /// This is the implicit input of the animation clock.
    fn wall_clock_secs(&self) -> f64 {
        self.system_time()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Suspends execution for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Waits for the next display refresh.
    ///
    /// In production: sleeps one frame interval
    /// In simulation: advances virtual time by one (jittered) frame interval
    async fn next_frame(&self);

    /// Spawns a background task and returns its handle.
    ///
    /// The handle lets the owner await or abort the task on teardown.
    fn spawn<F>(&self, name: &str, future: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    /// In simulation, returns the master seed.
    fn seed(&self) -> u64;
}
