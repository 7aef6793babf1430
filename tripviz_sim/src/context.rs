//! Simulation context implementing FrameContext for deterministic testing.

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tracing::debug;
use tripviz_env::FrameContext;

/// 2024-01-01 00:00:00 UTC. A whole number of 30 s cycles, so logical time
/// starts at 0 with the default clock.
pub const SIM_EPOCH_SECS: u64 = 1_704_067_200;

/// Simulation context backed by deterministic time and RNG.
///
/// This implements `FrameContext` using:
/// - A virtual clock that only moves through `next_frame()` or `advance_time()`
/// - A seeded ChaCha8 RNG for frame-interval jitter
/// - Sleeps that wait for the virtual clock to reach their deadline
pub struct SimContext {
    /// Master seed for this simulation
    seed: u64,

    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,

    /// Deterministic RNG for frame jitter
    rng: Arc<Mutex<ChaCha8Rng>>,

    /// Epoch offset (virtual time 0 maps to this wall-clock time)
    epoch: SystemTime,

    /// Nominal display refresh interval
    frame_interval: Duration,

    /// Upper bound of the extra delay added to each refresh
    frame_jitter: Duration,
}

impl SimContext {
    /// Creates a new SimContext with the given seed, refreshing at 60 Hz.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(Mutex::new(0)),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
            epoch: UNIX_EPOCH + Duration::from_secs(SIM_EPOCH_SECS),
            frame_interval: tripviz_env::DEFAULT_FRAME_INTERVAL,
            frame_jitter: Duration::ZERO,
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Sets the refresh rate.
    pub fn with_frame_rate(mut self, hz: u32) -> Self {
        self.frame_interval = Duration::from_secs_f64(1.0 / hz.max(1) as f64);
        self
    }

    /// Adds up to `jitter` of random delay to every refresh.
    pub fn with_frame_jitter(mut self, jitter: Duration) -> Self {
        self.frame_jitter = jitter;
        self
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap();
        *time += duration.as_nanos() as u64;
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.virtual_time_ns.lock().unwrap()
    }

    fn next_frame_delay(&self) -> Duration {
        let jitter_ns = self.frame_jitter.as_nanos() as u64;
        if jitter_ns == 0 {
            return self.frame_interval;
        }
        let extra = self.rng.lock().unwrap().gen_range(0..=jitter_ns);
        self.frame_interval + Duration::from_nanos(extra)
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
            rng: Arc::clone(&self.rng),
            epoch: self.epoch,
            frame_interval: self.frame_interval,
            frame_jitter: self.frame_jitter,
        }
    }
}

#[async_trait]
impl FrameContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    fn system_time(&self) -> SystemTime {
        self.epoch + self.now()
    }

    async fn sleep(&self, duration: Duration) {
        // Whoever drives the frames moves the clock; sleepers just wait for it
        let deadline = self.now() + duration;
        while self.now() < deadline {
            tokio::task::yield_now().await;
        }
    }

    async fn next_frame(&self) {
        self.advance_time(self.next_frame_delay());
        tokio::task::yield_now().await;
    }

    fn spawn<F>(&self, name: &str, future: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        debug!(task = name, t_ns = self.time_ns(), "spawning sim task");
        tokio::spawn(future)
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
