//! In-memory dataset source with fault injection.

use crate::context::SimContext;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;
use tripviz_env::{DatasetKind, DatasetSource, EnvError, FrameContext};

/// Serves dataset payloads from memory.
///
/// Clones share state, so a scenario can keep a clone to inject faults while
/// the viewer owns the other.
#[derive(Clone)]
pub struct SimSource {
    context: Arc<SimContext>,

    /// Raw payload per dataset
    payloads: Arc<Mutex<HashMap<DatasetKind, Vec<u8>>>>,

    /// Remaining injected failures per dataset
    failures: Arc<Mutex<HashMap<DatasetKind, u32>>>,

    /// Virtual time each fetch takes
    latency: Arc<Mutex<Duration>>,

    /// Fetches attempted per dataset
    fetches: Arc<Mutex<HashMap<DatasetKind, u64>>>,
}

impl SimSource {
    pub fn new(context: Arc<SimContext>) -> Self {
        Self {
            context,
            payloads: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            latency: Arc::new(Mutex::new(Duration::ZERO)),
            fetches: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Replaces the raw payload served for `dataset`.
    pub fn set_payload(&self, dataset: DatasetKind, bytes: Vec<u8>) {
        self.payloads.lock().unwrap().insert(dataset, bytes);
    }

    /// Serializes `value` as the payload for `dataset`.
    pub fn set_json<T: Serialize + ?Sized>(
        &self,
        dataset: DatasetKind,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        self.set_payload(dataset, serde_json::to_vec(value)?);
        Ok(())
    }

    /// Makes the next `count` fetches of `dataset` fail.
    pub fn fail_next(&self, dataset: DatasetKind, count: u32) {
        self.failures.lock().unwrap().insert(dataset, count);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn fetch_count(&self, dataset: DatasetKind) -> u64 {
        self.fetches.lock().unwrap().get(&dataset).copied().unwrap_or(0)
    }

    fn take_failure(&self, dataset: DatasetKind) -> bool {
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(&dataset) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl DatasetSource for SimSource {
    async fn fetch(&self, dataset: DatasetKind, location: &str) -> Result<Vec<u8>, EnvError> {
        *self.fetches.lock().unwrap().entry(dataset).or_insert(0) += 1;

        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            self.context.sleep(latency).await;
        }

        if self.take_failure(dataset) {
            debug!(%dataset, location, "injected fetch failure");
            return Err(EnvError::unavailable(format!("injected outage for {}", dataset)));
        }

        self.payloads
            .lock()
            .unwrap()
            .get(&dataset)
            .cloned()
            .ok_or_else(|| EnvError::not_found(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_payload() {
        let source = SimSource::new(SimContext::shared(1));
        source.set_payload(DatasetKind::Trips, b"[]".to_vec());

        let bytes = source.fetch(DatasetKind::Trips, "trips").await.unwrap();
        assert_eq!(bytes, b"[]");
        assert_eq!(source.fetch_count(DatasetKind::Trips), 1);
        assert_eq!(source.fetch_count(DatasetKind::Buildings), 0);
    }

    #[tokio::test]
    async fn test_missing_payload_is_not_found() {
        let source = SimSource::new(SimContext::shared(1));
        let err = source.fetch(DatasetKind::Buildings, "b.json").await.unwrap_err();
        assert_eq!(err, EnvError::NotFound("b.json".to_string()));
    }

    #[tokio::test]
    async fn test_injected_failures_run_out() {
        let source = SimSource::new(SimContext::shared(1));
        source.set_json(DatasetKind::Trips, &Vec::<u8>::new()).unwrap();
        source.fail_next(DatasetKind::Trips, 2);

        assert!(matches!(
            source.fetch(DatasetKind::Trips, "t").await,
            Err(EnvError::Unavailable(_))
        ));
        assert!(source.fetch(DatasetKind::Trips, "t").await.is_err());
        assert!(source.fetch(DatasetKind::Trips, "t").await.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_faults() {
        let source = SimSource::new(SimContext::shared(1));
        let controller = source.clone();
        source.set_payload(DatasetKind::Trips, b"[]".to_vec());
        controller.fail_next(DatasetKind::Trips, 1);

        assert!(source.fetch(DatasetKind::Trips, "t").await.is_err());
        assert_eq!(controller.fetch_count(DatasetKind::Trips), 1);
    }

    #[tokio::test]
    async fn test_latency_waits_on_virtual_clock() {
        let ctx = SimContext::shared(1);
        let source = SimSource::new(Arc::clone(&ctx));
        source.set_payload(DatasetKind::Trips, b"[]".to_vec());
        source.set_latency(Duration::from_millis(100));

        let fetcher = source.clone();
        let task = tokio::spawn(async move { fetcher.fetch(DatasetKind::Trips, "t").await });
        while !task.is_finished() {
            ctx.next_frame().await;
        }

        assert!(task.await.unwrap().is_ok());
        assert!(ctx.now() >= Duration::from_millis(100));
    }
}
