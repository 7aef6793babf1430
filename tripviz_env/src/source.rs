//! Dataset fetch abstraction.

use async_trait::async_trait;
use crate::error::EnvError;
use crate::types::DatasetKind;

/// Abstraction for fetching the raw bytes of a remote or local dataset.
///
/// # Implementations
///
/// - **Production**: `FileSource` reads local JSON files
/// - **Simulation**: in-memory payloads with injectable failures and latency
///
/// # Flow
///
/// ```text
/// Viewer                 loader task                 DatasetSource
///   |-- spawn(load) ------->|                              |
///   |                       |-- fetch(kind, location) ---->|
///   |                       |<------------- bytes ---------|
///   |<-- TripsLoaded(idx) --|  (parse + build off-loop)    |
/// ```
#[async_trait]
pub trait DatasetSource: Send + Sync + 'static {
    /// Fetches the dataset stored at `location`.
    ///
    /// # Arguments
    /// * `dataset` - Which dataset is being fetched (for logging and fault injection)
    /// * `location` - Opaque locator (path, URL, key) understood by the implementation
    ///
    /// # Returns
    /// * `Ok(bytes)` - The raw, still unparsed payload
    /// * `Err(EnvError)` - The resource could not be read
    async fn fetch(&self, dataset: DatasetKind, location: &str) -> Result<Vec<u8>, EnvError>;
}
