//! Common types for the TripViz environment abstraction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a running viewer instance.
///
/// Uses UUID v4 for uniqueness across page reloads without coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewerId(pub Uuid);

impl ViewerId {
    /// Creates a new random ViewerId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a deterministic ViewerId from a seed (for simulation).
    pub fn from_seed(seed: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&seed.to_le_bytes());
        bytes[8..16].copy_from_slice(&seed.wrapping_mul(0x517cc1b727220a95).to_le_bytes());
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for ViewerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ViewerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show first 8 chars for readability
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// The two datasets the viewer fetches at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Vehicle trips: `[{ path, timestamps, vendor }]`
    Trips,

    /// Static building footprints: `[{ polygon, height }]`
    Buildings,
}

impl DatasetKind {
    /// Returns the dataset name.
    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::Trips => "trips",
            DatasetKind::Buildings => "buildings",
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_id_from_seed_is_deterministic() {
        assert_eq!(ViewerId::from_seed(7), ViewerId::from_seed(7));
        assert_ne!(ViewerId::from_seed(7), ViewerId::from_seed(8));
    }

    #[test]
    fn test_dataset_kind_display() {
        assert_eq!(DatasetKind::Trips.to_string(), "trips");
        assert_eq!(DatasetKind::Buildings.to_string(), "buildings");
    }
}
