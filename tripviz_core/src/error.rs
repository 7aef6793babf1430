//! Error types for dataset loading and configuration.
//!
//! None of these are fatal to the viewer: a failed load leaves the previous
//! index in place and the frame loop keeps running.

use crate::trip::TripId;
use thiserror::Error;
use tripviz_env::{DatasetKind, EnvError};

/// Why a dataset could not be turned into records.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// The source could not deliver the bytes
    #[error(transparent)]
    Source(#[from] EnvError),

    /// The bytes were not the expected JSON array
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which part of the path/timestamps invariant a trip record violates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The element is not a trip record at all (missing or mistyped field)
    Shape(String),
    EmptyPath,
    EmptyTimestamps,
    LengthMismatch { path: usize, timestamps: usize },
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::Shape(detail) => write!(f, "not a trip record: {}", detail),
            MalformedReason::EmptyPath => write!(f, "path is empty"),
            MalformedReason::EmptyTimestamps => write!(f, "timestamps are empty"),
            MalformedReason::LengthMismatch { path, timestamps } => write!(
                f,
                "path has {} points but timestamps has {} entries",
                path, timestamps
            ),
        }
    }
}

/// Errors raised while loading trip and building datasets.
#[derive(Debug, Error)]
pub enum TripDataError {
    /// Network, file, or parse failure for a whole dataset.
    #[error("failed to fetch {dataset} dataset: {source}")]
    DatasetFetch {
        dataset: DatasetKind,
        #[source]
        source: FetchFailure,
    },

    /// A single trip record violates the path/timestamps invariant.
    #[error("trip {trip} is malformed: {reason}")]
    MalformedTripData { trip: TripId, reason: MalformedReason },
}

impl TripDataError {
    pub fn fetch(dataset: DatasetKind, source: impl Into<FetchFailure>) -> Self {
        Self::DatasetFetch {
            dataset,
            source: source.into(),
        }
    }

    /// True for failures that affect a whole dataset rather than one record.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Self::DatasetFetch { .. })
    }

    /// The offending record, for per-record errors.
    pub fn trip(&self) -> Option<TripId> {
        match self {
            Self::MalformedTripData { trip, .. } => Some(*trip),
            Self::DatasetFetch { .. } => None,
        }
    }
}

/// Errors raised while reading or validating viewer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// loop_length and animation_speed must be finite and positive
    #[error("invalid clock settings: loop_length={loop_length}, animation_speed={animation_speed}")]
    InvalidClock {
        loop_length: f64,
        animation_speed: f64,
    },
}
