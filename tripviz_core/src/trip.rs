//! Trip and building records, as delivered by the dataset sources.

use crate::error::{MalformedReason, TripDataError};
use serde::{Deserialize, Serialize};
use tripviz_env::DatasetKind;

/// A `[longitude, latitude]` pair.
pub type LonLat = [f64; 2];

/// Stable identity of a trip: its zero-based position in the raw dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TripId(pub usize);

impl std::fmt::Display for TripId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One vehicle's recorded path.
///
/// `path[i]` was observed at `timestamps[i]`; the last element of each is the
/// final observed position and time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub path: Vec<LonLat>,
    pub timestamps: Vec<f64>,
    #[serde(default)]
    pub vendor: i64,
}

impl TripRecord {
    /// Returns `(final_timestamp, final_position)` after checking that both
    /// sequences are non-empty and of equal length.
    pub fn final_point(&self, trip: TripId) -> Result<(f64, LonLat), TripDataError> {
        let malformed = |reason| TripDataError::MalformedTripData { trip, reason };

        let (Some(position), Some(timestamp)) = (self.path.last(), self.timestamps.last()) else {
            return Err(malformed(if self.path.is_empty() {
                MalformedReason::EmptyPath
            } else {
                MalformedReason::EmptyTimestamps
            }));
        };
        if self.path.len() != self.timestamps.len() {
            return Err(malformed(MalformedReason::LengthMismatch {
                path: self.path.len(),
                timestamps: self.timestamps.len(),
            }));
        }
        Ok((*timestamp, *position))
    }
}

/// A static building footprint, extruded by `height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub polygon: Vec<LonLat>,
    pub height: f64,
}

/// A trips payload decoded element by element.
#[derive(Debug, Default)]
pub struct ParsedTrips {
    /// Elements that decoded as trip records, tagged with their position
    pub records: Vec<(TripId, TripRecord)>,

    /// One error per element that did not decode; its position stays reserved
    pub rejected: Vec<TripDataError>,
}

impl ParsedTrips {
    /// Number of elements in the raw array.
    pub fn len(&self) -> usize {
        self.records.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decoded records in dataset order, without their ids.
    pub fn into_records(self) -> Vec<TripRecord> {
        self.records.into_iter().map(|(_, trip)| trip).collect()
    }
}

/// Parses a trips payload (a JSON array of trip records).
///
/// Only a payload that is not a JSON array fails as a whole. An element that
/// does not decode as a [`TripRecord`] is rejected on its own and the ids of
/// the elements after it do not shift.
pub fn parse_trips(bytes: &[u8]) -> Result<ParsedTrips, TripDataError> {
    let elements: Vec<serde_json::Value> =
        serde_json::from_slice(bytes).map_err(|e| TripDataError::fetch(DatasetKind::Trips, e))?;

    let mut parsed = ParsedTrips {
        records: Vec::with_capacity(elements.len()),
        rejected: Vec::new(),
    };
    for (idx, element) in elements.into_iter().enumerate() {
        let trip = TripId(idx);
        match serde_json::from_value::<TripRecord>(element) {
            Ok(record) => parsed.records.push((trip, record)),
            Err(e) => parsed.rejected.push(TripDataError::MalformedTripData {
                trip,
                reason: MalformedReason::Shape(e.to_string()),
            }),
        }
    }
    Ok(parsed)
}

/// Parses a buildings payload (a JSON array of footprints).
pub fn parse_buildings(bytes: &[u8]) -> Result<Vec<Building>, TripDataError> {
    serde_json::from_slice(bytes).map_err(|e| TripDataError::fetch(DatasetKind::Buildings, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(path: Vec<LonLat>, timestamps: Vec<f64>) -> TripRecord {
        TripRecord {
            path,
            timestamps,
            vendor: 0,
        }
    }

    #[test]
    fn test_final_point_takes_last_elements() {
        let t = trip(vec![[0.0, 0.0], [1.0, 1.0]], vec![0.0, 100.0]);
        assert_eq!(t.final_point(TripId(0)).unwrap(), (100.0, [1.0, 1.0]));
    }

    #[test]
    fn test_final_point_rejects_empty_path() {
        let err = trip(vec![], vec![]).final_point(TripId(3)).unwrap_err();
        assert!(matches!(
            err,
            TripDataError::MalformedTripData {
                trip: TripId(3),
                reason: MalformedReason::EmptyPath
            }
        ));
    }

    #[test]
    fn test_final_point_rejects_empty_timestamps() {
        let err = trip(vec![[0.0, 0.0]], vec![]).final_point(TripId(0)).unwrap_err();
        assert!(matches!(
            err,
            TripDataError::MalformedTripData {
                reason: MalformedReason::EmptyTimestamps,
                ..
            }
        ));
    }

    #[test]
    fn test_final_point_rejects_length_mismatch() {
        let err = trip(vec![[0.0, 0.0], [1.0, 1.0]], vec![5.0])
            .final_point(TripId(1))
            .unwrap_err();
        assert!(matches!(
            err,
            TripDataError::MalformedTripData {
                reason: MalformedReason::LengthMismatch { path: 2, timestamps: 1 },
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "trip #1 is malformed: path has 2 points but timestamps has 1 entries"
        );
    }

    #[test]
    fn test_parse_trips() {
        let json = br#"[{"path":[[-74.0,40.7],[-74.01,40.71]],"timestamps":[10,20],"vendor":1}]"#;
        let trips = parse_trips(json).unwrap().into_records();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].vendor, 1);
        assert_eq!(trips[0].timestamps, vec![10.0, 20.0]);
    }

    #[test]
    fn test_parse_trips_invalid_json_is_fetch_error() {
        let err = parse_trips(b"{not json").unwrap_err();
        assert!(err.is_fetch_error());
        assert!(err.to_string().starts_with("failed to fetch trips dataset"));
    }

    #[test]
    fn test_parse_trips_rejects_bad_elements_in_place() {
        let json = br#"[
            {"path": [[0, 0], [1, 1]], "timestamps": [0, 100]},
            {"path": [[2, 2]]},
            {"path": [[3, 3]], "timestamps": "soon"},
            {"path": [[4, 4]], "timestamps": [50], "vendor": 1}
        ]"#;
        let parsed = parse_trips(json).unwrap();

        assert_eq!(parsed.len(), 4);
        let ids: Vec<TripId> = parsed.records.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![TripId(0), TripId(3)]);
        assert_eq!(parsed.records[0].1.vendor, 0);
        assert_eq!(parsed.rejected.len(), 2);
        assert_eq!(parsed.rejected[0].trip(), Some(TripId(1)));
        assert!(matches!(
            &parsed.rejected[1],
            TripDataError::MalformedTripData {
                trip: TripId(2),
                reason: MalformedReason::Shape(_)
            }
        ));
        assert!(parsed.rejected[0].to_string().contains("missing field `timestamps`"));
    }

    #[test]
    fn test_parse_trips_non_array_is_fetch_error() {
        let err = parse_trips(br#"{"path": []}"#).unwrap_err();
        assert!(err.is_fetch_error());
        assert_eq!(err.trip(), None);
    }

    #[test]
    fn test_parse_buildings() {
        let json = br#"[{"polygon":[[0,0],[1,0],[1,1]],"height":42.5}]"#;
        let buildings = parse_buildings(json).unwrap();
        assert_eq!(buildings[0].height, 42.5);
        assert_eq!(buildings[0].polygon.len(), 3);
    }
}
