//! Trip windowing - which trips have reached their endpoint by now.
//!
//! On every dataset load the final `(timestamp, position)` of each trip is
//! precomputed into a [`RevealIndex`]. Every frame, the [`TripWindowFilter`]
//! rescans that index against the current logical time.
//!
//! The revealed set grows monotonically within one animation cycle and
//! falls back toward empty when the clock wraps; datasets are expected to be
//! pre-scaled to the loop window.

use crate::error::TripDataError;
use crate::trip::{LonLat, ParsedTrips, TripId, TripRecord};
use std::sync::Arc;
use tracing::warn;

/// Final observation of one trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealEntry {
    pub final_timestamp: f64,
    pub final_position: LonLat,
}

/// Immutable map from trip identity to its final observation.
///
/// Entries are kept in insertion order, which is also ascending `TripId`
/// order since ids are positions in the raw dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevealIndex {
    entries: Vec<(TripId, RevealEntry)>,
}

/// Outcome of building an index from a raw dataset.
#[derive(Debug)]
pub struct LoadReport {
    pub index: Arc<RevealIndex>,

    /// Records that made it into the index
    pub accepted: usize,

    /// One error per skipped record
    pub skipped: Vec<TripDataError>,
}

impl RevealIndex {
    /// Builds an index from scratch.
    ///
    /// Malformed records are skipped with a warning; the ids of the remaining
    /// records stay equal to their position in `trips`.
    pub fn build(trips: &[TripRecord]) -> LoadReport {
        Self::build_from(
            trips.iter().enumerate().map(|(idx, trip)| (TripId(idx), trip)),
            Vec::new(),
        )
    }

    /// Builds an index from a payload decoded by [`parse_trips`](crate::parse_trips)
    /// and hands back the decoded records in dataset order.
    ///
    /// Elements rejected while decoding count as skipped records.
    pub fn from_parsed(parsed: ParsedTrips) -> (LoadReport, Vec<TripRecord>) {
        let ParsedTrips { records, rejected } = parsed;
        for err in &rejected {
            warn!("skipping trip record: {}", err);
        }
        let mut report = Self::build_from(records.iter().map(|(id, trip)| (*id, trip)), rejected);
        report.skipped.sort_by_key(TripDataError::trip);
        (report, records.into_iter().map(|(_, trip)| trip).collect())
    }

    fn build_from<'a>(
        trips: impl Iterator<Item = (TripId, &'a TripRecord)>,
        mut skipped: Vec<TripDataError>,
    ) -> LoadReport {
        let mut entries = Vec::new();

        for (id, trip) in trips {
            match trip.final_point(id) {
                Ok((final_timestamp, final_position)) => entries.push((
                    id,
                    RevealEntry {
                        final_timestamp,
                        final_position,
                    },
                )),
                Err(err) => {
                    warn!("skipping trip record: {}", err);
                    skipped.push(err);
                }
            }
        }

        LoadReport {
            accepted: entries.len(),
            index: Arc::new(Self { entries }),
            skipped,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: TripId) -> Option<&RevealEntry> {
        self.entries
            .binary_search_by_key(&id, |(k, _)| *k)
            .ok()
            .map(|pos| &self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TripId, &RevealEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    /// Final positions of every trip whose final timestamp is `<= current_time`,
    /// in insertion order.
    pub fn revealed_points(&self, current_time: f64) -> Vec<LonLat> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.final_timestamp <= current_time)
            .map(|(_, entry)| entry.final_position)
            .collect()
    }
}

/// Holds the currently installed index and filters it per frame.
#[derive(Debug, Clone, Default)]
pub struct TripWindowFilter {
    index: Option<Arc<RevealIndex>>,
}

impl TripWindowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the index from `raw_trips` and installs it, discarding the
    /// previous one.
    pub fn on_dataset_loaded(&mut self, raw_trips: &[TripRecord]) -> LoadReport {
        let report = RevealIndex::build(raw_trips);
        self.install(Arc::clone(&report.index));
        report
    }

    /// Replaces the index in one step. Readers see either the old or the new
    /// index, never a partial one.
    pub fn install(&mut self, index: Arc<RevealIndex>) {
        self.index = Some(index);
    }

    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&Arc<RevealIndex>> {
        self.index.as_ref()
    }

    /// Revealed points at `current_time`; empty until a dataset has loaded.
    pub fn revealed_points(&self, current_time: f64) -> Vec<LonLat> {
        match &self.index {
            Some(index) => index.revealed_points(current_time),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedReason;
    use crate::trip::parse_trips;
    use proptest::prelude::*;

    fn trip(path: Vec<LonLat>, timestamps: Vec<f64>) -> TripRecord {
        TripRecord {
            path,
            timestamps,
            vendor: 0,
        }
    }

    #[test]
    fn test_single_trip_example() {
        let mut filter = TripWindowFilter::new();
        let report = filter.on_dataset_loaded(&[trip(vec![[0.0, 0.0], [1.0, 1.0]], vec![0.0, 100.0])]);

        assert_eq!(report.accepted, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(
            report.index.get(TripId(0)),
            Some(&RevealEntry {
                final_timestamp: 100.0,
                final_position: [1.0, 1.0],
            })
        );
        assert!(filter.revealed_points(50.0).is_empty());
        assert_eq!(filter.revealed_points(100.0), vec![[1.0, 1.0]]);
    }

    #[test]
    fn test_half_loop_example() {
        let mut filter = TripWindowFilter::new();
        filter.on_dataset_loaded(&[
            trip(vec![[1.0, 1.0]], vec![850.0]),
            trip(vec![[2.0, 2.0]], vec![1200.0]),
        ]);
        assert_eq!(filter.revealed_points(900.0), vec![[1.0, 1.0]]);
    }

    #[test]
    fn test_not_loaded_is_empty() {
        let filter = TripWindowFilter::new();
        assert!(!filter.is_loaded());
        assert!(filter.revealed_points(1e9).is_empty());
    }

    #[test]
    fn test_empty_dataset() {
        let mut filter = TripWindowFilter::new();
        let report = filter.on_dataset_loaded(&[]);
        assert_eq!(report.accepted, 0);
        assert!(filter.is_loaded());
        assert!(filter.revealed_points(0.0).is_empty());
        assert!(filter.revealed_points(1799.0).is_empty());
    }

    #[test]
    fn test_output_keeps_insertion_order() {
        let mut filter = TripWindowFilter::new();
        filter.on_dataset_loaded(&[
            trip(vec![[3.0, 3.0]], vec![300.0]),
            trip(vec![[1.0, 1.0]], vec![100.0]),
            trip(vec![[2.0, 2.0]], vec![100.0]),
        ]);
        assert_eq!(
            filter.revealed_points(300.0),
            vec![[3.0, 3.0], [1.0, 1.0], [2.0, 2.0]]
        );
    }

    #[test]
    fn test_malformed_records_are_skipped_without_shifting_ids() {
        let report = RevealIndex::build(&[
            trip(vec![[0.0, 0.0]], vec![10.0]),
            trip(vec![], vec![]),
            trip(vec![[1.0, 1.0], [2.0, 2.0]], vec![5.0]),
            trip(vec![[3.0, 3.0]], vec![30.0]),
        ]);

        assert_eq!(report.accepted, 2);
        assert_eq!(report.skipped.len(), 2);
        assert!(matches!(
            report.skipped[1],
            TripDataError::MalformedTripData {
                trip: TripId(2),
                reason: MalformedReason::LengthMismatch { .. }
            }
        ));
        let ids: Vec<TripId> = report.index.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![TripId(0), TripId(3)]);
        assert!(report.index.get(TripId(1)).is_none());
        assert_eq!(report.index.get(TripId(3)).unwrap().final_timestamp, 30.0);
    }

    #[test]
    fn test_undecodable_record_is_skipped_in_place() {
        let json = br#"[
            {"path": [[0, 0], [1, 1]], "timestamps": [0, 100]},
            {"path": [[2, 2]]},
            {"path": [[3, 3]], "timestamps": [50]}
        ]"#;
        let (report, trips) = RevealIndex::from_parsed(parse_trips(json).unwrap());

        assert_eq!(trips.len(), 2);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(
            &report.skipped[0],
            TripDataError::MalformedTripData {
                trip: TripId(1),
                reason: MalformedReason::Shape(_)
            }
        ));
        assert_eq!(report.index.get(TripId(2)).unwrap().final_position, [3.0, 3.0]);

        let mut filter = TripWindowFilter::new();
        filter.install(report.index);
        assert_eq!(filter.revealed_points(1000.0), vec![[1.0, 1.0], [3.0, 3.0]]);
    }

    #[test]
    fn test_skipped_records_are_reported_in_id_order() {
        let json = br#"[
            {"path": [], "timestamps": []},
            {"path": null, "timestamps": [1]},
            {"path": [[1, 1], [2, 2]], "timestamps": [1]},
            [7, 7]
        ]"#;
        let (report, _) = RevealIndex::from_parsed(parse_trips(json).unwrap());

        let ids: Vec<Option<TripId>> = report.skipped.iter().map(TripDataError::trip).collect();
        assert_eq!(ids, vec![Some(TripId(0)), Some(TripId(1)), Some(TripId(2)), Some(TripId(3))]);
        assert!(report.index.is_empty());
    }

    #[test]
    fn test_installed_index_is_the_built_one() {
        let mut filter = TripWindowFilter::new();
        let report = filter.on_dataset_loaded(&[trip(vec![[0.0, 0.0]], vec![1.0])]);
        assert!(Arc::ptr_eq(filter.index().unwrap(), &report.index));
    }

    #[test]
    fn test_reload_replaces_wholesale() {
        let mut filter = TripWindowFilter::new();
        filter.on_dataset_loaded(&[
            trip(vec![[0.0, 0.0]], vec![1.0]),
            trip(vec![[1.0, 1.0]], vec![2.0]),
        ]);
        filter.on_dataset_loaded(&[trip(vec![[9.0, 9.0]], vec![5.0])]);

        assert_eq!(filter.index().unwrap().len(), 1);
        assert_eq!(filter.revealed_points(10.0), vec![[9.0, 9.0]]);
    }

    fn arb_trips() -> impl Strategy<Value = Vec<TripRecord>> {
        prop::collection::vec(
            prop::collection::vec((-180.0f64..180.0, -90.0f64..90.0, 0.0f64..1800.0), 1..6)
                .prop_map(|samples| TripRecord {
                    path: samples.iter().map(|(lon, lat, _)| [*lon, *lat]).collect(),
                    timestamps: samples.iter().map(|(_, _, t)| *t).collect(),
                    vendor: 0,
                }),
            0..40,
        )
    }

    proptest! {
        #[test]
        fn prop_load_is_idempotent(trips in arb_trips()) {
            let mut a = TripWindowFilter::new();
            let mut b = TripWindowFilter::new();
            a.on_dataset_loaded(&trips);
            b.on_dataset_loaded(&trips);
            b.on_dataset_loaded(&trips);
            prop_assert_eq!(a.index().unwrap().as_ref(), b.index().unwrap().as_ref());
        }

        #[test]
        fn prop_revealed_is_monotonic(trips in arb_trips(), t1 in 0.0f64..1800.0, t2 in 0.0f64..1800.0) {
            let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            let index = RevealIndex::build(&trips).index;

            let early: Vec<TripId> = index.iter()
                .filter(|(_, e)| e.final_timestamp <= lo)
                .map(|(id, _)| id)
                .collect();
            let late: Vec<TripId> = index.iter()
                .filter(|(_, e)| e.final_timestamp <= hi)
                .map(|(id, _)| id)
                .collect();
            prop_assert!(early.iter().all(|id| late.contains(id)));
            prop_assert!(index.revealed_points(lo).len() <= index.revealed_points(hi).len());
        }

        #[test]
        fn prop_boundary_is_inclusive(trips in arb_trips()) {
            let index = RevealIndex::build(&trips).index;
            for (_, entry) in index.iter() {
                let revealed = index.revealed_points(entry.final_timestamp);
                prop_assert!(revealed.contains(&entry.final_position));
            }
        }
    }
}
