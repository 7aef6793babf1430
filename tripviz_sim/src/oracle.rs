//! Ground truth oracle for simulation.
//!
//! The Oracle generates the synthetic datasets a scenario serves and keeps
//! its own record of when each trip ends, so scenarios can check what the
//! viewer reveals against an independent answer:
//! - Trips random-walk inside the ground rectangle
//! - Timestamps stay inside one animation loop
//! - Selected records can be corrupted on purpose

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tripviz_core::theme::LAND_COVER;
use tripviz_core::{Building, LonLat, TripId, TripRecord};

/// Ground truth for one generated trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripTruth {
    pub id: TripId,

    /// `None` for records that were corrupted and must be skipped
    pub final_timestamp: Option<f64>,

    pub final_position: LonLat,
}

/// Seeded generator of trips and buildings.
pub struct Oracle {
    rng: ChaCha8Rng,

    /// Timestamps are drawn from `[0, loop_length)`
    loop_length: f64,

    truth: Vec<TripTruth>,
}

impl Oracle {
    pub fn new(seed: u64, loop_length: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            loop_length,
            truth: Vec::new(),
        }
    }

    /// Generates `count` well-formed trips, replacing any previous truth.
    pub fn generate_trips(&mut self, count: usize) -> Vec<TripRecord> {
        self.truth.clear();
        (0..count)
            .map(|i| {
                let trip = self.random_trip();
                let (final_timestamp, final_position) = match (trip.timestamps.last(), trip.path.last()) {
                    (Some(ts), Some(pos)) => (Some(*ts), *pos),
                    _ => (None, [0.0, 0.0]),
                };
                self.truth.push(TripTruth {
                    id: TripId(i),
                    final_timestamp,
                    final_position,
                });
                trip
            })
            .collect()
    }

    /// Corrupts `count` distinct records in place and marks them as
    /// unrevealable. Returns the corrupted ids in ascending order.
    pub fn corrupt(&mut self, trips: &mut [TripRecord], count: usize) -> Vec<TripId> {
        let count = count.min(trips.len());
        let mut ids: Vec<usize> = Vec::with_capacity(count);
        while ids.len() < count {
            let candidate = self.rng.gen_range(0..trips.len());
            if !ids.contains(&candidate) {
                ids.push(candidate);
            }
        }
        ids.sort_unstable();

        for &i in &ids {
            let trip = &mut trips[i];
            match self.rng.gen_range(0..3) {
                0 => trip.path.clear(),
                1 => trip.timestamps.clear(),
                _ => {
                    trip.timestamps.pop();
                }
            }
            if let Some(truth) = self.truth.get_mut(i) {
                truth.final_timestamp = None;
            }
        }
        ids.into_iter().map(TripId).collect()
    }

    /// Generates `count` square building footprints.
    pub fn generate_buildings(&mut self, count: usize) -> Vec<Building> {
        (0..count)
            .map(|_| {
                let [lon, lat] = self.random_point();
                let half = self.rng.gen_range(0.00005..0.0003);
                Building {
                    polygon: vec![
                        [lon - half, lat - half],
                        [lon + half, lat - half],
                        [lon + half, lat + half],
                        [lon - half, lat + half],
                    ],
                    height: self.rng.gen_range(5.0..200.0),
                }
            })
            .collect()
    }

    pub fn truth(&self) -> &[TripTruth] {
        &self.truth
    }

    /// Number of trips that should be revealed at `current_time`.
    pub fn expected_revealed(&self, current_time: f64) -> usize {
        self.truth
            .iter()
            .filter(|t| matches!(t.final_timestamp, Some(ts) if ts <= current_time))
            .count()
    }

    /// Number of records the viewer should index.
    pub fn well_formed(&self) -> usize {
        self.truth.iter().filter(|t| t.final_timestamp.is_some()).count()
    }

    fn random_trip(&mut self) -> TripRecord {
        let points = self.rng.gen_range(2..=12);
        let mut position = self.random_point();
        let mut time = self.rng.gen_range(0.0..self.loop_length * 0.5);
        let step = (self.loop_length - time) / (points as f64 + 1.0);

        let mut path = Vec::with_capacity(points);
        let mut timestamps = Vec::with_capacity(points);
        for _ in 0..points {
            path.push(position);
            timestamps.push(time);
            let jittered = [
                position[0] + self.rng.gen_range(-0.001..0.001),
                position[1] + self.rng.gen_range(-0.001..0.001),
            ];
            position = self.clamp_to_ground(jittered);
            time += self.rng.gen_range(step * 0.25..step);
        }

        TripRecord {
            path,
            timestamps,
            vendor: self.rng.gen_range(0..2),
        }
    }

    fn random_point(&mut self) -> LonLat {
        let (min, max) = ground_bounds();
        [
            self.rng.gen_range(min[0]..max[0]),
            self.rng.gen_range(min[1]..max[1]),
        ]
    }

    fn clamp_to_ground(&self, point: LonLat) -> LonLat {
        let (min, max) = ground_bounds();
        [point[0].clamp(min[0], max[0]), point[1].clamp(min[1], max[1])]
    }
}

fn ground_bounds() -> (LonLat, LonLat) {
    let ring = &LAND_COVER[0];
    let mut min = ring[0];
    let mut max = ring[0];
    for point in ring.iter() {
        min = [min[0].min(point[0]), min[1].min(point[1])];
        max = [max[0].max(point[0]), max[1].max(point[1])];
    }
    (min, max)
}
