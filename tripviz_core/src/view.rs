//! Initial camera handed to the renderer.

use crate::trip::TripRecord;
use geo::{BoundingRect, MultiPoint, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            longitude: -74.0,
            latitude: 40.72,
            zoom: 13.0,
            pitch: 45.0,
            bearing: 0.0,
        }
    }
}

impl ViewState {
    /// Recenters on the bounding box of every trip path, keeping zoom,
    /// pitch and bearing. Unchanged when there are no points.
    pub fn fit_to_trips(&self, trips: &[TripRecord]) -> Self {
        let points: MultiPoint<f64> = trips
            .iter()
            .flat_map(|trip| trip.path.iter())
            .map(|[lon, lat]| Point::new(*lon, *lat))
            .collect();

        match points.bounding_rect() {
            Some(rect) => {
                let center = rect.center();
                Self {
                    longitude: center.x,
                    latitude: center.y,
                    ..*self
                }
            }
            None => *self,
        }
    }
}
