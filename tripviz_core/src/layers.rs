//! Layer composition - turns the current frame state into draw descriptors.
//!
//! The output is always the same four layers, bottom to top:
//!
//! | id            | kind               | data              |
//! |---------------|--------------------|-------------------|
//! | `ground`      | `polygon`          | land cover        |
//! | `trips`       | `trips`            | trip records      |
//! | `buildings`   | `extruded_polygon` | footprints        |
//! | `scatterplot` | `scatterplot`      | revealed points   |
//!
//! Layers whose dataset has not loaded yet are emitted with empty data.

use crate::theme::{Material, Rgb, Rgba, Theme, LAND_COVER};
use crate::trip::{Building, LonLat, TripRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The loaded datasets, shared with every frame without copying.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub trips: Arc<[TripRecord]>,
    pub buildings: Arc<[Building]>,
}

impl Default for Datasets {
    fn default() -> Self {
        Self {
            trips: Arc::from(Vec::new()),
            buildings: Arc::from(Vec::new()),
        }
    }
}

/// Flat ground polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundLayer {
    pub id: String,
    pub data: Vec<Vec<LonLat>>,
    pub stroked: bool,
    pub fill_color: Rgba,
}

/// Animated trip trails, drawn up to `current_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailsLayer {
    pub id: String,
    pub data: Arc<[TripRecord]>,
    pub trail_color_0: Rgb,
    pub trail_color_1: Rgb,
    pub opacity: f64,
    pub width_min_pixels: f64,
    pub rounded: bool,
    pub trail_length: f64,
    pub shadow_enabled: bool,
    pub current_time: f64,
}

impl TrailsLayer {
    /// Per-trip color accessor: vendor 0 gets `trail_color_0`, all others
    /// `trail_color_1`.
    pub fn color_for(&self, trip: &TripRecord) -> Rgb {
        if trip.vendor == 0 {
            self.trail_color_0
        } else {
            self.trail_color_1
        }
    }
}

/// Extruded building footprints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingsLayer {
    pub id: String,
    pub data: Arc<[Building]>,
    pub extruded: bool,
    pub wireframe: bool,
    pub opacity: f64,
    pub fill_color: Rgb,
    pub material: Material,
}

impl BuildingsLayer {
    pub fn elevation_for(&self, building: &Building) -> f64 {
        building.height
    }
}

/// Point markers at the final position of every revealed trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsLayer {
    pub id: String,
    pub data: Vec<LonLat>,
    pub color: Rgb,
    pub radius: f64,
    pub opacity: f64,
    pub pickable: bool,
    pub radius_min_pixels: f64,
    pub radius_max_pixels: f64,
}

/// A drawable layer. `kind` selects the renderer's drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerDescriptor {
    Polygon(GroundLayer),
    Trips(TrailsLayer),
    ExtrudedPolygon(BuildingsLayer),
    Scatterplot(PointsLayer),
}

impl LayerDescriptor {
    pub fn id(&self) -> &str {
        match self {
            LayerDescriptor::Polygon(l) => &l.id,
            LayerDescriptor::Trips(l) => &l.id,
            LayerDescriptor::ExtrudedPolygon(l) => &l.id,
            LayerDescriptor::Scatterplot(l) => &l.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LayerDescriptor::Polygon(_) => "polygon",
            LayerDescriptor::Trips(_) => "trips",
            LayerDescriptor::ExtrudedPolygon(_) => "extruded_polygon",
            LayerDescriptor::Scatterplot(_) => "scatterplot",
        }
    }

    /// Number of data objects in the layer.
    pub fn data_len(&self) -> usize {
        match self {
            LayerDescriptor::Polygon(l) => l.data.len(),
            LayerDescriptor::Trips(l) => l.data.len(),
            LayerDescriptor::ExtrudedPolygon(l) => l.data.len(),
            LayerDescriptor::Scatterplot(l) => l.data.len(),
        }
    }

    /// Logical time the layer is drawn at, for time-aware layers.
    pub fn current_time(&self) -> Option<f64> {
        match self {
            LayerDescriptor::Trips(l) => Some(l.current_time),
            _ => None,
        }
    }
}

/// Builds the ordered layer list for one frame. Stateless.
pub fn compose(
    current_time: f64,
    revealed_points: Vec<LonLat>,
    datasets: &Datasets,
    theme: &Theme,
) -> Vec<LayerDescriptor> {
    vec![
        LayerDescriptor::Polygon(GroundLayer {
            id: "ground".to_string(),
            data: LAND_COVER.iter().map(|ring| ring.to_vec()).collect(),
            stroked: false,
            fill_color: [0, 0, 0, 0],
        }),
        LayerDescriptor::Trips(TrailsLayer {
            id: "trips".to_string(),
            data: Arc::clone(&datasets.trips),
            trail_color_0: theme.trail_color_0,
            trail_color_1: theme.trail_color_1,
            opacity: 0.3,
            width_min_pixels: 5.0,
            rounded: true,
            trail_length: 5.0,
            shadow_enabled: false,
            current_time,
        }),
        LayerDescriptor::ExtrudedPolygon(BuildingsLayer {
            id: "buildings".to_string(),
            data: Arc::clone(&datasets.buildings),
            extruded: true,
            wireframe: false,
            opacity: 0.5,
            fill_color: theme.building_color,
            material: theme.material,
        }),
        LayerDescriptor::Scatterplot(PointsLayer {
            id: "scatterplot".to_string(),
            data: revealed_points,
            color: [255, 255, 255],
            radius: 25.0,
            opacity: 0.9,
            pickable: false,
            radius_min_pixels: 3.0,
            radius_max_pixels: 30.0,
        }),
    ]
}
