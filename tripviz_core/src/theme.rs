//! Styling parameters passed through to the renderer.
//!
//! The core never interprets these values; it only routes them into the
//! right layer descriptor.

use crate::trip::LonLat;
use serde::{Deserialize, Serialize};

pub type Rgb = [u8; 3];
pub type Rgba = [u8; 4];

/// Ground rectangle drawn under everything so building shadows have a surface.
pub const LAND_COVER: [[LonLat; 4]; 1] = [[
    [-74.0, 40.7],
    [-74.02, 40.7],
    [-74.02, 40.72],
    [-74.0, 40.72],
]];

/// Phong material used for extruded buildings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub ambient: f64,
    pub diffuse: f64,
    pub shininess: f64,
    pub specular_color: Rgb,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: 0.1,
            diffuse: 0.6,
            shininess: 32.0,
            specular_color: [60, 64, 70],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: Rgb,
    pub intensity: f64,
    /// `[longitude, latitude, altitude]`
    pub position: [f64; 3],
}

/// Scene lighting effect handed to the renderer alongside the layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub point: PointLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: [255, 255, 255],
                intensity: 1.0,
            },
            point: PointLight {
                color: [255, 255, 255],
                intensity: 2.0,
                position: [-74.05, 40.7, 8000.0],
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub building_color: Rgb,
    /// Trail color for vendor 0
    pub trail_color_0: Rgb,
    /// Trail color for every other vendor
    pub trail_color_1: Rgb,
    pub material: Material,
    pub lighting: Lighting,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            building_color: [74, 80, 87],
            trail_color_0: [253, 128, 93],
            trail_color_1: [23, 184, 190],
            material: Material::default(),
            lighting: Lighting::default(),
        }
    }
}
