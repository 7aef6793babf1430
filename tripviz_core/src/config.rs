//! Viewer configuration.
//!
//! Every struct is `#[serde(default)]`, so a config file may list any subset
//! of keys:
//!
//! ```json
//! { "clock": { "animation_speed": 120 }, "fit_view_to_trips": true }
//! ```

use crate::clock::ClockConfig;
use crate::error::ConfigError;
use crate::theme::Theme;
use crate::view::ViewState;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tripviz_env::DatasetKind;

/// Where the two datasets live. Interpreted by the `DatasetSource`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetLocations {
    pub trips: String,
    pub buildings: String,
}

impl Default for DatasetLocations {
    fn default() -> Self {
        Self {
            trips: "https://raw.githubusercontent.com/visgl/deck.gl-data/master/examples/trips/trips-v7.json".to_string(),
            buildings: "https://raw.githubusercontent.com/visgl/deck.gl-data/master/examples/trips/buildings.json".to_string(),
        }
    }
}

impl DatasetLocations {
    pub fn get(&self, dataset: DatasetKind) -> &str {
        match dataset {
            DatasetKind::Trips => &self.trips,
            DatasetKind::Buildings => &self.buildings,
        }
    }
}

/// Configuration for a viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Loop length and animation speed
    pub clock: ClockConfig,

    /// Colors, material and lighting
    pub theme: Theme,

    /// Initial camera
    pub view: ViewState,

    pub datasets: DatasetLocations,

    /// Base-map style, passed through to the renderer untouched
    pub map_style: String,

    /// Recenter the initial camera on the loaded trips (default: false)
    pub fit_view_to_trips: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            clock: ClockConfig::default(),
            theme: Theme::default(),
            view: ViewState::default(),
            datasets: DatasetLocations::default(),
            map_style: "mapbox://styles/spear5306/ckzcz5m8w002814o2coz02sjc".to_string(),
            fit_view_to_trips: false,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.clock.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
