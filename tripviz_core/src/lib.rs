//! TripViz Core - Animated Trip Visualization
//!
//! This library turns a wall clock and two static datasets into a stream of
//! layer descriptors for an external renderer:
//! 1. **Animation clock**: wall time folded into a looping logical time
//! 2. **Trip windowing**: final trip positions revealed once logical time passes them
//! 3. **Layer composition**: ground, trails, buildings and points, in fixed order
//!
//! The [`Viewer`] ties these together behind a cancellable frame loop.

pub mod clock;
pub mod config;
pub mod error;
pub mod layers;
pub mod render;
pub mod theme;
pub mod trip;
pub mod view;
pub mod viewer;
pub mod window;

// Re-export key types for convenience
pub use clock::{AnimationClock, ClockConfig};
pub use config::{DatasetLocations, ViewerConfig};
pub use error::{ConfigError, FetchFailure, MalformedReason, TripDataError};
pub use layers::{compose, Datasets, LayerDescriptor};
pub use render::{Frame, Renderer, Scene};
pub use theme::Theme;
pub use trip::{parse_buildings, parse_trips, Building, LonLat, ParsedTrips, TripId, TripRecord};
pub use view::ViewState;
pub use viewer::{Viewer, ViewerEvent, ViewerHandle, ViewerSummary};
pub use window::{LoadReport, RevealEntry, RevealIndex, TripWindowFilter};
