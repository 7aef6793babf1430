//! Interface to the external rendering collaborator.

use crate::layers::LayerDescriptor;
use crate::theme::Lighting;
use crate::view::ViewState;
use serde::{Deserialize, Serialize};
use tripviz_env::ViewerId;

/// Scene-wide settings that change rarely (start-up, refit after a load).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub viewer_id: ViewerId,
    pub view: ViewState,
    pub map_style: String,
    pub lighting: Lighting,
}

/// Everything the renderer needs for one display refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub viewer_id: ViewerId,

    /// Frames presented so far by this viewer, starting at 0
    pub number: u64,

    /// Wall-clock sample the frame was derived from
    pub wall_time_secs: f64,

    /// Logical animation time, in `[0, loop_length)`
    pub current_time: f64,

    /// Ordered bottom to top
    pub layers: Vec<LayerDescriptor>,
}

impl Frame {
    pub fn layer(&self, id: &str) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|l| l.id() == id)
    }

    /// Number of revealed point markers in this frame.
    pub fn revealed_count(&self) -> usize {
        self.layer("scatterplot").map_or(0, |l| l.data_len())
    }
}

/// The rendering engine. Owns all GPU/canvas work, camera control and base
/// map tiles; the viewer only hands it descriptors.
pub trait Renderer: Send + 'static {
    /// Called once at start-up and again whenever the scene changes.
    fn update_scene(&mut self, _scene: &Scene) {}

    /// Called once per tick with the freshly composed frame.
    fn present(&mut self, frame: Frame);
}
