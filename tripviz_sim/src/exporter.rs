//! Frame recording and JSON export.
//!
//! [`RecordingRenderer`] stands in for the real rendering engine and keeps
//! every frame it is handed. [`SimExport`] is the JSON document written by
//! `tripviz-sim --export`.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tripviz_core::{Frame, Renderer, Scene};

/// Renderer that records frames and scenes. Clones share the recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    frames: Arc<Mutex<Vec<Frame>>>,
    scenes: Arc<Mutex<Vec<Scene>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.frames.lock().unwrap().last().cloned()
    }

    /// Copies out every frame recorded so far.
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn scenes(&self) -> Vec<Scene> {
        self.scenes.lock().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn update_scene(&mut self, scene: &Scene) {
        self.scenes.lock().unwrap().push(scene.clone());
    }

    fn present(&mut self, frame: Frame) {
        self.frames.lock().unwrap().push(frame);
    }
}

/// Condensed view of one presented frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub number: u64,

    /// Virtual time since the run started
    pub time_sec: f64,

    /// Logical animation time
    pub current_time: f64,

    /// Revealed point markers
    pub revealed: usize,

    /// `(layer id, data length)` in draw order
    pub layers: Vec<(String, usize)>,
}

impl FrameRecord {
    pub fn from_frame(frame: &Frame, epoch_secs: f64) -> Self {
        Self {
            number: frame.number,
            time_sec: frame.wall_time_secs - epoch_secs,
            current_time: frame.current_time,
            revealed: frame.revealed_count(),
            layers: frame
                .layers
                .iter()
                .map(|l| (l.id().to_string(), l.data_len()))
                .collect(),
        }
    }
}

/// Something notable that happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub time_sec: f64,
    pub message: String,
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Virtual duration in seconds
    pub duration_sec: f64,

    pub frames: Vec<FrameRecord>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<SimEvent>,

    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub failure_reason: Option<String>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            duration_sec: 0.0,
            frames: Vec::new(),
            events: Vec::new(),
            passed: false,
            failure_reason: None,
        }
    }

    pub fn add_frame(&mut self, frame: FrameRecord) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    pub fn add_event(&mut self, time_sec: f64, message: impl Into<String>) {
        self.events.push(SimEvent {
            time_sec,
            message: message.into(),
        });
    }

    pub fn finalize(&mut self, passed: bool, failure_reason: Option<String>) {
        self.passed = passed;
        self.failure_reason = failure_reason;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
