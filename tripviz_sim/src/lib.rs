//! TripViz Deterministic Simulation Harness
//!
//! Runs the real viewer against a virtual clock and in-memory datasets so
//! every frame is reproducible from a single seed.
//!
//! # Core Principle: The Reactor Pattern
//!
//! All sources of non-determinism are intercepted and controlled:
//! - **Time**: the virtual clock moves one (optionally jittered) refresh per frame
//! - **Datasets**: served from memory, with injectable outages and latency
//! - **Randomness**: all synthetic data derived from the seed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ScenarioRunner                         │
//! │  ┌───────────────┐  fetch   ┌────────────┐                 │
//! │  │    Viewer     │─────────►│ SimSource  │◄── faults       │
//! │  │ (tripviz_core)│          └────────────┘                 │
//! │  └──────┬────────┘                ▲                         │
//! │         │ present                 │ payloads                │
//! │  ┌──────▼────────────┐      ┌─────┴──────┐                  │
//! │  │ RecordingRenderer │─────►│   Oracle   │  (ground truth)  │
//! │  └───────────────────┘check └────────────┘                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tripviz_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42).with_duration(60.0).run(ScenarioId::SteadyLoop)?;
//! assert!(result.passed);
//! ```

mod context;
mod error;
mod exporter;
mod oracle;
mod runner;
mod source;
pub mod scenarios;

pub use context::{SimContext, SIM_EPOCH_SECS};
pub use error::SimError;
pub use exporter::{FrameRecord, RecordingRenderer, SimEvent, SimExport};
pub use oracle::{Oracle, TripTruth};
pub use runner::{ScenarioResult, ScenarioRunner};
pub use source::SimSource;
