//! TripViz Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" abstraction allowing the TripViz viewer
//! to run both against the **real world** (tokio, system clock, local files)
//! and inside the **simulation** harness (virtual clock, in-memory datasets).
//!
//! # Core Concept: The Reactor Pattern
//!
//! Everything the viewer cannot compute by itself is intercepted:
//! - Time (`wall_clock_secs()`, `now()`, `sleep()`)
//! - Display refresh pacing (`next_frame()`)
//! - Dataset fetching (`DatasetSource::fetch()`)
//!
//! # Example
//!
//! ```ignore
//! use tripviz_env::{FrameContext, DatasetSource, DatasetKind};
//!
//! async fn frame_loop<Ctx: FrameContext>(ctx: &Ctx) {
//!     loop {
//!         ctx.next_frame().await;
//!         let wall = ctx.wall_clock_secs();
//!         // fold `wall` into logical time, compose layers...
//!     }
//! }
//! ```

mod context;
mod source;
mod types;
mod error;
mod tokio_impl;

pub use context::FrameContext;
pub use source::DatasetSource;
pub use types::{DatasetKind, ViewerId};
pub use error::EnvError;
pub use tokio_impl::{FileSource, TokioContext, DEFAULT_FRAME_INTERVAL};
