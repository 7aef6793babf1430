//! The animation clock - folds wall-clock time into a repeating loop.
//!
//! Logical time is never integrated frame by frame. Every tick re-derives it
//! from the wall clock:
//!
//! ```text
//! loop_duration = loop_length / animation_speed      (real seconds per cycle)
//! phase         = (wall_secs % loop_duration) / loop_duration
//! logical_time  = phase * loop_length                (in [0, loop_length))
//! ```
//!
//! so dropped or late frames never skew the animation.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Clock settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Logical-time span of one cycle, in dataset timestamp units (default: 1800)
    pub loop_length: f64,

    /// Logical-time units advanced per real second (default: 60)
    pub animation_speed: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            loop_length: 1800.0,
            animation_speed: 60.0,
        }
    }
}

impl ClockConfig {
    /// Real seconds per cycle.
    pub fn loop_duration(&self) -> f64 {
        self.loop_length / self.animation_speed
    }

    /// Maps a wall-clock instant onto the logical timeline.
    pub fn logical_time_at(&self, wall_secs: f64) -> f64 {
        let loop_time = self.loop_duration();
        ((wall_secs % loop_time) / loop_time) * self.loop_length
    }

    /// Which cycle a wall-clock instant falls in.
    pub fn cycle_index(&self, wall_secs: f64) -> i64 {
        (wall_secs / self.loop_duration()).floor() as i64
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.loop_length) && ok(self.animation_speed) && ok(self.loop_duration()) {
            Ok(())
        } else {
            Err(ConfigError::InvalidClock {
                loop_length: self.loop_length,
                animation_speed: self.animation_speed,
            })
        }
    }
}

/// Owner of the current logical time.
///
/// Only `tick` writes the value; everything else reads it.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    config: ClockConfig,
    current_time: f64,
    last_cycle: Option<i64>,
}

impl AnimationClock {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            current_time: 0.0,
            last_cycle: None,
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Current logical time, in `[0, loop_length)`.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Samples the wall clock and stores the folded logical time.
    ///
    /// Returns the new logical time and whether this tick crossed into a new
    /// cycle since the previous one.
    pub fn tick(&mut self, wall_secs: f64) -> (f64, bool) {
        self.current_time = self.config.logical_time_at(wall_secs);

        let cycle = self.config.cycle_index(wall_secs);
        let wrapped = matches!(self.last_cycle, Some(prev) if prev != cycle);
        self.last_cycle = Some(cycle);

        (self.current_time, wrapped)
    }
}
