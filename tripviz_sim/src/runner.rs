//! Scenario runner - drives a viewer through a scenario and checks every frame.

use crate::context::{SimContext, SIM_EPOCH_SECS};
use crate::error::SimError;
use crate::exporter::{FrameRecord, RecordingRenderer, SimExport};
use crate::oracle::Oracle;
use crate::scenarios::ScenarioId;
use crate::source::SimSource;

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tripviz_core::{ClockConfig, Frame, Viewer, ViewerConfig, ViewerSummary};
use tripviz_env::{DatasetKind, FrameContext};

const LAYER_ORDER: [&str; 4] = ["ground", "trips", "buildings", "scatterplot"];

type SimViewer = Viewer<SimContext, SimSource, RecordingRenderer>;

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Frames presented by the viewer
    pub total_frames: u64,

    /// Final virtual time in seconds
    pub final_time_secs: f64,

    /// Revealed points in the last frame
    pub final_revealed: usize,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Viewer counters at the end of the run
    pub summary: ViewerSummary,
}

/// Runs scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Display refresh rate in Hz
    frame_rate_hz: u32,

    /// Virtual duration in seconds
    max_duration_secs: f64,

    /// Synthetic trips per dataset
    trips: usize,

    /// Synthetic building footprints
    buildings: usize,

    config: ViewerConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            frame_rate_hz: 60,
            max_duration_secs: 60.0,
            trips: 200,
            buildings: 50,
            config: ViewerConfig::default(),
        }
    }

    /// Sets the refresh rate.
    pub fn with_frame_rate(mut self, hz: u32) -> Self {
        self.frame_rate_hz = hz.max(1);
        self
    }

    /// Sets the maximum duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = secs.max(0.0);
        self
    }

    pub fn with_trips(mut self, count: usize) -> Self {
        self.trips = count;
        self
    }

    pub fn with_buildings(mut self, count: usize) -> Self {
        self.buildings = count;
        self
    }

    /// Uses `config` for the viewer (clock, theme, view).
    pub fn with_config(mut self, config: ViewerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        self.run_with_export(scenario).map(|(result, _)| result)
    }

    /// Runs a scenario and also returns the sampled frames.
    pub fn run_with_export(&self, scenario: ScenarioId) -> Result<(ScenarioResult, SimExport), SimError> {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;

        runtime.block_on(async {
            match scenario {
                ScenarioId::SteadyLoop => self.run_steady_loop().await,
                ScenarioId::Reload => self.run_reload().await,
                ScenarioId::FetchFailure => self.run_fetch_failure().await,
                ScenarioId::MalformedRecords => self.run_malformed_records().await,
                ScenarioId::Teardown => self.run_teardown().await,
                ScenarioId::FrameJitter => self.run_frame_jitter().await,
                ScenarioId::SlowSource => self.run_slow_source().await,
            }
        })
    }

    fn data_seed(&self) -> u64 {
        self.seed.wrapping_mul(0x9e3779b97f4a7c15)
    }

    fn oracle(&self, salt: u64) -> Oracle {
        Oracle::new(self.data_seed() ^ salt, self.config.clock.loop_length)
    }

    fn context(&self) -> SimContext {
        SimContext::new(self.seed).with_frame_rate(self.frame_rate_hz)
    }

    fn frames_for(&self, secs: f64) -> u64 {
        (secs * self.frame_rate_hz as f64) as u64
    }

    /// Loads once and checks every frame against the oracle.
    async fn run_steady_loop(&self) -> Result<(ScenarioResult, SimExport), SimError> {
        info!("steady_loop: {} trips, {} buildings", self.trips, self.buildings);

        let mut oracle = self.oracle(0);
        let trips = oracle.generate_trips(self.trips);
        let buildings = oracle.generate_buildings(self.buildings);

        let mut h = Harness::new(self, ScenarioId::SteadyLoop, self.context())?;
        h.source.set_json(DatasetKind::Trips, &trips)?;
        h.source.set_json(DatasetKind::Buildings, &buildings)?;
        h.viewer.request_load();
        h.run_frames(self.frames_for(self.max_duration_secs), &[&oracle]).await;

        let summary = h.viewer.summary().clone();
        let wraps = h.observed_wraps();
        h.verdict.require(summary.trips_loads == 1, || format!("expected 1 trips load, got {}", summary.trips_loads));
        h.verdict.require(summary.buildings_loads == 1, || {
            format!("expected 1 buildings load, got {}", summary.buildings_loads)
        });
        h.verdict.require(summary.failed_loads == 0, || format!("{} loads failed", summary.failed_loads));
        h.verdict.require(summary.wraparounds == wraps, || {
            format!("viewer counted {} wraparounds, frames show {}", summary.wraparounds, wraps)
        });
        h.verdict.require(h.viewer.datasets().buildings.len() == self.buildings, || {
            "buildings dataset not fully installed".to_string()
        });

        info!("✓ steady_loop: {} frames, {} wraparounds", summary.frames_presented, wraps);
        Ok(h.finish())
    }

    /// Swaps the trips dataset halfway through.
    async fn run_reload(&self) -> Result<(ScenarioResult, SimExport), SimError> {
        let mut first = self.oracle(0);
        let trips = first.generate_trips(self.trips);
        let mut second = self.oracle(0xB);
        let replacement = second.generate_trips(self.trips / 2 + 1);

        let mut h = Harness::new(self, ScenarioId::Reload, self.context())?;
        h.source.set_json(DatasetKind::Trips, &trips)?;
        h.source.set_json(DatasetKind::Buildings, &first.generate_buildings(self.buildings))?;
        h.viewer.request_load();

        let total = self.frames_for(self.max_duration_secs);
        h.run_frames(total / 2, &[&first]).await;

        info!("reload: swapping in {} trips", replacement.len());
        h.source.set_json(DatasetKind::Trips, &replacement)?;
        h.viewer.request_load();
        h.run_frames(total - total / 2, &[&first, &second]).await;

        let summary = h.viewer.summary().clone();
        h.verdict.require(summary.trips_loads == 2, || format!("expected 2 trips loads, got {}", summary.trips_loads));
        h.verdict.require(h.viewer.datasets().trips.len() == replacement.len(), || {
            format!(
                "installed {} trips, expected the replacement's {}",
                h.viewer.datasets().trips.len(),
                replacement.len()
            )
        });
        h.verdict.require(summary.stale_loads_ignored == 0, || "a fresh load was dropped as stale".to_string());

        Ok(h.finish())
    }

    /// Failed loads never stop the frames and never discard a good index.
    async fn run_fetch_failure(&self) -> Result<(ScenarioResult, SimExport), SimError> {
        let mut oracle = self.oracle(0);
        let trips = oracle.generate_trips(self.trips);

        let mut h = Harness::new(self, ScenarioId::FetchFailure, self.context())?;
        h.source.set_json(DatasetKind::Trips, &trips)?;
        h.source.set_json(DatasetKind::Buildings, &oracle.generate_buildings(self.buildings))?;

        let phase = self.frames_for(self.max_duration_secs / 3.0).max(2);

        // Phase 1: nothing loads
        h.source.fail_next(DatasetKind::Trips, 1);
        h.source.fail_next(DatasetKind::Buildings, 1);
        h.viewer.request_load();
        h.run_frames(phase, &[&oracle]).await;
        let after_outage = h.viewer.summary().clone();
        h.verdict.require(after_outage.failed_loads == 2, || {
            format!("expected 2 failed loads, got {}", after_outage.failed_loads)
        });
        h.verdict.require(
            h.viewer.last_error().map_or(false, |e| e.is_fetch_error()),
            || "last_error should hold the fetch failure".to_string(),
        );
        h.verdict.require(!h.viewer.filter().is_loaded(), || "index installed despite outage".to_string());

        // Phase 2: recovery
        h.viewer.request_load();
        h.run_frames(phase, &[&oracle]).await;
        h.verdict.require(h.viewer.summary().trips_loads == 1, || "recovery load did not install".to_string());

        // Phase 3: a failed reload keeps the installed index
        h.source.fail_next(DatasetKind::Trips, 1);
        h.viewer.request_load();
        h.run_frames(phase, &[&oracle]).await;

        let summary = h.viewer.summary().clone();
        h.verdict.require(summary.failed_loads == 3, || format!("expected 3 failed loads, got {}", summary.failed_loads));
        h.verdict.require(summary.trips_loads == 1, || "failed reload replaced the index".to_string());
        h.verdict.require(h.viewer.filter().index().map_or(0, |i| i.len()) == oracle.well_formed(), || {
            "installed index lost entries".to_string()
        });
        h.verdict.require(summary.frames_presented == phase * 3, || {
            format!("expected {} frames, got {}", phase * 3, summary.frames_presented)
        });

        Ok(h.finish())
    }

    /// Corrupted records are skipped and the rest keep their positional ids.
    async fn run_malformed_records(&self) -> Result<(ScenarioResult, SimExport), SimError> {
        let mut oracle = self.oracle(0);
        let mut trips = oracle.generate_trips(self.trips);
        let corrupted = oracle.corrupt(&mut trips, (self.trips / 10).max(1));

        let mut h = Harness::new(self, ScenarioId::MalformedRecords, self.context())?;
        h.source.set_json(DatasetKind::Trips, &trips)?;
        h.source.set_json(DatasetKind::Buildings, &oracle.generate_buildings(self.buildings))?;
        h.viewer.request_load();
        h.run_frames(self.frames_for(self.max_duration_secs), &[&oracle]).await;

        let summary = h.viewer.summary().clone();
        h.verdict.require(summary.skipped_records == corrupted.len() as u64, || {
            format!("skipped {} records, corrupted {}", summary.skipped_records, corrupted.len())
        });
        h.verdict.require(h.viewer.datasets().trips.len() == trips.len(), || {
            "trips layer should still carry every raw record".to_string()
        });

        match h.viewer.filter().index().cloned() {
            Some(index) => {
                for truth in oracle.truth() {
                    let entry = index.get(truth.id);
                    match truth.final_timestamp {
                        Some(ts) => h.verdict.require(
                            entry.map_or(false, |e| e.final_timestamp == ts && e.final_position == truth.final_position),
                            || format!("trip {} missing or shifted in index", truth.id),
                        ),
                        None => h.verdict.require(entry.is_none(), || {
                            format!("corrupted trip {} was indexed", truth.id)
                        }),
                    }
                }
            }
            None => h.verdict.require(false, || "trips never loaded".to_string()),
        }

        info!("✓ malformed_records: {} of {} records skipped", corrupted.len(), trips.len());
        Ok(h.finish())
    }

    /// Stops the running viewer while both loads are still in flight.
    async fn run_teardown(&self) -> Result<(ScenarioResult, SimExport), SimError> {
        let ctx = Arc::new(self.context());
        let source = SimSource::new(Arc::clone(&ctx));
        let mut oracle = self.oracle(0);
        source.set_json(DatasetKind::Trips, &oracle.generate_trips(self.trips))?;
        source.set_json(DatasetKind::Buildings, &oracle.generate_buildings(self.buildings))?;
        source.set_latency(Duration::from_secs(5));

        let recorder = RecordingRenderer::new();
        let viewer = SimViewer::new(
            Arc::clone(&ctx),
            Arc::new(source.clone()),
            recorder.clone(),
            self.config.clone(),
        )?;
        let handle = viewer.start();

        let target = self.frames_for(1.0).clamp(1, 60) as usize;
        for _ in 0..1_000_000 {
            if recorder.frame_count() >= target {
                break;
            }
            tokio::task::yield_now().await;
        }
        let summary = handle.stop().await;
        let frames_at_stop = recorder.frame_count();

        // Let any leftover task run and move the clock well past the latency
        ctx.advance_time(Duration::from_secs(10));
        for _ in 0..1_000 {
            tokio::task::yield_now().await;
        }

        let mut export = SimExport::new(ScenarioId::Teardown.name(), self.seed);
        let mut checker = FrameChecker::new(self.config.clock);
        let mut verdict = Verdict::default();
        for frame in recorder.frames() {
            checker.check(&frame, Some(0));
            export.add_frame(FrameRecord::from_frame(&frame, SIM_EPOCH_SECS as f64));
        }
        export.add_event(ctx.now().as_secs_f64(), "viewer stopped");

        if let Some(reason) = checker.failure.clone() {
            verdict.require(false, || reason);
        }
        verdict.require(frames_at_stop >= target, || format!("only {} frames before stop", frames_at_stop));
        verdict.require(recorder.frame_count() == frames_at_stop, || {
            format!("{} frames presented after stop", recorder.frame_count() - frames_at_stop)
        });
        verdict.require(summary.frames_presented as usize == frames_at_stop, || {
            "summary frame count disagrees with renderer".to_string()
        });
        verdict.require(summary.abandoned_loads == 2, || {
            format!("expected 2 abandoned loads, got {}", summary.abandoned_loads)
        });
        verdict.require(summary.trips_loads == 0 && summary.buildings_loads == 0, || {
            "a dataset was installed during teardown".to_string()
        });
        let scenes = recorder.scenes();
        verdict.require(scenes.len() == 1 && scenes[0].view == self.config.view, || {
            format!("expected the initial scene once, got {} scenes", scenes.len())
        });

        let passed = verdict.failure.is_none();
        export.finalize(passed, verdict.failure.clone());
        let result = ScenarioResult {
            scenario: ScenarioId::Teardown,
            seed: self.seed,
            passed,
            total_frames: summary.frames_presented,
            final_time_secs: ctx.now().as_secs_f64(),
            final_revealed: recorder.last_frame().map_or(0, |f| f.revealed_count()),
            failure_reason: verdict.failure,
            summary,
        };
        Ok((result, export))
    }

    /// Irregular refresh intervals must not disturb the clock or the window.
    async fn run_frame_jitter(&self) -> Result<(ScenarioResult, SimExport), SimError> {
        let mut oracle = self.oracle(0);
        let trips = oracle.generate_trips(self.trips);

        let max_jitter = Duration::from_millis(50);
        let ctx = self.context().with_frame_jitter(max_jitter);
        let mut h = Harness::new(self, ScenarioId::FrameJitter, ctx)?;
        h.source.set_json(DatasetKind::Trips, &trips)?;
        h.source.set_json(DatasetKind::Buildings, &oracle.generate_buildings(self.buildings))?;
        h.viewer.request_load();

        let frames = self.frames_for(self.max_duration_secs);
        h.run_frames(frames, &[&oracle]).await;

        let elapsed = h.ctx.now();
        let interval = h.ctx.frame_interval();
        h.verdict.require(elapsed >= interval * frames as u32, || "virtual clock ran slow".to_string());
        h.verdict.require(elapsed <= (interval + max_jitter) * frames as u32, || "virtual clock ran fast".to_string());
        let wraps = h.observed_wraps();
        let counted = h.viewer.summary().wraparounds;
        h.verdict.require(counted == wraps, || format!("viewer counted {} wraparounds, frames show {}", counted, wraps));

        Ok(h.finish())
    }

    /// Frames render with empty data layers until a slow source delivers.
    async fn run_slow_source(&self) -> Result<(ScenarioResult, SimExport), SimError> {
        let latency = Duration::from_secs(3);
        let mut oracle = self.oracle(0);
        let trips = oracle.generate_trips(self.trips);

        let mut h = Harness::new(self, ScenarioId::SlowSource, self.context())?;
        h.source.set_json(DatasetKind::Trips, &trips)?;
        h.source.set_json(DatasetKind::Buildings, &oracle.generate_buildings(self.buildings))?;
        h.source.set_latency(latency);
        h.viewer.request_load();

        let duration = self.max_duration_secs.max(latency.as_secs_f64() + 2.0);
        h.run_frames(self.frames_for(duration), &[&oracle]).await;

        let installed_at = h.first_trips_install;
        h.verdict.require(
            installed_at.map_or(false, |t| t >= latency.as_secs_f64()),
            || format!("trips installed at {:?}, before the {:?} latency", installed_at, latency),
        );
        let empty_frames = h
            .recorder
            .frames()
            .iter()
            .take_while(|f| f.layer("trips").map_or(0, |l| l.data_len()) == 0)
            .count();
        h.verdict.require(empty_frames > 0, || "no frames were presented while waiting".to_string());

        Ok(h.finish())
    }
}

/// First failed requirement wins.
#[derive(Debug, Default)]
struct Verdict {
    failure: Option<String>,
}

impl Verdict {
    fn require(&mut self, ok: bool, reason: impl FnOnce() -> String) {
        if !ok && self.failure.is_none() {
            let reason = reason();
            warn!("requirement failed: {}", reason);
            self.failure = Some(reason);
        }
    }
}

/// Per-frame invariants.
struct FrameChecker {
    clock: ClockConfig,

    frames_seen: u64,

    /// `(current_time, revealed)` of the previous frame on the same dataset
    previous: Option<(f64, usize)>,

    failure: Option<String>,
}

impl FrameChecker {
    fn new(clock: ClockConfig) -> Self {
        Self {
            clock,
            frames_seen: 0,
            previous: None,
            failure: None,
        }
    }

    fn dataset_changed(&mut self) {
        self.previous = None;
    }

    fn check(&mut self, frame: &Frame, expected_revealed: Option<usize>) {
        let result = self.inspect(frame, expected_revealed);
        self.frames_seen += 1;
        if let (Err(reason), None) = (result, &self.failure) {
            self.failure = Some(format!("frame {}: {}", frame.number, reason));
        }
    }

    fn inspect(&mut self, frame: &Frame, expected_revealed: Option<usize>) -> Result<(), String> {
        if frame.number != self.frames_seen {
            return Err(format!("expected frame number {}", self.frames_seen));
        }

        let t = frame.current_time;
        if !(0.0..self.clock.loop_length).contains(&t) {
            return Err(format!("current_time {} outside [0, {})", t, self.clock.loop_length));
        }
        let folded = self.clock.logical_time_at(frame.wall_time_secs);
        if t != folded {
            return Err(format!("current_time {} does not match wall clock ({})", t, folded));
        }

        let ids: Vec<&str> = frame.layers.iter().map(|l| l.id()).collect();
        if ids != LAYER_ORDER {
            return Err(format!("unexpected layer order {:?}", ids));
        }

        let revealed = frame.revealed_count();
        if let Some(expected) = expected_revealed {
            if revealed != expected {
                return Err(format!("revealed {} trips at t={:.3}, oracle says {}", revealed, t, expected));
            }
        }

        // revealed points only grow within a cycle
        if let Some((prev_t, prev_revealed)) = self.previous {
            if t >= prev_t && revealed < prev_revealed {
                return Err(format!("revealed set shrank from {} to {} within a cycle", prev_revealed, revealed));
            }
        }
        self.previous = Some((t, revealed));
        Ok(())
    }
}

/// A manually driven viewer plus everything needed to judge it.
struct Harness {
    scenario: ScenarioId,
    seed: u64,
    ctx: Arc<SimContext>,
    source: SimSource,
    recorder: RecordingRenderer,
    viewer: SimViewer,
    checker: FrameChecker,
    verdict: Verdict,
    export: SimExport,
    export_every: u64,
    seen: ViewerSummary,

    /// Virtual time at which the first trips dataset was installed
    first_trips_install: Option<f64>,
}

impl Harness {
    fn new(
        runner: &ScenarioRunner,
        scenario: ScenarioId,
        ctx: SimContext,
    ) -> Result<Self, SimError> {
        let ctx = Arc::new(ctx);
        let source = SimSource::new(Arc::clone(&ctx));
        let recorder = RecordingRenderer::new();
        let viewer = SimViewer::new(
            Arc::clone(&ctx),
            Arc::new(source.clone()),
            recorder.clone(),
            runner.config.clone(),
        )?;

        Ok(Self {
            scenario,
            seed: runner.seed,
            ctx,
            source,
            recorder,
            viewer,
            checker: FrameChecker::new(runner.config.clock),
            verdict: Verdict::default(),
            export: SimExport::new(scenario.name(), runner.seed),
            export_every: (runner.frame_rate_hz / 10).max(1) as u64,
            seen: ViewerSummary::default(),
            first_trips_install: None,
        })
    }

    /// One display refresh: advance the clock, apply finished loads, present.
    ///
    /// `truths[n]` is the oracle for the dataset installed by the `n+1`th
    /// successful trips load.
    async fn step(&mut self, truths: &[&Oracle]) {
        self.ctx.next_frame().await;
        self.viewer.pump_events();
        self.note_changes();
        self.viewer.present_frame();

        let Some(frame) = self.recorder.last_frame() else {
            return;
        };
        let expected = match self.viewer.summary().trips_loads {
            0 => Some(0),
            n => truths
                .get(n as usize - 1)
                .map(|oracle| oracle.expected_revealed(frame.current_time)),
        };
        self.checker.check(&frame, expected);

        if frame.number % self.export_every == 0 {
            self.export
                .add_frame(FrameRecord::from_frame(&frame, SIM_EPOCH_SECS as f64));
        }
    }

    async fn run_frames(&mut self, frames: u64, truths: &[&Oracle]) {
        for i in 0..frames {
            self.step(truths).await;
            if i % 600 == 0 {
                debug!(
                    "  t={:.1}s | frame={} | current_time={:.1}",
                    self.ctx.now().as_secs_f64(),
                    self.viewer.summary().frames_presented,
                    self.viewer.current_time()
                );
            }
        }
    }

    fn note_changes(&mut self) {
        let summary = self.viewer.summary().clone();
        let now = self.ctx.now().as_secs_f64();

        if summary.trips_loads != self.seen.trips_loads {
            self.checker.dataset_changed();
            self.first_trips_install.get_or_insert(now);
            self.export.add_event(
                now,
                format!("trips installed ({} records)", self.viewer.datasets().trips.len()),
            );
        }
        if summary.buildings_loads != self.seen.buildings_loads {
            self.export.add_event(
                now,
                format!("buildings installed ({} footprints)", self.viewer.datasets().buildings.len()),
            );
        }
        if summary.failed_loads != self.seen.failed_loads {
            let reason = self
                .viewer
                .last_error()
                .map(|e| e.to_string())
                .unwrap_or_default();
            self.export.add_event(now, format!("load failed: {}", reason));
        }
        self.seen = summary;
    }

    /// Wraparounds seen from the outside: logical time going backwards.
    fn observed_wraps(&self) -> u64 {
        self.recorder
            .frames()
            .windows(2)
            .filter(|w| w[1].current_time < w[0].current_time)
            .count() as u64
    }

    fn finish(mut self) -> (ScenarioResult, SimExport) {
        if let Some(reason) = self.checker.failure.take() {
            // Frame-level violations outrank end-of-run checks
            self.verdict.failure = Some(reason);
        }
        let passed = self.verdict.failure.is_none();
        self.export.finalize(passed, self.verdict.failure.clone());

        let summary = self.viewer.summary().clone();
        let result = ScenarioResult {
            scenario: self.scenario,
            seed: self.seed,
            passed,
            total_frames: summary.frames_presented,
            final_time_secs: self.ctx.now().as_secs_f64(),
            final_revealed: self.recorder.last_frame().map_or(0, |f| f.revealed_count()),
            failure_reason: self.verdict.failure,
            summary,
        };
        (result, self.export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(seed: u64) -> ScenarioRunner {
        ScenarioRunner::new(seed)
            .with_duration(35.0)
            .with_frame_rate(30)
            .with_trips(60)
            .with_buildings(10)
    }

    fn assert_passes(scenario: ScenarioId) {
        let result = runner(42).run(scenario).unwrap();
        assert!(
            result.passed,
            "{} failed: {:?}",
            scenario,
            result.failure_reason
        );
    }

    #[test]
    fn test_steady_loop_passes() {
        assert_passes(ScenarioId::SteadyLoop);
    }

    #[test]
    fn test_reload_passes() {
        assert_passes(ScenarioId::Reload);
    }

    #[test]
    fn test_fetch_failure_passes() {
        assert_passes(ScenarioId::FetchFailure);
    }

    #[test]
    fn test_malformed_records_passes() {
        assert_passes(ScenarioId::MalformedRecords);
    }

    #[test]
    fn test_teardown_passes() {
        assert_passes(ScenarioId::Teardown);
    }

    #[test]
    fn test_frame_jitter_passes() {
        assert_passes(ScenarioId::FrameJitter);
    }

    #[test]
    fn test_slow_source_passes() {
        assert_passes(ScenarioId::SlowSource);
    }

    #[test]
    fn test_steady_loop_wraps_and_reveals() {
        let result = runner(7).run(ScenarioId::SteadyLoop).unwrap();
        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.total_frames, 35 * 30);
        assert!(result.summary.wraparounds >= 1);
        assert_eq!(result.summary.trips_loads, 1);
    }

    #[test]
    fn test_same_seed_same_export() {
        let (_, a) = runner(3).run_with_export(ScenarioId::SteadyLoop).unwrap();
        let (_, b) = runner(3).run_with_export(ScenarioId::SteadyLoop).unwrap();
        assert_eq!(a.frames, b.frames);
        assert!(!a.frames.is_empty());
    }

    #[test]
    fn test_checker_flags_out_of_order_layers() {
        use tripviz_core::{compose, Datasets, Theme};
        use tripviz_env::ViewerId;

        let mut layers = compose(1.0, Vec::new(), &Datasets::default(), &Theme::default());
        layers.swap(0, 1);
        let clock = ClockConfig::default();
        let frame = Frame {
            viewer_id: ViewerId::from_seed(1),
            number: 0,
            wall_time_secs: 1.0 / 60.0,
            current_time: clock.logical_time_at(1.0 / 60.0),
            layers,
        };

        let mut checker = FrameChecker::new(clock);
        checker.check(&frame, None);
        assert!(checker.failure.unwrap().contains("layer order"));
    }

    #[test]
    fn test_checker_flags_shrinking_reveal_within_cycle() {
        use tripviz_core::{compose, Datasets, Theme};
        use tripviz_env::ViewerId;

        let clock = ClockConfig::default();
        let frame = |number: u64, wall: f64, points: Vec<[f64; 2]>| {
            let current_time = clock.logical_time_at(wall);
            Frame {
                viewer_id: ViewerId::from_seed(1),
                number,
                wall_time_secs: wall,
                current_time,
                layers: compose(current_time, points, &Datasets::default(), &Theme::default()),
            }
        };

        let mut checker = FrameChecker::new(clock);
        checker.check(&frame(0, 1.0, vec![[0.0, 0.0], [1.0, 1.0]]), None);
        assert!(checker.failure.is_none());
        checker.check(&frame(1, 2.0, vec![[0.0, 0.0]]), None);
        assert!(checker.failure.unwrap().contains("shrank from 2 to 1"));
    }
}
