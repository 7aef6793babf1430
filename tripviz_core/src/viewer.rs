//! Viewer Runtime - drives the animation clock, dataset loads and layer
//! composition from a single owner task.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Viewer                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │ frame loop (one task, biased select!)                  │  │
//! │  │  1. stop signal      → break, abort loaders            │  │
//! │  │  2. ViewerEvent      → install index / datasets        │  │
//! │  │  3. next_frame()     → tick clock, filter, compose     │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │        ▲ mpsc                                   │ present    │
//! │  ┌─────┴──────┐  ┌────────────┐           ┌─────▼──────┐     │
//! │  │ trips load │  │ bldg load  │           │  Renderer  │     │
//! │  └────────────┘  └────────────┘           └────────────┘     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Loader tasks never touch viewer state. They fetch, parse and build the
//! [`RevealIndex`] off the loop, then post one [`ViewerEvent`]; the loop
//! installs the result in a single assignment.
//!
//! # Usage
//!
//! ```ignore
//! use tripviz_core::{Viewer, ViewerConfig};
//! use tripviz_env::{FileSource, TokioContext};
//!
//! let viewer = Viewer::new(TokioContext::shared(), Arc::new(FileSource::new()), renderer, config)?;
//! let handle = viewer.start();
//! // ...
//! let summary = handle.stop().await;
//! ```

use crate::clock::AnimationClock;
use crate::config::ViewerConfig;
use crate::error::{ConfigError, TripDataError};
use crate::layers::{self, Datasets};
use crate::render::{Frame, Renderer, Scene};
use crate::trip::{parse_buildings, parse_trips, Building, TripRecord};
use crate::view::ViewState;
use crate::window::{RevealIndex, TripWindowFilter};

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tripviz_env::{DatasetKind, DatasetSource, FrameContext, ViewerId};

/// Messages delivered to the viewer's owner task.
#[derive(Debug)]
pub enum ViewerEvent {
    /// A trips dataset was fetched, parsed and indexed.
    TripsLoaded {
        generation: u64,
        trips: Arc<[TripRecord]>,
        index: Arc<RevealIndex>,
        skipped: usize,
    },

    /// A buildings dataset was fetched and parsed.
    BuildingsLoaded {
        generation: u64,
        buildings: Arc<[Building]>,
    },

    /// A load failed; the previously installed data stays in place.
    LoadFailed {
        dataset: DatasetKind,
        generation: u64,
        error: TripDataError,
    },

    /// Fetch both datasets again.
    ReloadRequested,
}

/// Counters collected over a viewer's lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerSummary {
    pub frames_presented: u64,
    pub wraparounds: u64,
    pub trips_loads: u64,
    pub buildings_loads: u64,
    pub failed_loads: u64,

    /// Trip records dropped as malformed, summed over all loads
    pub skipped_records: u64,

    /// Completions that arrived after a newer load of the same dataset
    pub stale_loads_ignored: u64,

    /// Loads still in flight at teardown
    pub abandoned_loads: u64,

    pub last_current_time: f64,
}

/// The viewer: owns the clock, the window filter and the loaded datasets.
///
/// Generic over the context, dataset source and renderer, so the same code
/// runs in production (tokio, files) and in simulation.
pub struct Viewer<Ctx, Src, R>
where
    Ctx: FrameContext,
    Src: DatasetSource,
    R: Renderer,
{
    /// Viewer identifier (for logging and exported frames)
    pub viewer_id: ViewerId,

    context: Arc<Ctx>,
    source: Arc<Src>,
    renderer: R,
    config: ViewerConfig,

    clock: AnimationClock,
    filter: TripWindowFilter,
    datasets: Datasets,
    view: ViewState,

    events_tx: mpsc::UnboundedSender<ViewerEvent>,
    events_rx: mpsc::UnboundedReceiver<ViewerEvent>,

    /// In-flight loader tasks, aborted on teardown
    loaders: Vec<JoinHandle<()>>,
    next_generation: u64,
    installed_generation: HashMap<DatasetKind, u64>,

    last_error: Option<TripDataError>,
    summary: ViewerSummary,
}

impl<Ctx, Src, R> Viewer<Ctx, Src, R>
where
    Ctx: FrameContext,
    Src: DatasetSource,
    R: Renderer,
{
    /// Creates a viewer. Fails only if the clock settings are unusable.
    pub fn new(
        context: Arc<Ctx>,
        source: Arc<Src>,
        renderer: R,
        config: ViewerConfig,
    ) -> Result<Self, ConfigError> {
        config.clock.validate()?;

        let viewer_id = match context.seed() {
            0 => ViewerId::new(),
            seed => ViewerId::from_seed(seed),
        };
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Self {
            viewer_id,
            context,
            source,
            renderer,
            clock: AnimationClock::new(config.clock),
            filter: TripWindowFilter::new(),
            datasets: Datasets::default(),
            view: config.view,
            config,
            events_tx,
            events_rx,
            loaders: Vec::new(),
            next_generation: 0,
            installed_generation: HashMap::new(),
            last_error: None,
            summary: ViewerSummary::default(),
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    pub fn filter(&self) -> &TripWindowFilter {
        &self.filter
    }

    pub fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Most recent load failure, if any.
    pub fn last_error(&self) -> Option<&TripDataError> {
        self.last_error.as_ref()
    }

    pub fn summary(&self) -> &ViewerSummary {
        &self.summary
    }

    pub fn scene(&self) -> Scene {
        Scene {
            viewer_id: self.viewer_id,
            view: self.view,
            map_style: self.config.map_style.clone(),
            lighting: self.config.theme.lighting,
        }
    }

    /// Spawns one loader task per dataset. Returns the generation assigned
    /// to this load.
    pub fn request_load(&mut self) -> u64 {
        self.loaders.retain(|task| !task.is_finished());
        self.next_generation += 1;
        let generation = self.next_generation;

        for dataset in [DatasetKind::Trips, DatasetKind::Buildings] {
            let source = Arc::clone(&self.source);
            let location = self.config.datasets.get(dataset).to_string();
            let tx = self.events_tx.clone();
            debug!(viewer = %self.viewer_id, %dataset, generation, "requesting dataset load");

            let task = self.context.spawn(
                &format!("load-{}", dataset),
                load_dataset(source, dataset, location, generation, tx),
            );
            self.loaders.push(task);
        }
        generation
    }

    /// Applies one event on the owner task.
    pub fn handle_event(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::TripsLoaded {
                generation,
                trips,
                index,
                skipped,
            } => {
                if !self.accept_generation(DatasetKind::Trips, generation) {
                    return;
                }
                info!(
                    viewer = %self.viewer_id,
                    generation,
                    trips = trips.len(),
                    indexed = index.len(),
                    skipped,
                    "trips dataset installed"
                );
                self.filter.install(index);
                if self.config.fit_view_to_trips {
                    self.view = self.config.view.fit_to_trips(&trips);
                    self.renderer.update_scene(&self.scene());
                }
                self.datasets.trips = trips;
                self.summary.trips_loads += 1;
                self.summary.skipped_records += skipped as u64;
            }
            ViewerEvent::BuildingsLoaded {
                generation,
                buildings,
            } => {
                if !self.accept_generation(DatasetKind::Buildings, generation) {
                    return;
                }
                info!(
                    viewer = %self.viewer_id,
                    generation,
                    buildings = buildings.len(),
                    "buildings dataset installed"
                );
                self.datasets.buildings = buildings;
                self.summary.buildings_loads += 1;
            }
            ViewerEvent::LoadFailed {
                dataset,
                generation,
                error,
            } => {
                if self.is_stale(dataset, generation) {
                    debug!(%dataset, generation, "ignoring failure of a superseded load: {}", error);
                    self.summary.stale_loads_ignored += 1;
                    return;
                }
                warn!(
                    viewer = %self.viewer_id,
                    %dataset,
                    generation,
                    "dataset load failed, keeping previous data: {}",
                    error
                );
                self.summary.failed_loads += 1;
                self.last_error = Some(error);
            }
            ViewerEvent::ReloadRequested => {
                self.request_load();
            }
        }
    }

    /// Drains every event already queued. Returns how many were applied.
    pub fn pump_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Samples the wall clock, advances logical time and composes the layers.
    pub fn compose_frame(&mut self) -> Frame {
        let wall_time_secs = self.context.wall_clock_secs();
        let (current_time, wrapped) = self.clock.tick(wall_time_secs);
        if wrapped {
            self.summary.wraparounds += 1;
            debug!(
                viewer = %self.viewer_id,
                cycle = self.clock.config().cycle_index(wall_time_secs),
                "animation loop wrapped"
            );
        }

        let revealed = self.filter.revealed_points(current_time);
        let layers = layers::compose(current_time, revealed, &self.datasets, &self.config.theme);

        let frame = Frame {
            viewer_id: self.viewer_id,
            number: self.summary.frames_presented,
            wall_time_secs,
            current_time,
            layers,
        };
        self.summary.frames_presented += 1;
        self.summary.last_current_time = current_time;
        frame
    }

    /// Composes a frame and hands it to the renderer.
    pub fn present_frame(&mut self) {
        let frame = self.compose_frame();
        self.renderer.present(frame);
    }

    /// Runs the frame loop until `stop` flips to `true` (or its sender is
    /// dropped). Returns the lifetime counters.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> ViewerSummary {
        info!(
            viewer = %self.viewer_id,
            loop_length = self.config.clock.loop_length,
            animation_speed = self.config.clock.animation_speed,
            "viewer started"
        );
        self.renderer.update_scene(&self.scene());
        self.request_load();

        loop {
            if *stop.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                Some(event) = self.events_rx.recv() => self.handle_event(event),
                _ = self.context.next_frame() => {
                    // A refresh may already have been pending when stop() was called
                    if *stop.borrow() {
                        break;
                    }
                    self.present_frame();
                }
            }
        }

        self.teardown()
    }

    /// Spawns the frame loop and returns a handle to control it.
    pub fn start(self) -> ViewerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (summary_tx, summary_rx) = oneshot::channel();
        let viewer_id = self.viewer_id;
        let events_tx = self.events_tx.clone();
        let context = Arc::clone(&self.context);

        let task = context.spawn("viewer-frame-loop", async move {
            let summary = self.run(stop_rx).await;
            let _ = summary_tx.send(summary);
        });

        ViewerHandle {
            viewer_id,
            stop_tx,
            events_tx,
            task,
            summary_rx,
        }
    }

    fn teardown(mut self) -> ViewerSummary {
        for task in self.loaders.drain(..) {
            if !task.is_finished() {
                self.summary.abandoned_loads += 1;
            }
            task.abort();
        }
        info!(
            viewer = %self.viewer_id,
            frames = self.summary.frames_presented,
            abandoned_loads = self.summary.abandoned_loads,
            "viewer stopped"
        );
        self.summary
    }

    fn accept_generation(&mut self, dataset: DatasetKind, generation: u64) -> bool {
        if self.is_stale(dataset, generation) {
            debug!(%dataset, generation, "ignoring stale dataset load");
            self.summary.stale_loads_ignored += 1;
            return false;
        }
        self.installed_generation.insert(dataset, generation);
        true
    }

    /// True when a newer load of `dataset` has already been installed.
    fn is_stale(&self, dataset: DatasetKind, generation: u64) -> bool {
        self.installed_generation
            .get(&dataset)
            .is_some_and(|installed| generation < *installed)
    }
}

/// Control handle for a running viewer.
pub struct ViewerHandle {
    viewer_id: ViewerId,
    stop_tx: watch::Sender<bool>,
    events_tx: mpsc::UnboundedSender<ViewerEvent>,
    task: JoinHandle<()>,
    summary_rx: oneshot::Receiver<ViewerSummary>,
}

impl ViewerHandle {
    pub fn viewer_id(&self) -> ViewerId {
        self.viewer_id
    }

    /// Asks the viewer to fetch both datasets again. Returns false if the
    /// viewer has already stopped.
    pub fn reload(&self) -> bool {
        self.events_tx.send(ViewerEvent::ReloadRequested).is_ok()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the frame loop and waits for it to exit. No frame is presented
    /// after this returns.
    pub async fn stop(self) -> ViewerSummary {
        let _ = self.stop_tx.send(true);
        if let Err(err) = self.task.await {
            warn!(viewer = %self.viewer_id, "frame loop ended abnormally: {}", err);
        }
        self.summary_rx.await.unwrap_or_default()
    }
}

async fn load_dataset<Src: DatasetSource>(
    source: Arc<Src>,
    dataset: DatasetKind,
    location: String,
    generation: u64,
    tx: mpsc::UnboundedSender<ViewerEvent>,
) {
    let event = match fetch_dataset(source.as_ref(), dataset, &location, generation).await {
        Ok(event) => event,
        Err(error) => ViewerEvent::LoadFailed {
            dataset,
            generation,
            error,
        },
    };
    if tx.send(event).is_err() {
        debug!(%dataset, generation, "viewer is gone, dropping loaded dataset");
    }
}

async fn fetch_dataset<Src: DatasetSource>(
    source: &Src,
    dataset: DatasetKind,
    location: &str,
    generation: u64,
) -> Result<ViewerEvent, TripDataError> {
    let bytes = source
        .fetch(dataset, location)
        .await
        .map_err(|e| TripDataError::fetch(dataset, e))?;

    Ok(match dataset {
        DatasetKind::Trips => {
            let (report, trips) = RevealIndex::from_parsed(parse_trips(&bytes)?);
            ViewerEvent::TripsLoaded {
                generation,
                trips: Arc::from(trips),
                index: report.index,
                skipped: report.skipped.len(),
            }
        }
        DatasetKind::Buildings => ViewerEvent::BuildingsLoaded {
            generation,
            buildings: Arc::from(parse_buildings(&bytes)?),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tripviz_env::{EnvError, TokioContext};

    const TRIPS: &str = r#"[
        {"path": [[-74.0, 40.7], [-74.01, 40.71]], "timestamps": [0, 0], "vendor": 0},
        {"path": [[-74.02, 40.72]], "timestamps": [5000], "vendor": 1},
        {"path": [], "timestamps": [], "vendor": 0}
    ]"#;
    const BUILDINGS: &str = r#"[{"polygon": [[0,0],[0,1],[1,1]], "height": 10}]"#;

    /// Serves fixed payloads; fails trips fetches once `fail_trips_after`
    /// successful ones have been served.
    struct StaticSource {
        trips_fetches: AtomicUsize,
        fail_trips_after: usize,
    }

    impl StaticSource {
        fn new(fail_trips_after: usize) -> Self {
            Self {
                trips_fetches: AtomicUsize::new(0),
                fail_trips_after,
            }
        }
    }

    #[async_trait]
    impl DatasetSource for StaticSource {
        async fn fetch(&self, dataset: DatasetKind, _location: &str) -> Result<Vec<u8>, EnvError> {
            match dataset {
                DatasetKind::Trips => {
                    let n = self.trips_fetches.fetch_add(1, Ordering::SeqCst);
                    if n >= self.fail_trips_after {
                        return Err(EnvError::unavailable("injected"));
                    }
                    Ok(TRIPS.as_bytes().to_vec())
                }
                DatasetKind::Buildings => Ok(BUILDINGS.as_bytes().to_vec()),
            }
        }
    }

    /// Blocks every fetch until released.
    struct GatedSource {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl DatasetSource for GatedSource {
        async fn fetch(&self, _dataset: DatasetKind, _location: &str) -> Result<Vec<u8>, EnvError> {
            self.gate.notified().await;
            Ok(b"[]".to_vec())
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        frames: Arc<Mutex<Vec<Frame>>>,
        scenes: Arc<Mutex<Vec<Scene>>>,
    }

    impl Recorder {
        fn frame_count(&self) -> usize {
            self.frames.lock().unwrap().len()
        }

        fn last_frame(&self) -> Option<Frame> {
            self.frames.lock().unwrap().last().cloned()
        }
    }

    impl Renderer for Recorder {
        fn update_scene(&mut self, scene: &Scene) {
            self.scenes.lock().unwrap().push(scene.clone());
        }

        fn present(&mut self, frame: Frame) {
            self.frames.lock().unwrap().push(frame);
        }
    }

    fn fast_context() -> Arc<TokioContext> {
        Arc::new(TokioContext::with_frame_interval(Duration::from_millis(1)))
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..2000 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("condition not reached in time");
    }

    #[test]
    fn test_new_rejects_invalid_clock() {
        let mut config = ViewerConfig::default();
        config.clock.animation_speed = 0.0;
        let result = Viewer::new(
            fast_context(),
            Arc::new(StaticSource::new(usize::MAX)),
            Recorder::default(),
            config,
        );
        assert!(matches!(result, Err(ConfigError::InvalidClock { .. })));
    }

    #[tokio::test]
    async fn test_manual_drive_loads_and_composes() {
        let mut viewer = Viewer::new(
            fast_context(),
            Arc::new(StaticSource::new(usize::MAX)),
            Recorder::default(),
            ViewerConfig::default(),
        )
        .unwrap();

        let frame = viewer.compose_frame();
        assert_eq!(frame.layers.len(), 4);
        assert_eq!(frame.revealed_count(), 0);

        viewer.request_load();
        let mut applied = 0;
        while applied < 2 {
            tokio::task::yield_now().await;
            applied += viewer.pump_events();
        }

        assert!(viewer.filter().is_loaded());
        assert_eq!(viewer.datasets().trips.len(), 3);
        assert_eq!(viewer.datasets().buildings.len(), 1);
        assert_eq!(viewer.summary().skipped_records, 1);

        // Trip 0 ends at t=0 and is always revealed; trip 1 ends past the loop
        let frame = viewer.compose_frame();
        assert_eq!(frame.number, 1);
        assert_eq!(frame.revealed_count(), 1);
        assert!(frame.current_time >= 0.0 && frame.current_time < 1800.0);
        assert_eq!(frame.layer("trips").unwrap().data_len(), 3);
    }

    #[tokio::test]
    async fn test_stop_prevents_further_frames() {
        let recorder = Recorder::default();
        let viewer = Viewer::new(
            fast_context(),
            Arc::new(StaticSource::new(usize::MAX)),
            recorder.clone(),
            ViewerConfig::default(),
        )
        .unwrap();

        let handle = viewer.start();
        wait_until(|| recorder.frame_count() >= 5).await;
        assert!(handle.is_running());

        let summary = handle.stop().await;
        let after_stop = recorder.frame_count();
        assert_eq!(summary.frames_presented as usize, after_stop);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(recorder.frame_count(), after_stop);
    }

    #[tokio::test]
    async fn test_frames_are_numbered_and_in_range() {
        let recorder = Recorder::default();
        let handle = Viewer::new(
            fast_context(),
            Arc::new(StaticSource::new(usize::MAX)),
            recorder.clone(),
            ViewerConfig::default(),
        )
        .unwrap()
        .start();

        wait_until(|| recorder.frame_count() >= 10).await;
        handle.stop().await;

        let frames = recorder.frames.lock().unwrap();
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.number, i as u64);
            assert!(frame.current_time >= 0.0 && frame.current_time < 1800.0);
            assert_eq!(frame.layers.len(), 4);
        }
        assert_eq!(recorder.scenes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_index() {
        let recorder = Recorder::default();
        let handle = Viewer::new(
            fast_context(),
            Arc::new(StaticSource::new(1)),
            recorder.clone(),
            ViewerConfig::default(),
        )
        .unwrap()
        .start();

        wait_until(|| recorder.last_frame().map_or(false, |f| f.revealed_count() == 1)).await;
        assert!(handle.reload());

        let before = recorder.frame_count();
        wait_until(|| recorder.frame_count() >= before + 20).await;
        let summary = handle.stop().await;

        assert_eq!(summary.trips_loads, 1);
        assert_eq!(summary.failed_loads, 1);
        assert_eq!(recorder.last_frame().unwrap().revealed_count(), 1);
    }

    #[tokio::test]
    async fn test_teardown_abandons_in_flight_loads() {
        let gate = Arc::new(Notify::new());
        let recorder = Recorder::default();
        let handle = Viewer::new(
            fast_context(),
            Arc::new(GatedSource { gate: Arc::clone(&gate) }),
            recorder.clone(),
            ViewerConfig::default(),
        )
        .unwrap()
        .start();

        wait_until(|| recorder.frame_count() >= 3).await;
        let summary = handle.stop().await;
        assert_eq!(summary.abandoned_loads, 2);
        assert_eq!(summary.trips_loads, 0);

        // Releasing the gate after teardown must not wake anything up
        gate.notify_waiters();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(recorder.frame_count() as u64, summary.frames_presented);
    }

    #[tokio::test]
    async fn test_loader_after_viewer_gone_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        load_dataset(
            Arc::new(StaticSource::new(usize::MAX)),
            DatasetKind::Trips,
            "trips.json".to_string(),
            1,
            tx,
        )
        .await;
    }

    #[tokio::test]
    async fn test_stale_generation_is_ignored() {
        let mut viewer = Viewer::new(
            fast_context(),
            Arc::new(StaticSource::new(usize::MAX)),
            Recorder::default(),
            ViewerConfig::default(),
        )
        .unwrap();

        let (fresh, _) = RevealIndex::from_parsed(parse_trips(TRIPS.as_bytes()).unwrap());
        viewer.handle_event(ViewerEvent::TripsLoaded {
            generation: 2,
            trips: Arc::from(Vec::new()),
            index: fresh.index,
            skipped: 0,
        });
        viewer.handle_event(ViewerEvent::TripsLoaded {
            generation: 1,
            trips: Arc::from(Vec::new()),
            index: Arc::new(RevealIndex::default()),
            skipped: 0,
        });

        assert_eq!(viewer.summary().stale_loads_ignored, 1);
        assert_eq!(viewer.filter().index().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_failure_is_ignored() {
        let mut viewer = Viewer::new(
            fast_context(),
            Arc::new(StaticSource::new(usize::MAX)),
            Recorder::default(),
            ViewerConfig::default(),
        )
        .unwrap();

        viewer.handle_event(ViewerEvent::TripsLoaded {
            generation: 2,
            trips: Arc::from(Vec::new()),
            index: Arc::new(RevealIndex::default()),
            skipped: 0,
        });
        viewer.handle_event(ViewerEvent::LoadFailed {
            dataset: DatasetKind::Trips,
            generation: 1,
            error: TripDataError::fetch(DatasetKind::Trips, EnvError::unavailable("late")),
        });

        assert_eq!(viewer.summary().failed_loads, 0);
        assert_eq!(viewer.summary().stale_loads_ignored, 1);
        assert!(viewer.last_error().is_none());

        // a failure of the current generation still counts
        viewer.handle_event(ViewerEvent::LoadFailed {
            dataset: DatasetKind::Trips,
            generation: 2,
            error: TripDataError::fetch(DatasetKind::Trips, EnvError::unavailable("now")),
        });
        assert_eq!(viewer.summary().failed_loads, 1);
        assert!(viewer.last_error().is_some());
    }

    #[tokio::test]
    async fn test_fit_view_updates_scene() {
        let recorder = Recorder::default();
        let mut config = ViewerConfig::default();
        config.fit_view_to_trips = true;
        let mut viewer = Viewer::new(
            fast_context(),
            Arc::new(StaticSource::new(usize::MAX)),
            recorder.clone(),
            config,
        )
        .unwrap();

        let (report, trips) = RevealIndex::from_parsed(parse_trips(TRIPS.as_bytes()).unwrap());
        viewer.handle_event(ViewerEvent::TripsLoaded {
            generation: 1,
            trips: Arc::from(trips),
            index: report.index,
            skipped: 1,
        });

        let scenes = recorder.scenes.lock().unwrap();
        assert_eq!(scenes.len(), 1);
        assert!((scenes[0].view.longitude - -74.01).abs() < 1e-9);
        assert!((scenes[0].view.latitude - 40.71).abs() < 1e-9);
    }
}
