//! Top-level application state.
//!
//! `AppState` owns the [`MorphAnimator`] and the particle colour, reads the
//! shared interaction cell every frame, and is the only place the control
//! surface (`set_shape`, `set_color`) touches the engine.  [`run`] wires it
//! to the window and the gesture tracker.

use std::sync::mpsc;
use std::sync::Arc;

use particle_morph::{
    HandDetector, Interaction, InteractionCell, MorphAnimator, Rgb, ShapeGenerator, ShapeKind,
    Tracker, TrackerConfig, TrackerEvent, UnavailableDetector, DEFAULT_COLOR,
    DEFAULT_PARTICLE_COUNT,
};
use thiserror::Error;

use crate::canvas::RenderStyle;
use crate::palette;
use crate::sim::{SimDetector, SimInput};
use crate::visualizer::{Control, Frame, Visualizer, WIN_H, WIN_W};

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum AppError {
    #[error("window error: {0}")]
    Window(String),
}

impl From<minifb::Error> for AppError {
    fn from(e: minifb::Error) -> Self { AppError::Window(e.to_string()) }
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where hand landmarks come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorKind {
    /// Keyboard + mouse simulation.
    Simulated,
    /// LeapMotion controller (needs the `leap` feature).
    Leap,
    /// No hand tracking; interaction stays neutral.
    Disabled,
}

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub particle_count: usize,
    /// Shape the cloud morphs into at start-up (it is seeded as a sphere).
    pub initial_shape:  ShapeKind,
    pub color:          Rgb,
    pub style:          RenderStyle,
    pub detector:       DetectorKind,
    pub tracker:        TrackerConfig,
    /// Fixed seed for the shape generators; `None` = entropy.
    pub seed:           Option<u64>,
    pub window_width:   usize,
    pub window_height:  usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            particle_count: DEFAULT_PARTICLE_COUNT,
            initial_shape:  ShapeKind::Heart,
            color:          DEFAULT_COLOR,
            style:          RenderStyle::default(),
            detector:       if cfg!(feature = "leap") { DetectorKind::Leap } else { DetectorKind::Simulated },
            tracker:        TrackerConfig::default(),
            seed:           None,
            window_width:   WIN_W,
            window_height:  WIN_H,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tracking status
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum TrackingStatus {
    Starting,
    Active,
    /// The detector failed or went away; interaction is neutral for good.
    Unavailable(String),
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    animator: MorphAnimator,
    color:    Rgb,
    cell:     Arc<InteractionCell>,
    tracking: TrackingStatus,
    /// Interaction read at the last tick.
    interaction: Interaction,
}

impl AppState {
    pub fn new(cfg: &AppConfig, cell: Arc<InteractionCell>) -> Self {
        let generator = match cfg.seed {
            Some(seed) => ShapeGenerator::seeded(seed),
            None       => ShapeGenerator::new(),
        };
        let mut animator = MorphAnimator::with_generator(generator, cfg.particle_count, ShapeKind::Sphere);
        if cfg.initial_shape != ShapeKind::Sphere {
            animator.set_target_shape(cfg.initial_shape);
        }

        AppState {
            animator,
            color:       cfg.color,
            cell,
            tracking:    TrackingStatus::Starting,
            interaction: Interaction::NEUTRAL,
        }
    }

    // ── Control surface ───────────────────────────────────────────────────

    /// Select a shape.  Re-selecting the current shape does nothing.
    pub fn set_shape(&mut self, kind: ShapeKind) {
        if kind == self.animator.shape() { return; }
        log::info!("[app] shape → {}", kind);
        self.animator.set_target_shape(kind);
    }

    /// Set the particle colour from a `#rrggbb` string.  Invalid strings are
    /// logged and ignored.
    pub fn set_color(&mut self, hex: &str) {
        match Rgb::from_hex(hex) {
            Ok(c) if c == self.color => {}
            Ok(c) => {
                log::info!("[app] colour → {}", c);
                self.color = c;
            }
            Err(e) => log::warn!("[app] {}", e),
        }
    }

    // ── Tracker lifecycle ─────────────────────────────────────────────────

    pub fn handle_tracker_event(&mut self, event: TrackerEvent) {
        match event {
            TrackerEvent::Ready { detector } => {
                log::info!("[app] hand tracking via {}", detector);
                self.tracking = TrackingStatus::Active;
            }
            TrackerEvent::InitFailed(e) | TrackerEvent::Lost(e) => {
                self.tracking = TrackingStatus::Unavailable(e.to_string());
            }
            TrackerEvent::Stopped => {
                if self.tracking != TrackingStatus::Active { return; }
                self.tracking = TrackingStatus::Unavailable("tracking stopped".to_string());
            }
        }
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    /// Read the latest interaction, retarget the scale, advance the morph.
    pub fn tick(&mut self) {
        self.interaction = match self.tracking {
            TrackingStatus::Unavailable(_) => Interaction::NEUTRAL,
            _ => self.cell.load(),
        };
        self.animator.apply_interaction(self.interaction.factor);
        self.animator.step();
    }

    /// One-line status for the header pill.
    pub fn status_line(&self) -> String {
        match &self.tracking {
            TrackingStatus::Unavailable(reason) => format!("No hand tracking: {}", reason),
            _ if self.interaction.detected => {
                format!("Hands Active ({}%)", (self.interaction.factor * 100.0).round() as u32)
            }
            _ => "Detecting Hands...".to_string(),
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn positions(&self)   -> &[f32]          { self.animator.rendered() }
    pub fn shape(&self)       -> ShapeKind        { self.animator.shape() }
    pub fn color(&self)       -> Rgb              { self.color }
    pub fn interaction(&self) -> Interaction      { self.interaction }
    pub fn tracking(&self)    -> &TrackingStatus  { &self.tracking }
    pub fn animator(&self)    -> &MorphAnimator   { &self.animator }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

fn make_detector(kind: DetectorKind, sim_rx: mpsc::Receiver<SimInput>) -> Box<dyn HandDetector> {
    match kind {
        DetectorKind::Simulated => Box::new(SimDetector::new(sim_rx)),
        #[cfg(feature = "leap")]
        DetectorKind::Leap => Box::new(crate::leap::LeapDetector::new()),
        #[cfg(not(feature = "leap"))]
        DetectorKind::Leap => Box::new(UnavailableDetector::new("built without the `leap` feature")),
        DetectorKind::Disabled => Box::new(UnavailableDetector::new("hand tracking disabled")),
    }
}

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It opens the window,
/// starts the gesture tracker (simulation by default, hardware with
/// `--features leap`), and drives the render loop at ~60 fps.  The render
/// loop never waits for the tracker: until the detector is up (or if it
/// never comes up) the cloud runs at neutral interaction.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    // ── Sim input channel ─────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    // ── Visualizer (owns the window and the sim input sender) ─────────────
    let mut vis = Visualizer::new(sim_tx, cfg.window_width, cfg.window_height, cfg.style)?;

    // ── Gesture tracker ───────────────────────────────────────────────────
    let cell = Arc::new(InteractionCell::new());
    let mut tracker = Tracker::spawn(make_detector(cfg.detector, sim_rx), Arc::clone(&cell), cfg.tracker);

    // ── App state ─────────────────────────────────────────────────────────
    let mut app = AppState::new(&cfg, cell);

    // ── Main loop ─────────────────────────────────────────────────────────
    let mut result = Ok(());
    'frames: while vis.is_open() {
        // 1. Controls
        for control in vis.poll_input() {
            match control {
                Control::Quit => break 'frames,
                Control::SetShape(kind) => app.set_shape(kind),
                Control::NextColor => {
                    let next = palette::next_preset(app.color());
                    app.set_color(next);
                }
            }
        }

        // 2. Tracker lifecycle
        for event in tracker.drain_events() {
            app.handle_tracker_event(event);
        }

        // 3. Per-frame logic
        app.tick();

        // 4. Render
        let status = app.status_line();
        let frame = Frame {
            positions: app.positions(),
            color:     app.color(),
            shape:     app.shape(),
            status:    &status,
            detected:  app.interaction().detected,
        };
        if let Err(e) = vis.render(&frame) {
            result = Err(e);
            break;
        }
    }

    // Teardown: stop sampling (releases the detector's device) before the
    // window goes away.
    tracker.stop();
    drop(vis);
    log::info!("[app] session ended");
    result
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use particle_morph::DetectorError;

    fn make_app() -> (AppState, Arc<InteractionCell>) {
        let cfg = AppConfig { particle_count: 600, seed: Some(17), ..AppConfig::default() };
        let cell = Arc::new(InteractionCell::new());
        (AppState::new(&cfg, Arc::clone(&cell)), cell)
    }

    #[test]
    fn starts_morphing_toward_the_initial_shape() {
        let (app, _) = make_app();
        assert_eq!(app.shape(), ShapeKind::Heart);
        assert_eq!(app.positions().len(), 3 * 600);
        assert_ne!(app.animator().base(), app.animator().target());
    }

    #[test]
    fn reselecting_the_current_shape_keeps_the_target() {
        let (mut app, _) = make_app();
        let before = app.animator().target().to_vec();
        app.set_shape(ShapeKind::Heart);
        assert_eq!(app.animator().target(), &before[..]);
    }

    #[test]
    fn selecting_a_new_shape_regenerates_the_target() {
        let (mut app, _) = make_app();
        let before = app.animator().target().to_vec();
        app.set_shape(ShapeKind::Saturn);
        assert_eq!(app.shape(), ShapeKind::Saturn);
        assert_ne!(app.animator().target(), &before[..]);
    }

    #[test]
    fn colour_updates_and_ignores_garbage() {
        let (mut app, _) = make_app();
        assert_eq!(app.color(), DEFAULT_COLOR);
        app.set_color("#ff6b9d");
        assert_eq!(app.color(), Rgb::new(0xff, 0x6b, 0x9d));
        app.set_color("not a colour");
        assert_eq!(app.color(), Rgb::new(0xff, 0x6b, 0x9d));
        app.set_color("#FF6B9D");
        assert_eq!(app.color(), Rgb::new(0xff, 0x6b, 0x9d));
    }

    #[test]
    fn tick_follows_the_shared_cell() {
        let (mut app, cell) = make_app();
        app.handle_tracker_event(TrackerEvent::Ready { detector: "test".into() });
        cell.store(Interaction { factor: 1.0, detected: true });
        app.tick();
        assert_eq!(app.animator().scale().target, 3.0);
        assert_eq!(app.status_line(), "Hands Active (100%)");

        cell.store(Interaction { factor: 0.0, detected: true });
        app.tick();
        assert!((app.animator().scale().target - 0.2).abs() < 1e-6);
    }

    #[test]
    fn waiting_for_hands_reads_neutral() {
        let (mut app, _) = make_app();
        app.tick();
        assert_eq!(app.interaction(), Interaction::NEUTRAL);
        assert_eq!(app.animator().scale().target, 1.0);
        assert_eq!(app.status_line(), "Detecting Hands...");
    }

    #[test]
    fn detector_failure_degrades_to_neutral() {
        let (mut app, cell) = make_app();
        app.handle_tracker_event(TrackerEvent::InitFailed(
            DetectorError::CameraUnavailable("permission denied".into()),
        ));
        app.handle_tracker_event(TrackerEvent::Stopped);
        // Even a stale value in the cell is ignored once tracking is gone.
        cell.store(Interaction { factor: 0.0, detected: true });
        for _ in 0..10 { app.tick(); }
        assert_eq!(app.animator().scale().target, 1.0);
        assert!(app.status_line().contains("permission denied"));
        assert!(matches!(app.tracking(), TrackingStatus::Unavailable(_)));
    }

    #[test]
    fn missing_tracking_service_is_reported_in_the_status() {
        let (mut app, _) = make_app();
        app.handle_tracker_event(TrackerEvent::InitFailed(
            DetectorError::ModelLoad("service not running".into()),
        ));
        app.tick();
        assert_eq!(app.status_line(), "No hand tracking: hand model failed to load: service not running");
        assert_eq!(app.interaction(), Interaction::NEUTRAL);
    }

    #[test]
    fn disabled_detector_reports_through_the_tracker() {
        let (_tx, rx) = mpsc::channel();
        let cell = Arc::new(InteractionCell::new());
        let tracker = Tracker::spawn(
            make_detector(DetectorKind::Disabled, rx),
            Arc::clone(&cell),
            TrackerConfig::default(),
        );
        let (mut app, _) = make_app();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !matches!(app.tracking(), TrackingStatus::Unavailable(_))
            && std::time::Instant::now() < deadline
        {
            for e in tracker.drain_events() { app.handle_tracker_event(e); }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert_eq!(
            app.tracking(),
            &TrackingStatus::Unavailable("camera unavailable: hand tracking disabled".into())
        );
    }

    #[test]
    fn rendered_cloud_settles_on_the_selected_shape() {
        let (mut app, _) = make_app();
        app.set_shape(ShapeKind::Sphere);
        for _ in 0..300 { app.tick(); }
        for p in app.positions().chunks_exact(3) {
            let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((r - 12.0).abs() < 0.01, "r = {}", r);
        }
    }
}
