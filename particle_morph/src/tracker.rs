//! The gesture-sampling loop.
//!
//! A [`Tracker`] runs a [`HandDetector`] on its own thread: initialise,
//! then repeatedly detect → [`extract`] → smooth → store into the shared
//! [`InteractionCell`].  The render loop never waits on it; it just reads
//! the cell.  Lifecycle changes come back over a channel and can be drained
//! once per frame.
//!
//! Dropping the `Tracker` (or calling [`Tracker::stop`]) stops the thread
//! and waits for it, and the thread always disposes its detector on the
//! way out, so no device handle outlives the session.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::detector::{Detection, HandDetector};
use crate::error::DetectorError;
use crate::gesture::{extract, FactorSmoother, Interaction, FACTOR_SMOOTHING};
use crate::shared::InteractionCell;

// ════════════════════════════════════════════════════════════════════════════
// Config / messages
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerConfig {
    /// EMA rate applied to raw factors.
    pub smoothing:     f32,
    /// Pause after a `NoFrame` before asking the detector again.
    pub idle_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            smoothing:     FACTOR_SMOOTHING,
            idle_interval: Duration::from_millis(5),
        }
    }
}

enum TrackerCommand {
    Stop,
}

/// Reported by the tracker thread.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackerEvent {
    /// `init` succeeded; sampling has started.
    Ready { detector: String },
    /// `init` failed.  Interaction stays neutral for the rest of the session.
    InitFailed(DetectorError),
    /// The device disappeared mid-session.
    Lost(DetectorError),
    /// The thread has disposed its detector and exited.
    Stopped,
}

// ════════════════════════════════════════════════════════════════════════════
// Tracker — handle to the sampling thread
// ════════════════════════════════════════════════════════════════════════════

pub struct Tracker {
    cmd_tx:   Sender<TrackerCommand>,
    event_rx: Receiver<TrackerEvent>,
    handle:   Option<JoinHandle<()>>,
}

impl Tracker {
    /// Start sampling `detector` into `cell`.  Initialisation happens on
    /// the new thread, so this returns immediately.
    pub fn spawn<D: HandDetector>(detector: D, cell: Arc<InteractionCell>, config: TrackerConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<TrackerCommand>();
        let (event_tx, event_rx) = mpsc::channel::<TrackerEvent>();

        let handle = thread::Builder::new()
            .name("gesture-tracker".to_string())
            .spawn(move || tracker_thread(detector, cell, config, cmd_rx, event_tx));

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                log::error!("[tracker] could not start sampling thread: {}", e);
                None
            }
        };

        Tracker { cmd_tx, event_rx, handle }
    }

    /// Drain pending lifecycle events (non-blocking).
    pub fn drain_events(&self) -> Vec<TrackerEvent> {
        let mut out = Vec::new();
        while let Ok(e) = self.event_rx.try_recv() { out.push(e); }
        out
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Ask the thread to stop and wait for it to dispose its detector.
    pub fn stop(&mut self) {
        let _ = self.cmd_tx.send(TrackerCommand::Stop);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("[tracker] sampling thread panicked");
            }
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) { self.stop(); }
}

// ════════════════════════════════════════════════════════════════════════════
// tracker_thread — the actual loop
// ════════════════════════════════════════════════════════════════════════════

fn tracker_thread<D: HandDetector>(
    mut detector: D,
    cell:         Arc<InteractionCell>,
    config:       TrackerConfig,
    cmd_rx:       Receiver<TrackerCommand>,
    event_tx:     Sender<TrackerEvent>,
) {
    let name = detector.name().to_string();

    if let Err(e) = detector.init() {
        log::error!("[tracker] {} failed to initialise: {}; interaction stays neutral", name, e);
        cell.reset();
        detector.dispose();
        let _ = event_tx.send(TrackerEvent::InitFailed(e));
        let _ = event_tx.send(TrackerEvent::Stopped);
        return;
    }

    log::info!("[tracker] {} ready", name);
    let _ = event_tx.send(TrackerEvent::Ready { detector: name.clone() });

    let mut smoother = FactorSmoother::new(config.smoothing);
    let started = Instant::now();

    loop {
        // ── commands ──────────────────────────────────────────────────────
        match cmd_rx.try_recv() {
            Ok(TrackerCommand::Stop) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        // ── one frame ─────────────────────────────────────────────────────
        let timestamp_ms = started.elapsed().as_millis() as u64;
        match detector.detect(timestamp_ms) {
            Detection::Sample(sample) => {
                let raw = extract(&sample);
                let factor = smoother.update(raw.factor);
                log::trace!(
                    "[tracker] hands={} raw={:.3} smoothed={:.3}",
                    sample.hands.len(), raw.factor, factor
                );
                cell.store(Interaction { factor, detected: raw.detected });
            }
            Detection::NoFrame => thread::sleep(config.idle_interval),
            Detection::Lost(e) => {
                log::warn!("[tracker] {} lost: {}", name, e);
                cell.reset();
                let _ = event_tx.send(TrackerEvent::Lost(e));
                break;
            }
        }
    }

    detector.dispose();
    log::info!("[tracker] {} disposed", name);
    let _ = event_tx.send(TrackerEvent::Stopped);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::tests::hand_at;
    use crate::gesture::GestureSample;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Plays back a fixed script, then repeats `idle` forever.
    struct ScriptedDetector {
        fail_init: bool,
        script:    VecDeque<Detection>,
        idle:      Detection,
        disposed:  Arc<AtomicBool>,
    }

    impl ScriptedDetector {
        fn new(script: Vec<Detection>, idle: Detection) -> (Self, Arc<AtomicBool>) {
            let disposed = Arc::new(AtomicBool::new(false));
            let d = ScriptedDetector {
                fail_init: false,
                script: script.into(),
                idle,
                disposed: Arc::clone(&disposed),
            };
            (d, disposed)
        }
    }

    impl HandDetector for ScriptedDetector {
        fn name(&self) -> &str { "scripted" }
        fn init(&mut self) -> Result<(), DetectorError> {
            if self.fail_init {
                Err(DetectorError::CameraUnavailable("denied".into()))
            } else {
                Ok(())
            }
        }
        fn detect(&mut self, _ts: u64) -> Detection {
            thread::sleep(Duration::from_millis(1));
            self.script.pop_front().unwrap_or_else(|| self.idle.clone())
        }
        fn dispose(&mut self) { self.disposed.store(true, Ordering::SeqCst); }
    }

    fn wait_for(tracker: &Tracker, want: impl Fn(&TrackerEvent) -> bool) -> Vec<TrackerEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = Vec::new();
        while Instant::now() < deadline {
            seen.extend(tracker.drain_events());
            if seen.iter().any(&want) { break; }
            thread::sleep(Duration::from_millis(2));
        }
        seen
    }

    fn open_hand() -> Detection {
        Detection::Sample(GestureSample::new(vec![hand_at((0.5, 0.5), 0.3)]))
    }

    #[test]
    fn init_failure_is_reported_and_disposes() {
        let (mut det, disposed) = ScriptedDetector::new(vec![], Detection::NoFrame);
        det.fail_init = true;
        let cell = Arc::new(InteractionCell::new());
        let tracker = Tracker::spawn(det, Arc::clone(&cell), TrackerConfig::default());

        let events = wait_for(&tracker, |e| *e == TrackerEvent::Stopped);
        assert!(matches!(events[0], TrackerEvent::InitFailed(DetectorError::CameraUnavailable(_))));
        assert!(events.contains(&TrackerEvent::Stopped));
        assert!(disposed.load(Ordering::SeqCst));
        assert_eq!(cell.load(), Interaction::NEUTRAL);
    }

    #[test]
    fn samples_are_smoothed_into_the_cell() {
        let (det, disposed) = ScriptedDetector::new(vec![], open_hand());
        let cell = Arc::new(InteractionCell::new());
        let mut tracker = Tracker::spawn(det, Arc::clone(&cell), TrackerConfig::default());

        let events = wait_for(&tracker, |e| matches!(e, TrackerEvent::Ready { .. }));
        assert!(events.contains(&TrackerEvent::Ready { detector: "scripted".into() }));

        let deadline = Instant::now() + Duration::from_secs(5);
        while cell.factor() < 0.99 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        let reading = cell.load();
        assert!(reading.detected);
        assert!(reading.factor >= 0.99 && reading.factor <= 1.0);

        tracker.stop();
        assert!(disposed.load(Ordering::SeqCst));
        assert!(!tracker.is_running());
        assert!(tracker.drain_events().contains(&TrackerEvent::Stopped));
    }

    #[test]
    fn first_sample_moves_only_a_tenth() {
        let script = vec![open_hand()];
        let (det, _) = ScriptedDetector::new(script, Detection::NoFrame);
        let cell = Arc::new(InteractionCell::new());
        let _tracker = Tracker::spawn(det, Arc::clone(&cell), TrackerConfig::default());

        let deadline = Instant::now() + Duration::from_secs(5);
        while !cell.load().detected && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        assert!((cell.factor() - 0.55).abs() < 1e-4);
    }

    #[test]
    fn lost_device_resets_to_neutral() {
        let script = vec![open_hand(), open_hand()];
        let lost = Detection::Lost(DetectorError::Device("unplugged".into()));
        let (det, disposed) = ScriptedDetector::new(script, lost);
        let cell = Arc::new(InteractionCell::new());
        let tracker = Tracker::spawn(det, Arc::clone(&cell), TrackerConfig::default());

        let events = wait_for(&tracker, |e| *e == TrackerEvent::Stopped);
        assert!(events.iter().any(|e| matches!(e, TrackerEvent::Lost(_))));
        assert!(disposed.load(Ordering::SeqCst));
        assert_eq!(cell.load(), Interaction::NEUTRAL);
    }

    #[test]
    fn drop_stops_and_disposes() {
        let (det, disposed) = ScriptedDetector::new(vec![], Detection::NoFrame);
        let cell = Arc::new(InteractionCell::new());
        let tracker = Tracker::spawn(det, cell, TrackerConfig::default());
        wait_for(&tracker, |e| matches!(e, TrackerEvent::Ready { .. }));
        drop(tracker);
        assert!(disposed.load(Ordering::SeqCst));
    }
}
