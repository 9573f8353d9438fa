//! LeapMotion hand detector (feature = "leap").
//!
//! Requires the `leap` feature flag and the LeapC shared library installed.
//!
//! The LeapC connection never leaves the poll thread that opens it.  `init`
//! starts that thread and waits for the connection to come up; the thread
//! then forwards each tracking frame as plain [`Hand`] data over a channel,
//! and `detect` picks up the newest one.  `dispose` stops and joins it.
//!
//! Leap reports joints in millimetres above the device.  They are mapped
//! into the same normalised image-style space a camera detector uses
//! (x, y in `[0, 1]`, y growing downward) so the extraction thresholds
//! keep their meaning:
//!
//! * x: −200 mm … +200 mm → 0 … 1
//! * y: 450 mm … 50 mm above the device → 0 … 1
//!
//! Each digit contributes four landmarks (MCP, PIP, DIP, tip); the wrist is
//! taken as the mean of the metacarpal bases.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use leaprs::*;

use particle_morph::gesture::{FINGER_BASES, FINGER_TIPS, LANDMARKS_PER_HAND};
use particle_morph::{Detection, DetectorError, GestureSample, Hand, HandDetector, Landmark};

const HALF_WIDTH_MM: f32 = 200.0;
const FLOOR_MM:      f32 = 50.0;
const SPAN_MM:       f32 = 400.0;
const POLL_MS:       u64 = 100;

/// How long `init` waits for the service to answer.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// How long `detect` waits for a tracking frame before reporting none.
const FRAME_WAIT: Duration = Duration::from_millis(20);

struct PollThread {
    stop_tx:  Sender<()>,
    frame_rx: Receiver<Vec<Hand>>,
    handle:   JoinHandle<()>,
}

#[derive(Default)]
pub struct LeapDetector {
    poll: Option<PollThread>,
}

impl LeapDetector {
    pub fn new() -> Self { LeapDetector { poll: None } }
}

impl HandDetector for LeapDetector {
    fn name(&self) -> &str { "LeapMotion" }

    fn init(&mut self) -> Result<(), DetectorError> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), DetectorError>>();
        let (frame_tx, frame_rx) = mpsc::channel::<Vec<Hand>>();
        let (stop_tx, stop_rx)   = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("leap-poll".to_string())
            .spawn(move || poll_thread(ready_tx, frame_tx, stop_rx))
            .map_err(|e| DetectorError::Device(format!("could not start Leap poll thread: {}", e)))?;

        let ready = ready_rx.recv_timeout(CONNECT_TIMEOUT).unwrap_or_else(|_| {
            Err(DetectorError::CameraUnavailable("LeapC service did not answer".into()))
        });
        if let Err(e) = ready {
            let _ = stop_tx.send(());
            let _ = handle.join();
            return Err(e);
        }

        log::info!("[leap] connection open");
        self.poll = Some(PollThread { stop_tx, frame_rx, handle });
        Ok(())
    }

    fn detect(&mut self, _timestamp_ms: u64) -> Detection {
        let poll = match self.poll.as_ref() {
            Some(p) => p,
            None    => return Detection::Lost(DetectorError::Device("not initialised".into())),
        };

        let mut hands = match poll.frame_rx.recv_timeout(FRAME_WAIT) {
            Ok(h) => h,
            Err(RecvTimeoutError::Timeout) => return Detection::NoFrame,
            Err(RecvTimeoutError::Disconnected) => {
                return Detection::Lost(DetectorError::Device("Leap poll thread exited".into()));
            }
        };
        // Latest frame wins.
        while let Ok(newer) = poll.frame_rx.try_recv() {
            hands = newer;
        }
        Detection::Sample(GestureSample::new(hands))
    }

    fn dispose(&mut self) {
        if let Some(poll) = self.poll.take() {
            let _ = poll.stop_tx.send(());
            if poll.handle.join().is_err() {
                log::error!("[leap] poll thread panicked");
            }
            log::info!("[leap] connection closed");
        }
    }
}

/// Owns the LeapC connection for its whole life.
fn poll_thread(
    ready_tx: Sender<Result<(), DetectorError>>,
    frame_tx: Sender<Vec<Hand>>,
    stop_rx:  Receiver<()>,
) {
    let mut connection = match Connection::create(ConnectionConfig::default()) {
        Ok(c)  => c,
        Err(e) => {
            let _ = ready_tx.send(Err(DetectorError::ModelLoad(format!("LeapC tracking service: {:?}", e))));
            return;
        }
    };
    if let Err(e) = connection.open() {
        let _ = ready_tx.send(Err(DetectorError::CameraUnavailable(format!("LeapMotion device: {:?}", e))));
        return;
    }
    if ready_tx.send(Ok(())).is_err() { return; }

    loop {
        match stop_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        let msg = match connection.poll(POLL_MS) {
            Ok(m)  => m,
            Err(_) => continue,
        };

        if let Event::Tracking(frame) = msg.event() {
            let hands: Vec<Hand> = frame.hands()
                .filter_map(|h| to_landmarks(&h))
                .take(2)
                .collect();
            if frame_tx.send(hands).is_err() { break; }
        }
    }
}

fn normalise(x: f32, y: f32, z: f32) -> Landmark {
    Landmark {
        x: (x + HALF_WIDTH_MM) / SPAN_MM,
        y: 1.0 - (y - FLOOR_MM) / SPAN_MM,
        z: z / SPAN_MM,
    }
}

fn to_landmarks(hand: &leaprs::Hand) -> Option<Hand> {
    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < FINGER_BASES.len() { return None; }

    let mut lm = [Landmark::default(); LANDMARKS_PER_HAND];
    let (mut wx, mut wy, mut wz) = (0.0, 0.0, 0.0);
    let n = FINGER_BASES.len() as f32;

    for (digit, (&base, &tip_idx)) in digits.iter().zip(FINGER_BASES.iter().zip(FINGER_TIPS.iter())) {
        let root = digit.metacarpal().prev_joint();
        let mcp  = digit.metacarpal().next_joint();
        let dip  = digit.distal().prev_joint();
        let tip  = digit.distal().next_joint();
        wx += root.x / n;
        wy += root.y / n;
        wz += root.z / n;

        lm[base]     = normalise(mcp.x, mcp.y, mcp.z);
        lm[base + 1] = normalise((mcp.x + dip.x) / 2.0, (mcp.y + dip.y) / 2.0, (mcp.z + dip.z) / 2.0);
        lm[base + 2] = normalise(dip.x, dip.y, dip.z);
        lm[tip_idx]  = normalise(tip.x, tip.y, tip.z);
    }
    lm[0] = normalise(wx, wy, wz);

    Some(Hand::new(lm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_volume_maps_onto_the_unit_square() {
        let low_left = normalise(-HALF_WIDTH_MM, FLOOR_MM, 0.0);
        assert!((low_left.x - 0.0).abs() < 1e-6 && (low_left.y - 1.0).abs() < 1e-6);
        let high_right = normalise(HALF_WIDTH_MM, FLOOR_MM + SPAN_MM, 0.0);
        assert!((high_right.x - 1.0).abs() < 1e-6 && high_right.y.abs() < 1e-6);
    }

    #[test]
    fn detector_holds_only_thread_safe_state() {
        fn assert_send<T: Send + 'static>() {}
        assert_send::<LeapDetector>();
    }

    #[test]
    fn uninitialised_detector_reports_lost_and_disposes_cleanly() {
        let mut det = LeapDetector::new();
        assert!(matches!(det.detect(0), Detection::Lost(_)));
        det.dispose();
        det.dispose();
    }
}
