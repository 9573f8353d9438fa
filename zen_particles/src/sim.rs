//! Simulated hand detector — keyboard and mouse stand in for a camera.
//!
//! The visualizer forwards raw input as [`SimInput`] over a channel; the
//! [`SimDetector`] folds it into a [`SimHands`] pose and, once per simulated
//! video frame, synthesises a full 21-landmark [`GestureSample`].  The
//! sample then goes through exactly the same extraction as real detector
//! output, so the simulation exercises the whole signal path.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use particle_morph::gesture::{
    FINGER_BASES, INDEX_TIP, JOINTS_PER_FINGER, LANDMARKS_PER_HAND, THUMB_TIP, WRIST,
};
use particle_morph::{Detection, DetectorError, GestureSample, Hand, HandDetector, Landmark};

/// Frame period of the simulated camera (~60 fps).
pub const SIM_FRAME: Duration = Duration::from_millis(16);

/// Pinch distance at full spread with one hand (just past fully open).
const MAX_PINCH: f32 = 0.26;
/// Wrist distances covered by the spread control with two hands.
const MIN_WRIST_GAP: f32 = 0.05;
const MAX_WRIST_GAP: f32 = 0.7;

// ════════════════════════════════════════════════════════════════════════════
// SimInput
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    /// 0 → 1 → 2 → 0 hands in view.
    CycleHands,
    /// Absolute openness in `[0, 1]` (mouse x across the window).
    Spread(f32),
    /// Relative openness change (arrow keys).
    Nudge(f32),
}

// ════════════════════════════════════════════════════════════════════════════
// SimHands — the simulated pose
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct SimHands {
    pub hands:  usize,
    /// 0 = closed / pinched, 1 = open / spread.
    pub spread: f32,
}

impl Default for SimHands {
    fn default() -> Self { SimHands { hands: 1, spread: 0.5 } }
}

impl SimHands {
    pub fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::CycleHands => self.hands = (self.hands + 1) % 3,
            SimInput::Spread(s)  => self.spread = s.clamp(0.0, 1.0),
            SimInput::Nudge(d)   => self.spread = (self.spread + d).clamp(0.0, 1.0),
        }
    }

    /// What a camera would report for this pose.
    pub fn sample(&self) -> GestureSample {
        match self.hands {
            0 => GestureSample::none(),
            1 => {
                let pinch = self.spread * MAX_PINCH;
                GestureSample::new(vec![synth_hand(0.5, pinch, false)])
            }
            _ => {
                let gap = MIN_WRIST_GAP + self.spread * (MAX_WRIST_GAP - MIN_WRIST_GAP);
                GestureSample::new(vec![
                    synth_hand(0.5 - gap / 2.0, 0.08, true),
                    synth_hand(0.5 + gap / 2.0, 0.08, false),
                ])
            }
        }
    }
}

/// An upright hand with its wrist at `(wrist_x, 0.8)` and the thumb and
/// index tips `pinch` apart.  `mirrored` flips it left/right.
fn synth_hand(wrist_x: f32, pinch: f32, mirrored: bool) -> Hand {
    let side = if mirrored { -1.0 } else { 1.0 };
    let wrist = Landmark::new(wrist_x, 0.8);
    let mut lm = [wrist; LANDMARKS_PER_HAND];

    // Five fingers fanned upward.
    for (finger, &base) in FINGER_BASES.iter().enumerate() {
        let angle = (-0.9 + finger as f32 * 0.35) * side;
        let reach = if finger == 0 { 0.045 } else { 0.055 };
        for joint in 0..JOINTS_PER_FINGER {
            let d = reach * (joint + 1) as f32;
            lm[base + joint] = Landmark::new(
                wrist_x + angle.sin() * d,
                0.8 - angle.cos() * d,
            );
        }
    }

    // Pinch tips sit symmetric about a point in front of the palm.
    let centre = Landmark::new(wrist_x - 0.03 * side, 0.62);
    lm[THUMB_TIP] = Landmark::new(centre.x - pinch / 2.0 * side, centre.y);
    lm[INDEX_TIP] = Landmark::new(centre.x + pinch / 2.0 * side, centre.y);
    lm[WRIST] = wrist;
    Hand::new(lm)
}

// ════════════════════════════════════════════════════════════════════════════
// SimDetector
// ════════════════════════════════════════════════════════════════════════════

pub struct SimDetector {
    rx:    Receiver<SimInput>,
    hands: SimHands,
    frame: Duration,
}

impl SimDetector {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimDetector { rx, hands: SimHands::default(), frame: SIM_FRAME }
    }

    pub fn with_frame(mut self, frame: Duration) -> Self {
        self.frame = frame;
        self
    }
}

impl HandDetector for SimDetector {
    fn name(&self) -> &str { "simulated camera" }

    fn init(&mut self) -> Result<(), DetectorError> {
        log::info!("[sim] keyboard/mouse hand simulation ready (H = hands, mouse x = spread)");
        Ok(())
    }

    fn detect(&mut self, _timestamp_ms: u64) -> Detection {
        // Wait out one frame period, folding in whatever input arrives.
        match self.rx.recv_timeout(self.frame) {
            Ok(input) => {
                self.hands.apply(input);
                while let Ok(more) = self.rx.try_recv() {
                    self.hands.apply(more);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return Detection::Lost(DetectorError::Device("simulation window closed".into()));
            }
        }
        Detection::Sample(self.hands.sample())
    }

    fn dispose(&mut self) {
        log::info!("[sim] simulated camera released");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
