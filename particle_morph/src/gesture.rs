//! Hand landmarks → interaction factor.
//!
//! A detector reports up to two hands, each as 21 normalised landmarks in
//! the usual hand-pose layout (0 = wrist, 4 = thumb tip, 8 = index tip, …).
//! [`extract`] turns one such sample into a raw openness value in `[0, 1]`;
//! [`FactorSmoother`] damps detector jitter before the value drives the
//! cloud.
//!
//! | Hands | Measure | 0 at | 1 at |
//! |---|---|---|---|
//! | none | — | neutral 0.5 | — |
//! | one | thumb-tip ↔ index-tip (pinch) | 0.02 | ≥ 0.22 |
//! | two | wrist ↔ wrist | 0.1 | ≥ 0.6 |

// ════════════════════════════════════════════════════════════════════════════
// Landmark layout
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARKS_PER_HAND: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_TIP:  usize = 20;

/// Joints per finger, base knuckle to tip.
pub const JOINTS_PER_FINGER: usize = 4;

/// First landmark of each finger, thumb to pinky.
pub const FINGER_BASES: [usize; 5] = [THUMB_CMC, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];
/// Last landmark of each finger, thumb to pinky.
pub const FINGER_TIPS:  [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Factor reported when no hand is visible.
pub const NEUTRAL_FACTOR: f32 = 0.5;

/// EMA rate applied to raw factors before use.
pub const FACTOR_SMOOTHING: f32 = 0.1;

const PINCH_CLOSED: f32 = 0.02;
const PINCH_GAIN:   f32 = 5.0;
const WRISTS_CLOSED: f32 = 0.1;
const WRISTS_GAIN:   f32 = 2.0;

// ════════════════════════════════════════════════════════════════════════════
// Sample types
// ════════════════════════════════════════════════════════════════════════════

/// One normalised keypoint.  `x`, `y` are in image space `[0, 1]`; `z` is
/// relative depth and 0 when the detector does not provide it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0 }
    }

    /// Distance in the image plane; depth is ignored.
    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    pub landmarks: [Landmark; LANDMARKS_PER_HAND],
}

impl Hand {
    pub fn new(landmarks: [Landmark; LANDMARKS_PER_HAND]) -> Self {
        Hand { landmarks }
    }

    /// Build from a detector's landmark list; anything other than exactly
    /// 21 points is rejected.
    pub fn from_slice(points: &[Landmark]) -> Option<Self> {
        let landmarks: [Landmark; LANDMARKS_PER_HAND] = points.try_into().ok()?;
        Some(Hand { landmarks })
    }

    pub fn wrist(&self)     -> &Landmark { &self.landmarks[WRIST] }
    pub fn thumb_tip(&self) -> &Landmark { &self.landmarks[THUMB_TIP] }
    pub fn index_tip(&self) -> &Landmark { &self.landmarks[INDEX_TIP] }

    /// Thumb-tip to index-tip distance.
    pub fn pinch_distance(&self) -> f32 {
        self.thumb_tip().distance_2d(self.index_tip())
    }
}

/// Everything the detector saw in one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GestureSample {
    pub hands: Vec<Hand>,
}

impl GestureSample {
    pub fn none() -> Self { GestureSample::default() }

    pub fn new(hands: Vec<Hand>) -> Self { GestureSample { hands } }
}

/// Result of [`extract`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interaction {
    /// 0 = closed / pinched, 1 = open / spread.
    pub factor:   f32,
    pub detected: bool,
}

impl Interaction {
    pub const NEUTRAL: Interaction = Interaction { factor: NEUTRAL_FACTOR, detected: false };
}

// ════════════════════════════════════════════════════════════════════════════
// Extraction
// ════════════════════════════════════════════════════════════════════════════

/// Raw, unsmoothed interaction for one sample.
///
/// More than two hands never comes from a well-behaved detector; if it
/// does, the first two hands are used.
pub fn extract(sample: &GestureSample) -> Interaction {
    let factor = match sample.hands.as_slice() {
        [] => return Interaction::NEUTRAL,
        [hand] => (hand.pinch_distance() - PINCH_CLOSED) * PINCH_GAIN,
        [first, second, ..] => {
            (first.wrist().distance_2d(second.wrist()) - WRISTS_CLOSED) * WRISTS_GAIN
        }
    };
    Interaction { factor: clamp_unit(factor), detected: true }
}

/// Same as [`extract`], treating a missing sample as "no hands".
pub fn extract_optional(sample: Option<&GestureSample>) -> Interaction {
    sample.map_or(Interaction::NEUTRAL, extract)
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { NEUTRAL_FACTOR } else { v.clamp(0.0, 1.0) }
}

// ════════════════════════════════════════════════════════════════════════════
// FactorSmoother
// ════════════════════════════════════════════════════════════════════════════

/// Exponential moving average over raw factors, starting at neutral.
#[derive(Clone, Debug)]
pub struct FactorSmoother {
    value: f32,
    rate:  f32,
}

impl FactorSmoother {
    pub fn new(rate: f32) -> Self {
        FactorSmoother { value: NEUTRAL_FACTOR, rate: rate.clamp(0.0, 1.0) }
    }

    /// Fold one raw factor in and return the new smoothed value.
    pub fn update(&mut self, raw: f32) -> f32 {
        self.value += (clamp_unit(raw) - self.value) * self.rate;
        self.value
    }

    pub fn value(&self) -> f32 { self.value }
}

impl Default for FactorSmoother {
    fn default() -> Self { FactorSmoother::new(FACTOR_SMOOTHING) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Open hand with the wrist at `wrist` and the thumb/index tips
    /// `pinch` apart.
    pub(crate) fn hand_at(wrist: (f32, f32), pinch: f32) -> Hand {
        let mut lm = [Landmark::new(wrist.0, wrist.1 - 0.1); LANDMARKS_PER_HAND];
        lm[WRIST] = Landmark::new(wrist.0, wrist.1);
        lm[THUMB_TIP] = Landmark::new(wrist.0 - pinch / 2.0, wrist.1 - 0.15);
        lm[INDEX_TIP] = Landmark::new(wrist.0 + pinch / 2.0, wrist.1 - 0.15);
        Hand::new(lm)
    }

    fn two_hands(wrist_gap: f32) -> GestureSample {
        GestureSample::new(vec![
            hand_at((0.2, 0.7), 0.05),
            hand_at((0.2 + wrist_gap, 0.7), 0.05),
        ])
    }

    fn near(a: f32, b: f32) -> bool { (a - b).abs() < 1e-4 }

    #[test]
    fn finger_layout_covers_every_landmark_once() {
        let mut seen = [false; LANDMARKS_PER_HAND];
        seen[WRIST] = true;
        for (&base, &tip) in FINGER_BASES.iter().zip(FINGER_TIPS.iter()) {
            assert_eq!(tip, base + JOINTS_PER_FINGER - 1);
            for i in base..=tip {
                assert!(!seen[i], "landmark {} claimed twice", i);
                seen[i] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn no_hands_is_neutral_and_undetected() {
        assert_eq!(extract(&GestureSample::none()), Interaction { factor: 0.5, detected: false });
        assert_eq!(extract_optional(None), Interaction::NEUTRAL);
    }

    #[test]
    fn pinch_endpoints() {
        let closed = extract(&GestureSample::new(vec![hand_at((0.5, 0.5), 0.02)]));
        assert!(closed.detected);
        assert!(near(closed.factor, 0.0));

        let open = extract(&GestureSample::new(vec![hand_at((0.5, 0.5), 0.22)]));
        assert!(near(open.factor, 1.0));

        let wide = extract(&GestureSample::new(vec![hand_at((0.5, 0.5), 0.4)]));
        assert_eq!(wide.factor, 1.0);

        let mid = extract(&GestureSample::new(vec![hand_at((0.5, 0.5), 0.12)]));
        assert!(near(mid.factor, 0.5));
    }

    #[test]
    fn touching_fingertips_clamp_to_zero() {
        let i = extract(&GestureSample::new(vec![hand_at((0.5, 0.5), 0.0)]));
        assert_eq!(i.factor, 0.0);
        assert!(i.detected);
    }

    #[test]
    fn wrist_distance_endpoints() {
        assert!(near(extract(&two_hands(0.1)).factor, 0.0));
        assert!(near(extract(&two_hands(0.6)).factor, 1.0));
        assert_eq!(extract(&two_hands(0.75)).factor, 1.0);
        assert!(near(extract(&two_hands(0.35)).factor, 0.5));
        assert_eq!(extract(&two_hands(0.02)).factor, 0.0);
    }

    #[test]
    fn two_hand_rule_ignores_pinch() {
        let mut sample = two_hands(0.6);
        sample.hands[0] = hand_at((0.2, 0.7), 0.0);
        assert!(near(extract(&sample).factor, 1.0));
    }

    #[test]
    fn extra_hands_use_first_two() {
        let mut sample = two_hands(0.35);
        sample.hands.push(hand_at((0.95, 0.1), 0.3));
        assert!(near(extract(&sample).factor, 0.5));
    }

    #[test]
    fn from_slice_requires_21_points() {
        assert!(Hand::from_slice(&[Landmark::default(); 20]).is_none());
        assert!(Hand::from_slice(&[Landmark::default(); 21]).is_some());
    }

    #[test]
    fn smoother_starts_neutral_and_approaches() {
        let mut s = FactorSmoother::default();
        assert_eq!(s.value(), 0.5);
        let first = s.update(1.0);
        assert!(near(first, 0.55));
        for _ in 0..200 { s.update(1.0); }
        assert!(s.value() > 0.999 && s.value() <= 1.0);
    }

    #[test]
    fn smoother_drifts_back_to_neutral_without_hands() {
        let mut s = FactorSmoother::default();
        for _ in 0..100 { s.update(0.0); }
        assert!(s.value() < 0.01);
        for _ in 0..100 { s.update(extract(&GestureSample::none()).factor); }
        assert!((s.value() - 0.5).abs() < 0.01);
    }
}
