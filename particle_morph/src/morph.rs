//! The morph engine.
//!
//! [`MorphAnimator`] owns three equally sized buffers:
//!
//! * `target`   — frozen snapshot of the selected shape, replaced wholesale
//!   when the shape changes;
//! * `base`     — the current approximation of the shape, pulled toward
//!   `target` every tick;
//! * `rendered` — what the renderer draws, pulled toward `base · scale`.
//!
//! All three approaches are per-tick exponential moving averages, so a
//! shape switch never snaps: the cloud keeps flowing from wherever it is.
//! Particle `i` of the old shape always becomes particle `i` of the new one
//! (no nearest-neighbour matching), which gives the converge-in-place look.

use rand::rngs::StdRng;
use rand::Rng;

use crate::scale::map_scale;
use crate::shape::{ParticleSet, ShapeGenerator, ShapeKind};

// ════════════════════════════════════════════════════════════════════════════
// MorphRates
// ════════════════════════════════════════════════════════════════════════════

/// Per-tick convergence constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MorphRates {
    /// `base` → `target`.
    pub morph:    f32,
    /// `scale.current` → `scale.target`.
    pub scale:    f32,
    /// `rendered` → `base · scale.current`.
    pub position: f32,
}

impl Default for MorphRates {
    fn default() -> Self {
        MorphRates { morph: 0.08, scale: 0.1, position: 0.1 }
    }
}

/// Current and target visual scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleState {
    pub current: f32,
    pub target:  f32,
}

impl Default for ScaleState {
    fn default() -> Self { ScaleState { current: 1.0, target: 1.0 } }
}

// ════════════════════════════════════════════════════════════════════════════
// MorphAnimator
// ════════════════════════════════════════════════════════════════════════════

pub struct MorphAnimator<R = StdRng> {
    generator: ShapeGenerator<R>,
    shape:     ShapeKind,
    count:     usize,
    base:      Vec<f32>,
    target:    Vec<f32>,
    rendered:  Vec<f32>,
    scale:     ScaleState,
    rates:     MorphRates,
}

impl MorphAnimator<StdRng> {
    /// Entropy-seeded animator showing `initial` with `count` particles.
    pub fn new(count: usize, initial: ShapeKind) -> Self {
        MorphAnimator::with_generator(ShapeGenerator::new(), count, initial)
    }
}

impl<R: Rng> MorphAnimator<R> {
    /// All three buffers start as the same freshly generated `initial`
    /// cloud at scale 1.
    pub fn with_generator(mut generator: ShapeGenerator<R>, count: usize, initial: ShapeKind) -> Self {
        let positions = generator.generate(initial, count).into_vec();
        MorphAnimator {
            generator,
            shape:    initial,
            count,
            base:     positions.clone(),
            target:   positions.clone(),
            rendered: positions,
            scale:    ScaleState::default(),
            rates:    MorphRates::default(),
        }
    }

    pub fn with_rates(mut self, rates: MorphRates) -> Self {
        self.rates = rates;
        self
    }

    /// Regenerate `target` for `kind`.  `base` and `rendered` are left alone
    /// so the morph continues from the current state.
    pub fn set_target_shape(&mut self, kind: ShapeKind) {
        let fresh = self.generator.generate(kind, self.count);
        self.set_target(fresh);
        self.shape = kind;
    }

    /// Replace `target` with an explicit cloud.  A cloud of the wrong size
    /// is rejected and the current target kept.
    pub fn set_target(&mut self, target: ParticleSet) -> bool {
        if target.len() != self.count {
            log::warn!(
                "[morph] ignoring target with {} points (animator holds {})",
                target.len(), self.count
            );
            return false;
        }
        self.target = target.into_vec();
        true
    }

    /// Set the scale the cloud eases toward; `scale.current` follows over
    /// the next ticks.
    pub fn set_target_scale(&mut self, scale: f32) {
        if scale.is_finite() {
            self.scale.target = scale;
        }
    }

    /// Convenience: `set_target_scale(map_scale(factor))`.
    pub fn apply_interaction(&mut self, factor: f32) {
        self.set_target_scale(map_scale(factor));
    }

    /// Advance one animation tick.
    pub fn step(&mut self) {
        let MorphRates { morph, scale: scale_rate, position } = self.rates;

        self.scale.current += (self.scale.target - self.scale.current) * scale_rate;
        let scale = self.scale.current;

        let buffers = self.base.iter_mut()
            .zip(self.target.iter())
            .zip(self.rendered.iter_mut());
        for ((b, &t), r) in buffers {
            *b += (t - *b) * morph;
            let desired = *b * scale;
            *r += (desired - *r) * position;
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Flat positions for the renderer.
    pub fn rendered(&self)       -> &[f32]      { &self.rendered }
    pub fn base(&self)           -> &[f32]      { &self.base }
    pub fn target(&self)         -> &[f32]      { &self.target }
    pub fn shape(&self)          -> ShapeKind   { self.shape }
    pub fn particle_count(&self) -> usize       { self.count }
    pub fn scale(&self)          -> ScaleState  { self.scale }
    pub fn rates(&self)          -> MorphRates  { self.rates }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(count: usize, shape: ShapeKind, seed: u64) -> MorphAnimator {
        MorphAnimator::with_generator(ShapeGenerator::seeded(seed), count, shape)
    }

    fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f32::max)
    }

    fn mean_abs_y(flat: &[f32]) -> f32 {
        let n = flat.len() / 3;
        flat.chunks_exact(3).map(|p| p[1].abs()).sum::<f32>() / n as f32
    }

    fn axis_range(flat: &[f32], axis: usize) -> (f32, f32) {
        flat.chunks_exact(3)
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p[axis]), hi.max(p[axis])))
    }

    #[test]
    fn buffers_share_length() {
        let mut m = seeded(1_000, ShapeKind::Sphere, 1);
        assert_eq!(m.base().len(), 3_000);
        assert_eq!(m.target().len(), 3_000);
        assert_eq!(m.rendered().len(), 3_000);
        m.set_target_shape(ShapeKind::Buddha);
        m.step();
        assert_eq!(m.base().len(), m.target().len());
        assert_eq!(m.rendered().len(), m.target().len());
    }

    #[test]
    fn shape_switch_keeps_base_and_rendered() {
        let mut m = seeded(500, ShapeKind::Sphere, 2);
        for _ in 0..5 { m.step(); }
        let base = m.base().to_vec();
        let rendered = m.rendered().to_vec();
        m.set_target_shape(ShapeKind::Heart);
        assert_eq!(m.shape(), ShapeKind::Heart);
        assert_eq!(m.base(), &base[..]);
        assert_eq!(m.rendered(), &rendered[..]);
        assert_ne!(m.target(), &base[..]);
    }

    #[test]
    fn set_target_scale_is_deferred() {
        let mut m = seeded(10, ShapeKind::Sphere, 3);
        m.set_target_scale(3.0);
        assert_eq!(m.scale().current, 1.0);
        assert_eq!(m.scale().target, 3.0);
        m.step();
        assert!((m.scale().current - 1.2).abs() < 1e-6);
    }

    #[test]
    fn non_finite_scale_ignored() {
        let mut m = seeded(10, ShapeKind::Sphere, 3);
        m.set_target_scale(f32::NAN);
        assert_eq!(m.scale().target, 1.0);
    }

    #[test]
    fn wrong_sized_target_rejected() {
        let mut m = seeded(10, ShapeKind::Sphere, 3);
        let before = m.target().to_vec();
        assert!(!m.set_target(ParticleSet::from_flat(vec![0.0; 9])));
        assert_eq!(m.target(), &before[..]);
    }

    #[test]
    fn base_converges_geometrically() {
        let mut m = seeded(2_000, ShapeKind::Sphere, 4);
        m.set_target_shape(ShapeKind::Saturn);
        let initial = max_abs_diff(m.base(), m.target());
        assert!(initial > 1.0);

        for _ in 0..50 { m.step(); }
        let after_50 = max_abs_diff(m.base(), m.target());
        // 0.92^50 ≈ 0.0155
        assert!(after_50 <= initial * 0.92f32.powi(50) * 1.01 + 1e-4,
            "ratio {}", after_50 / initial);

        for _ in 0..10 { m.step(); }
        let after_60 = max_abs_diff(m.base(), m.target());
        assert!(after_60 < initial * 0.01);
        assert!(after_60 > 0.0, "EMA never snaps exactly");
    }

    #[test]
    fn rendered_converges_to_scaled_base() {
        let mut m = seeded(1_000, ShapeKind::Flower, 5);
        // base == target, scale steady at 1: only `rendered` has to move.
        m.rendered.iter_mut().for_each(|r| *r = 0.0);
        let initial = max_abs_diff(m.rendered(), m.base());

        for _ in 0..50 { m.step(); }
        let err = max_abs_diff(m.rendered(), m.base());
        // 0.9^50 ≈ 0.0052
        assert!(err <= initial * 0.9f32.powi(50) * 1.01 + 1e-4, "ratio {}", err / initial);
    }

    #[test]
    fn rendered_tracks_scale() {
        let mut m = seeded(500, ShapeKind::Sphere, 6);
        m.apply_interaction(1.0);
        for _ in 0..300 { m.step(); }
        assert!((m.scale().current - 3.0).abs() < 1e-3);
        for (r, b) in m.rendered().iter().zip(m.base()) {
            assert!((r - b * 3.0).abs() < 1e-2);
        }
    }

    #[test]
    fn sphere_to_heart_settles_on_heart() {
        const N: usize = 5_000;
        let mut reference = ShapeGenerator::seeded(99);
        let heart = reference.generate(ShapeKind::Heart, N);
        let direct_mean = mean_abs_y(heart.as_slice());

        for seed in 0..5 {
            let mut m = seeded(N, ShapeKind::Sphere, seed);
            m.set_target_scale(1.0);
            m.set_target_shape(ShapeKind::Heart);
            for _ in 0..200 { m.step(); }

            let morphed_mean = mean_abs_y(m.base());
            assert!((morphed_mean - direct_mean).abs() < 0.05 * direct_mean,
                "seed {}: mean |y| {} vs {}", seed, morphed_mean, direct_mean);

            for (axis, name) in ["x", "y", "z"].iter().enumerate() {
                let (lo, hi) = axis_range(m.base(), axis);
                let (dlo, dhi) = axis_range(heart.as_slice(), axis);
                assert!((lo - dlo).abs() < 0.5 && (hi - dhi).abs() < 0.5,
                    "seed {}: {} range [{}, {}] vs [{}, {}]", seed, name, lo, hi, dlo, dhi);
            }

            // And the rendered cloud follows at scale 1.
            assert!(max_abs_diff(m.rendered(), m.base()) < 1e-3);
        }
    }

    #[test]
    fn custom_rates_apply() {
        let rates = MorphRates { morph: 1.0, scale: 1.0, position: 1.0 };
        let mut m = seeded(100, ShapeKind::Sphere, 8).with_rates(rates);
        m.set_target_shape(ShapeKind::Fireworks);
        m.set_target_scale(2.0);
        m.step();
        assert!(max_abs_diff(m.base(), m.target()) < 1e-5);
        for (r, b) in m.rendered().iter().zip(m.base()) {
            assert!((r - b * 2.0).abs() < 1e-5);
        }
    }
}
