//! # particle_morph
//!
//! The engine behind a gesture-driven particle cloud:
//!
//! * [`shape`]   — six procedural point-cloud shapes over a pluggable RNG;
//! * [`morph`]   — the per-tick converge-in-place morph and scale easing;
//! * [`gesture`] — hand landmarks → a `[0, 1]` openness factor;
//! * [`scale`]   — openness → visual scale (0.2× … 3×);
//! * [`tracker`] — the detector thread feeding a lock-free [`shared`] cell.
//!
//! No windowing or camera code lives here; detectors plug in through the
//! [`HandDetector`] trait.
//!
//! ## Quick start
//!
//! ```rust
//! use particle_morph::{MorphAnimator, ShapeGenerator, ShapeKind, map_scale};
//!
//! let mut cloud = MorphAnimator::with_generator(
//!     ShapeGenerator::seeded(1), 1_000, ShapeKind::Sphere,
//! );
//! cloud.set_target_shape(ShapeKind::Heart);
//! cloud.set_target_scale(map_scale(0.8));
//! for _ in 0..60 { cloud.step(); }
//! assert_eq!(cloud.rendered().len(), 3 * 1_000);
//! ```

pub mod color;
pub mod detector;
pub mod error;
pub mod gesture;
pub mod morph;
pub mod scale;
pub mod shape;
pub mod shared;
pub mod tracker;

pub use color::{Rgb, DEFAULT_COLOR};
pub use detector::{Detection, HandDetector, UnavailableDetector};
pub use error::{ColorError, DetectorError};
pub use gesture::{
    extract, extract_optional, FactorSmoother, GestureSample, Hand, Interaction, Landmark,
    LANDMARKS_PER_HAND, NEUTRAL_FACTOR,
};
pub use morph::{MorphAnimator, MorphRates, ScaleState};
pub use scale::map_scale;
pub use shape::{ParticleSet, ShapeGenerator, ShapeKind, DEFAULT_PARTICLE_COUNT};
pub use shared::InteractionCell;
pub use tracker::{Tracker, TrackerConfig, TrackerEvent};
