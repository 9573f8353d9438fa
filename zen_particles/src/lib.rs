//! # zen_particles
//!
//! A windowed particle cloud that morphs between six procedural shapes and
//! grows or shrinks with the openness of your hands.
//!
//! ## Gesture → Effect mapping
//!
//! | Hands in view | Measured | Effect |
//! |---|---|---|
//! | none | — | cloud rests at 1× |
//! | one | thumb-tip ↔ index-tip distance | pinch shrinks to 0.2×, open grows to 3× |
//! | two | wrist ↔ wrist distance | hands together shrink, hands apart grow |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard and mouse stand in for hands.
//! * `leap` — **Hardware mode**: hand joints from a real LeapMotion controller.
//!
//! ### Keys
//!
//! | Key | Action |
//! |---|---|
//! | `1`–`6` | Heart, Flower, Saturn, Buddha, Fireworks, Sphere |
//! | `C` | Next colour preset |
//! | `H` | Cycle simulated hands (0 → 1 → 2) |
//! | mouse x / `↑` `↓` | Simulated openness |
//! | `Q` / `Esc` | Quit |

pub mod app;
pub mod canvas;
pub mod palette;
pub mod sim;
pub mod visualizer;

#[cfg(feature = "leap")]
pub mod leap;
