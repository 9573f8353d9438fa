//! Procedural particle shapes.
//!
//! Every generator fills a flat `[x0, y0, z0, x1, y1, z1, …]` buffer with
//! `count` points drawn from the shape's distribution.  Generation is
//! stochastic: two calls with the same kind return different clouds that
//! follow the same distribution.  The random source is owned by the
//! [`ShapeGenerator`], so tests can seed it and production code can leave
//! it on entropy.

use std::f32::consts::PI;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default number of particles in a cloud.
pub const DEFAULT_PARTICLE_COUNT: usize = 15_000;

// ════════════════════════════════════════════════════════════════════════════
// ShapeKind
// ════════════════════════════════════════════════════════════════════════════

/// The closed set of shapes the cloud can morph into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Heart,
    Flower,
    Saturn,
    Buddha,
    Fireworks,
    Sphere,
}

impl ShapeKind {
    /// All shapes, in the order the control surface lists them.
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Heart,
        ShapeKind::Flower,
        ShapeKind::Saturn,
        ShapeKind::Buddha,
        ShapeKind::Fireworks,
        ShapeKind::Sphere,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Heart     => "Heart",
            ShapeKind::Flower    => "Flower",
            ShapeKind::Saturn    => "Saturn",
            ShapeKind::Buddha    => "Buddha",
            ShapeKind::Fireworks => "Fireworks",
            ShapeKind::Sphere    => "Sphere",
        }
    }

    /// Case-insensitive lookup by name.  Unknown names resolve to
    /// [`ShapeKind::Sphere`]; no name is ever rejected.
    pub fn from_name(name: &str) -> ShapeKind {
        let name = name.trim();
        ShapeKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name))
            .unwrap_or(ShapeKind::Sphere)
    }
}

impl Default for ShapeKind {
    fn default() -> Self { ShapeKind::Sphere }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleSet
// ════════════════════════════════════════════════════════════════════════════

/// One instantaneous particle cloud: `3·N` floats, point `i` at
/// `[3i, 3i+1, 3i+2]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSet {
    positions: Vec<f32>,
}

impl ParticleSet {
    /// Wrap an existing flat buffer.  A trailing partial point is dropped.
    pub fn from_flat(mut positions: Vec<f32>) -> Self {
        let whole = positions.len() - positions.len() % 3;
        positions.truncate(whole);
        ParticleSet { positions }
    }

    /// Number of points.
    pub fn len(&self) -> usize { self.positions.len() / 3 }

    pub fn is_empty(&self) -> bool { self.positions.is_empty() }

    pub fn point(&self, i: usize) -> [f32; 3] {
        let i3 = i * 3;
        [self.positions[i3], self.positions[i3 + 1], self.positions[i3 + 2]]
    }

    pub fn points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.positions.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    pub fn as_slice(&self) -> &[f32] { &self.positions }

    pub fn into_vec(self) -> Vec<f32> { self.positions }
}

// ════════════════════════════════════════════════════════════════════════════
// ShapeGenerator
// ════════════════════════════════════════════════════════════════════════════

/// Produces [`ParticleSet`]s for any [`ShapeKind`] from an owned random
/// source.
#[derive(Debug)]
pub struct ShapeGenerator<R = StdRng> {
    rng: R,
}

impl ShapeGenerator<StdRng> {
    /// Entropy-seeded generator; results are not reproducible.
    pub fn new() -> Self {
        ShapeGenerator { rng: StdRng::from_entropy() }
    }

    /// Deterministic generator for tests and repeatable runs.
    pub fn seeded(seed: u64) -> Self {
        ShapeGenerator { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for ShapeGenerator<StdRng> {
    fn default() -> Self { Self::new() }
}

impl<R: Rng> ShapeGenerator<R> {
    /// Use any `rand` source.
    pub fn with_rng(rng: R) -> Self {
        ShapeGenerator { rng }
    }

    /// Generate exactly `count` points of `kind`.
    pub fn generate(&mut self, kind: ShapeKind, count: usize) -> ParticleSet {
        let mut positions = Vec::with_capacity(count * 3);
        for _ in 0..count {
            let p = self.sample(kind);
            positions.extend_from_slice(&p);
        }
        ParticleSet { positions }
    }

    /// Draw a single point of `kind`.
    pub fn sample(&mut self, kind: ShapeKind) -> [f32; 3] {
        let rng = &mut self.rng;
        match kind {
            ShapeKind::Heart     => heart_point(rng),
            ShapeKind::Flower    => flower_point(rng),
            ShapeKind::Saturn    => saturn_point(rng).1,
            ShapeKind::Buddha    => buddha_point(rng),
            ShapeKind::Fireworks => {
                let radius = rng.gen::<f32>() * 20.0;
                sphere_surface_point(rng, radius)
            }
            ShapeKind::Sphere    => sphere_surface_point(rng, 12.0),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Per-shape samplers
// ════════════════════════════════════════════════════════════════════════════

/// Uniform point on the surface of a sphere of `radius` centred at the origin.
fn sphere_surface_point<R: Rng>(rng: &mut R, radius: f32) -> [f32; 3] {
    let u: f32 = rng.gen();
    let v: f32 = rng.gen();
    let theta = 2.0 * PI * u;
    let phi   = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();
    [
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    ]
}

fn heart_point<R: Rng>(rng: &mut R) -> [f32; 3] {
    const SCALE: f32 = 0.8;
    let t: f32 = rng.gen::<f32>() * 2.0 * PI;
    let x = 16.0 * t.sin().powi(3) * SCALE;
    let y = (13.0 * t.cos()
        - 5.0 * (2.0 * t).cos()
        - 2.0 * (3.0 * t).cos()
        - (4.0 * t).cos()) * SCALE;
    // Thickness tapers to zero at the centre line.
    let z = (rng.gen::<f32>() - 0.5) * 10.0 * (x.abs() / 16.0).sqrt();
    [x, y, z]
}

fn flower_point<R: Rng>(rng: &mut R) -> [f32; 3] {
    const PETALS: f32 = 4.0;
    let theta: f32 = rng.gen::<f32>() * 2.0 * PI;
    let phi: f32   = rng.gen::<f32>() * PI;
    let r = 10.0 * (PETALS * theta).sin() + 5.0;
    [
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos() * 0.3,
    ]
}

/// Which half of the Saturn mixture a point came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SaturnPart { Body, Ring }

pub(crate) const SATURN_TILT: f32 = PI / 6.0;

pub(crate) fn saturn_point<R: Rng>(rng: &mut R) -> (SaturnPart, [f32; 3]) {
    if rng.gen::<f32>() < 0.4 {
        return (SaturnPart::Body, sphere_surface_point(rng, 8.0));
    }

    let angle: f32 = rng.gen::<f32>() * 2.0 * PI;
    let dist = 11.0 + rng.gen::<f32>() * 9.0;
    let x = angle.cos() * dist;
    let z = angle.sin() * dist;
    let y = (rng.gen::<f32>() - 0.5) * 0.5;

    // Tilt the ring plane about the x axis.
    let (s, c) = SATURN_TILT.sin_cos();
    (SaturnPart::Ring, [x, y * c - z * s, y * s + z * c])
}

fn buddha_point<R: Rng>(rng: &mut R) -> [f32; 3] {
    let pick: f32 = rng.gen();
    if pick < 0.25 {
        // head
        let [x, y, z] = sphere_surface_point(rng, 3.5);
        [x, y + 6.0, z]
    } else if pick < 0.65 {
        // body
        let [x, y, z] = sphere_surface_point(rng, 5.0);
        [x * 1.2, y * 1.1 - 1.0, z * 0.8]
    } else {
        // crossed legs / base
        let [x, y, z] = sphere_surface_point(rng, 6.0);
        [x * 1.8, y * 0.5 - 6.0, z * 1.5]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
