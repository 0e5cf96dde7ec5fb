//! Random source abstraction and emission-volume sampling
//!
//! The simulation core never owns an RNG; the host supplies one through the
//! [`RandomSource`] trait (any `rand::Rng` qualifies). Each spawned particle
//! requests its draws exactly once, so a seeded generator makes spawn
//! patterns fully reproducible.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Uniform random draws supplied by the host
///
/// Blanket-implemented for every [`rand::Rng`], so `StdRng`, `ThreadRng` or
/// a seeded test generator all plug in directly.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`
    fn unit(&mut self) -> f32;

    /// Uniform draw in `[lo, hi)`
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.unit()
    }
}

impl<R: rand::Rng> RandomSource for R {
    fn unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

/// Geometric volume particles are emitted from, in emitter-local space
///
/// The volume produces local-space position (or velocity) samples; the
/// emitter rotates them into world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EmissionVolume {
    /// All samples at the emitter origin
    Point,
    /// Uniform within a box of the given half-extents
    Box {
        /// Half-extents along each local axis
        extents: Vec3,
    },
    /// Uniform within a solid sphere
    SphereSolid {
        /// Sphere radius
        radius: f32,
    },
    /// Uniform on the surface of a sphere
    SphereHollow {
        /// Sphere radius
        radius: f32,
    },
    /// Uniform within a cylinder aligned with the local Z axis
    Cylinder {
        /// Cylinder radius
        radius: f32,
        /// Full length along Z, centered on the origin
        length: f32,
    },
}

impl Default for EmissionVolume {
    fn default() -> Self {
        Self::Point
    }
}

impl EmissionVolume {
    /// Draw one local-space sample from the volume
    pub fn sample(&self, rng: &mut dyn RandomSource) -> Vec3 {
        match *self {
            Self::Point => Vec3::zeros(),
            Self::Box { extents } => Vec3::new(
                rng.range(-extents.x, extents.x),
                rng.range(-extents.y, extents.y),
                rng.range(-extents.z, extents.z),
            ),
            Self::SphereSolid { radius } => {
                // Cube-root radial density gives uniform volume distribution
                let r = radius * rng.unit().cbrt();
                unit_direction(rng) * r
            }
            Self::SphereHollow { radius } => unit_direction(rng) * radius,
            Self::Cylinder { radius, length } => {
                let theta = rng.range(0.0, std::f32::consts::TAU);
                // Square-root radial density gives uniform disc distribution
                let r = radius * rng.unit().sqrt();
                Vec3::new(
                    r * theta.cos(),
                    r * theta.sin(),
                    rng.range(-length * 0.5, length * 0.5),
                )
            }
        }
    }

    /// Direction pointing away from the volume center at a sampled point
    ///
    /// Cylinders push radially away from their axis; spheres and boxes push
    /// away from the origin. A degenerate sample (at the exact center, or
    /// any point volume) has no outward direction and yields zero.
    pub fn outward_direction(&self, local_sample: Vec3) -> Vec3 {
        const EPSILON: f32 = 1.0e-6;

        let dir = match *self {
            Self::Point => Vec3::zeros(),
            Self::Cylinder { .. } => Vec3::new(local_sample.x, local_sample.y, 0.0),
            _ => local_sample,
        };

        let magnitude = dir.magnitude();
        if magnitude < EPSILON {
            Vec3::zeros()
        } else {
            dir / magnitude
        }
    }
}

/// Uniformly distributed unit direction
fn unit_direction(rng: &mut dyn RandomSource) -> Vec3 {
    let z = rng.range(-1.0, 1.0);
    let phi = rng.range(0.0, std::f32::consts::TAU);
    let planar = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(planar * phi.cos(), planar * phi.sin(), z)
}
