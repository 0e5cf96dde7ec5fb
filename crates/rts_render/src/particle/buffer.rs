//! Live-particle storage and kinematics
//!
//! A [`ParticleBuffer`] owns a fixed-capacity ring of live particles plus a
//! staging queue of particles that have been reserved but are not yet due to
//! appear. Spawn events carry keyframe-accurate timestamps, so a particle
//! becomes visible at its timestamp, not at the moment the emitter enqueued
//! it; the staging queue is what absorbs variable-length frame times.
//!
//! The buffer also maintains the axis-aligned bounds of its live set and
//! exposes continuous LOD cost/value numbers for an external detail
//! scheduler.

use std::collections::VecDeque;

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Aabb, Vec3};
use crate::particle::definition::{EmitterDefinition, ParticleCurves};

/// Highest supported billboard subdivision level
pub const MAX_SUBDIVISION: u32 = 4;

/// One live particle record
///
/// Owned exclusively by the buffer slot it occupies; nothing outside the
/// buffer holds a reference across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// World-space position
    pub position: Vec3,
    /// Velocity in world units per millisecond
    pub velocity: Vec3,
    /// Spawn time on the frame clock; the particle becomes visible here
    pub timestamp_ms: u32,
    /// Emitter group this particle belongs to
    pub group_id: u8,
    /// Per-particle jitter draw, fixed at spawn, fed to every curve sample
    pub random: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            timestamp_ms: 0,
            group_id: 0,
            random: 0.0,
        }
    }
}

/// Packed per-particle state handed to the render backend
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    /// World-space position
    pub position: [f32; 3],
    /// Billboard size
    pub size: f32,
    /// RGB color
    pub color: [f32; 3],
    /// Opacity
    pub opacity: f32,
    /// Rotation angle in radians
    pub rotation: f32,
    /// Texture frame index
    pub frame: f32,
    /// Motion-blur tail length
    pub blur_time: f32,
}

/// Fixed-capacity ring of live particles plus the staging queue feeding it
pub struct ParticleBuffer {
    /// Ring storage; `start`/`len` track the occupied span
    slots: Vec<Particle>,
    start: usize,
    len: usize,

    /// Reserved-but-not-yet-due particles, oldest first
    staging: VecDeque<Particle>,

    curves: ParticleCurves,
    texture: String,
    max_age_ms: f32,
    acceleration: Vec3,

    emitter_dead: bool,
    last_update_ms: Option<u32>,

    aabb: Option<Aabb>,
    aabb_dirty: bool,

    subdivision: u32,
}

impl ParticleBuffer {
    /// Create a buffer for a validated emitter definition
    pub fn new(def: &EmitterDefinition) -> Self {
        let capacity = def.capacity.max(1) as usize;
        Self {
            slots: vec![Particle::default(); capacity],
            start: 0,
            len: 0,
            staging: VecDeque::with_capacity(capacity),
            curves: def.curves.clone(),
            texture: def.texture.clone(),
            max_age_ms: def.sanitized_max_age_ms(),
            acceleration: def.acceleration,
            emitter_dead: false,
            last_update_ms: None,
            aabb: None,
            aabb_dirty: false,
            subdivision: 0,
        }
    }

    /// Ring capacity in particles
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of particles currently live in the ring
    pub fn live_count(&self) -> usize {
        self.len
    }

    /// Number of particles waiting in the staging queue
    pub fn staged_count(&self) -> usize {
        self.staging.len()
    }

    /// Texture reference the backend renders this buffer with
    pub fn texture(&self) -> &str {
        &self.texture
    }

    /// The buffer's property curves
    pub fn curves(&self) -> &ParticleCurves {
        &self.curves
    }

    /// Replace the property curves, e.g. for runtime VFX overrides
    pub fn set_curves(&mut self, curves: ParticleCurves) {
        self.curves = curves;
    }

    /// Reserve a staging slot for a particle the emitter will initialize
    ///
    /// Two-phase add: the buffer does the capacity bookkeeping here, the
    /// emitter fills in randomized position/velocity/timestamp through the
    /// returned reference. Returns `None` when the staging queue is full,
    /// which is overload behavior, not an error.
    pub fn add_uninitialized_particle(&mut self) -> Option<&mut Particle> {
        if self.staging.len() >= self.capacity() {
            return None;
        }
        self.staging.push_back(Particle::default());
        self.staging.back_mut()
    }

    /// Mark the owning emitter dead so the buffer can finish draining
    pub fn set_emitter_dead(&mut self) {
        self.emitter_dead = true;
    }

    /// True once the emitter is dead and no particles remain anywhere
    ///
    /// The scene uses this to decide when the buffer's render-object handle
    /// can be released.
    pub fn is_complete(&self) -> bool {
        self.emitter_dead && self.len == 0 && self.staging.is_empty()
    }

    /// Advance the buffer to `now_ms`
    ///
    /// Promotes due staged particles into the ring, integrates kinematics,
    /// recycles expired particles oldest-first, and refreshes the bounding
    /// box when anything moved.
    pub fn tick(&mut self, now_ms: u32) {
        let elapsed_ms = self
            .last_update_ms
            .map_or(0, |last| now_ms.saturating_sub(last));
        self.last_update_ms = Some(now_ms);

        self.promote_due(now_ms);
        if elapsed_ms > 0 && self.len > 0 {
            self.advance_live(elapsed_ms as f32);
        }
        self.recycle_expired(now_ms);

        if self.aabb_dirty {
            self.recompute_aabb();
        }
    }

    /// Bounding box of the live set, `None` while the ring is empty
    pub fn aabb(&self) -> Option<Aabb> {
        self.aabb
    }

    /// Iterate the live particles in spawn order
    pub fn live_particles(&self) -> impl Iterator<Item = &Particle> {
        let capacity = self.slots.len();
        let start = self.start;
        (0..self.len).map(move |i| &self.slots[(start + i) % capacity])
    }

    /// Compute the renderable per-particle state at `now_ms`
    ///
    /// Samples every property curve at each particle's age using its fixed
    /// jitter draw. The caller hands the result to the render backend.
    pub fn render_state(&self, now_ms: u32) -> Vec<ParticleVertex> {
        self.live_particles()
            .map(|p| {
                let age_ms = now_ms.saturating_sub(p.timestamp_ms);
                let color = self.curves.color.sample_with_random(age_ms, p.random);
                ParticleVertex {
                    position: [p.position.x, p.position.y, p.position.z],
                    size: self.curves.size.sample_with_random(age_ms, p.random),
                    color: [color.x, color.y, color.z],
                    opacity: self.curves.opacity.sample_with_random(age_ms, p.random),
                    rotation: self.curves.rotation.sample_with_random(age_ms, p.random),
                    frame: self.curves.frame.sample_with_random(age_ms, p.random),
                    blur_time: self.curves.blur_time.sample_with_random(age_ms, p.random),
                }
            })
            .collect()
    }

    // --- LOD -------------------------------------------------------------

    /// Current subdivision level
    pub fn subdivision(&self) -> u32 {
        self.subdivision
    }

    /// Set the subdivision level, clamped to [`MAX_SUBDIVISION`]
    pub fn set_subdivision(&mut self, level: u32) {
        self.subdivision = level.min(MAX_SUBDIVISION);
    }

    /// Rendering cost of the live set at the current subdivision level
    ///
    /// Proportional to live particle count times triangles per particle, so
    /// raising the level always raises the cost.
    pub fn cost(&self) -> f32 {
        const COST_PER_TRIANGLE: f32 = 0.0001;
        self.len as f32 * Self::triangles_per_particle(self.subdivision) as f32 * COST_PER_TRIANGLE
    }

    /// Visual value of the live set at the current subdivision level
    ///
    /// Monotonic in the level, with diminishing marginal value per step, so
    /// an external scheduler comparing value-per-cost naturally stops
    /// raising detail on buffers that no longer benefit.
    pub fn value(&self) -> f32 {
        self.value_at(self.subdivision)
    }

    /// Visual value one subdivision level higher than the current one
    pub fn post_increment_value(&self) -> f32 {
        self.value_at((self.subdivision + 1).min(MAX_SUBDIVISION))
    }

    fn value_at(&self, level: u32) -> f32 {
        self.len as f32 * (1.0 - 1.0 / (level + 2) as f32)
    }

    fn triangles_per_particle(level: u32) -> u32 {
        2 * (level + 1) * (level + 1)
    }

    // --- internals -------------------------------------------------------

    fn promote_due(&mut self, now_ms: u32) {
        while self
            .staging
            .front()
            .map_or(false, |front| front.timestamp_ms <= now_ms)
        {
            if let Some(particle) = self.staging.pop_front() {
                self.push_live(particle);
                self.aabb_dirty = true;
            }
        }
    }

    /// Append to the ring; a full ring recycles the oldest slot first
    fn push_live(&mut self, particle: Particle) {
        let capacity = self.slots.len();
        if self.len == capacity {
            self.start = (self.start + 1) % capacity;
            self.len -= 1;
        }
        let index = (self.start + self.len) % capacity;
        self.slots[index] = particle;
        self.len += 1;
    }

    fn advance_live(&mut self, dt_ms: f32) {
        let capacity = self.slots.len();
        let accelerated = self.acceleration != Vec3::zeros();
        for i in 0..self.len {
            let p = &mut self.slots[(self.start + i) % capacity];
            p.position += p.velocity * dt_ms;
            if accelerated {
                p.position += self.acceleration * (0.5 * dt_ms * dt_ms);
                p.velocity += self.acceleration * dt_ms;
            }
        }
        self.aabb_dirty = true;
    }

    /// Drop particles older than the configured lifetime, oldest first
    fn recycle_expired(&mut self, now_ms: u32) {
        let capacity = self.slots.len();
        while self.len > 0 {
            let oldest = &self.slots[self.start];
            let age_ms = now_ms.saturating_sub(oldest.timestamp_ms) as f32;
            if age_ms <= self.max_age_ms {
                break;
            }
            self.start = (self.start + 1) % capacity;
            self.len -= 1;
            self.aabb_dirty = true;
        }
    }

    fn recompute_aabb(&mut self) {
        self.aabb_dirty = false;
        let mut aabb: Option<Aabb> = None;
        for p in self.live_particles() {
            match &mut aabb {
                Some(aabb) => aabb.expand_to_point(p.position),
                None => aabb = Some(Aabb::from_point(p.position)),
            }
        }
        self.aabb = aabb;
    }
}
