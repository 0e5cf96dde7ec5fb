//! Particle emitter: spawn policy and lifecycle
//!
//! The emitter owns exactly one [`ParticleBuffer`] and decides, once per
//! simulation tick, how many particles to create and with what randomized
//! initial state. Spawn events are distributed across the elapsed frame time
//! with a carried remainder, and each event reconstructs the emitter's
//! mid-frame pose by interpolating between the previous and current
//! transform, so fast-moving emitters leave smooth trails instead of clumps.

use log::debug;

use crate::foundation::math::{Transform, Vec3};
use crate::foundation::random::{EmissionVolume, RandomSource};
use crate::particle::buffer::ParticleBuffer;
use crate::particle::definition::{DefinitionError, EmitterDefinition};

/// Emission lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    /// Not emitting; the buffer keeps draining already-spawned particles
    Stopped,
    /// Emitting spawn events every `emit_rate_ms`
    Active,
    /// The lifetime particle budget is exhausted; no further emission
    Complete,
}

/// Spawn-policy controller for one particle effect instance
pub struct ParticleEmitter {
    name: String,
    buffer: ParticleBuffer,
    state: EmitterState,

    emit_rate_ms: u32,
    burst_size: u32,
    one_time_burst: Option<u32>,
    max_particles: u32,
    particles_left: u32,

    base_velocity: Vec3,
    outward_velocity: f32,
    velocity_inherit_factor: f32,
    position_volume: EmissionVolume,
    velocity_volume: EmissionVolume,
    group_id: u8,

    /// Carried remainder of the emission interval, in milliseconds
    emit_remain_ms: u32,
    /// Clock time and transform observed at the previous update
    prev: Option<(u32, Transform)>,
}

impl ParticleEmitter {
    /// Construct an emitter and its buffer from a definition
    pub fn new(def: &EmitterDefinition) -> Result<Self, DefinitionError> {
        def.validate()?;
        Ok(Self {
            name: def.name.clone(),
            buffer: ParticleBuffer::new(def),
            state: EmitterState::Stopped,
            emit_rate_ms: def.emit_rate_ms(),
            burst_size: def.sanitized_burst_size(),
            one_time_burst: None,
            max_particles: def.max_particles,
            particles_left: def.max_particles,
            base_velocity: def.base_velocity,
            outward_velocity: def.outward_velocity,
            velocity_inherit_factor: def.velocity_inherit_factor,
            position_volume: def.position_volume,
            velocity_volume: def.velocity_volume,
            group_id: def.group_id,
            emit_remain_ms: 0,
            prev: None,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> EmitterState {
        self.state
    }

    /// The owned particle buffer
    pub fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    /// Mutable access to the owned buffer (LOD control, curve overrides)
    pub fn buffer_mut(&mut self) -> &mut ParticleBuffer {
        &mut self.buffer
    }

    /// Begin emitting
    ///
    /// Resets the lifetime budget and captures the current transform as the
    /// baseline for the next update's velocity-inheritance delta; no
    /// particles spawn until that next update.
    pub fn start(&mut self, now_ms: u32, transform: &Transform) {
        match self.state {
            EmitterState::Stopped | EmitterState::Complete => {
                self.state = EmitterState::Active;
                self.particles_left = self.max_particles;
                self.emit_remain_ms = 0;
                self.prev = Some((now_ms, transform.clone()));
            }
            EmitterState::Active => {
                debug!("emitter '{}' started while already active", self.name);
            }
        }
    }

    /// Halt emission; already-spawned particles keep draining
    pub fn stop(&mut self) {
        if self.state == EmitterState::Active {
            self.state = EmitterState::Stopped;
        }
    }

    /// Return to the Stopped state with a fresh budget, keeping the buffer
    pub fn reset(&mut self) {
        self.state = EmitterState::Stopped;
        self.particles_left = self.max_particles;
        self.emit_remain_ms = 0;
        self.prev = None;
    }

    /// Spawn `size` particles at the next emission event instead of the
    /// configured burst size, then revert
    pub fn request_one_time_burst(&mut self, size: u32) {
        self.one_time_burst = Some(size);
    }

    /// Advance the emitter and its buffer by one simulation tick
    ///
    /// While Active, distributes spawn events over the elapsed interval;
    /// always ticks the buffer afterwards so draining continues in every
    /// state.
    pub fn update(&mut self, now_ms: u32, transform: &Transform, rng: &mut dyn RandomSource) {
        if self.state == EmitterState::Active {
            self.emit(now_ms, transform, rng);
        }
        self.buffer.tick(now_ms);
    }

    /// Consume the emitter, flagging the buffer so it can finish draining
    ///
    /// The caller keeps ticking the returned buffer until
    /// [`ParticleBuffer::is_complete`] before releasing its render object.
    pub fn into_buffer(mut self) -> ParticleBuffer {
        self.buffer.set_emitter_dead();
        self.buffer
    }

    fn emit(&mut self, now_ms: u32, transform: &Transform, rng: &mut dyn RandomSource) {
        let Some((prev_ms, prev_transform)) = self.prev.take() else {
            self.prev = Some((now_ms, transform.clone()));
            return;
        };

        let mut elapsed_ms = now_ms.saturating_sub(prev_ms);

        // After a stall (debugger pause, hitch) the elapsed time could imply
        // more emission cycles than the ring holds. Wrap it modulo the ring
        // fill cycle instead of emitting an unbounded backlog.
        let fill_bursts = {
            let capacity = self.buffer.capacity() as u32;
            capacity / gcd(capacity, self.burst_size)
        };
        let cycle_ms = u64::from(self.emit_rate_ms) * u64::from(fill_bursts);
        if u64::from(elapsed_ms) > cycle_ms {
            elapsed_ms = (u64::from(elapsed_ms) % cycle_ms) as u32;
        }

        // Fraction of the emitter's own displacement imparted to this
        // frame's particles, in units per millisecond.
        let inherited_velocity = if elapsed_ms > 0 {
            (transform.position - prev_transform.position)
                * (self.velocity_inherit_factor / elapsed_ms as f32)
        } else {
            Vec3::zeros()
        };

        self.emit_remain_ms += elapsed_ms;
        'events: while self.emit_remain_ms >= self.emit_rate_ms {
            self.emit_remain_ms -= self.emit_rate_ms;

            let event_ms = now_ms - self.emit_remain_ms;
            let alpha = if elapsed_ms > 0 {
                1.0 - self.emit_remain_ms as f32 / elapsed_ms as f32
            } else {
                1.0
            };
            let pose = Transform::interpolate(&prev_transform, transform, alpha);

            let burst = self.one_time_burst.take().unwrap_or(self.burst_size);
            for _ in 0..burst {
                if self.max_particles > 0 && self.particles_left == 0 {
                    self.state = EmitterState::Complete;
                    break 'events;
                }
                self.spawn_particle(&pose, event_ms, inherited_velocity, rng);
                if self.max_particles > 0 {
                    self.particles_left -= 1;
                    if self.particles_left == 0 {
                        self.state = EmitterState::Complete;
                        break 'events;
                    }
                }
            }
        }

        self.prev = Some((now_ms, transform.clone()));
    }

    fn spawn_particle(
        &mut self,
        pose: &Transform,
        timestamp_ms: u32,
        inherited_velocity: Vec3,
        rng: &mut dyn RandomSource,
    ) {
        let position_sample = self.position_volume.sample(rng);
        let velocity_sample = self.velocity_volume.sample(rng);
        let outward =
            self.position_volume.outward_direction(position_sample) * self.outward_velocity;
        let local_velocity = velocity_sample + outward + self.base_velocity;

        let Some(slot) = self.buffer.add_uninitialized_particle() else {
            // Staging full is sustained-overload behavior: skip the spawn.
            debug!("emitter '{}' skipping spawn, staging queue full", self.name);
            return;
        };
        slot.position = pose.rotate_vector(position_sample) + pose.position;
        slot.velocity = inherited_velocity + pose.rotate_vector(local_velocity);
        slot.timestamp_ms = timestamp_ms;
        slot.group_id = self.group_id;
        slot.random = rng.unit();
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn emitter(def: EmitterDefinition) -> ParticleEmitter {
        ParticleEmitter::new(&def).expect("definition should validate")
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_ten_per_second_for_one_second_spawns_ten() {
        let mut e = emitter(EmitterDefinition {
            emission_rate: 10.0,
            burst_size: 1,
            max_age_ms: 2000.0,
            capacity: 64,
            ..Default::default()
        });
        let mut rng = rng();
        let at = Transform::identity();

        e.start(0, &at);
        e.update(1000, &at, &mut rng);

        assert_eq!(e.buffer().live_count(), 10);
        let timestamps: Vec<u32> = e
            .buffer()
            .live_particles()
            .map(|p| p.timestamp_ms)
            .collect();
        assert_eq!(
            timestamps,
            vec![100, 200, 300, 400, 500, 600, 700, 800, 900, 1000]
        );
    }

    #[test]
    fn test_spawn_count_carries_remainder_across_ticks() {
        let mut e = emitter(EmitterDefinition {
            emission_rate: 1000.0 / 30.0, // one event per 30 ms
            burst_size: 2,
            max_age_ms: 60_000.0,
            capacity: 256,
            ..Default::default()
        });
        let mut rng = rng();
        let at = Transform::identity();

        e.start(0, &at);
        for tick in 1..=10 {
            e.update(tick * 100, &at, &mut rng);
        }

        // 1000 ms total at 30 ms per event: floor(1000/30) = 33 events.
        assert_eq!(e.buffer().live_count(), 66);
    }

    #[test]
    fn test_particles_interpolate_emitter_motion_across_the_frame() {
        let mut e = emitter(EmitterDefinition {
            emission_rate: 10.0,
            burst_size: 1,
            max_age_ms: 60_000.0,
            capacity: 64,
            ..Default::default()
        });
        let mut rng = rng();

        e.start(0, &Transform::from_position(Vec3::zeros()));
        e.update(
            1000,
            &Transform::from_position(Vec3::new(100.0, 0.0, 0.0)),
            &mut rng,
        );

        let positions: Vec<f32> = e.buffer().live_particles().map(|p| p.position.x).collect();
        assert_eq!(positions.len(), 10);
        for (i, x) in positions.iter().enumerate() {
            // Event k fires at alpha k/10 along the 0 -> 100 sweep.
            assert_relative_eq!(*x, (i + 1) as f32 * 10.0, epsilon = 1.0e-3);
        }
    }

    #[test]
    fn test_velocity_inheritance_scales_frame_displacement() {
        let mut e = emitter(EmitterDefinition {
            emission_rate: 1.0,
            burst_size: 1,
            velocity_inherit_factor: 0.5,
            max_age_ms: 60_000.0,
            capacity: 16,
            ..Default::default()
        });
        let mut rng = rng();

        e.start(0, &Transform::from_position(Vec3::zeros()));
        e.update(
            1000,
            &Transform::from_position(Vec3::new(100.0, 0.0, 0.0)),
            &mut rng,
        );

        let p = e.buffer().live_particles().next().expect("one spawn");
        // 100 units over 1000 ms at factor 0.5 = 0.05 units/ms.
        assert_relative_eq!(p.velocity.x, 0.05, epsilon = 1.0e-6);
    }

    #[test]
    fn test_budget_completes_mid_call_and_stops_spawning() {
        let mut e = emitter(EmitterDefinition {
            emission_rate: 10.0,
            burst_size: 2,
            max_particles: 5,
            max_age_ms: 60_000.0,
            capacity: 64,
            ..Default::default()
        });
        let mut rng = rng();
        let at = Transform::identity();

        e.start(0, &at);
        e.update(1000, &at, &mut rng);

        assert_eq!(e.state(), EmitterState::Complete);
        assert_eq!(e.buffer().live_count(), 5);

        // Further updates emit nothing.
        e.update(2000, &at, &mut rng);
        assert_eq!(e.buffer().live_count(), 5);
    }

    #[test]
    fn test_one_time_burst_is_consumed_once() {
        let mut e = emitter(EmitterDefinition {
            emission_rate: 10.0,
            burst_size: 1,
            max_age_ms: 60_000.0,
            capacity: 64,
            ..Default::default()
        });
        let mut rng = rng();
        let at = Transform::identity();

        e.start(0, &at);
        e.request_one_time_burst(6);
        e.update(200, &at, &mut rng);

        // First event bursts 6, second reverts to the configured 1.
        assert_eq!(e.buffer().live_count(), 7);
    }

    #[test]
    fn test_stall_wraps_elapsed_time_instead_of_backlogging() {
        let mut e = emitter(EmitterDefinition {
            emission_rate: 10.0, // 100 ms per event
            burst_size: 1,
            max_age_ms: 600_000.0,
            capacity: 4,
            ..Default::default()
        });
        let mut rng = rng();
        let at = Transform::identity();

        // Fill cycle: 100 ms * (4 / gcd(4, 1)) = 400 ms. A 100 s stall wraps
        // to 100000 % 400 = 0 ms of effective elapsed time.
        e.start(0, &at);
        e.update(100_000, &at, &mut rng);
        assert_eq!(e.buffer().live_count(), 0);

        // A stall that wraps to a partial cycle emits only that partial.
        let mut e2 = emitter(EmitterDefinition {
            emission_rate: 10.0,
            burst_size: 1,
            max_age_ms: 600_000.0,
            capacity: 4,
            ..Default::default()
        });
        e2.start(0, &at);
        e2.update(100_250, &at, &mut rng); // 100250 % 400 = 250 -> 2 events
        assert_eq!(e2.buffer().live_count(), 2);
    }

    #[test]
    fn test_stop_halts_emission_but_keeps_draining() {
        let mut e = emitter(EmitterDefinition {
            emission_rate: 10.0,
            burst_size: 1,
            max_age_ms: 500.0,
            capacity: 64,
            ..Default::default()
        });
        let mut rng = rng();
        let at = Transform::identity();

        e.start(0, &at);
        e.update(300, &at, &mut rng);
        assert_eq!(e.buffer().live_count(), 3);

        e.stop();
        e.update(601, &at, &mut rng);
        // No new spawns; the oldest particle (age 501 > 500) ages out.
        assert_eq!(e.buffer().live_count(), 2);
        e.update(1601, &at, &mut rng);
        assert_eq!(e.buffer().live_count(), 0);
    }

    #[test]
    fn test_into_buffer_marks_emitter_dead() {
        let mut e = emitter(EmitterDefinition {
            emission_rate: 10.0,
            max_age_ms: 100.0,
            capacity: 8,
            ..Default::default()
        });
        let mut rng = rng();
        let at = Transform::identity();

        e.start(0, &at);
        e.update(100, &at, &mut rng);

        let mut buffer = e.into_buffer();
        assert!(!buffer.is_complete());
        buffer.tick(500);
        assert!(buffer.is_complete());
    }

    #[test]
    fn test_restart_after_complete_resets_budget() {
        let mut e = emitter(EmitterDefinition {
            emission_rate: 10.0,
            burst_size: 1,
            max_particles: 2,
            max_age_ms: 60_000.0,
            capacity: 64,
            ..Default::default()
        });
        let mut rng = rng();
        let at = Transform::identity();

        e.start(0, &at);
        e.update(1000, &at, &mut rng);
        assert_eq!(e.state(), EmitterState::Complete);

        e.start(1000, &at);
        assert_eq!(e.state(), EmitterState::Active);
        e.update(2000, &at, &mut rng);
        assert_eq!(e.buffer().live_count(), 4);
    }
}
