//! Headless skirmish demo
//!
//! Drives the full render core against the recording backend: a tank with
//! treads and a garrisoned rider rolls forward while its dust-trail emitter
//! streams particles. No window or GPU is involved; the recorded draw log
//! stands in for the real renderer.

use rand::rngs::StdRng;
use rand::SeedableRng;

use rts_render::condition::state::AnimationSpec;
use rts_render::particle::{Keyframe, KeyframeCurve, ParticleCurves};
use rts_render::prelude::*;
use rts_render::render::ParticleDrawCall;

const FRAME_MS: u32 = 33;
const FRAMES: u32 = 120;

struct SkirmishDemo {
    clock: FrameClock,
    table: DrawableTable,
    tank_id: DrawableId,
    emitter: ParticleEmitter,
    membership: SceneMembership,
    backend: RecordingBackend,
    rng: StdRng,
}

impl SkirmishDemo {
    fn new() -> Self {
        log::info!("Building condition-state table...");
        let resolver = std::sync::Arc::new(build_tank_states());

        log::info!("Building drawables...");
        let mut table = DrawableTable::new();

        let mut rider = Drawable::new();
        rider.hidden = true;
        rider.add_module(DrawModule::Model(ModelDraw::new(resolver.clone())));
        let rider_id = table.insert(rider);

        let mut tank = Drawable::new();
        tank.add_module(DrawModule::Model(ModelDraw::new(resolver)));
        tank.add_module(DrawModule::Treads(TreadDraw::new("tank_treads", 0.002)));
        tank.add_module(DrawModule::Dependency(DependencyDraw::new(rider_id)));
        tank.notify_dependency_cleared();
        let tank_id = table.insert(tank);

        log::info!("Building dust-trail emitter...");
        let emitter =
            ParticleEmitter::new(&dust_trail_definition()).expect("demo definition is valid");

        Self {
            clock: FrameClock::new(),
            table,
            tank_id,
            emitter,
            membership: SceneMembership::new(),
            backend: RecordingBackend::new(),
            rng: StdRng::seed_from_u64(1337),
        }
    }

    fn run(&mut self) {
        self.membership.ensure_in_scene(&mut self.backend);
        self.emitter.start(self.clock.now_ms(), &Transform::identity());

        for frame in 0..FRAMES {
            self.clock.advance(FRAME_MS);
            let now_ms = self.clock.now_ms();

            // The tank rolls down the +X axis at a steady clip.
            let tank_transform =
                Transform::from_position(Vec3::new(now_ms as f32 * 0.01, 0.0, 0.0));

            {
                let tank = self.table.get_mut(self.tank_id).expect("tank exists");
                tank.transform = tank_transform.clone();
                tank.set_condition_flags(
                    ModelConditionFlags::MOVING | ModelConditionFlags::CARRYING,
                );
            }

            self.emitter.update(now_ms, &tank_transform, &mut self.rng);

            let mut ctx = DrawContext {
                backend: &mut self.backend,
                now_ms,
            };
            draw_all(&mut self.table, &mut ctx);

            let vertices = self.emitter.buffer().render_state(now_ms);
            if !vertices.is_empty() {
                let call = ParticleDrawCall {
                    texture: self.emitter.buffer().texture().to_owned(),
                    vertices,
                };
                if let Err(e) = self.backend.submit_particles(call) {
                    log::warn!("particle draw failed: {e}");
                }
            }

            if frame % 30 == 0 {
                log::info!(
                    "frame {frame}: {} live particles, {} draw calls recorded",
                    self.emitter.buffer().live_count(),
                    self.backend.recorded().len()
                );
            }
        }

        self.membership.ensure_removed(&mut self.backend);

        log::info!(
            "done: {} backend calls over {FRAMES} frames, final particle count {}",
            self.backend.recorded().len(),
            self.emitter.buffer().live_count()
        );
    }
}

fn build_tank_states() -> ModelConditionResolver {
    let mut resolver = ModelConditionResolver::new();

    let idle = resolver.register_state(ModelConditionState::new(
        "idle",
        "tank_idle",
        ModelConditionFlags::empty(),
    ));
    let moving = resolver.register_state(
        ModelConditionState::new("moving", "tank_moving", ModelConditionFlags::MOVING)
            .with_animation(AnimationSpec {
                name: String::from("roll"),
                duration_ms: 800,
                fps: 30.0,
                distance_covered: 4.0,
                idle: false,
            }),
    );
    resolver.register_state(ModelConditionState::new(
        "moving_damaged",
        "tank_moving_damaged",
        ModelConditionFlags::MOVING | ModelConditionFlags::DAMAGED,
    ));
    resolver.register_transition(
        idle,
        moving,
        ModelConditionState::new("idle_to_moving", "tank_lurch", ModelConditionFlags::empty())
            .with_animation(AnimationSpec {
                name: String::from("lurch"),
                duration_ms: 150,
                fps: 30.0,
                distance_covered: 0.0,
                idle: false,
            }),
    );

    resolver
}

fn dust_trail_definition() -> EmitterDefinition {
    let mut curves = ParticleCurves::default();
    curves.color = KeyframeCurve::new(
        Vec3::new(0.55, 0.47, 0.35),
        Vec3::new(0.05, 0.05, 0.05),
        vec![Keyframe {
            time_ms: 1500,
            value: Vec3::new(0.35, 0.32, 0.28),
        }],
    );
    curves.opacity = KeyframeCurve::new(
        0.8,
        0.1,
        vec![Keyframe {
            time_ms: 1500,
            value: 0.0,
        }],
    );
    curves.size = KeyframeCurve::new(
        0.5,
        0.2,
        vec![Keyframe {
            time_ms: 1500,
            value: 2.5,
        }],
    );

    EmitterDefinition {
        name: String::from("dust_trail"),
        texture: String::from("fx_dust"),
        capacity: 256,
        emission_rate: 30.0,
        burst_size: 2,
        max_age_ms: 1500.0,
        base_velocity: Vec3::new(0.0, 0.0, 0.001),
        outward_velocity: 0.002,
        velocity_inherit_factor: 0.3,
        position_volume: EmissionVolume::Cylinder {
            radius: 0.8,
            length: 0.4,
        },
        velocity_volume: EmissionVolume::SphereSolid { radius: 0.001 },
        curves,
        ..Default::default()
    }
}

fn main() {
    rts_render::foundation::logging::init();
    log::info!("Starting skirmish demo...");

    let mut demo = SkirmishDemo::new();
    demo.run();
}
