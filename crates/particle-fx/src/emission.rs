//! Spawn sampling for every particle kind
//!
//! All randomness goes through the emitter-owned [`ParticleRng`]. Ranges are
//! half-open `[min, max)` uniform draws unless noted otherwise.

use crate::collision::Ball;
use crate::config::{BallsConfig, EmitterKind, FireworkConfig};
use crate::fireworks::{ComplexFirework, FireworkNode, NodeId, SimpleFirework};
use crate::particle::{Particle, ParticleKind, SparkRay};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random number generator owned by each emitter
pub type ParticleRng = StdRng;

/// Seeded generator for reproducible runs, OS entropy otherwise
pub fn rng_from_seed(seed: Option<u64>) -> ParticleRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// `(r - 0.5) * scale`, a symmetric jitter of total width `scale`
#[inline]
fn centered(rng: &mut ParticleRng, scale: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * scale
}

/// Velocity in the XY plane from an angle in degrees
#[inline]
pub fn polar_velocity(angle_degrees: f32, speed: f32) -> Vec3 {
    let rad = angle_degrees.to_radians();
    Vec3::new(rad.cos() * speed, rad.sin() * speed, 0.0)
}

/// Create a particle for `kind`.
///
/// `anchor` is only used by world-space kinds; local kinds spawn around the
/// origin and the emitter offsets them at render time.
pub fn create_particle(
    kind: EmitterKind,
    anchor: Vec3,
    balls: &BallsConfig,
    fireworks: &FireworkConfig,
    rng: &mut ParticleRng,
) -> Particle {
    match kind {
        EmitterKind::Spark => create_spark(rng),
        EmitterKind::Smoke => create_smoke(rng),
        EmitterKind::Rain => create_rain(rng),
        EmitterKind::Cloud => create_cloud(rng),
        EmitterKind::FallingBalls => create_ball(balls, rng),
        EmitterKind::SimpleFirework => create_simple_firework(anchor, fireworks, rng),
        EmitterKind::ComplexFirework => create_complex_firework(anchor, fireworks, rng),
    }
}

/// Spark on a random ray: angle in [0, 360), radius in [0, 1),
/// multiplier in [125, 250)
pub fn create_spark(rng: &mut ParticleRng) -> Particle {
    let angle = rng.random_range(0.0..360.0);
    let radius = rng.random::<f32>();
    let multiplier = rng.random_range(125.0..250.0);
    let life = rng.random_range(1.0..3.0);
    Particle::new(
        Vec3::ZERO,
        life,
        ParticleKind::Spark(SparkRay::new(angle, radius, multiplier)),
    )
}

/// Smoke puff near the origin drifting mostly upwards
pub fn create_smoke(rng: &mut ParticleRng) -> Particle {
    const VELOCITY_SCALE: f32 = 0.8;
    const POSITION_SCALE: f32 = 0.2;

    let velocity = Vec3::new(
        centered(rng, VELOCITY_SCALE),
        rng.random::<f32>() * VELOCITY_SCALE,
        0.0,
    );
    let life = rng.random_range(2.0..5.0);
    let position = Vec3::new(
        centered(rng, POSITION_SCALE),
        centered(rng, POSITION_SCALE),
        0.0,
    );
    Particle::new(position, life, ParticleKind::Smoke { velocity })
}

/// Rain drop in a 12 unit wide band above the origin
pub fn create_rain(rng: &mut ParticleRng) -> Particle {
    let position = Vec3::new(centered(rng, 12.0), 2.3 + centered(rng, 1.0), 0.0);
    let velocity = Vec3::new(rng.random::<f32>() * 0.03, -5.0, 0.0);
    let life = 2.0 + centered(rng, 4.0);
    Particle::new(
        position,
        life,
        ParticleKind::Rain {
            velocity,
            size: 10.0,
        },
    )
}

/// Cloud puff in a 40 unit wide band
pub fn create_cloud(rng: &mut ParticleRng) -> Particle {
    let position = Vec3::new(centered(rng, 40.0), 1.0 + centered(rng, 2.0), 0.0);
    let velocity = Vec3::new(centered(rng, 0.2), 0.0, 0.0);
    let size = 300.0 + centered(rng, 300.0);
    Particle::new(position, 1.0, ParticleKind::Cloud { velocity, size })
}

/// Ball dropped at rest from the spawn box
pub fn create_ball(config: &BallsConfig, rng: &mut ParticleRng) -> Particle {
    let x = sample_range(rng, config.spawn_x);
    let y = sample_range(rng, config.spawn_y);
    Particle::new(
        Vec3::new(x, y, 0.0),
        config.life,
        ParticleKind::Ball(Ball::new(Vec3::ZERO, config.radius, config.mass)),
    )
}

fn sample_range(rng: &mut ParticleRng, [min, max]: [f32; 2]) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

/// Rocket launched straight up from `anchor` at [5, 10) units per second
pub fn create_simple_firework(
    anchor: Vec3,
    config: &FireworkConfig,
    rng: &mut ParticleRng,
) -> Particle {
    let velocity = Vec3::new(0.0, rng.random_range(5.0..10.0), 0.0);
    Particle::new(
        anchor,
        SimpleFirework::LIFE,
        ParticleKind::SimpleFirework(Box::new(SimpleFirework::new(
            velocity,
            config.explosion_time,
            config.trail_length,
        ))),
    )
}

/// Wobbling rocket with a burst schedule
pub fn create_complex_firework(
    anchor: Vec3,
    config: &FireworkConfig,
    rng: &mut ParticleRng,
) -> Particle {
    let velocity_y = rng.random_range(5.0..10.0);
    let sign = if rng.random::<f32>() > 0.5 { 1.0 } else { -1.0 };
    let frequency = sign * rng.random_range(20.0..70.0);
    Particle::new(
        anchor,
        ComplexFirework::LIFE,
        ParticleKind::ComplexFirework(Box::new(ComplexFirework::new(
            anchor.x,
            velocity_y,
            config.amplitude,
            frequency,
            config.explosion_times.iter().copied(),
            config.trail_length,
        ))),
    )
}

/// Ember thrown radially from a burst: speed in [1, 3), life around 1s
pub fn create_ember(origin: Vec3, parent: Option<NodeId>, rng: &mut ParticleRng) -> FireworkNode {
    let angle = rng.random_range(0.0..360.0);
    let speed = rng.random_range(1.0..3.0);
    let life = 1.0 + centered(rng, 1.0);
    FireworkNode::ember(origin, life, polar_velocity(angle, speed), parent)
}

/// Secondary rocket thrown from a complex burst: speed in [2, 4),
/// bursting after 0.5 to 1.5 seconds, without a trail
pub fn create_sub_shell(
    origin: Vec3,
    parent: Option<NodeId>,
    rng: &mut ParticleRng,
) -> FireworkNode {
    let angle = rng.random_range(0.0..360.0);
    let speed = rng.random_range(2.0..4.0);
    let explosion_time = 1.0 + centered(rng, 1.0);
    FireworkNode::shell(
        origin,
        polar_velocity(angle, speed),
        explosion_time,
        0,
        parent,
    )
}
