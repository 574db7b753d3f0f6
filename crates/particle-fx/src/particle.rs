//! Individual particle representation

use crate::collision::Ball;
use crate::config::{BallsConfig, FireworkConfig};
use crate::emission::ParticleRng;
use crate::fireworks::{ComplexFirework, SimpleFirework};
use crate::surface::Surface;
use glam::{Vec2, Vec3};

/// Visual speed multiplier applied to spark travel
pub const SPARK_SPEED: f32 = 200.0;

/// A single particle in an emitter pool
#[derive(Debug, Clone)]
pub struct Particle {
    /// Position, emitter-local or world depending on the emitter kind
    pub position: Vec3,
    /// Total lifespan in seconds, fixed at creation
    pub life: f32,
    /// Current age in seconds
    pub age: f32,
    /// Per-kind state and update rule
    pub kind: ParticleKind,
}

/// Per-kind particle payload
#[derive(Debug, Clone)]
pub enum ParticleKind {
    /// Straight-line spark that snaps back to the origin on overshoot
    Spark(SparkRay),
    /// Drifting smoke puff
    Smoke { velocity: Vec3 },
    /// Falling rain drop
    Rain { velocity: Vec3, size: f32 },
    /// Cloud puff. Clouds never age.
    Cloud { velocity: Vec3, size: f32 },
    /// Ball bouncing on a surface
    Ball(Ball),
    /// Rocket bursting into embers
    SimpleFirework(Box<SimpleFirework>),
    /// Rocket bursting into rockets
    ComplexFirework(Box<ComplexFirework>),
}

/// Linear spark trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct SparkRay {
    /// Ray direction in degrees
    pub angle: f32,
    /// Ray length
    pub radius: f32,
    /// Slowdown divisor; larger means slower
    pub multiplier: f32,
    /// End of the ray (`x_max`, `y_max`)
    pub target: Vec2,
    /// Per-second slope before the speed constant (`dx`, `dy`)
    pub step: Vec2,
    /// Distance travelled so far (`x`, `y`)
    pub travel: Vec2,
}

impl SparkRay {
    pub fn new(angle: f32, radius: f32, multiplier: f32) -> Self {
        let rad = angle.to_radians();
        let target = Vec2::new(rad.cos() * radius, rad.sin() * radius);
        Self {
            angle,
            radius,
            multiplier,
            target,
            step: target / multiplier,
            travel: Vec2::ZERO,
        }
    }

    /// Whether the spark has travelled past the end of its ray
    pub fn overshot(&self) -> bool {
        self.travel.x.abs() > self.target.x.abs() || self.travel.y.abs() > self.target.y.abs()
    }
}

/// Everything a particle update may need besides its own state
pub struct StepContext<'a> {
    pub rng: &'a mut ParticleRng,
    pub balls: &'a BallsConfig,
    pub fireworks: &'a FireworkConfig,
    pub surface: &'a Surface,
}

/// Outcome of a single particle update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The particle advanced normally
    Advanced,
    /// A spark ran past the end of its ray and needs recycling
    Overshot,
}

impl Particle {
    /// Create a new particle with zero age
    pub fn new(position: Vec3, life: f32, kind: ParticleKind) -> Self {
        Self {
            position,
            life,
            age: 0.0,
            kind,
        }
    }

    /// Check if the particle is still alive
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.age < self.life
    }

    /// Get the age as a fraction of life (0.0 to 1.0)
    #[inline]
    pub fn age_percent(&self) -> f32 {
        if self.life > 0.0 {
            (self.age / self.life).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Alpha for fade-out effects, `1 - age / life`
    #[inline]
    pub fn fade_alpha(&self) -> f32 {
        1.0 - self.age_percent()
    }

    /// Mark the particle as spent so the next filter drops it
    pub fn expire(&mut self) {
        self.age = self.life;
    }

    /// Send a spark back to the origin of its ray with a fresh age.
    ///
    /// Other kinds are left untouched.
    pub fn rewind(&mut self) {
        if let ParticleKind::Spark(ray) = &mut self.kind {
            ray.travel = Vec2::ZERO;
            self.position.x = 0.0;
            self.position.y = 0.0;
            self.age = 0.0;
        }
    }

    /// Advance the particle by `dt` seconds
    pub fn update(&mut self, dt: f32, ctx: &mut StepContext<'_>) -> Step {
        let Particle {
            position,
            life,
            age,
            kind,
        } = self;

        match kind {
            ParticleKind::Spark(ray) => {
                ray.travel += ray.step * dt * SPARK_SPEED;
                position.x = ray.travel.x;
                position.y = ray.travel.y;
                *age += dt;
                if ray.overshot() {
                    return Step::Overshot;
                }
            }
            ParticleKind::Smoke { velocity } | ParticleKind::Rain { velocity, .. } => {
                *position += *velocity * dt;
                *age += dt;
            }
            ParticleKind::Cloud { velocity, .. } => {
                *position += *velocity * dt;
            }
            ParticleKind::Ball(ball) => {
                ball.step(position, dt, ctx.balls, ctx.surface);
                *age += dt;
            }
            ParticleKind::SimpleFirework(firework) => {
                firework.step(position, age, *life, dt, ctx.fireworks, ctx.rng);
            }
            ParticleKind::ComplexFirework(firework) => {
                firework.step(position, age, *life, dt, ctx.fireworks, ctx.rng);
            }
        }

        Step::Advanced
    }

    /// Ball state, if this particle is a ball
    pub fn ball(&self) -> Option<&Ball> {
        match &self.kind {
            ParticleKind::Ball(ball) => Some(ball),
            _ => None,
        }
    }

    /// Velocity for kinds that carry one
    pub fn velocity(&self) -> Option<Vec3> {
        match &self.kind {
            ParticleKind::Smoke { velocity }
            | ParticleKind::Rain { velocity, .. }
            | ParticleKind::Cloud { velocity, .. } => Some(*velocity),
            ParticleKind::Ball(ball) => Some(ball.velocity),
            ParticleKind::SimpleFirework(firework) => Some(firework.shell.velocity),
            ParticleKind::ComplexFirework(firework) => {
                Some(Vec3::new(0.0, firework.velocity_y, 0.0))
            }
            ParticleKind::Spark(_) => None,
        }
    }
}
