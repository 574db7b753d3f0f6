//! Ball physics for the falling balls effect
//!
//! Balls fall under gravity, land on a [`Surface`] and push each other apart.
//! Ball/ball resolution checks every pair, so each pass costs O(n²) in the
//! number of live balls. One pass exchanges impulses, then position-only
//! passes repeat until no pair overlaps by more than [`CONTACT_SLOP`], at
//! most [`SEPARATION_PASSES`] times. Ball lifetime keeps `n` small.

use crate::config::BallsConfig;
use crate::particle::{Particle, ParticleKind};
use crate::surface::Surface;
use glam::{Vec2, Vec3};

/// Overlap below this depth counts as resting contact
pub const CONTACT_SLOP: f32 = 1e-4;

/// Upper bound on position-only passes after the impulse pass
pub const SEPARATION_PASSES: usize = 64;

/// Rigid ball state carried by a falling-ball particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub velocity: Vec3,
    pub radius: f32,
    pub mass: f32,
}

impl Ball {
    pub fn new(velocity: Vec3, radius: f32, mass: f32) -> Self {
        Self {
            velocity,
            radius,
            mass,
        }
    }

    /// Integrate one step with symplectic Euler and bounce off the surface.
    ///
    /// When the ball's bottom dips below the ground it is lifted to rest on
    /// it and its velocity is reflected about the surface normal, scaled by
    /// `1 + elasticity`.
    pub fn step(&mut self, position: &mut Vec3, dt: f32, config: &BallsConfig, surface: &Surface) {
        self.velocity.y -= config.gravity * dt;
        position.x += self.velocity.x * dt;
        position.y += self.velocity.y * dt;

        let ground = surface.height(position.x);
        if position.y - self.radius < ground {
            position.y = ground + self.radius;
            let normal = surface.normal(position.x, config.derivative_step);
            let dot = self.velocity.dot(normal);
            self.velocity -= (1.0 + config.elasticity) * dot * normal;
        }
    }
}

/// Resolve contact between two balls.
///
/// Approaching balls exchange an impulse along the line of centres. Any
/// overlapping pair is then pushed apart by half the overlap each. Returns
/// whether the balls were touching. Non-ball particles are ignored.
pub fn collide_pair(a: &mut Particle, b: &mut Particle, elasticity: f32) -> bool {
    let (ParticleKind::Ball(ball_a), ParticleKind::Ball(ball_b)) = (&mut a.kind, &mut b.kind)
    else {
        return false;
    };

    let offset = (b.position - a.position).truncate();
    let distance = offset.length();
    let reach = ball_a.radius + ball_b.radius;
    // NaN distances are not contacts
    if !(distance < reach) {
        return false;
    }

    let normal = contact_normal(offset, distance);

    let approach = (ball_b.velocity - ball_a.velocity).dot(normal);
    if approach < 0.0 {
        let impulse = (1.0 + elasticity) * approach / (ball_a.mass + ball_b.mass);
        ball_a.velocity += impulse * ball_b.mass * normal;
        ball_b.velocity -= impulse * ball_a.mass * normal;
    }

    let separation = (reach - distance) * 0.5 * normal;
    a.position -= separation;
    b.position += separation;
    true
}

fn contact_normal(offset: Vec2, distance: f32) -> Vec3 {
    if distance > f32::EPSILON {
        (offset / distance).extend(0.0)
    } else {
        Vec3::X
    }
}

/// Push an overlapping pair apart without touching velocities.
///
/// Returns whether the pair overlapped by more than [`CONTACT_SLOP`].
fn separate_pair(a: &mut Particle, b: &mut Particle) -> bool {
    let (ParticleKind::Ball(ball_a), ParticleKind::Ball(ball_b)) = (&a.kind, &b.kind) else {
        return false;
    };

    let offset = (b.position - a.position).truncate();
    let distance = offset.length();
    let depth = ball_a.radius + ball_b.radius - distance;
    if !(depth > CONTACT_SLOP) {
        return false;
    }

    let separation = depth * 0.5 * contact_normal(offset, distance);
    a.position -= separation;
    b.position += separation;
    true
}

fn for_each_pair(particles: &mut [Particle], mut visit: impl FnMut(&mut Particle, &mut Particle)) {
    for i in 0..particles.len() {
        let (head, tail) = particles.split_at_mut(i + 1);
        let first = &mut head[i];
        for second in tail.iter_mut() {
            visit(first, second);
        }
    }
}

/// Run [`collide_pair`] over every unordered pair, then separate until no
/// pair overlaps. Returns the contact count of the impulse pass.
///
/// Separating one pair can push a ball into a third, so chains and clusters
/// need several passes.
pub fn resolve_collisions(particles: &mut [Particle], elasticity: f32) -> usize {
    let mut contacts = 0;
    for_each_pair(particles, |first, second| {
        if collide_pair(first, second, elasticity) {
            contacts += 1;
        }
    });

    for _ in 0..SEPARATION_PASSES {
        let mut overlapping = false;
        for_each_pair(particles, |first, second| {
            overlapping |= separate_pair(first, second);
        });
        if !overlapping {
            break;
        }
    }
    contacts
}
