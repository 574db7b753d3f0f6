//! Particle emitter runtime state
//!
//! A [`ParticleEmitter`] owns a pool of particles of a single kind and keeps
//! it populated according to its [`PoolPolicy`]. Rendering flattens the pool
//! into batches for a [`RenderSink`].

use crate::collision::resolve_collisions;
use crate::config::{BallsConfig, EmitterConfig, EmitterKind, FireworkConfig};
use crate::emission::{self, ParticleRng, rng_from_seed};
use crate::error::{Result, check_delta};
use crate::particle::{Particle, ParticleKind, Step, StepContext};
use crate::render::{LineBatch, PointBatch, RenderSink, TextureHandle};
use crate::surface::Surface;
use glam::{Mat4, Vec3};
use log::{debug, trace};
use std::future::Future;

/// Range and step used to draw the falling balls ground
pub const SURFACE_SAMPLE_RANGE: (f32, f32) = (-7.0, 7.0);
/// Horizontal distance between surface samples
pub const SURFACE_SAMPLE_STEP: f32 = 0.01;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const SPARK_SIZE: f32 = 32.0;
const SMOKE_SIZE: f32 = 128.0;
const RAIN_COLOR: [f32; 4] = [0.5, 0.5, 1.0, 0.5];
const CLOUD_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.2];
const SPARK_TRACK_TAIL: [f32; 3] = [0.47, 0.31, 0.24];

/// Frame in which particle positions are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    /// Relative to the emitter anchor; the anchor is added at render time
    Local,
    /// Already in world coordinates
    World,
}

impl Space {
    pub fn for_kind(kind: EmitterKind) -> Self {
        match kind {
            EmitterKind::Spark | EmitterKind::Smoke | EmitterKind::Rain | EmitterKind::Cloud => {
                Space::Local
            }
            EmitterKind::FallingBalls
            | EmitterKind::SimpleFirework
            | EmitterKind::ComplexFirework => Space::World,
        }
    }
}

/// What happens to a spark that runs past the end of its ray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recycle {
    /// Drop it and let the top-up spawn a fresh one
    Replace,
    /// Send it back to the origin with a fresh age
    #[default]
    ResetInPlace,
}

/// How an emitter keeps its pool populated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoolPolicy {
    /// Keep exactly `capacity` particles, replacing the dead after each update
    Replenish {
        capacity: usize,
        recycle: Recycle,
        /// Fill the pool at construction instead of on the first update
        prefill: bool,
    },
    /// Spawn `batch` particles every `interval` seconds; particles leave the
    /// pool only by dying
    Interval { interval: f32, batch: usize },
}

impl PoolPolicy {
    /// Policy the effect was designed around
    pub fn for_config(config: &EmitterConfig) -> Self {
        match config.kind {
            EmitterKind::FallingBalls => PoolPolicy::Interval {
                interval: config.balls.spawn_interval,
                batch: config.balls.batch,
            },
            kind => PoolPolicy::Replenish {
                capacity: config.resolved_particle_count(),
                recycle: Recycle::default(),
                prefill: !matches!(
                    kind,
                    EmitterKind::SimpleFirework | EmitterKind::ComplexFirework
                ),
            },
        }
    }
}

/// Buffers produced by one render pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitterFrame {
    /// Point sprites, textured when a texture is attached
    pub points: PointBatch,
    /// Independent segments (spark tracks, rocket trails)
    pub lines: LineBatch,
    /// Connected polyline (falling balls ground)
    pub strip: LineBatch,
}

/// Runtime particle emitter
#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    /// Effect produced by this emitter
    kind: EmitterKind,
    /// World anchor
    position: Vec3,
    /// Pool maintenance strategy
    policy: PoolPolicy,
    /// Coordinate frame of particle positions
    space: Space,
    /// Current particles
    particles: Vec<Particle>,
    /// Random number generator
    rng: ParticleRng,
    balls: BallsConfig,
    fireworks: FireworkConfig,
    /// Ground for falling balls
    surface: Surface,
    /// Seconds accumulated towards the next interval spawn
    spawn_timer: f32,
    /// Texture bound when drawing points, once available
    texture: Option<TextureHandle>,
}

impl ParticleEmitter {
    /// Create an emitter, filling the pool when its policy asks for it
    pub fn new(config: &EmitterConfig) -> Result<Self> {
        config.validate()?;
        let policy = PoolPolicy::for_config(config);
        let mut emitter = Self {
            kind: config.kind,
            position: config.position,
            policy,
            space: Space::for_kind(config.kind),
            particles: Vec::new(),
            rng: rng_from_seed(config.seed),
            balls: config.balls.clone(),
            fireworks: config.fireworks.clone(),
            surface: Surface::default(),
            spawn_timer: 0.0,
            texture: None,
        };

        if let PoolPolicy::Replenish { prefill: true, .. } = policy {
            emitter.init_particles();
        }

        debug!(
            "created {} emitter at {} with {} particles",
            emitter.kind,
            emitter.position,
            emitter.particles.len()
        );
        Ok(emitter)
    }

    /// Replace the ground the balls bounce on
    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = surface;
        self
    }

    /// Change how overshooting sparks are recycled
    pub fn with_recycle(mut self, recycle: Recycle) -> Self {
        if let PoolPolicy::Replenish { recycle: r, .. } = &mut self.policy {
            *r = recycle;
        }
        self
    }

    pub fn kind(&self) -> EmitterKind {
        self.kind
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the emitter anchor. Local-space particles follow it.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn policy(&self) -> PoolPolicy {
        self.policy
    }

    pub fn space(&self) -> Space {
        self.space
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Pool size a replenishing emitter maintains; zero for interval spawning
    pub fn target_count(&self) -> usize {
        match self.policy {
            PoolPolicy::Replenish { capacity, .. } => capacity,
            PoolPolicy::Interval { .. } => 0,
        }
    }

    /// Get the current number of particles
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Insert a hand-built particle
    pub fn push_particle(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Remove every particle and reset the spawn timer
    pub fn clear(&mut self) {
        self.particles.clear();
        self.spawn_timer = 0.0;
    }

    /// Fill the pool with `target_count` fresh particles
    pub fn init_particles(&mut self) {
        let count = self.target_count();
        self.particles.reserve(count);
        for _ in 0..count {
            let particle = self.create_particle();
            self.particles.push(particle);
        }
    }

    /// Sample a new particle of this emitter's kind
    pub fn create_particle(&mut self) -> Particle {
        emission::create_particle(
            self.kind,
            self.position,
            &self.balls,
            &self.fireworks,
            &mut self.rng,
        )
    }

    /// Advance the simulation by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) -> Result<()> {
        check_delta(delta_time)?;
        match self.policy {
            PoolPolicy::Replenish {
                capacity, recycle, ..
            } => self.update_pool(delta_time, capacity, recycle),
            PoolPolicy::Interval { interval, batch } => {
                self.update_interval(delta_time, interval, batch);
            }
        }
        Ok(())
    }

    fn update_pool(&mut self, dt: f32, capacity: usize, recycle: Recycle) {
        let Self {
            particles,
            rng,
            balls,
            fireworks,
            surface,
            ..
        } = self;
        let mut ctx = StepContext {
            rng,
            balls,
            fireworks,
            surface,
        };

        let mut recycled = 0usize;
        for particle in particles.iter_mut() {
            if particle.update(dt, &mut ctx) == Step::Overshot {
                match recycle {
                    Recycle::ResetInPlace => particle.rewind(),
                    Recycle::Replace => particle.expire(),
                }
                recycled += 1;
            }
        }
        if recycled > 0 {
            trace!("{} emitter recycled {recycled} sparks", self.kind);
        }

        self.particles.retain(Particle::is_alive);
        while self.particles.len() < capacity {
            let particle = self.create_particle();
            self.particles.push(particle);
        }
    }

    fn update_interval(&mut self, dt: f32, interval: f32, batch: usize) {
        self.spawn_timer += dt;
        if self.spawn_timer >= interval {
            for _ in 0..batch {
                let particle = self.create_particle();
                self.particles.push(particle);
            }
            self.spawn_timer -= interval;
            trace!(
                "{} emitter spawned {batch}, pool now {}",
                self.kind,
                self.particles.len()
            );
        }

        let Self {
            particles,
            rng,
            balls,
            fireworks,
            surface,
            ..
        } = self;
        let mut ctx = StepContext {
            rng,
            balls,
            fireworks,
            surface,
        };
        for particle in particles.iter_mut() {
            particle.update(dt, &mut ctx);
        }

        resolve_collisions(&mut self.particles, self.balls.elasticity);
        self.particles.retain(Particle::is_alive);
    }

    /// Make `texture` available to subsequent renders
    pub fn attach_texture(&mut self, texture: TextureHandle) {
        self.texture = Some(texture);
    }

    /// Wait for a texture to finish loading, then attach it.
    ///
    /// Renders issued before it resolves draw untextured.
    pub async fn set_texture<F>(&mut self, texture: F)
    where
        F: Future<Output = TextureHandle>,
    {
        let handle = texture.await;
        self.attach_texture(handle);
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    fn world_position(&self, local: Vec3) -> Vec3 {
        match self.space {
            Space::Local => self.position + local,
            Space::World => local,
        }
    }

    /// Flatten the pool into render buffers, in particle order
    pub fn build_frame(&self) -> EmitterFrame {
        let mut frame = EmitterFrame {
            points: PointBatch::with_capacity(self.particles.len()),
            ..EmitterFrame::default()
        };

        for particle in &self.particles {
            let position = self.world_position(particle.position);
            match &particle.kind {
                ParticleKind::Spark(_) => {
                    let alpha = particle.fade_alpha();
                    frame.points.push(position, [1.0, 1.0, 1.0, alpha], SPARK_SIZE);
                    let [r, g, b] = SPARK_TRACK_TAIL;
                    frame.lines.push_segment(
                        self.position,
                        [1.0, 1.0, 1.0, alpha],
                        position,
                        [r, g, b, alpha],
                    );
                }
                ParticleKind::Smoke { .. } => {
                    frame
                        .points
                        .push(position, [0.5, 0.5, 0.5, particle.fade_alpha()], SMOKE_SIZE);
                }
                ParticleKind::Rain { size, .. } => {
                    frame.points.push(position, RAIN_COLOR, *size);
                }
                ParticleKind::Cloud { size, .. } => {
                    frame.points.push(position, CLOUD_COLOR, *size);
                }
                ParticleKind::Ball(_) => {
                    frame.points.push(position, WHITE, self.balls.point_size);
                }
                ParticleKind::SimpleFirework(firework) => {
                    firework.render_into(position, &mut frame.points, &mut frame.lines);
                }
                ParticleKind::ComplexFirework(firework) => {
                    firework.render_into(position, &mut frame.points, &mut frame.lines);
                }
            }
        }

        if self.kind == EmitterKind::FallingBalls {
            let (min, max) = SURFACE_SAMPLE_RANGE;
            for point in self.surface.sample(min, max, SURFACE_SAMPLE_STEP) {
                frame.strip.push_vertex(point, BLACK);
            }
        }

        frame
    }

    /// Draw the emitter: points first, then segments, then the ground strip.
    /// Empty line batches are skipped.
    pub fn render<S>(&self, sink: &mut S, view: &Mat4, projection: &Mat4) -> Result<()>
    where
        S: RenderSink + ?Sized,
    {
        let frame = self.build_frame();
        self.render_particles(sink, view, projection, &frame.points)?;
        if !frame.lines.is_empty() {
            frame.lines.validate(false)?;
            sink.draw_lines(view, projection, &frame.lines)?;
        }
        if !frame.strip.is_empty() {
            frame.strip.validate(true)?;
            sink.draw_line_strip(view, projection, &frame.strip)?;
        }
        Ok(())
    }

    /// Check a point batch and hand it to the sink with this emitter's texture
    pub fn render_particles<S>(
        &self,
        sink: &mut S,
        view: &Mat4,
        projection: &Mat4,
        batch: &PointBatch,
    ) -> Result<()>
    where
        S: RenderSink + ?Sized,
    {
        batch.validate()?;
        sink.draw_points(view, projection, self.texture, batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParticleError;
    use crate::render::{DrawCall, FrameRecorder};

    fn seeded(config: EmitterConfig) -> ParticleEmitter {
        ParticleEmitter::new(&config.with_seed(99)).unwrap()
    }

    #[test]
    fn test_prefill_and_empty_start() {
        assert_eq!(seeded(EmitterConfig::spark()).particle_count(), 200);
        assert_eq!(seeded(EmitterConfig::cloud()).particle_count(), 50);
        assert_eq!(seeded(EmitterConfig::simple_firework()).particle_count(), 0);
        assert_eq!(seeded(EmitterConfig::falling_balls()).particle_count(), 0);
    }

    #[test]
    fn test_fireworks_fill_on_first_update() {
        let mut emitter = seeded(EmitterConfig::complex_firework());
        emitter.update(0.016).unwrap();
        assert_eq!(emitter.particle_count(), 1);
    }

    #[test]
    fn test_negative_delta_rejected() {
        let mut emitter = seeded(EmitterConfig::rain());
        assert!(matches!(
            emitter.update(-0.5),
            Err(ParticleError::ContractViolation(_))
        ));
        assert_eq!(emitter.particle_count(), 1000);
    }

    #[test]
    fn test_interval_spawning() {
        let mut emitter = seeded(EmitterConfig::falling_balls());
        emitter.update(0.5).unwrap();
        assert_eq!(emitter.particle_count(), 0);
        emitter.update(0.5).unwrap();
        assert_eq!(emitter.particle_count(), 5);
    }

    #[test]
    fn test_replace_recycle_respawns_sparks() {
        let mut emitter = seeded(EmitterConfig::spark()).with_recycle(Recycle::Replace);
        for _ in 0..50 {
            emitter.update(0.05).unwrap();
            assert_eq!(emitter.particle_count(), 200);
        }
    }

    #[test]
    fn test_local_space_offsets_render() {
        let config = EmitterConfig::smoke()
            .with_position(Vec3::new(10.0, 0.0, 0.0))
            .with_particle_count(1);
        let emitter = seeded(config);
        let frame = emitter.build_frame();
        let drawn = frame.points.position(0).unwrap();
        assert!((drawn - emitter.particles()[0].position - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_render_without_texture() {
        let emitter = seeded(EmitterConfig::rain().with_particle_count(3));
        let mut recorder = FrameRecorder::new();
        emitter
            .render(&mut recorder, &Mat4::IDENTITY, &Mat4::IDENTITY)
            .unwrap();

        assert_eq!(recorder.calls().len(), 1);
        assert!(matches!(
            &recorder.calls()[0],
            DrawCall::Points { texture: None, batch } if batch.len() == 3
        ));
    }

    #[test]
    fn test_spark_render_draws_tracks() {
        let mut emitter = seeded(EmitterConfig::spark().with_particle_count(4));
        emitter.attach_texture(TextureHandle(7));
        let mut recorder = FrameRecorder::new();
        emitter
            .render(&mut recorder, &Mat4::IDENTITY, &Mat4::IDENTITY)
            .unwrap();

        assert_eq!(recorder.points_drawn(), 4);
        assert_eq!(recorder.line_vertices_drawn(), 8);
        assert!(matches!(
            &recorder.calls()[0],
            DrawCall::Points {
                texture: Some(TextureHandle(7)),
                ..
            }
        ));
    }

    #[test]
    fn test_balls_render_surface_strip() {
        let emitter = seeded(EmitterConfig::falling_balls());
        let mut recorder = FrameRecorder::new();
        emitter
            .render(&mut recorder, &Mat4::IDENTITY, &Mat4::IDENTITY)
            .unwrap();

        assert_eq!(recorder.points_drawn(), 0);
        assert!(matches!(
            recorder.calls().last(),
            Some(DrawCall::LineStrip(strip)) if strip.vertex_count() == 1401
        ));
    }

    #[test]
    fn test_bad_batch_rejected() {
        let emitter = seeded(EmitterConfig::cloud());
        let mut recorder = FrameRecorder::new();
        let batch = PointBatch::from_raw(vec![0.0; 4], vec![1.0; 4], vec![1.0]);
        let result =
            emitter.render_particles(&mut recorder, &Mat4::IDENTITY, &Mat4::IDENTITY, &batch);
        assert!(matches!(result, Err(ParticleError::ContractViolation(_))));
        assert!(recorder.calls().is_empty());
    }
}
