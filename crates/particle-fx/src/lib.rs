//! Frame-driven particle effects
//!
//! This crate simulates the classic point-sprite effects: a sparkler, smoke,
//! rain, a cloud band, balls bouncing on a terrain curve, and two kinds of
//! fireworks. Simulation is CPU-only; drawing goes through the [`RenderSink`]
//! trait so any graphics backend can consume the output.
//!
//! # Architecture
//!
//! - `Particle`: position, life, age and a per-kind payload (`ParticleKind`)
//! - `ParticleEmitter`: a pool of one kind, maintained by a `PoolPolicy`
//! - `FireworkArena`: burst cascades as a flat tree of nodes
//! - `Scene`: named emitters with one active selection
//!
//! # Usage
//!
//! ```rust
//! use particle_fx::{EmitterConfig, FrameRecorder, ParticleEmitter};
//! use glam::Mat4;
//!
//! let mut emitter = ParticleEmitter::new(&EmitterConfig::smoke().with_seed(7))?;
//! for _ in 0..60 {
//!     emitter.update(0.016)?;
//! }
//!
//! let mut recorder = FrameRecorder::new();
//! emitter.render(&mut recorder, &Mat4::IDENTITY, &Mat4::IDENTITY)?;
//! assert_eq!(recorder.points_drawn(), 100);
//! # Ok::<(), particle_fx::ParticleError>(())
//! ```

pub mod collision;
pub mod config;
pub mod emission;
pub mod emitter;
pub mod error;
pub mod fireworks;
pub mod particle;
pub mod render;
pub mod scene;
pub mod surface;

pub use collision::{Ball, collide_pair, resolve_collisions};
pub use config::{BallsConfig, EmitterConfig, EmitterKind, FireworkConfig};
pub use emitter::{EmitterFrame, ParticleEmitter, PoolPolicy, Recycle, Space};
pub use error::{ParticleError, Result};
pub use fireworks::{
    ComplexFirework, FireworkArena, FireworkNode, NodeId, NodeKind, SimpleFirework, Stage, Trail,
};
pub use particle::{Particle, ParticleKind, SparkRay};
pub use render::{DrawCall, FrameRecorder, LineBatch, PointBatch, RenderSink, TextureHandle};
pub use scene::{FrameClock, NamedEmitter, Scene, SceneConfig, SurfacePreset};
pub use surface::Surface;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
