//! Emitter configuration
//!
//! Every tunable the effects use lives here with the defaults the effects were
//! designed around. Enable the `serde` feature to load these from JSON.

use crate::error::{ParticleError, Result};
use glam::Vec3;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The effect an emitter produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EmitterKind {
    /// Sparkler: sparks shoot along random rays and snap back to the origin
    Spark,
    /// Rising, fading smoke puffs
    Smoke,
    /// Dense rain curtain
    Rain,
    /// Wide, slowly drifting cloud band
    Cloud,
    /// Balls spawned in batches, bouncing off a terrain curve and each other
    FallingBalls,
    /// Rocket that bursts into embers
    SimpleFirework,
    /// Wobbling rocket that bursts into rockets that burst into embers
    ComplexFirework,
}

impl EmitterKind {
    /// All kinds, in showcase order
    pub const ALL: [EmitterKind; 7] = [
        EmitterKind::Spark,
        EmitterKind::Smoke,
        EmitterKind::Rain,
        EmitterKind::Cloud,
        EmitterKind::SimpleFirework,
        EmitterKind::ComplexFirework,
        EmitterKind::FallingBalls,
    ];

    /// Short name used on the command line and in scene files
    pub fn name(&self) -> &'static str {
        match self {
            EmitterKind::Spark => "spark",
            EmitterKind::Smoke => "smoke",
            EmitterKind::Rain => "rain",
            EmitterKind::Cloud => "cloud",
            EmitterKind::FallingBalls => "falling_balls",
            EmitterKind::SimpleFirework => "simple_firework",
            EmitterKind::ComplexFirework => "complex_firework",
        }
    }

    /// Default pool size. Zero means the kind spawns on a timer instead.
    pub fn default_particle_count(&self) -> usize {
        match self {
            EmitterKind::Spark => 200,
            EmitterKind::Smoke => 100,
            EmitterKind::Rain => 1000,
            EmitterKind::Cloud => 50,
            EmitterKind::FallingBalls => 0,
            EmitterKind::SimpleFirework | EmitterKind::ComplexFirework => 1,
        }
    }

    /// Whether the kind keeps a fixed-size pool
    pub fn is_fixed_pool(&self) -> bool {
        !matches!(self, EmitterKind::FallingBalls)
    }
}

impl fmt::Display for EmitterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EmitterKind {
    type Err = ParticleError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "spark" | "sparkler" => Ok(EmitterKind::Spark),
            "smoke" => Ok(EmitterKind::Smoke),
            "rain" => Ok(EmitterKind::Rain),
            "cloud" | "clouds" => Ok(EmitterKind::Cloud),
            "falling_balls" | "balls" => Ok(EmitterKind::FallingBalls),
            "simple_firework" | "fireworks1" => Ok(EmitterKind::SimpleFirework),
            "complex_firework" | "fireworks2" => Ok(EmitterKind::ComplexFirework),
            _ => Err(ParticleError::InvalidConfig(format!(
                "unknown emitter kind '{s}'"
            ))),
        }
    }
}

/// Tunables for the falling balls effect
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BallsConfig {
    /// Downward acceleration
    pub gravity: f32,
    /// Restitution coefficient for ground and ball contacts
    pub elasticity: f32,
    /// Step of the central-difference surface derivative
    pub derivative_step: f32,
    /// Seconds between spawn batches
    pub spawn_interval: f32,
    /// Balls per spawn batch
    pub batch: usize,
    /// Ball lifetime in seconds
    pub life: f32,
    /// Ball radius in world units
    pub radius: f32,
    /// Ball mass
    pub mass: f32,
    /// Rendered point size
    pub point_size: f32,
    /// Horizontal spawn range `[min, max)`
    pub spawn_x: [f32; 2],
    /// Vertical spawn range `[min, max)`
    pub spawn_y: [f32; 2],
}

impl Default for BallsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            elasticity: 0.5,
            derivative_step: crate::surface::DERIVATIVE_STEP,
            spawn_interval: 1.0,
            batch: 5,
            life: 10.0,
            radius: 128.0 / 800.0,
            mass: 1.0,
            point_size: 128.0,
            spawn_x: [-2.0, 2.0],
            spawn_y: [3.0, 4.0],
        }
    }
}

impl BallsConfig {
    /// Check that the values describe a runnable simulation
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("gravity", self.gravity),
            ("elasticity", self.elasticity),
            ("derivative step", self.derivative_step),
            ("spawn interval", self.spawn_interval),
            ("life", self.life),
            ("radius", self.radius),
            ("mass", self.mass),
            ("point size", self.point_size),
        ];
        let ranges = [("spawn_x", self.spawn_x), ("spawn_y", self.spawn_y)];
        for (name, value) in scalars
            .into_iter()
            .chain(ranges.iter().flat_map(|&(name, [min, max])| [(name, min), (name, max)]))
        {
            if !value.is_finite() {
                return Err(ParticleError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        if !(self.spawn_interval > 0.0) {
            return Err(ParticleError::InvalidConfig(format!(
                "spawn interval must be positive, got {}",
                self.spawn_interval
            )));
        }
        if !(self.radius > 0.0) || !(self.mass > 0.0) {
            return Err(ParticleError::InvalidConfig(format!(
                "ball radius and mass must be positive, got radius {} mass {}",
                self.radius, self.mass
            )));
        }
        if !(self.derivative_step > 0.0) {
            return Err(ParticleError::InvalidConfig(format!(
                "derivative step must be positive, got {}",
                self.derivative_step
            )));
        }
        if !(0.0..=1.0).contains(&self.elasticity) {
            return Err(ParticleError::InvalidConfig(format!(
                "elasticity must be within [0, 1], got {}",
                self.elasticity
            )));
        }
        if self.spawn_x[0] > self.spawn_x[1] || self.spawn_y[0] > self.spawn_y[1] {
            return Err(ParticleError::InvalidConfig(
                "spawn ranges must be ordered [min, max]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tunables for both firework effects
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FireworkConfig {
    /// Trail positions kept per ascending rocket
    pub trail_length: usize,
    /// Embers released by a simple burst
    pub embers: usize,
    /// Age at which a simple rocket bursts
    pub explosion_time: f32,
    /// Rockets released per complex burst
    pub sub_shells: usize,
    /// Burst schedule of a complex rocket, consumed front to back
    pub explosion_times: Vec<f32>,
    /// Horizontal wobble of a complex rocket
    pub amplitude: f32,
}

impl Default for FireworkConfig {
    fn default() -> Self {
        Self {
            trail_length: 50,
            embers: 50,
            explosion_time: 0.4,
            sub_shells: 3,
            explosion_times: vec![0.4, 0.3, 0.2],
            amplitude: 0.05,
        }
    }
}

impl FireworkConfig {
    /// Check that burst times and wobble are usable
    pub fn validate(&self) -> Result<()> {
        if !self.explosion_time.is_finite() || !self.amplitude.is_finite() {
            return Err(ParticleError::InvalidConfig(format!(
                "explosion time and amplitude must be finite, got {} and {}",
                self.explosion_time, self.amplitude
            )));
        }
        if self.explosion_times.iter().any(|t| !t.is_finite()) {
            return Err(ParticleError::InvalidConfig(
                "explosion times must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Full description of one emitter
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EmitterConfig {
    /// Effect to produce
    pub kind: EmitterKind,
    /// World anchor of the emitter
    pub position: Vec3,
    /// Pool size override; `None` uses the kind's default
    pub particle_count: Option<usize>,
    /// RNG seed; `None` seeds from the operating system
    pub seed: Option<u64>,
    /// Falling balls tunables
    pub balls: BallsConfig,
    /// Firework tunables
    pub fireworks: FireworkConfig,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self::new(EmitterKind::Spark)
    }
}

impl EmitterConfig {
    /// Default configuration for `kind`, anchored at the origin
    pub fn new(kind: EmitterKind) -> Self {
        Self {
            kind,
            position: Vec3::ZERO,
            particle_count: None,
            seed: None,
            balls: BallsConfig::default(),
            fireworks: FireworkConfig::default(),
        }
    }

    pub fn spark() -> Self {
        Self::new(EmitterKind::Spark)
    }

    pub fn smoke() -> Self {
        Self::new(EmitterKind::Smoke)
    }

    pub fn rain() -> Self {
        Self::new(EmitterKind::Rain)
    }

    pub fn cloud() -> Self {
        Self::new(EmitterKind::Cloud)
    }

    pub fn falling_balls() -> Self {
        Self::new(EmitterKind::FallingBalls)
    }

    pub fn simple_firework() -> Self {
        Self::new(EmitterKind::SimpleFirework)
    }

    pub fn complex_firework() -> Self {
        Self::new(EmitterKind::ComplexFirework)
    }

    /// Move the emitter anchor
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Override the pool size
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = Some(count);
        self
    }

    /// Make the emitter deterministic
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pool size after applying the kind default
    pub fn resolved_particle_count(&self) -> usize {
        self.particle_count
            .unwrap_or_else(|| self.kind.default_particle_count())
    }

    /// Check that the configuration describes a runnable emitter
    pub fn validate(&self) -> Result<()> {
        if !self.position.is_finite() {
            return Err(ParticleError::InvalidConfig(format!(
                "emitter position must be finite, got {}",
                self.position
            )));
        }
        match self.kind {
            EmitterKind::FallingBalls => self.balls.validate(),
            kind => {
                if self.resolved_particle_count() == 0 {
                    return Err(ParticleError::InvalidConfig(format!(
                        "{kind} keeps a fixed pool and needs a particle count above zero"
                    )));
                }
                if matches!(
                    kind,
                    EmitterKind::SimpleFirework | EmitterKind::ComplexFirework
                ) {
                    self.fireworks.validate()?;
                }
                Ok(())
            }
        }
    }
}
