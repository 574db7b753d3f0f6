//! Frame driver for a set of named emitters
//!
//! A [`Scene`] mirrors an interactive showcase: several emitters exist side
//! by side but only the selected one is ticked and drawn each frame.

use crate::config::{EmitterConfig, EmitterKind};
use crate::emitter::ParticleEmitter;
use crate::error::{ParticleError, Result};
use crate::render::RenderSink;
use crate::surface::Surface;
use glam::{Mat4, Vec3};
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Anchor of the showcase fireworks, just below the view
pub const SHOWCASE_FIREWORK_ANCHOR: Vec3 = Vec3::new(0.0, -1.8, 0.0);

/// Built-in ground curves for falling balls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SurfacePreset {
    /// [`Surface::sine`]
    #[default]
    Sine,
    /// [`Surface::cubic_basin`]
    CubicBasin,
}

impl SurfacePreset {
    pub fn build(self) -> Surface {
        match self {
            SurfacePreset::Sine => Surface::sine(),
            SurfacePreset::CubicBasin => Surface::cubic_basin(),
        }
    }
}

/// One emitter entry of a [`SceneConfig`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NamedEmitter {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub surface: SurfacePreset,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub config: EmitterConfig,
}

/// Declarative scene description
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SceneConfig {
    pub emitters: Vec<NamedEmitter>,
    /// Emitter to select; the first one when absent
    pub selected: Option<String>,
}

#[cfg(feature = "serde")]
impl SceneConfig {
    /// Parse a scene from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a scene file
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Named emitters with a single active selection
#[derive(Debug, Default)]
pub struct Scene {
    emitters: Vec<(String, ParticleEmitter)>,
    selected: Option<usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every emitter of `config` and apply its selection
    pub fn from_config(config: &SceneConfig) -> Result<Self> {
        let mut scene = Self::new();
        for entry in &config.emitters {
            let emitter =
                ParticleEmitter::new(&entry.config)?.with_surface(entry.surface.build());
            scene.add(entry.name.clone(), emitter)?;
        }
        if let Some(name) = &config.selected {
            scene.select(name)?;
        }
        Ok(scene)
    }

    /// The seven effects of the interactive demo, sparkler selected
    pub fn showcase(seed: Option<u64>) -> Result<Self> {
        let entries = [
            ("sparkler", EmitterKind::Spark, Vec3::ZERO),
            ("smoke", EmitterKind::Smoke, Vec3::ZERO),
            ("rain", EmitterKind::Rain, Vec3::ZERO),
            ("clouds", EmitterKind::Cloud, Vec3::ZERO),
            ("fireworks1", EmitterKind::SimpleFirework, SHOWCASE_FIREWORK_ANCHOR),
            ("fireworks2", EmitterKind::ComplexFirework, SHOWCASE_FIREWORK_ANCHOR),
            ("falling_balls", EmitterKind::FallingBalls, Vec3::ZERO),
        ];

        let mut scene = Self::new();
        for (index, (name, kind, position)) in entries.into_iter().enumerate() {
            let mut config = EmitterConfig::new(kind).with_position(position);
            config.seed = seed.map(|s| s.wrapping_add(index as u64));
            let mut emitter = ParticleEmitter::new(&config)?;
            if kind == EmitterKind::FallingBalls {
                emitter = emitter.with_surface(Surface::cubic_basin());
            }
            scene.add(name, emitter)?;
        }
        Ok(scene)
    }

    /// Register an emitter. The first one added becomes the selection.
    pub fn add(&mut self, name: impl Into<String>, emitter: ParticleEmitter) -> Result<()> {
        let name = name.into();
        if self.index_of(&name).is_some() {
            return Err(ParticleError::InvalidConfig(format!(
                "emitter '{name}' is already registered"
            )));
        }
        debug!("scene: added {} emitter '{name}'", emitter.kind());
        self.emitters.push((name, emitter));
        if self.selected.is_none() {
            self.selected = Some(self.emitters.len() - 1);
        }
        Ok(())
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.emitters.iter().position(|(n, _)| n == name)
    }

    /// Make `name` the active emitter
    pub fn select(&mut self, name: &str) -> Result<()> {
        let index = self
            .index_of(name)
            .ok_or_else(|| ParticleError::UnknownEmitter(name.to_string()))?;
        self.selected = Some(index);
        Ok(())
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.map(|i| self.emitters[i].0.as_str())
    }

    pub fn selected(&self) -> Option<&ParticleEmitter> {
        self.selected.map(|i| &self.emitters[i].1)
    }

    pub fn get(&self, name: &str) -> Option<&ParticleEmitter> {
        self.index_of(name).map(|i| &self.emitters[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ParticleEmitter> {
        self.index_of(name).map(|i| &mut self.emitters[i].1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.emitters.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParticleEmitter)> {
        self.emitters.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    /// Tick the selected emitter only
    pub fn update(&mut self, delta_time: f32) -> Result<()> {
        match self.selected {
            Some(i) => self.emitters[i].1.update(delta_time),
            None => Ok(()),
        }
    }

    /// Tick every emitter
    pub fn update_all(&mut self, delta_time: f32) -> Result<()> {
        for (_, emitter) in &mut self.emitters {
            emitter.update(delta_time)?;
        }
        Ok(())
    }

    /// Draw the selected emitter only
    pub fn render<S>(&self, sink: &mut S, view: &Mat4, projection: &Mat4) -> Result<()>
    where
        S: RenderSink + ?Sized,
    {
        match self.selected() {
            Some(emitter) => emitter.render(sink, view, projection),
            None => Ok(()),
        }
    }
}

/// Converts animation-frame timestamps into simulation steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<f64>,
    last_fps_time: f64,
    fps: u32,
}

impl FrameClock {
    /// Milliseconds between frame-rate refreshes
    pub const FPS_REFRESH_MS: f64 = 100.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `timestamp_ms` and return the step in seconds.
    ///
    /// The first frame returns zero. Timestamps that go backwards also
    /// return zero.
    pub fn tick(&mut self, timestamp_ms: f64) -> f32 {
        let Some(last) = self.last.replace(timestamp_ms) else {
            self.last_fps_time = timestamp_ms;
            return 0.0;
        };

        let delta = ((timestamp_ms - last) * 0.001).max(0.0);
        if timestamp_ms - self.last_fps_time > Self::FPS_REFRESH_MS && delta > 0.0 {
            self.fps = (1.0 / delta).floor() as u32;
            self.last_fps_time = timestamp_ms;
        }
        delta as f32
    }

    /// Frame rate as of the last refresh
    pub fn fps(&self) -> u32 {
        self.fps
    }
}
