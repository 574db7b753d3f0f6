//! Terrain curve for the falling balls effect
//!
//! A `Surface` is a height function `y = f(x)` supplied by the caller. The
//! slope is estimated by central differences, so any finite function works,
//! but normals get noisy near kinks or discontinuities.

use glam::Vec3;
use std::fmt;
use std::sync::Arc;

/// Default step for the central-difference derivative
pub const DERIVATIVE_STEP: f32 = 0.001;

/// Height function shared between an emitter and its balls
#[derive(Clone)]
pub struct Surface {
    height: Arc<dyn Fn(f32) -> f32 + Send + Sync>,
}

impl Surface {
    /// Wrap a height function
    pub fn new<F>(height: F) -> Self
    where
        F: Fn(f32) -> f32 + Send + Sync + 'static,
    {
        Self {
            height: Arc::new(height),
        }
    }

    /// Gentle sine hills, `-1 + 0.5 * sin(2x)`
    pub fn sine() -> Self {
        Self::new(|x| -1.0 + 0.5 * (2.0 * x).sin())
    }

    /// Cubic basin on `[-7, 7]` with a drop to -100 outside of it
    pub fn cubic_basin() -> Self {
        Self::new(|x| {
            if !(-7.0..=7.0).contains(&x) {
                return -100.0;
            }
            x * x * x / 343.0 - 3.0 * x / 7.0
        })
    }

    /// Height of the surface at `x`
    #[inline]
    pub fn height(&self, x: f32) -> f32 {
        (self.height)(x)
    }

    /// Central-difference slope at `x`
    pub fn slope(&self, x: f32, step: f32) -> f32 {
        (self.height(x + step) - self.height(x - step)) / (2.0 * step)
    }

    /// Unit normal pointing away from the ground, `(-slope, 1, 0)` normalized
    pub fn normal(&self, x: f32, step: f32) -> Vec3 {
        Vec3::new(-self.slope(x, step), 1.0, 0.0).normalize()
    }

    /// Sample the curve as a polyline from `min` to `max` (inclusive when the
    /// step lands on it)
    pub fn sample(&self, min: f32, max: f32, step: f32) -> Vec<Vec3> {
        if step <= 0.0 || max < min {
            return Vec::new();
        }
        // Index-based stepping keeps the sample count stable in f32.
        let count = ((max - min) / step + 1e-4).floor() as usize + 1;
        (0..count)
            .map(|i| {
                let x = min + i as f32 * step;
                Vec3::new(x, self.height(x), 0.0)
            })
            .collect()
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::sine()
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface").finish_non_exhaustive()
    }
}
