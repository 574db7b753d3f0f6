//! Render contract between emitters and a graphics backend
//!
//! Emitters never talk to a GPU. They flatten their particles into
//! [`PointBatch`] and [`LineBatch`] buffers and hand them to a [`RenderSink`],
//! which owns shaders, buffers and uniforms. Buffers are flat `f32` arrays
//! laid out the way vertex attributes expect them: 3 floats per position, 4
//! per colour and 1 per point size.

use crate::error::{ParticleError, Result};
use glam::{Mat4, Vec3};

/// Opaque id of a texture owned by the graphics backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Point sprites in particle iteration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBatch {
    positions: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
}

impl PointBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(points: usize) -> Self {
        Self {
            positions: Vec::with_capacity(points * 3),
            colors: Vec::with_capacity(points * 4),
            sizes: Vec::with_capacity(points),
        }
    }

    /// Build a batch from raw attribute arrays without checking them
    pub fn from_raw(positions: Vec<f32>, colors: Vec<f32>, sizes: Vec<f32>) -> Self {
        Self {
            positions,
            colors,
            sizes,
        }
    }

    /// Append one point, keeping the arrays in lockstep
    pub fn push(&mut self, position: Vec3, color: [f32; 4], size: f32) {
        self.positions.extend_from_slice(&position.to_array());
        self.colors.extend_from_slice(&color);
        self.sizes.push(size);
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Position of point `index`
    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions
            .get(index * 3..index * 3 + 3)
            .map(Vec3::from_slice)
    }

    /// Colour of point `index`
    pub fn color(&self, index: usize) -> Option<[f32; 4]> {
        let c = self.colors.get(index * 4..index * 4 + 4)?;
        Some([c[0], c[1], c[2], c[3]])
    }

    /// Check that the three arrays describe the same number of points
    pub fn validate(&self) -> Result<()> {
        let points = self.sizes.len();
        if self.positions.len() != points * 3 || self.colors.len() != points * 4 {
            return Err(ParticleError::ContractViolation(format!(
                "point batch arrays disagree: {} position floats, {} colour floats, {} sizes",
                self.positions.len(),
                self.colors.len(),
                points
            )));
        }
        Ok(())
    }
}

/// Coloured line vertices, drawn either as pairs or as a strip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineBatch {
    positions: Vec<f32>,
    colors: Vec<f32>,
}

impl LineBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a batch from raw attribute arrays without checking them
    pub fn from_raw(positions: Vec<f32>, colors: Vec<f32>) -> Self {
        Self { positions, colors }
    }

    pub fn push_vertex(&mut self, position: Vec3, color: [f32; 4]) {
        self.positions.extend_from_slice(&position.to_array());
        self.colors.extend_from_slice(&color);
    }

    /// Append a segment from `a` to `b`
    pub fn push_segment(&mut self, a: Vec3, color_a: [f32; 4], b: Vec3, color_b: [f32; 4]) {
        self.push_vertex(a, color_a);
        self.push_vertex(b, color_b);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Check array lengths. Pair batches also need an even vertex count.
    pub fn validate(&self, strip: bool) -> Result<()> {
        if self.positions.len() % 3 != 0 || self.colors.len() != self.positions.len() / 3 * 4 {
            return Err(ParticleError::ContractViolation(format!(
                "line batch arrays disagree: {} position floats, {} colour floats",
                self.positions.len(),
                self.colors.len()
            )));
        }
        if !strip && self.vertex_count() % 2 != 0 {
            return Err(ParticleError::ContractViolation(format!(
                "line pairs need an even vertex count, got {}",
                self.vertex_count()
            )));
        }
        Ok(())
    }
}

/// Graphics backend that draws emitter output
pub trait RenderSink {
    /// Draw point sprites; `texture` is `None` when no texture is attached yet
    fn draw_points(
        &mut self,
        view: &Mat4,
        projection: &Mat4,
        texture: Option<TextureHandle>,
        batch: &PointBatch,
    ) -> Result<()>;

    /// Draw independent segments, two vertices each
    fn draw_lines(&mut self, view: &Mat4, projection: &Mat4, batch: &LineBatch) -> Result<()>;

    /// Draw a connected polyline
    fn draw_line_strip(&mut self, view: &Mat4, projection: &Mat4, batch: &LineBatch)
    -> Result<()>;
}

/// A call captured by [`FrameRecorder`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Points {
        texture: Option<TextureHandle>,
        batch: PointBatch,
    },
    Lines(LineBatch),
    LineStrip(LineBatch),
}

/// In-memory sink that keeps every draw call, for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct FrameRecorder {
    calls: Vec<DrawCall>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Points across every recorded point batch
    pub fn points_drawn(&self) -> usize {
        self.calls
            .iter()
            .map(|call| match call {
                DrawCall::Points { batch, .. } => batch.len(),
                _ => 0,
            })
            .sum()
    }

    /// Vertices across every recorded line and strip batch
    pub fn line_vertices_drawn(&self) -> usize {
        self.calls
            .iter()
            .map(|call| match call {
                DrawCall::Lines(batch) | DrawCall::LineStrip(batch) => batch.vertex_count(),
                DrawCall::Points { .. } => 0,
            })
            .sum()
    }

    /// The most recent point batch
    pub fn last_points(&self) -> Option<&PointBatch> {
        self.calls.iter().rev().find_map(|call| match call {
            DrawCall::Points { batch, .. } => Some(batch),
            _ => None,
        })
    }
}

impl RenderSink for FrameRecorder {
    fn draw_points(
        &mut self,
        _view: &Mat4,
        _projection: &Mat4,
        texture: Option<TextureHandle>,
        batch: &PointBatch,
    ) -> Result<()> {
        batch.validate()?;
        self.calls.push(DrawCall::Points {
            texture,
            batch: batch.clone(),
        });
        Ok(())
    }

    fn draw_lines(&mut self, _view: &Mat4, _projection: &Mat4, batch: &LineBatch) -> Result<()> {
        batch.validate(false)?;
        self.calls.push(DrawCall::Lines(batch.clone()));
        Ok(())
    }

    fn draw_line_strip(
        &mut self,
        _view: &Mat4,
        _projection: &Mat4,
        batch: &LineBatch,
    ) -> Result<()> {
        batch.validate(true)?;
        self.calls.push(DrawCall::LineStrip(batch.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_batch_lockstep() {
        let mut batch = PointBatch::with_capacity(2);
        batch.push(Vec3::new(1.0, 2.0, 3.0), [1.0, 0.5, 0.25, 1.0], 32.0);
        batch.push(Vec3::ZERO, [0.0; 4], 16.0);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.positions().len(), 6);
        assert_eq!(batch.colors().len(), 8);
        assert_eq!(batch.position(0), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(batch.color(0), Some([1.0, 0.5, 0.25, 1.0]));
        assert_eq!(batch.position(2), None);
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_mismatched_points_rejected() {
        let batch = PointBatch::from_raw(vec![0.0; 6], vec![1.0; 4], vec![10.0, 10.0]);
        assert!(matches!(
            batch.validate(),
            Err(ParticleError::ContractViolation(_))
        ));
    }

    #[test]
    fn test_line_pairs_need_even_count() {
        let mut lines = LineBatch::new();
        lines.push_vertex(Vec3::ZERO, [1.0; 4]);
        assert!(lines.validate(true).is_ok());
        assert!(lines.validate(false).is_err());

        lines.push_vertex(Vec3::ONE, [1.0; 4]);
        assert!(lines.validate(false).is_ok());
        assert_eq!(lines.vertex_count(), 2);
    }

    #[test]
    fn test_recorder_counts() {
        let mut recorder = FrameRecorder::new();
        let mut points = PointBatch::new();
        points.push(Vec3::ZERO, [1.0; 4], 1.0);
        let mut lines = LineBatch::new();
        lines.push_segment(Vec3::ZERO, [1.0; 4], Vec3::X, [1.0; 4]);

        recorder
            .draw_points(&Mat4::IDENTITY, &Mat4::IDENTITY, None, &points)
            .unwrap();
        recorder
            .draw_lines(&Mat4::IDENTITY, &Mat4::IDENTITY, &lines)
            .unwrap();

        assert_eq!(recorder.calls().len(), 2);
        assert_eq!(recorder.points_drawn(), 1);
        assert_eq!(recorder.line_vertices_drawn(), 2);
        assert_eq!(recorder.last_points(), Some(&points));

        recorder.clear();
        assert!(recorder.calls().is_empty());
    }
}
