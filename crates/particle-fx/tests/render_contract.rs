//! Render hand-off: batch layout, texture gating and sink errors

use glam::{Mat4, Vec3};
use particle_fx::{
    DrawCall, EmitterConfig, FrameRecorder, LineBatch, ParticleEmitter, ParticleError,
    PointBatch, RenderSink, Result, TextureHandle,
};
use pretty_assertions::assert_eq;
use test_case::test_case;

/// Sink that refuses every draw, like a backend with a lost context
struct BrokenSink;

impl RenderSink for BrokenSink {
    fn draw_points(
        &mut self,
        _view: &Mat4,
        _projection: &Mat4,
        _texture: Option<TextureHandle>,
        _batch: &PointBatch,
    ) -> Result<()> {
        Err(ParticleError::ContractViolation("no context".to_string()))
    }

    fn draw_lines(&mut self, _view: &Mat4, _projection: &Mat4, _batch: &LineBatch) -> Result<()> {
        Err(ParticleError::ContractViolation("no context".to_string()))
    }

    fn draw_line_strip(
        &mut self,
        _view: &Mat4,
        _projection: &Mat4,
        _batch: &LineBatch,
    ) -> Result<()> {
        Err(ParticleError::ContractViolation("no context".to_string()))
    }
}

fn render(emitter: &ParticleEmitter) -> FrameRecorder {
    let mut recorder = FrameRecorder::new();
    emitter
        .render(&mut recorder, &Mat4::IDENTITY, &Mat4::IDENTITY)
        .unwrap();
    recorder
}

#[test_case(EmitterConfig::spark(), 200 ; "spark")]
#[test_case(EmitterConfig::smoke(), 100 ; "smoke")]
#[test_case(EmitterConfig::rain(), 1000 ; "rain")]
#[test_case(EmitterConfig::cloud(), 50 ; "cloud")]
fn batches_have_parallel_arrays(config: EmitterConfig, points: usize) {
    let emitter = ParticleEmitter::new(&config.with_seed(10)).unwrap();
    let recorder = render(&emitter);
    let batch = recorder.last_points().unwrap();

    assert_eq!(batch.len(), points);
    assert_eq!(batch.positions().len(), points * 3);
    assert_eq!(batch.colors().len(), points * 4);
    assert_eq!(batch.sizes().len(), points);
}

#[test]
fn points_follow_particle_order() {
    let emitter = ParticleEmitter::new(
        &EmitterConfig::cloud()
            .with_position(Vec3::new(0.0, 5.0, 0.0))
            .with_seed(11),
    )
    .unwrap();
    let recorder = render(&emitter);
    let batch = recorder.last_points().unwrap();

    for (i, particle) in emitter.particles().iter().enumerate() {
        let expected = particle.position + Vec3::new(0.0, 5.0, 0.0);
        assert_eq!(batch.position(i), Some(expected));
        assert_eq!(batch.color(i), Some([1.0, 1.0, 1.0, 0.2]));
    }
}

#[test]
fn smoke_fades_with_age() {
    let mut emitter =
        ParticleEmitter::new(&EmitterConfig::smoke().with_particle_count(1).with_seed(12))
            .unwrap();
    emitter.particles_mut()[0].life = 4.0;
    emitter.particles_mut()[0].age = 1.0;

    let recorder = render(&emitter);
    assert_eq!(
        recorder.last_points().unwrap().color(0),
        Some([0.5, 0.5, 0.5, 0.75])
    );
}

#[test]
fn texture_attaches_after_load() {
    let mut emitter = ParticleEmitter::new(&EmitterConfig::rain().with_seed(13)).unwrap();
    assert_eq!(emitter.texture(), None);

    let recorder = render(&emitter);
    assert!(matches!(
        recorder.calls()[0],
        DrawCall::Points { texture: None, .. }
    ));

    emitter.attach_texture(TextureHandle(3));
    let recorder = render(&emitter);
    assert!(matches!(
        recorder.calls()[0],
        DrawCall::Points {
            texture: Some(TextureHandle(3)),
            ..
        }
    ));
}

#[tokio::test]
async fn async_texture_gates_binding() {
    let mut emitter = ParticleEmitter::new(&EmitterConfig::spark().with_seed(14)).unwrap();

    let (sender, receiver) = tokio::sync::oneshot::channel::<TextureHandle>();
    let loading = async move { receiver.await.unwrap_or(TextureHandle(0)) };

    // Nothing bound while the load is pending
    let recorder = render(&emitter);
    assert!(matches!(
        recorder.calls()[0],
        DrawCall::Points { texture: None, .. }
    ));

    sender.send(TextureHandle(42)).unwrap();
    emitter.set_texture(loading).await;

    assert_eq!(emitter.texture(), Some(TextureHandle(42)));
    let recorder = render(&emitter);
    assert!(matches!(
        recorder.calls()[0],
        DrawCall::Points {
            texture: Some(TextureHandle(42)),
            ..
        }
    ));
}

#[test]
fn sink_errors_propagate() {
    let emitter = ParticleEmitter::new(&EmitterConfig::smoke().with_seed(15)).unwrap();
    let result = emitter.render(&mut BrokenSink, &Mat4::IDENTITY, &Mat4::IDENTITY);
    assert!(matches!(result, Err(ParticleError::ContractViolation(_))));
}

#[test]
fn mismatched_batch_is_a_contract_violation() {
    let emitter = ParticleEmitter::new(&EmitterConfig::smoke().with_seed(16)).unwrap();
    let mut recorder = FrameRecorder::new();
    let batch = PointBatch::from_raw(vec![0.0; 9], vec![1.0; 12], vec![8.0, 8.0]);

    let result = emitter.render_particles(&mut recorder, &Mat4::IDENTITY, &Mat4::IDENTITY, &batch);

    assert!(matches!(result, Err(ParticleError::ContractViolation(_))));
    assert!(recorder.calls().is_empty());
}

#[test]
fn dyn_sink_is_supported() {
    let emitter = ParticleEmitter::new(&EmitterConfig::cloud().with_seed(17)).unwrap();
    let mut recorder = FrameRecorder::new();
    {
        let sink: &mut dyn RenderSink = &mut recorder;
        emitter.render(sink, &Mat4::IDENTITY, &Mat4::IDENTITY).unwrap();
    }
    assert_eq!(recorder.points_drawn(), 50);
}
