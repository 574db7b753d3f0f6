//! Firework lifecycles driven through the emitter

use glam::{Mat4, Vec3};
use particle_fx::{
    ComplexFirework, EmitterConfig, FrameRecorder, NodeKind, ParticleEmitter, ParticleKind,
    SimpleFirework, Stage,
};
use pretty_assertions::assert_eq;

fn simple_emitter(seed: u64) -> ParticleEmitter {
    ParticleEmitter::new(
        &EmitterConfig::simple_firework()
            .with_position(Vec3::new(0.0, -1.8, 0.0))
            .with_seed(seed),
    )
    .unwrap()
}

fn simple(emitter: &ParticleEmitter) -> &SimpleFirework {
    match &emitter.particles()[0].kind {
        ParticleKind::SimpleFirework(firework) => firework,
        other => panic!("expected a simple firework, got {other:?}"),
    }
}

fn complex(emitter: &ParticleEmitter) -> &ComplexFirework {
    match &emitter.particles()[0].kind {
        ParticleKind::ComplexFirework(firework) => firework,
        other => panic!("expected a complex firework, got {other:?}"),
    }
}

#[test]
fn simple_rocket_bursts_into_fifty_embers_once() {
    let mut emitter = simple_emitter(1);
    emitter.update(0.0).unwrap();
    assert_eq!(emitter.particle_count(), 1);

    let mut burst_frame = None;
    for frame in 0..100 {
        emitter.update(0.016).unwrap();
        let rocket = simple(&emitter);
        if rocket.stage() == Stage::Exploding && burst_frame.is_none() {
            burst_frame = Some(frame);
            assert_eq!(rocket.children.len(), 50);
            assert_eq!(rocket.arena.len(), 50);
            assert!(emitter.particles()[0].age >= rocket.shell.explosion_time);
        }
        if burst_frame.is_some() && rocket.stage() == Stage::Exploding {
            // No second burst ever adds to the arena
            assert_eq!(rocket.arena.len(), 50);
        }
    }
    assert!(burst_frame.is_some());
}

#[test]
fn spent_rocket_is_replaced() {
    let mut emitter = simple_emitter(2);
    emitter.update(0.0).unwrap();
    let launch = emitter.particles()[0].position;

    // Burst at 0.4s, embers live at most 1.5s after that
    for _ in 0..150 {
        emitter.update(0.016).unwrap();
    }

    assert_eq!(emitter.particle_count(), 1);
    let rocket = simple(&emitter);
    assert!(rocket.arena.len() <= 50);
    assert!(emitter.particles()[0].age < 2.4);
    assert_eq!(launch, Vec3::new(0.0, -1.8, 0.0));
}

#[test]
fn embers_point_back_to_no_parent() {
    let mut emitter = simple_emitter(3);
    emitter.update(0.0).unwrap();
    for _ in 0..30 {
        emitter.update(0.016).unwrap();
    }

    let rocket = simple(&emitter);
    assert_eq!(rocket.stage(), Stage::Exploding);
    for &id in &rocket.children {
        let node = rocket.arena.get(id).unwrap();
        assert_eq!(node.parent, None);
        assert!(matches!(node.kind, NodeKind::Ember { .. }));
    }
}

#[test]
fn trail_is_bounded_and_fifo() {
    let mut emitter = simple_emitter(4);
    emitter.update(0.0).unwrap();

    // Tiny steps keep the rocket climbing for well over 50 frames
    let mut heights = Vec::new();
    for _ in 0..80 {
        emitter.update(0.001).unwrap();
        heights.push(emitter.particles()[0].position.y);
        let trail = &simple(&emitter).shell.trail;
        assert!(trail.len() <= 50);
    }

    let trail: Vec<f32> = simple(&emitter).shell.trail.iter().map(|p| p.y).collect();
    assert_eq!(trail.len(), 50);
    assert_eq!(trail, heights[heights.len() - 50..].to_vec());
}

#[test]
fn complex_schedule_fires_nine_sub_shells() {
    let mut emitter =
        ParticleEmitter::new(&EmitterConfig::complex_firework().with_seed(5)).unwrap();
    emitter.update(0.0).unwrap();

    let mut last_bursts = 0;
    for _ in 0..40 {
        emitter.update(0.016).unwrap();
        let rocket = complex(&emitter);
        assert!(rocket.bursts >= last_bursts);
        last_bursts = rocket.bursts;
        if rocket.bursts > 0 {
            break;
        }
    }

    let rocket = complex(&emitter);
    assert_eq!(rocket.bursts, 3);
    assert!(rocket.explosion_times.is_empty());
    assert_eq!(rocket.children.len(), 9);
    for &id in &rocket.children {
        let node = rocket.arena.get(id).unwrap();
        assert_eq!(node.stage(), Some(Stage::Ascending));
    }
}

#[test]
fn complex_cascade_runs_to_completion() {
    let mut emitter =
        ParticleEmitter::new(&EmitterConfig::complex_firework().with_seed(6)).unwrap();
    emitter.update(0.0).unwrap();

    let mut saw_embers = false;
    let mut replaced = false;
    for _ in 0..400 {
        let before = complex(&emitter).bursts;
        emitter.update(0.016).unwrap();
        let rocket = complex(&emitter);
        if rocket.bursts < before {
            replaced = true;
            break;
        }
        // 1 + 9 sub-shells + 9 * 50 embers at most
        assert!(rocket.arena.len() <= 9 + 9 * 50);
        if rocket.arena.len() > 9 {
            saw_embers = true;
        }
    }

    assert!(saw_embers);
    assert!(replaced);
}

#[test]
fn ascending_rocket_draws_head_and_trail() {
    let mut emitter = simple_emitter(7);
    emitter.update(0.0).unwrap();
    for _ in 0..5 {
        emitter.update(0.01).unwrap();
    }

    let mut recorder = FrameRecorder::new();
    emitter
        .render(&mut recorder, &Mat4::IDENTITY, &Mat4::IDENTITY)
        .unwrap();

    let points = recorder.last_points().unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points.color(0), Some([1.0, 1.0, 0.0, 1.0]));
    assert_eq!(points.sizes(), &[32.0]);
    // Five trail points, four segments
    assert_eq!(recorder.line_vertices_drawn(), 8);
}

#[test]
fn exploded_rocket_draws_embers_only() {
    let mut emitter = simple_emitter(8);
    emitter.update(0.0).unwrap();
    for _ in 0..30 {
        emitter.update(0.016).unwrap();
    }
    assert_eq!(simple(&emitter).stage(), Stage::Exploding);

    let mut recorder = FrameRecorder::new();
    emitter
        .render(&mut recorder, &Mat4::IDENTITY, &Mat4::IDENTITY)
        .unwrap();

    let points = recorder.last_points().unwrap();
    assert_eq!(points.len(), simple(&emitter).children.len());
    assert!(points.sizes().iter().all(|&s| s == 16.0));
    assert_eq!(recorder.line_vertices_drawn(), 0);
}
