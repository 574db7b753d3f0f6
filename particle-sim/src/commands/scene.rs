//! Scene simulation

use anyhow::{Context, Result};
use clap::Args;
use glam::Mat4;
use log::info;
use particle_fx::{FrameRecorder, Scene, SceneConfig};
use serde::Serialize;
use std::path::PathBuf;

use crate::utils::{add_table_row, create_table};

#[derive(Args)]
pub struct SceneArgs {
    /// Scene description (JSON). The built-in showcase is used when omitted.
    pub file: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    pub frames: u32,

    /// Seconds per frame
    #[arg(long, default_value_t = 0.016)]
    pub dt: f32,

    /// RNG seed for the showcase scene
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Tick only the selected emitter, like the interactive demo
    #[arg(long)]
    pub selected_only: bool,

    /// Select this emitter before simulating
    #[arg(long)]
    pub select: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Per-emitter line of a scene report
#[derive(Debug, Serialize)]
pub struct EmitterSummary {
    pub name: String,
    pub kind: String,
    pub selected: bool,
    pub particles: usize,
    pub points_drawn: usize,
    pub line_vertices_drawn: usize,
}

pub fn execute(args: SceneArgs) -> Result<()> {
    let mut scene = match &args.file {
        Some(path) => {
            let config = SceneConfig::from_path(path)
                .with_context(|| format!("Failed to load scene {}", path.display()))?;
            Scene::from_config(&config).context("Failed to build scene")?
        }
        None => Scene::showcase(args.seed).context("Failed to build showcase scene")?,
    };

    if let Some(name) = &args.select {
        scene.select(name)?;
    }

    let summaries = simulate(&mut scene, args.frames, args.dt, args.selected_only)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summaries).context("Failed to encode report")?
        );
        return Ok(());
    }

    let mut table = create_table(&["Emitter", "Kind", "Particles", "Points", "Line vertices"]);
    for summary in &summaries {
        let marker = if summary.selected { "*" } else { "" };
        add_table_row(
            &mut table,
            vec![
                format!("{}{marker}", summary.name),
                summary.kind.clone(),
                summary.particles.to_string(),
                summary.points_drawn.to_string(),
                summary.line_vertices_drawn.to_string(),
            ],
        );
    }
    table.printstd();
    Ok(())
}

/// Tick the scene and draw every emitter once at the end
pub fn simulate(
    scene: &mut Scene,
    frames: u32,
    dt: f32,
    selected_only: bool,
) -> Result<Vec<EmitterSummary>> {
    for frame in 0..frames {
        let result = if selected_only {
            scene.update(dt)
        } else {
            scene.update_all(dt)
        };
        result.with_context(|| format!("Update failed at frame {frame}"))?;
    }
    info!("scene finished {frames} frames");

    let selected = scene.selected_name().map(str::to_string);
    scene
        .iter()
        .map(|(name, emitter)| -> Result<EmitterSummary> {
            let mut recorder = FrameRecorder::new();
            emitter
                .render(&mut recorder, &Mat4::IDENTITY, &Mat4::IDENTITY)
                .with_context(|| format!("Render of '{name}' failed"))?;
            Ok(EmitterSummary {
                name: name.to_string(),
                kind: emitter.kind().to_string(),
                selected: selected.as_deref() == Some(name),
                particles: emitter.particle_count(),
                points_drawn: recorder.points_drawn(),
                line_vertices_drawn: recorder.line_vertices_drawn(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_only_leaves_others_idle() {
        let mut scene = Scene::showcase(Some(3)).unwrap();
        scene.select("fireworks1").unwrap();
        let summaries = simulate(&mut scene, 10, 0.016, true).unwrap();

        let rockets = summaries.iter().find(|s| s.name == "fireworks1").unwrap();
        assert!(rockets.selected);
        assert_eq!(rockets.particles, 1);

        let balls = summaries.iter().find(|s| s.name == "falling_balls").unwrap();
        assert_eq!(balls.particles, 0);
    }

    #[test]
    fn test_update_all_ticks_everything() {
        let mut scene = Scene::showcase(Some(4)).unwrap();
        let summaries = simulate(&mut scene, 70, 0.016, false).unwrap();
        assert_eq!(summaries.len(), 7);

        let balls = summaries.iter().find(|s| s.name == "falling_balls").unwrap();
        assert_eq!(balls.particles, 5);
    }
}
