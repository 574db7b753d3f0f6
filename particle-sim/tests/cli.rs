//! CLI integration tests
//!
//! These run the real binary and check its output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn particle_sim() -> Command {
    Command::cargo_bin("particle-sim").unwrap()
}

#[test]
fn test_help() {
    particle_sim()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("scene"))
        .stdout(predicate::str::contains("kinds"));
}

#[test]
fn test_kinds_lists_every_effect() {
    let output = particle_sim().arg("kinds").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in [
        "spark",
        "smoke",
        "rain",
        "cloud",
        "falling_balls",
        "simple_firework",
        "complex_firework",
    ] {
        assert!(stdout.contains(name), "missing {name}");
    }
}

#[test]
fn test_run_json_report() {
    let output = particle_sim()
        .args(["run", "smoke", "--frames", "1000", "--seed", "1", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["kind"], "smoke");
    assert_eq!(report["final_particles"], 100);
    assert_eq!(report["points_drawn"], 100);
}

#[test]
fn test_run_accepts_aliases_and_position() {
    particle_sim()
        .args([
            "run",
            "fireworks2",
            "--frames",
            "30",
            "--seed",
            "2",
            "--position",
            "0,-1.8,0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("complex_firework"))
        .stdout(predicate::str::contains("(0.00, -1.80, 0.00)"));
}

#[test]
fn test_run_unknown_kind_fails() {
    particle_sim()
        .args(["run", "snow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown emitter kind"));
}

#[test]
fn test_run_negative_step_fails() {
    particle_sim()
        .args(["run", "rain", "--frames", "1", "--dt=-0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("delta time"));
}

#[test]
fn test_showcase_scene() {
    particle_sim()
        .args(["scene", "--frames", "70", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sparkler*"))
        .stdout(predicate::str::contains("falling_balls"));
}

#[test]
fn test_scene_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scene.json");
    fs::write(
        &path,
        r#"{
            "selected": "drops",
            "emitters": [
                { "name": "drops", "kind": "rain", "particle_count": 25, "seed": 9 },
                { "name": "puffs", "kind": "smoke", "seed": 10 }
            ]
        }"#,
    )
    .unwrap();

    let output = particle_sim()
        .args(["scene", "--frames", "20", "--json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report[0]["name"], "drops");
    assert_eq!(report[0]["selected"], true);
    assert_eq!(report[0]["particles"], 25);
    assert_eq!(report[1]["particles"], 100);
}

#[test]
fn test_scene_missing_file_fails() {
    particle_sim()
        .args(["scene", "/nonexistent/scene.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load scene"));
}

#[test]
fn test_completions() {
    particle_sim()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("particle-sim"));
}
