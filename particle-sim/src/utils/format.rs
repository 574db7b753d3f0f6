//! Formatting utilities

use std::time::Duration;

/// Format simulated seconds
pub fn format_seconds(seconds: f64) -> String {
    format!("{seconds:.3} s")
}

/// Format a wall-clock duration
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_secs_f64() * 1000.0;
    if millis < 1000.0 {
        format!("{millis:.1} ms")
    } else {
        format!("{:.2} s", millis / 1000.0)
    }
}

/// How many times faster than real time a run was
pub fn format_speedup(simulated: f64, wall: Duration) -> String {
    let wall = wall.as_secs_f64();
    if wall <= 0.0 {
        "N/A".to_string()
    } else {
        format!("{:.1}x", simulated / wall)
    }
}

/// Format a vector as `(x, y, z)`
pub fn format_vec3(v: glam::Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}
