//! Render the full camera and cursor timeline at a fixed frame rate.

use std::io::Write;
use std::path::PathBuf;

use cinelens_motion_core::precompute_frames;

pub fn run(
    events: PathBuf,
    fps: f64,
    zoom: Option<f64>,
    speed: Option<String>,
    duration_ms: Option<f64>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    anyhow::ensure!(fps >= 1.0 && fps <= 240.0, "fps must be within [1, 240]");

    let log = super::load_event_log(&events, duration_ms)?;
    let config = super::camera_config(zoom, speed.as_deref())?;
    let frames = precompute_frames(&log, &config, fps);

    let mut lines = String::with_capacity(frames.len() * 160);
    for frame in &frames {
        lines.push_str(&serde_json::to_string(frame)?);
        lines.push('\n');
    }

    match output {
        Some(path) => {
            std::fs::write(&path, lines)?;
            println!("{} frames at {fps} fps written to: {}", frames.len(), path.display());
        }
        None => {
            std::io::stdout().write_all(lines.as_bytes())?;
        }
    }
    Ok(())
}
