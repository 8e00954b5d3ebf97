//! Replay the live camera engine over a recorded log.

use std::path::PathBuf;

use cinelens_motion_core::LiveCameraEngine;

pub fn run(
    events: PathBuf,
    time_ms: f64,
    zoom: Option<f64>,
    speed: Option<String>,
) -> anyhow::Result<()> {
    anyhow::ensure!(time_ms >= 0.0, "time_ms must be non-negative");

    let log = super::load_event_log(&events, None)?;
    let config = super::camera_config(zoom, speed.as_deref())?;

    let mut engine = LiveCameraEngine::with_log(config, log);
    let state = engine.seek(time_ms);
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
