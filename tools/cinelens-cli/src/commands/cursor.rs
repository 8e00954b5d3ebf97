//! Evaluate the cursor overlay at a timestamp.

use std::path::PathBuf;

use cinelens_motion_core::CursorEngine;

pub fn run(events: PathBuf, time_ms: f64) -> anyhow::Result<()> {
    anyhow::ensure!(time_ms >= 0.0, "time_ms must be non-negative");

    let log = super::load_event_log(&events, None)?;
    let engine = CursorEngine::new(&log);
    let state = engine.overlay_at(time_ms);
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
