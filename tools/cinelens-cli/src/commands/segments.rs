//! Generate zoom segments from a recorded event log.

use std::path::PathBuf;

use cinelens_motion_core::generate_zoom_segments;

pub fn run(
    events: PathBuf,
    zoom: Option<f64>,
    speed: Option<String>,
    duration_ms: Option<f64>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let log = super::load_event_log(&events, duration_ms)?;
    let config = super::camera_config(zoom, speed.as_deref())?;

    println!("Loaded {} clicks, {} moves", log.clicks.len(), log.moves.len());

    let segments = generate_zoom_segments(&log, &config);
    if segments.is_empty() {
        println!("No zoom segments (no click presses outside the stop padding).");
        return Ok(());
    }

    for (i, segment) in segments.iter().enumerate() {
        println!(
            "  #{i}: {:.2}s -> {:.2}s  x{:.2}  ({} focus points)",
            segment.start,
            segment.end,
            segment.amount,
            segment.focus_points.len()
        );
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&segments)?;
        std::fs::write(&path, json)?;
        println!("Segments written to: {}", path.display());
    }
    Ok(())
}
