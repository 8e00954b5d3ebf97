pub mod cursor;
pub mod frames;
pub mod segments;
pub mod simulate;

use std::path::Path;

use cinelens_project_model::{parse_event_log, CameraConfig, EventLog, ZoomSpeed};
use tracing::{debug, info};

/// Reads a JSONL event log from disk. Header lines starting with `#` are
/// skipped by the parser; the duration falls back to the last event time
/// when not given explicitly.
pub fn load_event_log(path: &Path, duration_ms: Option<f64>) -> anyhow::Result<EventLog> {
    let content = std::fs::read_to_string(path)
        .map_err(|_| anyhow::anyhow!("Events file not found: {}", path.display()))?;
    let log = parse_event_log(&content, duration_ms.unwrap_or(0.0))
        .map_err(|e| anyhow::anyhow!("Failed to parse events: {e}"))?;
    info!(
        clicks = log.clicks.len(),
        moves = log.moves.len(),
        duration_ms = log.duration_ms,
        "event log loaded"
    );
    Ok(log)
}

/// Builds a validated camera configuration from CLI flags, falling back to
/// the user's saved defaults for anything not given on the command line.
pub fn camera_config(zoom: Option<f64>, speed: Option<&str>) -> anyhow::Result<CameraConfig> {
    let defaults = cinelens_common::config::AppConfig::load().camera;
    let speed_name = speed.map(str::to_string).unwrap_or(defaults.zoom_speed);
    let zoom_speed = ZoomSpeed::from_name(&speed_name).ok_or_else(|| {
        anyhow::anyhow!("Unknown speed preset: {speed_name} (try slow|normal|fast)")
    })?;
    let config = CameraConfig {
        zoom_level: zoom.unwrap_or(defaults.zoom_level),
        zoom_speed,
        edge_padding: defaults.edge_padding,
        ..Default::default()
    }
    .validate();
    debug!(zoom_level = config.zoom_level, ?config.zoom_speed, "camera config resolved");
    Ok(config)
}
