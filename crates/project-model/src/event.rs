//! Input event types for the recorded pointer stream.
//!
//! Events are recorded in append-only JSONL format for crash safety.
//! All coordinates are normalized to `[0.0, 1.0]` relative to the
//! capture region dimensions. Timestamps are milliseconds since
//! recording start.

use serde::{Deserialize, Serialize};

/// Recording-relative timestamp in milliseconds.
pub type TimestampMs = f64;

/// A mouse button press or release at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// Milliseconds since recording start.
    pub time: TimestampMs,

    /// Normalized X coordinate [0.0, 1.0].
    pub x: f64,

    /// Normalized Y coordinate [0.0, 1.0].
    pub y: f64,

    /// Which button was pressed.
    #[serde(default)]
    pub button: MouseButton,

    /// Press (true) or release (false). Only presses seed zooms.
    #[serde(default = "default_true", rename = "down")]
    pub pressed: bool,
}

fn default_true() -> bool {
    true
}

/// A cursor position sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveEvent {
    /// Milliseconds since recording start.
    pub time: TimestampMs,

    /// Normalized X coordinate [0.0, 1.0].
    pub x: f64,

    /// Normalized Y coordinate [0.0, 1.0].
    pub y: f64,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Whether this is the primary (drag-capable) button.
    pub fn is_primary(self) -> bool {
        matches!(self, MouseButton::Left)
    }
}

impl ClickEvent {
    /// Create a primary-button press, clamping coordinates to the
    /// padded frame interior.
    pub fn press(time: TimestampMs, x: f64, y: f64, edge_padding: f64) -> Self {
        let (x, y) = clamp_to_padded(x, y, edge_padding);
        Self {
            time,
            x,
            y,
            button: MouseButton::Left,
            pressed: true,
        }
    }

    /// Create a primary-button release.
    pub fn release(time: TimestampMs, x: f64, y: f64, edge_padding: f64) -> Self {
        let (x, y) = clamp_to_padded(x, y, edge_padding);
        Self {
            time,
            x,
            y,
            button: MouseButton::Left,
            pressed: false,
        }
    }

    /// Timestamp as fractional seconds since recording start.
    pub fn time_secs(&self) -> f64 {
        self.time / 1000.0
    }
}

impl MoveEvent {
    /// Create a move sample, clamping coordinates to the padded
    /// frame interior.
    pub fn new(time: TimestampMs, x: f64, y: f64, edge_padding: f64) -> Self {
        let (x, y) = clamp_to_padded(x, y, edge_padding);
        Self { time, x, y }
    }

    /// Timestamp as fractional seconds since recording start.
    pub fn time_secs(&self) -> f64 {
        self.time / 1000.0
    }

    /// Euclidean distance to another sample.
    pub fn distance_to(&self, other: &MoveEvent) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Clamp a normalized coordinate pair to `[padding, 1 - padding]`.
pub fn clamp_to_padded(x: f64, y: f64, edge_padding: f64) -> (f64, f64) {
    let pad = edge_padding.clamp(0.0, 0.49);
    (x.clamp(pad, 1.0 - pad), y.clamp(pad, 1.0 - pad))
}

/// The full recorded input of a session: clicks and moves, appended
/// during capture or supplied in bulk for playback/export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub clicks: Vec<ClickEvent>,
    pub moves: Vec<MoveEvent>,

    /// Total recording duration in milliseconds.
    pub duration_ms: f64,
}

impl EventLog {
    /// Create an empty log for a recording of the given duration.
    pub fn new(duration_ms: f64) -> Self {
        Self {
            clicks: Vec::new(),
            moves: Vec::new(),
            duration_ms: duration_ms.max(0.0),
        }
    }

    /// Create a log from already-recorded data.
    pub fn from_recorded(clicks: Vec<ClickEvent>, moves: Vec<MoveEvent>, duration_ms: f64) -> Self {
        Self {
            clicks,
            moves,
            duration_ms: duration_ms.max(0.0),
        }
    }

    /// Append a click. Live capture appends monotonically.
    pub fn push_click(&mut self, click: ClickEvent) {
        self.duration_ms = self.duration_ms.max(click.time);
        self.clicks.push(click);
    }

    /// Append a move sample.
    pub fn push_move(&mut self, sample: MoveEvent) {
        self.duration_ms = self.duration_ms.max(sample.time);
        self.moves.push(sample);
    }

    /// Return a copy with both streams sorted by time. The offline
    /// segment generator tolerates out-of-order input by sorting
    /// before grouping; the live path expects monotonic input.
    pub fn sorted_for_export(&self) -> Self {
        let mut sorted = self.clone();
        sorted
            .clicks
            .sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));
        sorted
            .moves
            .sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    /// Whether the log contains no input at all.
    pub fn is_empty(&self) -> bool {
        self.clicks.is_empty() && self.moves.is_empty()
    }
}

/// One line of the JSONL event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EventLine {
    Click(ClickEvent),
    Move(MoveEvent),
}

/// Parse an event log from JSONL content (one JSON object per line).
/// Lines starting with `#` are header/comment lines and are skipped.
pub fn parse_event_log(jsonl: &str, duration_ms: f64) -> Result<EventLog, serde_json::Error> {
    let mut log = EventLog::new(duration_ms);
    for line in jsonl.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<EventLine>(line)? {
            EventLine::Click(click) => log.push_click(click),
            EventLine::Move(sample) => log.push_move(sample),
        }
    }
    Ok(log)
}

/// Serialize an event log to JSONL format, interleaved by timestamp.
pub fn serialize_event_log(log: &EventLog) -> Result<String, serde_json::Error> {
    let sorted = log.sorted_for_export();
    let mut lines: Vec<(f64, String)> =
        Vec::with_capacity(sorted.clicks.len() + sorted.moves.len());

    for click in &sorted.clicks {
        lines.push((click.time, serde_json::to_string(&EventLine::Click(*click))?));
    }
    for sample in &sorted.moves {
        lines.push((sample.time, serde_json::to_string(&EventLine::Move(*sample))?));
    }
    lines.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut output = String::new();
    for (_, line) in lines {
        output.push_str(&line);
        output.push('\n');
    }
    Ok(output)
}
