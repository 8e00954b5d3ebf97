//! Camera and cursor-overlay contracts.
//!
//! These are the shapes the motion engine emits to renderer and export
//! layers. They are recomputed every query and never persisted.

use serde::{Deserialize, Serialize};

/// Phase of the live zoom state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomPhase {
    /// Camera at rest, scale 1.
    Idle,
    /// Scale spring approaching the configured zoom level.
    ZoomingIn,
    /// Zoomed in and following interaction.
    ActiveTracking,
    /// Scale spring returning to 1.
    ZoomingOut,
}

/// Per-frame camera state: the rendering contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// Camera center X (normalized).
    pub x: f64,
    /// Camera center Y (normalized).
    pub y: f64,
    /// Zoom scale (1.0 = no zoom).
    pub scale: f64,
    /// Current state-machine phase.
    pub phase: ZoomPhase,
    /// Whether the camera is meaningfully zoomed in.
    pub is_zoomed: bool,
    /// Current engagement score in [0, 1].
    pub activity: f64,
}

impl CameraState {
    /// Centered, unzoomed, idle camera.
    pub fn idle() -> Self {
        Self {
            x: 0.5,
            y: 0.5,
            scale: 1.0,
            phase: ZoomPhase::Idle,
            is_zoomed: false,
            activity: 0.0,
        }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::idle()
    }
}

/// A timestamped pan target inside a zoom segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusPoint {
    /// Seconds since recording start.
    pub time: f64,
    /// Normalized X.
    pub x: f64,
    /// Normalized Y.
    pub y: f64,
}

/// A finalized, non-overlapping zoom interval for deterministic export.
///
/// Invariants: `start < end`, segments in a generated array are sorted
/// by `start` and do not overlap, and `focus_points` are ordered by
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomSegment {
    /// Segment start in seconds.
    pub start: f64,
    /// Segment end in seconds.
    pub end: f64,
    /// Zoom scale factor while fully zoomed (e.g., 1.8).
    pub amount: f64,
    /// Ordered pan path through the segment.
    pub focus_points: Vec<FocusPoint>,
}

impl ZoomSegment {
    /// Segment duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether a time (seconds) falls inside the segment.
    pub fn contains(&self, time_secs: f64) -> bool {
        time_secs >= self.start && time_secs <= self.end
    }
}

/// Per-query output of the cursor smoothing engine, independent of the
/// zoom camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorOverlayState {
    /// Smoothed cursor X (normalized).
    pub x: f64,
    /// Smoothed cursor Y (normalized).
    pub y: f64,
    /// Spring velocity (normalized units/sec).
    pub velocity: (f64, f64),
    /// Velocity magnitude clamped to [0, 1], for motion blur.
    pub motion: f64,
    /// Overlay opacity after idle fade, in [0, 1].
    pub opacity: f64,
    /// Click ripple envelope value in [0, 1].
    pub click_progress: f64,
}

impl CursorOverlayState {
    /// Hidden overlay at the frame center.
    pub fn hidden() -> Self {
        Self {
            x: 0.5,
            y: 0.5,
            velocity: (0.0, 0.0),
            motion: 0.0,
            opacity: 0.0,
            click_progress: 0.0,
        }
    }
}

/// Combined per-frame evaluation for the export compositor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameState {
    pub camera: CameraState,
    pub cursor: CursorOverlayState,
}
