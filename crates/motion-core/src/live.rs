//! Frame-driven camera engine for the recording preview.
//!
//! The engine consumes pointer events as they happen and is stepped once per
//! rendered frame. All motion state lives in analytical springs, so the step
//! size only controls how often decisions are made, not where the camera
//! ends up. Seeking is a rewind-and-replay: spring motion depends on the
//! whole input history, so there is no shortcut that lands on the same
//! state.

use cinelens_project_model::{
    clamp_to_padded, CameraConfig, CameraState, ClickEvent, EventLog, MouseButton, MoveEvent,
    SpeedProfile, ZoomPhase,
};
use tracing::debug;

use crate::activity::ActivityScorer;
use crate::spring::{smoothstep, Spring1D, Spring2D};

/// Fraction of the zoom-in transition that counts as "arrived".
const APPROACH_THRESHOLD: f64 = 0.93;

/// Activity below which a tracked zoom is released.
const RELEASE_ACTIVITY: f64 = 0.18;

/// Activity above which a zoom-out in flight is reclaimed.
const RECLAIM_ACTIVITY: f64 = 0.55;

/// Minimum time spent tracking before a release is allowed.
const MIN_TRACKING_DWELL_MS: f64 = 900.0;

/// Quiet period after a completed zoom-out during which clicks do not start
/// a new zoom.
const COOLDOWN_MS: f64 = 400.0;

/// Ramp duration over which cursor influence fades in after arrival.
const BLEND_RAMP_MS: f64 = 1_200.0;

/// Upper bound on cursor influence in the anchor/cursor blend.
const BLEND_MAX: f64 = 0.65;

/// Margin inside the viewport edge, as a fraction of the half-extent, that
/// the live cursor is kept away from.
const CURSOR_MARGIN_FRACTION: f64 = 0.15;

/// Fixed step used when replaying history for a seek, in milliseconds.
const SEEK_STEP_MS: f64 = 8.0;

/// Scale above which the frame is reported as zoomed.
const ZOOMED_SCALE: f64 = 1.05;

/// Live camera state machine and blender.
#[derive(Debug, Clone)]
pub struct LiveCameraEngine {
    config: CameraConfig,
    profile: SpeedProfile,
    log: EventLog,
    activity: ActivityScorer,
    phase: ZoomPhase,
    anchor: [f64; 2],
    anchor_spring: Spring2D,
    cursor_spring: Spring2D,
    scale_spring: Spring1D,
    cursor: [f64; 2],
    has_cursor: bool,
    tracking_since: f64,
    cooldown_until: f64,
    last_update_ms: Option<f64>,
}

impl LiveCameraEngine {
    pub fn new(config: CameraConfig) -> Self {
        let config = config.validate();
        let profile = config.profile();
        let center = [0.5, 0.5];
        Self {
            anchor: center,
            anchor_spring: Spring2D::new(profile.anchor_spring, center),
            cursor_spring: Spring2D::new(profile.cursor_spring, center),
            scale_spring: Spring1D::new(profile.scale_spring, 1.0),
            cursor: center,
            has_cursor: false,
            tracking_since: 0.0,
            cooldown_until: 0.0,
            last_update_ms: None,
            activity: ActivityScorer::new(),
            phase: ZoomPhase::Idle,
            log: EventLog::default(),
            profile,
            config,
        }
    }

    /// Builds an engine over an already-recorded log, positioned at time
    /// zero. Use [`LiveCameraEngine::seek`] to move through it.
    pub fn with_log(config: CameraConfig, log: EventLog) -> Self {
        let mut engine = Self::new(config);
        engine.log = log;
        engine
    }

    pub fn phase(&self) -> ZoomPhase {
        self.phase
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn into_log(self) -> EventLog {
        self.log
    }

    /// Ingests a live click press. Releases are recorded for export but do
    /// not drive the state machine.
    pub fn on_click(&mut self, time_ms: f64, x: f64, y: f64, button: MouseButton) {
        let (x, y) = clamp_to_padded(x, y, self.config.edge_padding);
        let event = ClickEvent { time: time_ms, x, y, button, pressed: true };
        self.log.push_click(event);
        self.apply_click(&event);
    }

    pub fn on_click_release(&mut self, time_ms: f64, x: f64, y: f64, button: MouseButton) {
        let (x, y) = clamp_to_padded(x, y, self.config.edge_padding);
        let event = ClickEvent { time: time_ms, x, y, button, pressed: false };
        self.log.push_click(event);
        self.apply_click(&event);
    }

    /// Ingests a live cursor move.
    pub fn on_move(&mut self, time_ms: f64, x: f64, y: f64) {
        let event = MoveEvent::new(time_ms, x, y, self.config.edge_padding);
        self.log.push_move(event);
        self.apply_move(&event);
    }

    fn apply_click(&mut self, event: &ClickEvent) {
        if !event.pressed {
            return;
        }
        self.activity.add_click(event.time);
        let point = [event.x, event.y];
        match self.phase {
            ZoomPhase::Idle => {
                if event.time >= self.cooldown_until {
                    self.begin_zoom_in(event.time, point);
                }
            }
            ZoomPhase::ZoomingIn | ZoomPhase::ActiveTracking => {
                // Already engaged: pan to the new point of interest.
                self.anchor = point;
            }
            ZoomPhase::ZoomingOut => {
                // Remember where interest returned; the reclaim decision
                // itself happens on the next update, off the activity score.
                self.anchor = point;
            }
        }
    }

    fn apply_move(&mut self, event: &MoveEvent) {
        let point = [event.x, event.y];
        if self.has_cursor {
            let dx = point[0] - self.cursor[0];
            let dy = point[1] - self.cursor[1];
            self.activity.add_movement(event.time, (dx * dx + dy * dy).sqrt());
        }
        self.cursor = point;
        self.has_cursor = true;
        self.cursor_spring.set_target(point);
    }

    fn begin_zoom_in(&mut self, time_ms: f64, point: [f64; 2]) {
        debug!(time_ms, x = point[0], y = point[1], "zoom in");
        self.anchor = point;
        self.scale_spring.set_target(self.config.zoom_level);
        self.phase = ZoomPhase::ZoomingIn;
        self.tracking_since = time_ms;
    }

    /// How far the scale spring has come along the 1 -> zoom_level journey.
    fn zoom_progress(&self) -> f64 {
        let depth = self.config.zoom_level - 1.0;
        if depth <= f64::EPSILON {
            return 1.0;
        }
        ((self.scale_spring.value() - 1.0) / depth).clamp(0.0, 1.0)
    }

    /// Snapshot of the camera as of the last `update`, without advancing.
    pub fn state(&self) -> CameraState {
        let scale = self.scale_spring.value().clamp(1.0, self.config.max_zoom);
        let center = clamp_center(self.anchor_spring.value(), scale);
        CameraState {
            x: center[0],
            y: center[1],
            scale,
            phase: self.phase,
            is_zoomed: scale > ZOOMED_SCALE,
            activity: self.activity.score(),
        }
    }

    /// Advances the engine to `time_ms` and returns the frame's camera.
    pub fn update(&mut self, time_ms: f64) -> CameraState {
        let dt_ms = match self.last_update_ms {
            Some(prev) => (time_ms - prev).max(0.0),
            None => 0.0,
        };
        self.last_update_ms = Some(time_ms);

        let activity = self.activity.update(time_ms, dt_ms);
        self.step_state_machine(time_ms, activity);

        self.cursor_spring.run(dt_ms);
        self.scale_spring.run(dt_ms);
        let scale = self.scale_spring.value().clamp(1.0, self.config.max_zoom);

        // Blend the click anchor with the smoothed cursor. Cursor influence
        // ramps in only once tracking begins and scales with zoom depth, so
        // a barely-zoomed frame never sways with the pointer.
        let weight = self.blend_weight(time_ms);
        let smoothed = self.cursor_spring.value();
        let mut target = [
            self.anchor[0] * (1.0 - weight) + smoothed[0] * weight,
            self.anchor[1] * (1.0 - weight) + smoothed[1] * weight,
        ];
        if self.has_cursor {
            target = nudge_for_cursor(target, scale, self.cursor);
        }
        self.anchor_spring.set_target(clamp_center(target, scale));
        self.anchor_spring.run(dt_ms);

        let [x, y] = self.anchor_spring.value();
        let center = clamp_center([x, y], scale);
        CameraState {
            x: center[0],
            y: center[1],
            scale,
            phase: self.phase,
            is_zoomed: scale > ZOOMED_SCALE,
            activity,
        }
    }

    fn step_state_machine(&mut self, time_ms: f64, activity: f64) {
        match self.phase {
            ZoomPhase::Idle => {}
            ZoomPhase::ZoomingIn => {
                if self.zoom_progress() >= APPROACH_THRESHOLD {
                    debug!(time_ms, "tracking");
                    self.phase = ZoomPhase::ActiveTracking;
                    self.tracking_since = time_ms;
                }
            }
            ZoomPhase::ActiveTracking => {
                let dwelled = time_ms - self.tracking_since >= MIN_TRACKING_DWELL_MS;
                if dwelled && activity < RELEASE_ACTIVITY {
                    debug!(time_ms, activity, "zoom out");
                    self.phase = ZoomPhase::ZoomingOut;
                    self.scale_spring.set_target(1.0);
                }
            }
            ZoomPhase::ZoomingOut => {
                if activity > RECLAIM_ACTIVITY {
                    // Interest came back mid-release: head straight back in
                    // from the current scale, no dip through 1.0.
                    debug!(time_ms, activity, "reclaim");
                    self.begin_zoom_in(time_ms, self.anchor);
                } else if self.scale_spring.is_settled(1e-3) {
                    self.phase = ZoomPhase::Idle;
                    self.cooldown_until = time_ms + COOLDOWN_MS;
                }
            }
        }
    }

    fn blend_weight(&self, time_ms: f64) -> f64 {
        if self.phase != ZoomPhase::ActiveTracking {
            return 0.0;
        }
        let ramp = ((time_ms - self.tracking_since) / BLEND_RAMP_MS).clamp(0.0, 1.0);
        smoothstep(ramp) * BLEND_MAX * self.zoom_progress()
    }

    /// Rewinds to time zero and replays the retained log up to `time_ms`.
    pub fn seek(&mut self, time_ms: f64) -> CameraState {
        self.rewind();
        let log = self.log.sorted_for_export();
        let mut clicks = log.clicks.iter().peekable();
        let mut moves = log.moves.iter().peekable();

        let mut sim_ms = 0.0;
        loop {
            // The final step lands exactly on `time_ms`; a seek to zero
            // still dispatches events stamped at zero.
            let step_end = (sim_ms + SEEK_STEP_MS).min(time_ms);
            loop {
                // Apply, in timestamp order, every event due within this step.
                let next_click = clicks.peek().map(|c| c.time).filter(|&t| t <= step_end);
                let next_move = moves.peek().map(|m| m.time).filter(|&t| t <= step_end);
                let take_click = match (next_click, next_move) {
                    (Some(ct), Some(mt)) => ct <= mt,
                    (Some(_), None) => true,
                    (None, Some(_)) => false,
                    (None, None) => break,
                };
                if take_click {
                    if let Some(&event) = clicks.next() {
                        self.apply_click(&event);
                    }
                } else if let Some(&event) = moves.next() {
                    self.apply_move(&event);
                }
            }
            let state = self.update(step_end);
            if step_end >= time_ms {
                return state;
            }
            sim_ms = step_end;
        }
    }

    /// Resets all motion state but keeps the retained event log.
    fn rewind(&mut self) {
        let center = [0.5, 0.5];
        self.activity.reset();
        self.phase = ZoomPhase::Idle;
        self.anchor = center;
        self.anchor_spring = Spring2D::new(self.profile.anchor_spring, center);
        self.cursor_spring = Spring2D::new(self.profile.cursor_spring, center);
        self.scale_spring = Spring1D::new(self.profile.scale_spring, 1.0);
        self.cursor = center;
        self.has_cursor = false;
        self.tracking_since = 0.0;
        self.cooldown_until = 0.0;
        self.last_update_ms = None;
    }

    /// Discards motion state and the retained log.
    pub fn reset(&mut self) {
        self.rewind();
        self.log = EventLog::default();
    }
}

/// Shifts `center` by the exact overflow needed to keep `cursor` inside the
/// viewport, with a margin of [`CURSOR_MARGIN_FRACTION`] of the half-extent.
fn nudge_for_cursor(center: [f64; 2], scale: f64, cursor: [f64; 2]) -> [f64; 2] {
    if scale <= 1.001 {
        return center;
    }
    let half = 0.5 / scale;
    let margin = half * CURSOR_MARGIN_FRACTION;
    let mut out = center;
    for axis in 0..2 {
        let lo = out[axis] - half + margin;
        let hi = out[axis] + half - margin;
        if cursor[axis] < lo {
            out[axis] -= lo - cursor[axis];
        } else if cursor[axis] > hi {
            out[axis] += cursor[axis] - hi;
        }
    }
    out
}

/// Clamps a viewport center so the visible rectangle stays inside `[0, 1]`.
fn clamp_center(center: [f64; 2], scale: f64) -> [f64; 2] {
    let half = (0.5 / scale.max(1.0)).min(0.5);
    [center[0].clamp(half, 1.0 - half), center[1].clamp(half, 1.0 - half)]
}
