//! Cursor-overlay smoothing, independent of the zoom camera.
//!
//! The raw pointer stream is cleaned (shake filter), densified across
//! recording gaps, and replayed through a spring whose tuning switches
//! with interaction context. All of that happens once at construction;
//! queries are pure lookups plus an exact spring advance, so any frame
//! can be evaluated in any order.

use cinelens_project_model::{CursorOverlayState, EventLog, MoveEvent, SpringParams};
use tracing::debug;

use crate::spring::{smoothstep, solve_spring_1d};

/// Window after a click press during which the spring snaps harder.
const CLICK_REACTION_WINDOW_MS: f64 = 160.0;

/// A direction reversal within this window and under this travel is
/// treated as hand shake and dropped.
const SHAKE_WINDOW_MS: f64 = 100.0;
const SHAKE_DISTANCE: f64 = 0.015;

/// Nominal capture cadence used to size gap filling.
const FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

/// Gaps longer than this many frame intervals get synthetic samples.
const GAP_FRAMES: f64 = 4.0;

/// Gap filling only kicks in for meaningful travel; tiny hops across a
/// long pause should stay a single step.
const MIN_GAP_TRAVEL: f64 = 0.02;

/// Upper bound on synthetic samples per gap.
const MAX_FILL_STEPS: usize = 120;

/// Overlay fade: full opacity for this long after the last movement,
/// then a linear fade to invisible.
const IDLE_DELAY_MS: f64 = 500.0;
const IDLE_FADE_MS: f64 = 400.0;

/// Click ripple length and the share of it spent on the attack.
const CLICK_PULSE_MS: f64 = 350.0;
const PULSE_ATTACK_FRACTION: f64 = 0.25;

/// Spring tuning selected from interaction context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorProfile {
    /// Relaxed follow for ordinary travel.
    Default,
    /// Stiff and fast right after a click, so the overlay lands where
    /// the viewer expects the action to be.
    Snappy,
    /// Heavier follow while the primary button is held, steadying drags.
    Drag,
}

impl CursorProfile {
    fn params(self) -> SpringParams {
        match self {
            CursorProfile::Default => SpringParams { tension: 100.0, mass: 1.0, friction: 20.0 },
            CursorProfile::Snappy => SpringParams { tension: 700.0, mass: 1.0, friction: 30.0 },
            CursorProfile::Drag => SpringParams { tension: 80.0, mass: 1.2, friction: 26.0 },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SpringState {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

/// Precomputed spring state at one target sample. A query between two
/// samples resumes the spring from the earlier one.
#[derive(Debug, Clone, Copy)]
struct SmoothedSample {
    time: f64,
    target: (f64, f64),
    state: SpringState,
}

/// One click in the flattened interaction timeline.
#[derive(Debug, Clone, Copy)]
struct ClickMark {
    time: f64,
    down: bool,
    primary: bool,
}

/// Deterministic cursor-overlay evaluator for a recorded log.
#[derive(Debug, Clone)]
pub struct CursorEngine {
    samples: Vec<SmoothedSample>,
    clicks: Vec<ClickMark>,
    move_times: Vec<f64>,
}

impl CursorEngine {
    pub fn new(log: &EventLog) -> Self {
        let log = log.sorted_for_export();
        let clicks: Vec<ClickMark> = log
            .clicks
            .iter()
            .map(|c| ClickMark { time: c.time, down: c.pressed, primary: c.button.is_primary() })
            .collect();
        let move_times: Vec<f64> = log.moves.iter().map(|m| m.time).collect();

        let filtered = shake_filter(&log.moves);
        let dense = densify(&filtered);
        debug!(
            raw = log.moves.len(),
            filtered = filtered.len(),
            dense = dense.len(),
            "prepared cursor timeline"
        );

        let mut engine = Self { samples: Vec::with_capacity(dense.len()), clicks, move_times };
        engine.replay(&dense);
        engine
    }

    /// Replays the spring over the prepared targets, storing its exact
    /// state at every retarget so queries can resume mid-flight.
    fn replay(&mut self, targets: &[MoveEvent]) {
        let Some(first) = targets.first() else {
            return;
        };
        let mut state = SpringState { x: first.x, y: first.y, vx: 0.0, vy: 0.0 };
        let mut target = (first.x, first.y);
        self.samples.push(SmoothedSample { time: first.time, target, state });

        for sample in &targets[1..] {
            let from = self
                .samples
                .last()
                .map(|s| s.time)
                .unwrap_or(first.time);
            self.advance(&mut state, target, from, sample.time);
            target = (sample.x, sample.y);
            self.samples.push(SmoothedSample { time: sample.time, target, state });
        }
    }

    /// Evaluates the overlay at `time_ms`.
    pub fn overlay_at(&self, time_ms: f64) -> CursorOverlayState {
        let Some(first) = self.samples.first() else {
            return CursorOverlayState::hidden();
        };
        if time_ms <= first.time {
            return CursorOverlayState {
                x: first.state.x,
                y: first.state.y,
                velocity: (0.0, 0.0),
                motion: 0.0,
                opacity: 1.0,
                click_progress: self.click_progress(time_ms),
            };
        }

        let idx = self.samples.partition_point(|s| s.time <= time_ms) - 1;
        let base = self.samples[idx];
        let mut state = base.state;
        self.advance(&mut state, base.target, base.time, time_ms);

        let speed = (state.vx * state.vx + state.vy * state.vy).sqrt();
        CursorOverlayState {
            x: state.x,
            y: state.y,
            velocity: (state.vx, state.vy),
            motion: speed.min(1.0),
            opacity: self.opacity(time_ms),
            click_progress: self.click_progress(time_ms),
        }
    }

    /// Advances `state` toward `target`, splitting the interval at every
    /// profile boundary so tuning changes land at their exact times. The
    /// solver is time-additive under fixed tuning, so extra splits never
    /// change the result.
    fn advance(&self, state: &mut SpringState, target: (f64, f64), from_ms: f64, to_ms: f64) {
        let mut t = from_ms;
        while t < to_ms - 1e-9 {
            let mut step_end = self.next_profile_boundary(t).min(to_ms);
            if step_end <= t {
                step_end = to_ms;
            }
            let params = self.profile_at(t).params();
            let omega0 = (params.tension / params.mass).sqrt();
            let zeta = params.friction / (2.0 * (params.tension * params.mass).sqrt());
            let dt_secs = (step_end - t) / 1000.0;

            let (dx, vx) = solve_spring_1d(state.x - target.0, state.vx, dt_secs, omega0, zeta);
            let (dy, vy) = solve_spring_1d(state.y - target.1, state.vy, dt_secs, omega0, zeta);
            state.x = target.0 + dx;
            state.y = target.1 + dy;
            state.vx = vx;
            state.vy = vy;
            t = step_end;
        }
    }

    fn profile_at(&self, time_ms: f64) -> CursorProfile {
        if self.primary_held_at(time_ms) {
            return CursorProfile::Drag;
        }
        let recent_press = self
            .last_press_at(time_ms)
            .is_some_and(|press| time_ms - press <= CLICK_REACTION_WINDOW_MS);
        if recent_press {
            CursorProfile::Snappy
        } else {
            CursorProfile::Default
        }
    }

    fn primary_held_at(&self, time_ms: f64) -> bool {
        self.clicks
            .iter()
            .rev()
            .find(|c| c.primary && c.time <= time_ms)
            .is_some_and(|c| c.down)
    }

    fn last_press_at(&self, time_ms: f64) -> Option<f64> {
        self.clicks
            .iter()
            .rev()
            .find(|c| c.down && c.time <= time_ms)
            .map(|c| c.time)
    }

    /// Earliest time after `time_ms` at which the active profile can
    /// change: a click edge or the snappy window expiring.
    fn next_profile_boundary(&self, time_ms: f64) -> f64 {
        let mut boundary = f64::INFINITY;
        if let Some(next) = self.clicks.iter().find(|c| c.time > time_ms) {
            boundary = next.time;
        }
        if let Some(press) = self.last_press_at(time_ms) {
            let expiry = press + CLICK_REACTION_WINDOW_MS;
            if expiry > time_ms {
                boundary = boundary.min(expiry);
            }
        }
        boundary
    }

    fn opacity(&self, time_ms: f64) -> f64 {
        let idx = self.move_times.partition_point(|&t| t <= time_ms);
        if idx == 0 {
            return 1.0;
        }
        let idle = time_ms - self.move_times[idx - 1];
        if idle <= IDLE_DELAY_MS {
            1.0
        } else {
            (1.0 - (idle - IDLE_DELAY_MS) / IDLE_FADE_MS).max(0.0)
        }
    }

    /// Click ripple envelope: a fast smoothstep attack to 1, then a
    /// decaying oscillatory release back to 0.
    fn click_progress(&self, time_ms: f64) -> f64 {
        let Some(press) = self.last_press_at(time_ms) else {
            return 0.0;
        };
        let elapsed = time_ms - press;
        if !(0.0..CLICK_PULSE_MS).contains(&elapsed) {
            return 0.0;
        }
        let t = elapsed / CLICK_PULSE_MS;
        if t < PULSE_ATTACK_FRACTION {
            smoothstep(t / PULSE_ATTACK_FRACTION)
        } else {
            let release = (t - PULSE_ATTACK_FRACTION) / (1.0 - PULSE_ATTACK_FRACTION);
            let decay = (1.0 - release) * (-3.0 * release).exp();
            decay * (0.7 + 0.3 * (release * std::f64::consts::PI * 3.0).cos())
        }
    }
}

/// Drops micro-reversals: a sample that turns the path back on itself
/// within [`SHAKE_WINDOW_MS`] while traveling less than
/// [`SHAKE_DISTANCE`] is hand tremor, not intent.
fn shake_filter(moves: &[MoveEvent]) -> Vec<MoveEvent> {
    let mut filtered: Vec<MoveEvent> = Vec::with_capacity(moves.len());
    for sample in moves {
        if filtered.len() >= 2 {
            let prev = filtered[filtered.len() - 1];
            let before = filtered[filtered.len() - 2];
            let (v1x, v1y) = (prev.x - before.x, prev.y - before.y);
            let (v2x, v2y) = (sample.x - prev.x, sample.y - prev.y);
            let reversal = v1x * v2x + v1y * v2y < 0.0;
            let travel = (v2x * v2x + v2y * v2y).sqrt();
            if reversal && travel < SHAKE_DISTANCE && sample.time - prev.time <= SHAKE_WINDOW_MS {
                continue;
            }
        }
        filtered.push(*sample);
    }
    filtered
}

/// Inserts smoothstep-eased synthetic samples across recording gaps so
/// the spring glides instead of teleporting after a pause.
fn densify(moves: &[MoveEvent]) -> Vec<MoveEvent> {
    let mut dense: Vec<MoveEvent> = Vec::with_capacity(moves.len());
    for sample in moves {
        if let Some(prev) = dense.last().copied() {
            let dt = sample.time - prev.time;
            let travel = prev.distance_to(sample);
            if dt > FRAME_INTERVAL_MS * GAP_FRAMES && travel >= MIN_GAP_TRAVEL {
                let steps = ((dt / FRAME_INTERVAL_MS) as usize).min(MAX_FILL_STEPS);
                for i in 1..steps {
                    let frac = i as f64 / steps as f64;
                    let eased = smoothstep(frac);
                    dense.push(MoveEvent {
                        time: prev.time + dt * frac,
                        x: prev.x + (sample.x - prev.x) * eased,
                        y: prev.y + (sample.y - prev.y) * eased,
                    });
                }
            }
        }
        dense.push(*sample);
    }
    dense
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinelens_project_model::ClickEvent;

    fn mv(time: f64, x: f64, y: f64) -> MoveEvent {
        MoveEvent { time, x, y }
    }

    fn log_with(moves: Vec<MoveEvent>, clicks: Vec<ClickEvent>) -> EventLog {
        EventLog::from_recorded(clicks, moves, 60_000.0)
    }

    #[test]
    fn empty_log_is_hidden() {
        let engine = CursorEngine::new(&EventLog::default());
        assert_eq!(engine.overlay_at(123.0), CursorOverlayState::hidden());
    }

    #[test]
    fn before_first_move_holds_first_position() {
        let engine = CursorEngine::new(&log_with(vec![mv(1_000.0, 0.3, 0.7)], vec![]));
        let state = engine.overlay_at(0.0);
        assert_eq!((state.x, state.y), (0.3, 0.7));
        assert_eq!(state.opacity, 1.0);
        assert_eq!(state.motion, 0.0);
    }

    #[test]
    fn spring_approaches_target() {
        let engine = CursorEngine::new(&log_with(vec![mv(0.0, 0.2, 0.2), mv(16.0, 0.8, 0.8)], vec![]));
        let early = engine.overlay_at(50.0);
        let late = engine.overlay_at(2_000.0);
        assert!((early.x - 0.8).abs() > (late.x - 0.8).abs());
        assert!((late.x - 0.8).abs() < 1e-3);
        assert!((late.y - 0.8).abs() < 1e-3);
    }

    #[test]
    fn queries_are_order_independent() {
        let engine = CursorEngine::new(&log_with(
            vec![mv(0.0, 0.1, 0.1), mv(100.0, 0.5, 0.2), mv(700.0, 0.9, 0.9)],
            vec![ClickEvent::press(120.0, 0.5, 0.2, 0.0)],
        ));
        let forward: Vec<_> = (0..20).map(|i| engine.overlay_at(i as f64 * 60.0)).collect();
        let backward: Vec<_> = (0..20).rev().map(|i| engine.overlay_at(i as f64 * 60.0)).collect();
        for (f, b) in forward.iter().zip(backward.iter().rev()) {
            assert_eq!(f, b);
        }
    }

    #[test]
    fn shake_reversals_are_dropped() {
        let jittery = vec![
            mv(0.0, 0.500, 0.5),
            mv(20.0, 0.510, 0.5),
            mv(40.0, 0.505, 0.5), // reversal, 0.005 travel, 20 ms
            mv(60.0, 0.512, 0.5),
        ];
        let filtered = shake_filter(&jittery);
        assert_eq!(filtered.len(), 3);
        assert!((filtered[2].x - 0.512).abs() < 1e-12);
    }

    #[test]
    fn deliberate_reversals_survive() {
        let back_and_forth = vec![
            mv(0.0, 0.2, 0.5),
            mv(100.0, 0.6, 0.5),
            mv(200.0, 0.3, 0.5), // reversal but far beyond shake distance
        ];
        assert_eq!(shake_filter(&back_and_forth).len(), 3);
    }

    #[test]
    fn gaps_are_densified_with_cap() {
        let short_hop = densify(&[mv(0.0, 0.5, 0.5), mv(500.0, 0.505, 0.5)]);
        assert_eq!(short_hop.len(), 2, "tiny travel must not be filled");

        let jump = densify(&[mv(0.0, 0.1, 0.1), mv(500.0, 0.9, 0.9)]);
        assert!(jump.len() > 10);
        assert!(jump.len() <= MAX_FILL_STEPS + 1);
        let times: Vec<f64> = jump.iter().map(|m| m.time).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));

        let long_pause = densify(&[mv(0.0, 0.1, 0.1), mv(60_000.0, 0.9, 0.9)]);
        assert!(long_pause.len() <= MAX_FILL_STEPS + 1);
    }

    #[test]
    fn click_makes_the_follow_snappier() {
        let moves = vec![mv(0.0, 0.2, 0.5), mv(16.0, 0.8, 0.5)];
        let relaxed = CursorEngine::new(&log_with(moves.clone(), vec![]));
        let clicked = CursorEngine::new(&log_with(
            moves,
            vec![
                ClickEvent::press(10.0, 0.8, 0.5, 0.0),
                ClickEvent::release(20.0, 0.8, 0.5, 0.0),
            ],
        ));
        let t = 100.0;
        let d_relaxed = (relaxed.overlay_at(t).x - 0.8).abs();
        let d_clicked = (clicked.overlay_at(t).x - 0.8).abs();
        assert!(d_clicked < d_relaxed, "snappy profile should close faster");
    }

    #[test]
    fn drag_profile_is_active_while_primary_held() {
        let engine = CursorEngine::new(&log_with(
            vec![mv(0.0, 0.5, 0.5)],
            vec![
                ClickEvent::press(100.0, 0.5, 0.5, 0.0),
                ClickEvent::release(900.0, 0.6, 0.6, 0.0),
            ],
        ));
        assert_eq!(engine.profile_at(50.0), CursorProfile::Default);
        assert_eq!(engine.profile_at(500.0), CursorProfile::Drag);
        // After release the press is long outside the reaction window.
        assert_eq!(engine.profile_at(1_200.0), CursorProfile::Default);
    }

    #[test]
    fn snappy_window_follows_release() {
        let engine = CursorEngine::new(&log_with(
            vec![mv(0.0, 0.5, 0.5)],
            vec![
                ClickEvent::press(100.0, 0.5, 0.5, 0.0),
                ClickEvent::release(150.0, 0.5, 0.5, 0.0),
            ],
        ));
        assert_eq!(engine.profile_at(120.0), CursorProfile::Drag);
        assert_eq!(engine.profile_at(200.0), CursorProfile::Snappy);
        assert_eq!(engine.profile_at(400.0), CursorProfile::Default);
    }

    #[test]
    fn profile_swap_keeps_position_continuous() {
        let engine = CursorEngine::new(&log_with(
            vec![mv(0.0, 0.2, 0.2), mv(16.0, 0.8, 0.8)],
            vec![ClickEvent::press(60.0, 0.8, 0.8, 0.0)],
        ));
        let before = engine.overlay_at(59.9);
        let after = engine.overlay_at(60.1);
        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);
    }

    #[test]
    fn click_pulse_envelope() {
        let engine = CursorEngine::new(&log_with(
            vec![mv(0.0, 0.5, 0.5)],
            vec![ClickEvent::press(1_000.0, 0.5, 0.5, 0.0)],
        ));
        assert_eq!(engine.overlay_at(900.0).click_progress, 0.0);
        let attack_end = 1_000.0 + CLICK_PULSE_MS * PULSE_ATTACK_FRACTION;
        assert!((engine.overlay_at(attack_end - 0.01).click_progress - 1.0).abs() < 0.01);
        let mid_release = engine.overlay_at(1_000.0 + CLICK_PULSE_MS * 0.6).click_progress;
        assert!(mid_release > 0.0 && mid_release < 1.0);
        assert_eq!(engine.overlay_at(1_000.0 + CLICK_PULSE_MS + 1.0).click_progress, 0.0);
    }

    #[test]
    fn overlay_fades_after_idle() {
        let engine = CursorEngine::new(&log_with(vec![mv(0.0, 0.5, 0.5)], vec![]));
        assert_eq!(engine.overlay_at(IDLE_DELAY_MS - 1.0).opacity, 1.0);
        let mid = engine.overlay_at(IDLE_DELAY_MS + IDLE_FADE_MS / 2.0).opacity;
        assert!((mid - 0.5).abs() < 1e-9);
        assert_eq!(engine.overlay_at(IDLE_DELAY_MS + IDLE_FADE_MS + 1.0).opacity, 0.0);
    }

    #[test]
    fn movement_resets_the_fade() {
        let engine = CursorEngine::new(&log_with(
            vec![mv(0.0, 0.5, 0.5), mv(2_000.0, 0.6, 0.5)],
            vec![],
        ));
        // Deep into the fade from the first move, but the second move
        // restores full opacity.
        assert!(engine.overlay_at(1_200.0).opacity < 1.0);
        assert_eq!(engine.overlay_at(2_100.0).opacity, 1.0);
    }
}
