//! Engagement scoring over a sliding window of input events.
//!
//! The score is what the zoom state machine consults to decide when interest
//! has faded (release the zoom) and when it has returned (reclaim it). It
//! rises the instant input arrives and bleeds off slowly, so a single missed
//! frame of input never causes a visible camera twitch.

use std::collections::VecDeque;

/// How far back clicks and movement still count, in milliseconds.
const MEMORY_WINDOW_MS: f64 = 3_000.0;

/// Immediate score bump applied per click.
const CLICK_IMPULSE: f64 = 0.55;

/// Converts normalized travel distance into score. A full screen diagonal
/// of movement in one window would saturate several times over.
const MOVE_WEIGHT: f64 = 14.0;

/// Cap on how much a single movement event may add, so one fast flick does
/// not pin the score by itself.
const MOVE_CONTRIBUTION_CAP: f64 = 0.3;

/// Clicks per window that count as full engagement.
const CLICKS_FOR_SATURATION: f64 = 2.0;

/// Windowed travel distance that counts as full engagement.
const TRAVEL_FOR_SATURATION: f64 = 0.5;

/// Maximum downward slope of the score, per second. Upward jumps are
/// unbounded.
const MAX_DECAY_PER_SEC: f64 = 0.9;

/// Sliding-window activity score in `[0, 1]`.
#[derive(Debug, Clone, Default)]
pub struct ActivityScorer {
    score: f64,
    clicks: VecDeque<f64>,
    moves: VecDeque<(f64, f64)>,
}

impl ActivityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn reset(&mut self) {
        self.score = 0.0;
        self.clicks.clear();
        self.moves.clear();
    }

    /// Records a click at `time_ms` and bumps the score immediately.
    pub fn add_click(&mut self, time_ms: f64) {
        self.clicks.push_back(time_ms);
        self.score = (self.score + CLICK_IMPULSE).min(1.0);
    }

    /// Records `distance` units of cursor travel at `time_ms`.
    pub fn add_movement(&mut self, time_ms: f64, distance: f64) {
        let distance = distance.max(0.0);
        self.moves.push_back((time_ms, distance));
        let contribution = (distance * MOVE_WEIGHT).min(MOVE_CONTRIBUTION_CAP);
        self.score = (self.score + contribution).min(1.0);
    }

    /// Re-evaluates the score at `time_ms` after `dt_ms` of elapsed time.
    ///
    /// The windowed target may pull the score down, but never faster than
    /// [`MAX_DECAY_PER_SEC`]; it may pull it up instantly.
    pub fn update(&mut self, time_ms: f64, dt_ms: f64) -> f64 {
        let horizon = time_ms - MEMORY_WINDOW_MS;
        while self.clicks.front().is_some_and(|&t| t < horizon) {
            self.clicks.pop_front();
        }
        while self.moves.front().is_some_and(|&(t, _)| t < horizon) {
            self.moves.pop_front();
        }

        let click_component = (self.clicks.len() as f64 / CLICKS_FOR_SATURATION).min(1.0);
        let travel: f64 = self.moves.iter().map(|&(_, d)| d).sum();
        let move_component = (travel / TRAVEL_FOR_SATURATION).min(1.0);
        let target = (0.6 * click_component + 0.6 * move_component).min(1.0);

        if target >= self.score {
            self.score = target;
        } else {
            let floor = self.score - MAX_DECAY_PER_SEC * (dt_ms.max(0.0) / 1000.0);
            self.score = floor.max(target);
        }
        self.score
    }
}
