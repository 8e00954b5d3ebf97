//! Camera-motion engine for CineLens.
//!
//! Everything in this crate is deterministic and side-effect free: the same
//! event log and configuration always produce the same camera path, whether
//! it is driven frame by frame during a live preview ([`live`]) or evaluated
//! at arbitrary timestamps during export ([`segments`]).
//!
//! Coordinates are normalized to `[0, 1]` in both axes, matching the event
//! log produced by the recorder.

pub mod activity;
pub mod cursor;
pub mod live;
pub mod segments;
pub mod spring;

pub use activity::ActivityScorer;
pub use cursor::CursorEngine;
pub use live::LiveCameraEngine;
pub use segments::{evaluate_at_time, generate_zoom_segments, precompute_frames};
pub use spring::{smoothstep, spring_ease_in, spring_ease_out, Spring1D, Spring2D};
