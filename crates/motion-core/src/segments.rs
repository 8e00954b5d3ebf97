//! Offline zoom-segment generation and evaluation for export.
//!
//! Unlike the live engine, this path is stateless: segments are derived
//! once from the full event log, and any timestamp can then be evaluated
//! in isolation. Export workers can therefore render frames out of order
//! or in parallel and still agree on every pixel of camera motion.

use cinelens_project_model::{
    CameraConfig, CameraState, EventLog, FocusPoint, FrameState, ZoomPhase, ZoomSegment,
};
use tracing::debug;

use crate::cursor::CursorEngine;
use crate::spring::{smoothstep, spring_ease_in, spring_ease_out};

/// Clicks this close in time may share a segment.
const GROUP_TIME_THRESHOLD_SECS: f64 = 2.0;

/// Clicks this close in normalized distance may share a segment.
const GROUP_SPATIAL_THRESHOLD: f64 = 0.15;

/// Lead-in before the first click of a group.
const PRE_PADDING_SECS: f64 = 0.3;

/// Hold after the last click of a group.
const POST_PADDING_SECS: f64 = 1.0;

/// Segments closer than this are merged into one.
const MERGE_GAP_SECS: f64 = 0.4;

/// Segments shorter than this are discarded.
const MIN_SEGMENT_SECS: f64 = 0.8;

/// No segment may extend into the final stretch of the recording, so the
/// export never ends mid-zoom.
const STOP_PADDING_SECS: f64 = 0.5;

/// Minimum spacing between move-derived focus points.
const FOCUS_SAMPLE_SPACING_SECS: f64 = 0.2;

/// Zoom progress at which the evaluated phase flips to tracking; matches
/// the live engine's arrival threshold.
const APPROACH_THRESHOLD: f64 = 0.93;

/// Derives the non-overlapping zoom segments for a recorded log.
///
/// Only click presses seed segments; cursor movement refines the pan path
/// inside a segment but never opens one. The result is sorted by start
/// time, padded, merged, and filtered so every segment is long enough to
/// complete its transitions.
pub fn generate_zoom_segments(log: &EventLog, config: &CameraConfig) -> Vec<ZoomSegment> {
    let config = config.validate();
    let log = log.sorted_for_export();
    let duration_secs = effective_duration_secs(&log);
    let cutoff = if duration_secs > STOP_PADDING_SECS {
        duration_secs - STOP_PADDING_SECS
    } else {
        duration_secs
    };

    // Click positions snap to the nearest preceding cursor sample: the
    // pointer path is sampled continuously while click coordinates come
    // from a separate hook and can lag by a frame.
    let presses: Vec<FocusPoint> = log
        .clicks
        .iter()
        .filter(|c| c.pressed && c.time_secs() <= cutoff)
        .map(|c| {
            let (x, y) = log
                .moves
                .iter()
                .rev()
                .find(|m| m.time <= c.time)
                .map(|m| (m.x, m.y))
                .unwrap_or((c.x, c.y));
            FocusPoint { time: c.time_secs(), x, y }
        })
        .collect();

    if presses.is_empty() {
        return Vec::new();
    }

    // Chronological grouping: a press joins the open group when it is near
    // the group's previous press in both time and space.
    let mut groups: Vec<Vec<FocusPoint>> = Vec::new();
    for press in presses {
        let joins = groups.last().and_then(|g| g.last()).is_some_and(|last| {
            let dt = press.time - last.time;
            let dist = ((press.x - last.x).powi(2) + (press.y - last.y).powi(2)).sqrt();
            dt <= GROUP_TIME_THRESHOLD_SECS && dist <= GROUP_SPATIAL_THRESHOLD
        });
        if joins {
            if let Some(group) = groups.last_mut() {
                group.push(press);
            }
        } else {
            groups.push(vec![press]);
        }
    }

    let mut segments: Vec<ZoomSegment> = Vec::new();
    for group in groups {
        let (Some(first), Some(last)) = (group.first().copied(), group.last().copied()) else {
            continue;
        };
        let start = (first.time - PRE_PADDING_SECS).max(0.0);
        let end = (last.time + POST_PADDING_SECS).min(cutoff);
        if end <= start {
            continue;
        }
        let mut segment = ZoomSegment {
            start,
            end,
            amount: config.zoom_level,
            focus_points: group,
        };

        // Enrich the pan path with subsampled cursor positions so the
        // camera drifts with deliberate travel between clicks.
        let mut last_sample = f64::NEG_INFINITY;
        for sample in &log.moves {
            let t = sample.time_secs();
            if t < segment.start || t > segment.end {
                continue;
            }
            if t - last_sample >= FOCUS_SAMPLE_SPACING_SECS {
                segment.focus_points.push(FocusPoint { time: t, x: sample.x, y: sample.y });
                last_sample = t;
            }
        }
        sort_focus(&mut segment.focus_points);
        segments.push(segment);
    }

    segments.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

    // Merge near-adjacent (or overlapping) segments, then drop the ones too
    // short to complete a zoom round trip.
    let mut merged: Vec<ZoomSegment> = Vec::new();
    for segment in segments {
        match merged.last_mut() {
            Some(last) if segment.start - last.end < MERGE_GAP_SECS => {
                last.end = last.end.max(segment.end);
                last.focus_points.extend(segment.focus_points);
                sort_focus(&mut last.focus_points);
            }
            _ => merged.push(segment),
        }
    }
    merged.retain(|s| s.duration() >= MIN_SEGMENT_SECS);

    debug!(segments = merged.len(), duration_secs, "generated zoom segments");
    merged
}

fn effective_duration_secs(log: &EventLog) -> f64 {
    let mut duration = log.duration_ms;
    if let Some(last) = log.clicks.last() {
        duration = duration.max(last.time);
    }
    if let Some(last) = log.moves.last() {
        duration = duration.max(last.time);
    }
    duration / 1000.0
}

fn sort_focus(points: &mut [FocusPoint]) {
    points.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));
}

/// Evaluates the camera at an arbitrary timestamp (seconds).
///
/// Pure function of its inputs: calling it for any time, in any order,
/// always yields the same state. Zoom progress doubles as the reported
/// activity since the offline path has no live engagement score.
pub fn evaluate_at_time(
    segments: &[ZoomSegment],
    time_secs: f64,
    config: &CameraConfig,
) -> CameraState {
    let config = config.validate();
    let profile = config.profile();
    let duration = profile.transition_secs.max(1e-6);
    let ease = profile.scale_spring;

    let current_idx = segments.iter().position(|s| s.contains(time_secs));
    let previous = match current_idx {
        Some(0) => None,
        Some(i) => Some(&segments[i - 1]),
        None => segments.iter().rev().find(|s| s.end < time_secs),
    };

    let (focus, amount, zoom_t, phase) = if let Some(segment) = current_idx.map(|i| &segments[i]) {
        let in_t = spring_ease_in(((time_secs - segment.start) / duration).clamp(0.0, 1.0), ease);

        // If the previous segment's release was still in flight when this
        // one started, the scale never reaches 1: it bottoms out at the
        // residual level and climbs back, cross-fading the pan target.
        let residual = previous
            .map(|p| (segment.start - p.end) / duration)
            .filter(|gap| *gap < 1.0)
            .map(|gap| 1.0 - spring_ease_out(gap.clamp(0.0, 1.0), ease));

        match (previous, residual) {
            (Some(prev), Some(floor)) => {
                let zoom_t = floor + (1.0 - floor) * in_t;
                let out_remaining =
                    1.0 - spring_ease_out(((time_secs - prev.end) / duration).clamp(0.0, 1.0), ease);
                let w = if in_t + out_remaining > 0.0 {
                    in_t / (in_t + out_remaining)
                } else {
                    1.0
                };
                let from = last_focus(prev);
                let to = focus_at(segment, time_secs);
                let focus = (from.0 + (to.0 - from.0) * w, from.1 + (to.1 - from.1) * w);
                let amount = prev.amount + (segment.amount - prev.amount) * w;
                let phase =
                    if zoom_t >= APPROACH_THRESHOLD { ZoomPhase::ActiveTracking } else { ZoomPhase::ZoomingIn };
                (focus, amount, zoom_t, phase)
            }
            _ => {
                let phase =
                    if in_t >= APPROACH_THRESHOLD { ZoomPhase::ActiveTracking } else { ZoomPhase::ZoomingIn };
                (focus_at(segment, time_secs), segment.amount, in_t, phase)
            }
        }
    } else if let Some(prev) = previous.filter(|p| time_secs - p.end < duration) {
        let out_t = spring_ease_out(((time_secs - prev.end) / duration).clamp(0.0, 1.0), ease);
        (last_focus(prev), prev.amount, 1.0 - out_t, ZoomPhase::ZoomingOut)
    } else {
        return CameraState::idle();
    };

    let scale = (1.0 + (amount - 1.0) * zoom_t).clamp(1.0, config.max_zoom);
    let half = 0.5 / scale;
    CameraState {
        x: focus.0.clamp(half, 1.0 - half),
        y: focus.1.clamp(half, 1.0 - half),
        scale,
        phase,
        is_zoomed: scale > 1.05,
        activity: zoom_t.clamp(0.0, 1.0),
    }
}

/// Pan target inside a segment: smoothstep interpolation between the
/// bracketing focus points, held flat beyond either end.
fn focus_at(segment: &ZoomSegment, time_secs: f64) -> (f64, f64) {
    let points = &segment.focus_points;
    let Some(first) = points.first() else {
        return (0.5, 0.5);
    };
    if time_secs <= first.time {
        return (first.x, first.y);
    }
    for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if time_secs <= b.time {
            let span = (b.time - a.time).max(1e-9);
            let t = smoothstep((time_secs - a.time) / span);
            return (a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
        }
    }
    points.last().map(|p| (p.x, p.y)).unwrap_or((0.5, 0.5))
}

fn last_focus(segment: &ZoomSegment) -> (f64, f64) {
    segment.focus_points.last().map(|p| (p.x, p.y)).unwrap_or((0.5, 0.5))
}

/// Renders the full camera and cursor timeline at a fixed frame rate.
///
/// Convenience for exporters that want one state per output frame rather
/// than issuing per-timestamp queries.
pub fn precompute_frames(log: &EventLog, config: &CameraConfig, fps: f64) -> Vec<FrameState> {
    let fps = fps.max(1.0);
    let segments = generate_zoom_segments(log, config);
    let cursor = CursorEngine::new(log);
    let duration_secs = effective_duration_secs(log);
    let frames = (duration_secs * fps).ceil() as usize;
    (0..=frames)
        .map(|i| {
            let t = i as f64 / fps;
            FrameState {
                camera: evaluate_at_time(&segments, t, config),
                cursor: cursor.overlay_at(t * 1000.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinelens_project_model::{ClickEvent, MoveEvent};

    fn press(time_ms: f64, x: f64, y: f64) -> ClickEvent {
        ClickEvent::press(time_ms, x, y, 0.0)
    }

    fn log_of(clicks: Vec<ClickEvent>, moves: Vec<MoveEvent>, duration_ms: f64) -> EventLog {
        EventLog::from_recorded(clicks, moves, duration_ms)
    }

    #[test]
    fn no_clicks_no_segments() {
        let log = log_of(vec![], vec![MoveEvent::new(100.0, 0.5, 0.5, 0.0)], 5_000.0);
        assert!(generate_zoom_segments(&log, &CameraConfig::default()).is_empty());
    }

    #[test]
    fn single_click_gets_padding() {
        let log = log_of(vec![press(1_000.0, 0.5, 0.5)], vec![], 10_000.0);
        let segments = generate_zoom_segments(&log, &CameraConfig::default());
        assert_eq!(segments.len(), 1);
        assert!((segments[0].start - 0.7).abs() < 1e-9);
        assert!((segments[0].end - 2.0).abs() < 1e-9);
        assert_eq!(segments[0].amount, 2.0);
    }

    #[test]
    fn pre_padding_clamps_at_zero() {
        let log = log_of(
            vec![press(0.0, 0.5, 0.5), press(1_000.0, 0.5, 0.5)],
            vec![],
            10_000.0,
        );
        let segments = generate_zoom_segments(&log, &CameraConfig::default());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, 0.0);
        assert!((segments[0].end - 2.0).abs() < 1e-9);
        assert_eq!(segments[0].focus_points.len(), 2);
    }

    #[test]
    fn distant_clicks_make_separate_segments() {
        let log = log_of(
            vec![press(1_000.0, 0.5, 0.5), press(6_000.0, 0.5, 0.5)],
            vec![],
            10_000.0,
        );
        let segments = generate_zoom_segments(&log, &CameraConfig::default());
        assert_eq!(segments.len(), 2);
        assert!(segments[1].start - segments[0].end >= MERGE_GAP_SECS);
    }

    #[test]
    fn spatially_distant_clicks_split_but_overlap_merges() {
        // Far apart on screen, close in time: separate groups whose padded
        // intervals overlap, so merging folds them back into one segment
        // with both pan targets.
        let log = log_of(
            vec![press(1_000.0, 0.1, 0.1), press(1_500.0, 0.9, 0.9)],
            vec![],
            10_000.0,
        );
        let segments = generate_zoom_segments(&log, &CameraConfig::default());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].focus_points.len(), 2);
    }

    #[test]
    fn releases_do_not_seed_segments() {
        let log = log_of(
            vec![ClickEvent::release(1_000.0, 0.5, 0.5, 0.0)],
            vec![],
            10_000.0,
        );
        assert!(generate_zoom_segments(&log, &CameraConfig::default()).is_empty());
    }

    #[test]
    fn clicks_in_stop_padding_are_dropped() {
        let log = log_of(vec![press(9_800.0, 0.5, 0.5)], vec![], 10_000.0);
        assert!(generate_zoom_segments(&log, &CameraConfig::default()).is_empty());
    }

    #[test]
    fn short_tail_segment_is_filtered() {
        // Click just before the stop padding: the clamped interval is too
        // short to survive the minimum-duration filter.
        let log = log_of(vec![press(9_400.0, 0.5, 0.5)], vec![], 10_000.0);
        assert!(generate_zoom_segments(&log, &CameraConfig::default()).is_empty());
    }

    #[test]
    fn click_position_snaps_to_preceding_move() {
        let log = log_of(
            vec![press(1_000.0, 0.8, 0.8)],
            vec![MoveEvent::new(950.0, 0.3, 0.4, 0.0)],
            10_000.0,
        );
        let segments = generate_zoom_segments(&log, &CameraConfig::default());
        let click_focus = segments[0]
            .focus_points
            .iter()
            .find(|p| (p.time - 1.0).abs() < 1e-9)
            .copied()
            .unwrap();
        assert_eq!((click_focus.x, click_focus.y), (0.3, 0.4));
    }

    #[test]
    fn moves_enrich_the_pan_path_with_spacing() {
        let moves: Vec<MoveEvent> = (0..20)
            .map(|i| MoveEvent::new(1_000.0 + i as f64 * 50.0, 0.5 + i as f64 * 0.01, 0.5, 0.0))
            .collect();
        let log = log_of(vec![press(1_000.0, 0.5, 0.5)], moves, 10_000.0);
        let segments = generate_zoom_segments(&log, &CameraConfig::default());
        let move_samples = segments[0].focus_points.len() - 1;
        // 950 ms of moves at 50 ms spacing, subsampled to >= 200 ms apart.
        assert!(move_samples <= 5, "got {move_samples}");
        assert!(move_samples >= 4);
        let times: Vec<f64> = segments[0].focus_points.iter().map(|p| p.time).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn segments_are_sorted_and_disjoint() {
        let log = log_of(
            vec![
                press(8_000.0, 0.2, 0.2),
                press(1_000.0, 0.5, 0.5),
                press(4_500.0, 0.8, 0.8),
            ],
            vec![],
            12_000.0,
        );
        let segments = generate_zoom_segments(&log, &CameraConfig::default());
        for pair in segments.windows(2) {
            assert!(pair[0].end <= pair[1].start);
            assert!(pair[0].start < pair[1].start);
        }
    }

    #[test]
    fn evaluate_is_idle_outside_segments() {
        let log = log_of(vec![press(5_000.0, 0.5, 0.5)], vec![], 20_000.0);
        let config = CameraConfig::default();
        let segments = generate_zoom_segments(&log, &config);
        let state = evaluate_at_time(&segments, 1.0, &config);
        assert_eq!(state, CameraState::idle());
    }

    #[test]
    fn evaluate_reaches_full_zoom_mid_segment() {
        let log = log_of(
            vec![press(5_000.0, 0.5, 0.5), press(6_500.0, 0.5, 0.5)],
            vec![],
            20_000.0,
        );
        let config = CameraConfig::default();
        let segments = generate_zoom_segments(&log, &config);
        let t = segments[0].start + 2.5;
        let state = evaluate_at_time(&segments, t, &config);
        assert!((state.scale - 2.0).abs() < 0.02);
        assert_eq!(state.phase, ZoomPhase::ActiveTracking);
        assert!(state.is_zoomed);
    }

    #[test]
    fn evaluate_starts_at_unit_scale() {
        let log = log_of(vec![press(5_000.0, 0.5, 0.5)], vec![], 20_000.0);
        let config = CameraConfig::default();
        let segments = generate_zoom_segments(&log, &config);
        let state = evaluate_at_time(&segments, segments[0].start, &config);
        assert!((state.scale - 1.0).abs() < 1e-9);
        assert_eq!(state.phase, ZoomPhase::ZoomingIn);
    }

    #[test]
    fn evaluate_zooms_out_after_segment() {
        let log = log_of(vec![press(5_000.0, 0.5, 0.5)], vec![], 20_000.0);
        let config = CameraConfig::default();
        let segments = generate_zoom_segments(&log, &config);
        let end = segments[0].end;
        let mid_out = evaluate_at_time(&segments, end + 0.4, &config);
        assert_eq!(mid_out.phase, ZoomPhase::ZoomingOut);
        assert!(mid_out.scale > 1.0 && mid_out.scale < 2.0);
        let after = evaluate_at_time(&segments, end + 5.0, &config);
        assert_eq!(after, CameraState::idle());
    }

    #[test]
    fn close_segments_cross_fade_without_full_zoom_out() {
        // Gap shorter than the transition: the scale at the start of the
        // second segment keeps the residual level instead of hitting 1.
        let segments = vec![
            ZoomSegment {
                start: 1.0,
                end: 3.0,
                amount: 2.0,
                focus_points: vec![FocusPoint { time: 1.0, x: 0.3, y: 0.3 }],
            },
            ZoomSegment {
                start: 3.2,
                end: 5.0,
                amount: 2.0,
                focus_points: vec![FocusPoint { time: 3.2, x: 0.7, y: 0.7 }],
            },
        ];
        let config = CameraConfig::default();
        let state = evaluate_at_time(&segments, 3.2, &config);
        assert!(state.scale > 1.2, "residual zoom lost: {}", state.scale);
    }

    #[test]
    fn evaluate_keeps_viewport_inside_frame() {
        let log = log_of(vec![press(5_000.0, 0.98, 0.02)], vec![], 20_000.0);
        let config = CameraConfig { edge_padding: 0.0, ..Default::default() };
        let segments = generate_zoom_segments(&log, &config);
        let state = evaluate_at_time(&segments, segments[0].start + 1.2, &config);
        let half = 0.5 / state.scale;
        assert!(state.x <= 1.0 - half + 1e-9);
        assert!(state.y >= half - 1e-9);
    }

    #[test]
    fn evaluate_is_pure() {
        let log = log_of(
            vec![press(2_000.0, 0.4, 0.6), press(7_000.0, 0.6, 0.4)],
            vec![MoveEvent::new(2_500.0, 0.45, 0.55, 0.0)],
            20_000.0,
        );
        let config = CameraConfig::default();
        let segments = generate_zoom_segments(&log, &config);
        for i in 0..100 {
            let t = i as f64 * 0.2;
            assert_eq!(
                evaluate_at_time(&segments, t, &config),
                evaluate_at_time(&segments, t, &config)
            );
        }
    }

    #[test]
    fn precompute_covers_every_frame() {
        let log = log_of(
            vec![press(1_000.0, 0.5, 0.5)],
            vec![MoveEvent::new(500.0, 0.4, 0.4, 0.0)],
            5_000.0,
        );
        let frames = precompute_frames(&log, &CameraConfig::default(), 30.0);
        assert_eq!(frames.len(), 151);
        assert!(frames.iter().any(|f| f.camera.is_zoomed));
    }
}
