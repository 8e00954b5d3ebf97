//! Camera configuration with named, validated fields.
//!
//! Defaults are resolved at construction; `validate()` clamps rather
//! than errors so a bad settings file can never produce NaN motion.

use serde::{Deserialize, Serialize};

/// Zoom transition speed preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

/// Physical spring parameters. Damping ratio is
/// `friction / (2 * sqrt(tension * mass))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    pub tension: f64,
    pub mass: f64,
    pub friction: f64,
}

impl SpringParams {
    /// Damping ratio of this parameter set.
    pub fn damping_ratio(&self) -> f64 {
        self.friction / (2.0 * (self.tension * self.mass).sqrt())
    }
}

/// Concrete timings and spring tuning resolved from a [`ZoomSpeed`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    /// Nominal zoom-in/zoom-out transition duration (seconds).
    pub transition_secs: f64,

    /// Spring driving camera pan toward the click anchor.
    pub anchor_spring: SpringParams,

    /// Lighter spring following the live cursor while tracking.
    pub cursor_spring: SpringParams,

    /// Scalar spring driving the zoom scale.
    pub scale_spring: SpringParams,
}

impl ZoomSpeed {
    /// Resolve the preset into concrete durations and spring tuning.
    pub fn profile(self) -> SpeedProfile {
        match self {
            ZoomSpeed::Slow => SpeedProfile {
                transition_secs: 1.4,
                anchor_spring: SpringParams {
                    tension: 80.0,
                    mass: 2.8,
                    friction: 34.0,
                },
                cursor_spring: SpringParams {
                    tension: 70.0,
                    mass: 1.0,
                    friction: 18.0,
                },
                scale_spring: SpringParams {
                    tension: 80.0,
                    mass: 2.8,
                    friction: 34.0,
                },
            },
            ZoomSpeed::Normal => SpeedProfile {
                transition_secs: 1.0,
                anchor_spring: SpringParams {
                    tension: 120.0,
                    mass: 2.5,
                    friction: 32.0,
                },
                cursor_spring: SpringParams {
                    tension: 100.0,
                    mass: 1.0,
                    friction: 20.0,
                },
                scale_spring: SpringParams {
                    tension: 120.0,
                    mass: 2.5,
                    friction: 32.0,
                },
            },
            ZoomSpeed::Fast => SpeedProfile {
                transition_secs: 0.6,
                anchor_spring: SpringParams {
                    tension: 200.0,
                    mass: 2.25,
                    friction: 40.0,
                },
                cursor_spring: SpringParams {
                    tension: 160.0,
                    mass: 1.0,
                    friction: 24.0,
                },
                scale_spring: SpringParams {
                    tension: 200.0,
                    mass: 2.25,
                    friction: 40.0,
                },
            },
        }
    }

    /// Parse a preset name as written in settings files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "slow" => Some(ZoomSpeed::Slow),
            "normal" => Some(ZoomSpeed::Normal),
            "fast" => Some(ZoomSpeed::Fast),
            _ => None,
        }
    }
}

/// Engine-level camera configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Target zoom scale while tracking, in [1.0, 4.0].
    pub zoom_level: f64,

    /// Transition speed preset.
    pub zoom_speed: ZoomSpeed,

    /// Inset border fraction; click/move coordinates are clamped to
    /// `[edge_padding, 1 - edge_padding]` on ingestion.
    pub edge_padding: f64,

    /// Lower bound on the configurable `zoom_level`; the emitted scale
    /// itself rests at 1.0 whenever the camera is not zoomed.
    pub min_zoom: f64,

    /// Upper bound on the emitted camera scale.
    pub max_zoom: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom_level: 2.0,
            zoom_speed: ZoomSpeed::Normal,
            edge_padding: 0.05,
            min_zoom: 1.0,
            max_zoom: 4.0,
        }
    }
}

impl CameraConfig {
    /// Clamp every field to its sane range. Zero or negative values
    /// are a configuration error and are corrected, not propagated.
    pub fn validate(mut self) -> Self {
        self.min_zoom = self.min_zoom.clamp(1.0, 4.0);
        self.max_zoom = self.max_zoom.clamp(self.min_zoom, 4.0);
        self.zoom_level = self.zoom_level.clamp(self.min_zoom, self.max_zoom);
        self.edge_padding = self.edge_padding.clamp(0.0, 0.45);
        self
    }

    /// Resolved timings and spring tuning for the selected speed.
    pub fn profile(&self) -> SpeedProfile {
        self.zoom_speed.profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_already_valid() {
        let config = CameraConfig::default();
        assert_eq!(config, config.validate());
    }

    #[test]
    fn validate_clamps_out_of_range_zoom() {
        let config = CameraConfig {
            zoom_level: 9.0,
            min_zoom: -1.0,
            max_zoom: 100.0,
            ..Default::default()
        }
        .validate();
        assert_eq!(config.min_zoom, 1.0);
        assert_eq!(config.max_zoom, 4.0);
        assert_eq!(config.zoom_level, 4.0);
    }

    #[test]
    fn presets_resolve_to_distinct_durations() {
        let slow = ZoomSpeed::Slow.profile();
        let fast = ZoomSpeed::Fast.profile();
        assert!(slow.transition_secs > fast.transition_secs);
    }

    #[test]
    fn all_preset_springs_are_overdamped_or_critical_enough() {
        // Camera motion must not visibly ring; every preset keeps the
        // anchor and scale springs near or above critical damping.
        for speed in [ZoomSpeed::Slow, ZoomSpeed::Normal, ZoomSpeed::Fast] {
            let p = speed.profile();
            assert!(p.anchor_spring.damping_ratio() > 0.8, "{speed:?}");
            assert!(p.scale_spring.damping_ratio() > 0.8, "{speed:?}");
        }
    }

    #[test]
    fn speed_names_parse() {
        assert_eq!(ZoomSpeed::from_name("slow"), Some(ZoomSpeed::Slow));
        assert_eq!(ZoomSpeed::from_name("warp"), None);
    }
}
