//! CineLens Project Model
//!
//! Defines the core data contracts for the camera-motion engine:
//! - **Events:** Timestamped pointer input (clicks, moves)
//! - **Camera:** Per-frame camera and cursor-overlay state, zoom segments
//! - **Config:** Validated camera tuning with speed presets
//!
//! All coordinates are normalized to `[0.0, 1.0]` range relative to
//! the capture region to survive DPI/scaling changes across sessions.

pub mod camera;
pub mod config;
pub mod event;

pub use camera::*;
pub use config::*;
pub use event::*;
