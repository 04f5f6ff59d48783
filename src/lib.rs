//! # Sparkle Tree
//!
//! A gesture-controlled particle holiday tree.
//!
//! Thousands of particles form a layered cone tree with garland, ornaments
//! and a star, surrounded by drifting dust, a pointer trail and snow. An
//! external hand tracker streams 21-point hand landmarks over UDP; an open
//! hand bursts the tree outward and a fist (or no hand) gathers it back. The
//! index fingertip, or the mouse pointer when no hand is tracked, attracts the
//! dust and leaves a sparkling trail.
//!
//! ## Per-frame pipeline
//!
//! ```text
//! UDP datagram ─▶ HandFrame ─▶ Gesture ─┐
//!                       └──▶ fingertip ─┴▶ TargetPoint ─▶ SceneSimulation::step
//!                                                              │
//!                          GpuState::render ◀─ FrameInstances ◀┘
//! ```
//!
//! [`control::ControlLoop::tick`] runs detection, classification, target
//! mapping and integration in that order. The simulation is plain CPU code,
//! so all of it can be driven headless:
//!
//! ```
//! use sparkle_tree::prelude::*;
//!
//! let config = Config::default();
//! let mut sim = SceneSimulation::new(&config.tree, Some(7));
//! let mut control = ControlLoop::new(Perception::disabled(), config.gesture);
//! let viewport = Viewport::new(4.0, 2.25);
//!
//! for frame in 0..10 {
//!     control.tick(&mut sim, Vec2::ZERO, &viewport, FrameTime::fixed(frame));
//! }
//! assert_eq!(control.gesture(), Gesture::None);
//! ```
//!
//! ## Hand tracking
//!
//! `scripts/hand_tracker.py` captures the webcam and sends
//! `{"timestamp_ms": .., "hands": [[[x, y, z]; 21], ..]}` datagrams to
//! `127.0.0.1:39541`. Tracking is optional: every perception failure is
//! logged and the scene keeps running under pointer control.
//!
//! ## Features
//!
//! - `egui`: a settings panel for colors, rotation speed, snow and glow.

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod gesture;
pub mod gpu;
pub mod hand;
pub mod input;
pub mod instance;
pub mod perception;
pub mod sim;
pub mod spawn;
pub mod target;
pub mod time;
pub mod ui;

pub use glam::{Vec2, Vec3, Vec4};

pub use app::App;
pub use config::{Config, Rgb};
pub use control::{ControlLoop, TickOutput, TrackingStatus};
pub use error::{AppError, ConfigError, GpuError, PerceptionError, TextureError};
pub use gesture::{classify, Gesture, GestureThresholds};
pub use hand::{HandFrame, NUM_LANDMARKS};
pub use perception::{Detection, HandSource, Perception};
pub use sim::{Palette, SceneSimulation, StepInputs};
pub use target::{TargetPoint, TargetSource, Viewport};
pub use time::{FrameTime, Time};

/// Common imports.
pub mod prelude {
    pub use crate::config::{Config, Rgb, TreeConfig};
    pub use crate::control::{ControlLoop, TrackingStatus};
    pub use crate::gesture::{classify, Gesture, GestureThresholds};
    pub use crate::hand::HandFrame;
    pub use crate::perception::{Detection, HandSource, Perception};
    pub use crate::sim::{Palette, SceneCounts, SceneSimulation, StepInputs};
    pub use crate::target::{TargetPoint, TargetSource, Viewport};
    pub use crate::time::FrameTime;
    pub use glam::{Vec2, Vec3};
}
