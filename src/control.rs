//! The per-frame control loop.
//!
//! Each tick runs, in order: detection, classification, target mapping and
//! particle integration. Only values derived from the newest detection
//! (gesture and fingertip) survive between ticks; a tick without a new
//! detection reuses them.

use std::fmt;

use glam::Vec2;

use crate::gesture::{classify, Gesture, GestureThresholds};
use crate::perception::{Detection, Perception};
use crate::sim::{SceneSimulation, StepInputs};
use crate::target::{resolve, Viewport};
use crate::time::FrameTime;

/// What the UI shows about hand tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackingStatus {
    pub tracking: bool,
    pub gesture: Gesture,
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tracking {
            write!(f, "Tracking hand ({})", self.gesture.label())
        } else {
            write!(f, "Show hand to control")
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    pub inputs: StepInputs,
    /// Set only when the status differs from the previous tick.
    pub status_changed: Option<TrackingStatus>,
}

pub struct ControlLoop {
    perception: Perception,
    thresholds: GestureThresholds,
    hand_tip: Option<Vec2>,
    gesture: Gesture,
    status: TrackingStatus,
}

impl ControlLoop {
    pub fn new(perception: Perception, thresholds: GestureThresholds) -> Self {
        Self {
            perception,
            thresholds,
            hand_tip: None,
            gesture: Gesture::None,
            status: TrackingStatus::default(),
        }
    }

    /// Run one frame.
    pub fn tick(
        &mut self,
        sim: &mut SceneSimulation,
        pointer_ndc: Vec2,
        viewport: &Viewport,
        time: FrameTime,
    ) -> TickOutput {
        match self.perception.poll() {
            Some(Detection::Hand(frame)) => {
                self.gesture = classify(&frame, &self.thresholds);
                self.hand_tip = Some(frame.index_tip());
            }
            Some(Detection::NoHand) => {
                self.gesture = Gesture::None;
                self.hand_tip = None;
            }
            None => {}
        }

        let target = resolve(self.hand_tip, pointer_ndc, viewport);
        let inputs = StepInputs {
            gesture: self.gesture,
            target,
            pointer_ndc,
            time,
        };
        sim.step(inputs);

        let status = TrackingStatus {
            tracking: self.hand_tip.is_some(),
            gesture: self.gesture,
        };
        let status_changed = (status != self.status).then(|| {
            tracing::info!("{}", status);
            self.status = status;
            status
        });

        TickOutput {
            inputs,
            status_changed,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn status(&self) -> TrackingStatus {
        self.status
    }

    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    pub fn perception_available(&self) -> bool {
        self.perception.is_available()
    }

    /// Tear down perception. Later calls are no-ops.
    pub fn shutdown(&mut self) {
        self.perception.shutdown();
    }
}
