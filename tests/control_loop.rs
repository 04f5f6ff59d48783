//! Integration tests for the per-frame control loop.
//!
//! A scripted [`HandSource`] stands in for the UDP receiver so each tick's
//! detection is known in advance.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use glam::{Vec2, Vec3};
use sparkle_tree::hand::{INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_TIP, RING_TIP};
use sparkle_tree::prelude::*;
use sparkle_tree::target::TARGET_DEPTH;
use sparkle_tree::{PerceptionError, NUM_LANDMARKS};

type Script = Arc<Mutex<VecDeque<Result<Option<Detection>, PerceptionError>>>>;

struct ScriptedSource {
    script: Script,
}

impl HandSource for ScriptedSource {
    fn poll(&mut self) -> Result<Option<Detection>, PerceptionError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct Harness {
    script: Script,
    control: ControlLoop,
    sim: SceneSimulation,
    viewport: Viewport,
    frame: u64,
}

impl Harness {
    fn new() -> Self {
        let script: Script = Arc::default();
        let source = ScriptedSource {
            script: script.clone(),
        };
        let config = Config::default();
        let counts = SceneCounts {
            ambient: 30,
            layer_points: 40,
            snow: 10,
        };
        Self {
            script,
            control: ControlLoop::new(Perception::with_source(Box::new(source)), config.gesture),
            sim: SceneSimulation::with_counts(&config.tree, Some(11), counts),
            viewport: Viewport::new(4.0, 3.0),
            frame: 0,
        }
    }

    fn push(&self, item: Result<Option<Detection>, PerceptionError>) {
        self.script.lock().unwrap().push_back(item);
    }

    fn tick(&mut self) -> sparkle_tree::TickOutput {
        self.tick_with_pointer(Vec2::ZERO)
    }

    fn tick_with_pointer(&mut self, pointer: Vec2) -> sparkle_tree::TickOutput {
        self.frame += 1;
        self.control.tick(
            &mut self.sim,
            pointer,
            &self.viewport,
            FrameTime::fixed(self.frame),
        )
    }
}

/// Wrist at the origin, palm base at (0, 0.1), fingertips `tip_distance`
/// away, index tip shifted to `index_xy`.
fn hand(tip_distance: f32, index_xy: Vec2) -> HandFrame {
    let mut landmarks = [Vec3::ZERO; NUM_LANDMARKS];
    landmarks[MIDDLE_MCP] = Vec3::new(0.0, 0.1, 0.0);
    for tip in [MIDDLE_TIP, RING_TIP, PINKY_TIP] {
        landmarks[tip] = Vec3::new(0.0, tip_distance, 0.0);
    }
    landmarks[INDEX_TIP] = index_xy.extend(0.0);
    HandFrame::new(landmarks, 0.0)
}

fn open_hand() -> Detection {
    Detection::Hand(hand(0.5, Vec2::new(0.5, 0.6)))
}

fn fist() -> Detection {
    Detection::Hand(hand(0.05, Vec2::new(0.02, 0.03)))
}

#[test]
fn test_starts_without_gesture() {
    let mut h = Harness::new();
    let out = h.tick();
    assert_eq!(out.inputs.gesture, Gesture::None);
    assert_eq!(out.inputs.target.source, TargetSource::Pointer);
    assert!(out.status_changed.is_none());
}

#[test]
fn test_missing_detection_keeps_previous_gesture() {
    let mut h = Harness::new();
    h.push(Ok(Some(open_hand())));
    assert_eq!(h.tick().inputs.gesture, Gesture::Open);

    for _ in 0..5 {
        let out = h.tick();
        assert_eq!(out.inputs.gesture, Gesture::Open);
        assert_eq!(out.inputs.target.source, TargetSource::Hand);
    }
}

#[test]
fn test_no_hand_resets_gesture() {
    let mut h = Harness::new();
    h.push(Ok(Some(open_hand())));
    h.tick();
    h.push(Ok(Some(Detection::NoHand)));
    let out = h.tick();
    assert_eq!(out.inputs.gesture, Gesture::None);
    assert_eq!(out.inputs.target.source, TargetSource::Pointer);
}

#[test]
fn test_status_emitted_only_on_change() {
    let mut h = Harness::new();
    h.push(Ok(Some(fist())));
    let changed = h.tick().status_changed.expect("status should change");
    assert!(changed.tracking);
    assert_eq!(changed.gesture, Gesture::Closed);

    // Same gesture again: no new status.
    h.push(Ok(Some(fist())));
    assert!(h.tick().status_changed.is_none());
    assert!(h.tick().status_changed.is_none());

    h.push(Ok(Some(open_hand())));
    let changed = h.tick().status_changed.expect("status should change");
    assert_eq!(changed.gesture, Gesture::Open);
    assert_eq!(changed.to_string(), "Tracking hand (open hand)");

    h.push(Ok(Some(Detection::NoHand)));
    let changed = h.tick().status_changed.expect("status should change");
    assert!(!changed.tracking);
    assert_eq!(h.control.status(), changed);
}

#[test]
fn test_hand_target_overrides_pointer() {
    let mut h = Harness::new();
    h.push(Ok(Some(open_hand())));
    let out = h.tick_with_pointer(Vec2::new(0.9, -0.9));
    let target = out.inputs.target;
    assert_eq!(target.source, TargetSource::Hand);
    // Index tip (0.5, 0.6): centered horizontally, below center.
    assert!(target.position.x.abs() < 1e-5);
    assert!((target.position.y - (-0.6)).abs() < 1e-4);
    assert_eq!(target.position.z, TARGET_DEPTH);
}

#[test]
fn test_pointer_drives_target_without_hand() {
    let mut h = Harness::new();
    let out = h.tick_with_pointer(Vec2::new(1.0, 1.0));
    assert_eq!(out.inputs.target.position, Vec3::new(4.0, 3.0, TARGET_DEPTH));
    assert_eq!(out.inputs.pointer_ndc, Vec2::new(1.0, 1.0));
}

#[test]
fn test_bad_packet_keeps_state() {
    let mut h = Harness::new();
    h.push(Ok(Some(fist())));
    h.tick();
    h.push(Err(PerceptionError::LandmarkCount(4)));
    let out = h.tick();
    assert_eq!(out.inputs.gesture, Gesture::Closed);
    assert!(h.control.perception_available());
}

#[test]
fn test_receive_failure_falls_back_to_pointer() {
    let mut h = Harness::new();
    h.push(Ok(Some(open_hand())));
    h.tick();
    h.push(Err(PerceptionError::Receive(std::io::Error::new(
        std::io::ErrorKind::Other,
        "socket closed",
    ))));
    let out = h.tick();
    assert_eq!(out.inputs.gesture, Gesture::None);
    assert!(!h.control.perception_available());

    // Later script entries are never read.
    h.push(Ok(Some(open_hand())));
    assert_eq!(h.tick().inputs.gesture, Gesture::None);
}

#[test]
fn test_open_hand_expands_tree() {
    let mut h = Harness::new();
    h.push(Ok(Some(open_hand())));
    for _ in 0..200 {
        h.tick();
    }
    assert!(h.sim.tree().max_error(true) < 0.01);

    h.push(Ok(Some(fist())));
    for _ in 0..200 {
        h.tick();
    }
    assert!(h.sim.tree().max_error(false) < 0.01);
}

#[test]
fn test_shutdown_is_idempotent() {
    let mut h = Harness::new();
    h.control.shutdown();
    h.control.shutdown();
    assert!(!h.control.perception_available());
    assert_eq!(h.tick().inputs.gesture, Gesture::None);
}
