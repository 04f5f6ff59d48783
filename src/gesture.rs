//! Open-hand / fist classification from landmark geometry.
//!
//! The heuristic is scale invariant: every fingertip distance is compared
//! against the palm length (wrist to middle-finger knuckle), so the result does
//! not depend on how far the hand is from the camera.
//!
//! ```ignore
//! let gesture = classify(&frame, &GestureThresholds::default());
//! if gesture.is_open() {
//!     // burst the tree
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::hand::{HandFrame, FINGERTIPS, MIDDLE_MCP, WRIST};

/// Fingertip-to-wrist distance, as a multiple of palm size, below which a
/// finger counts as curled.
pub const CURL_RATIO: f32 = 1.3;

/// Curled fingers needed to call the hand a fist.
pub const MIN_CURLED: usize = 3;

/// The discrete hand state the simulation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gesture {
    /// Fingers spread. Bursts the tree and pushes the dust outward.
    Open,
    /// Fist.
    Closed,
    /// No hand tracked.
    #[default]
    None,
}

impl Gesture {
    /// Whether this gesture puts the scene into its exploded state.
    #[inline]
    pub fn is_open(self) -> bool {
        self == Gesture::Open
    }

    /// Short label for status displays.
    pub fn label(self) -> &'static str {
        match self {
            Gesture::Open => "open hand",
            Gesture::Closed => "fist",
            Gesture::None => "no hand",
        }
    }
}

/// Tunable classifier constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    /// See [`CURL_RATIO`].
    pub curl_ratio: f32,
    /// See [`MIN_CURLED`].
    pub min_curled: usize,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            curl_ratio: CURL_RATIO,
            min_curled: MIN_CURLED,
        }
    }
}

/// Number of fingertips (index..pinky) closer to the wrist than
/// `palm_size * curl_ratio`, measured on the image plane.
pub fn curled_fingers(frame: &HandFrame, curl_ratio: f32) -> usize {
    let wrist = frame.landmark_xy(WRIST);
    let palm_size = wrist.distance(frame.landmark_xy(MIDDLE_MCP));
    let limit = palm_size * curl_ratio;

    FINGERTIPS
        .iter()
        .filter(|&&tip| frame.landmark_xy(tip).distance(wrist) < limit)
        .count()
}

/// Classify a detected hand as [`Gesture::Open`] or [`Gesture::Closed`].
///
/// Never returns [`Gesture::None`]; that state belongs to the caller when no
/// frame is available.
pub fn classify(frame: &HandFrame, thresholds: &GestureThresholds) -> Gesture {
    if curled_fingers(frame, thresholds.curl_ratio) >= thresholds.min_curled {
        Gesture::Closed
    } else {
        Gesture::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{INDEX_TIP, MIDDLE_TIP, NUM_LANDMARKS, PINKY_TIP, RING_TIP};
    use glam::Vec3;

    /// Wrist at the origin, palm base at (0, 0.1), tips at the given distances.
    fn hand_with_tips(distances: [f32; 4]) -> HandFrame {
        let mut landmarks = [Vec3::ZERO; NUM_LANDMARKS];
        landmarks[MIDDLE_MCP] = Vec3::new(0.0, 0.1, 0.0);
        for (tip, d) in [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP].iter().zip(distances) {
            landmarks[*tip] = Vec3::new(0.0, d, 0.0);
        }
        HandFrame::new(landmarks, 0.0)
    }

    #[test]
    fn test_fist_is_closed() {
        let frame = hand_with_tips([0.05; 4]);
        assert_eq!(curled_fingers(&frame, CURL_RATIO), 4);
        assert_eq!(classify(&frame, &GestureThresholds::default()), Gesture::Closed);
    }

    #[test]
    fn test_spread_hand_is_open() {
        let frame = hand_with_tips([0.5; 4]);
        assert_eq!(curled_fingers(&frame, CURL_RATIO), 0);
        assert_eq!(classify(&frame, &GestureThresholds::default()), Gesture::Open);
    }

    #[test]
    fn test_three_curled_is_the_boundary() {
        let three = hand_with_tips([0.05, 0.05, 0.05, 0.5]);
        let two = hand_with_tips([0.05, 0.05, 0.5, 0.5]);
        let t = GestureThresholds::default();

        assert_eq!(classify(&three, &t), Gesture::Closed);
        assert_eq!(classify(&two, &t), Gesture::Open);
    }

    #[test]
    fn test_scale_invariance() {
        // Same pose at twice the size stays closed.
        let mut landmarks = [Vec3::ZERO; NUM_LANDMARKS];
        landmarks[MIDDLE_MCP] = Vec3::new(0.0, 0.2, 0.0);
        for tip in [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP] {
            landmarks[tip] = Vec3::new(0.1, 0.0, 0.0);
        }
        let frame = HandFrame::new(landmarks, 0.0);
        assert_eq!(classify(&frame, &GestureThresholds::default()), Gesture::Closed);
    }

    #[test]
    fn test_depth_is_ignored() {
        let mut frame = hand_with_tips([0.05; 4]);
        let mut landmarks = *frame.landmarks();
        landmarks[INDEX_TIP].z = 5.0;
        frame = HandFrame::new(landmarks, 0.0);
        assert_eq!(curled_fingers(&frame, CURL_RATIO), 4);
    }

    #[test]
    fn test_custom_thresholds() {
        let frame = hand_with_tips([0.05, 0.05, 0.5, 0.5]);
        let lenient = GestureThresholds {
            curl_ratio: CURL_RATIO,
            min_curled: 2,
        };
        assert_eq!(classify(&frame, &lenient), Gesture::Closed);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let frame = hand_with_tips([0.05, 0.5, 0.05, 0.5]);
        let t = GestureThresholds::default();
        let first = classify(&frame, &t);
        for _ in 0..10 {
            assert_eq!(classify(&frame, &t), first);
        }
    }

    #[test]
    fn test_only_open_explodes() {
        assert!(Gesture::Open.is_open());
        assert!(!Gesture::Closed.is_open());
        assert!(!Gesture::None.is_open());
    }
}
