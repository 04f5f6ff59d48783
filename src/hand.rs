//! Hand landmark frames as delivered by the perception helper.
//!
//! A [`HandFrame`] is the 21-point MediaPipe hand skeleton in normalized image
//! space: `x` and `y` in `[0, 1]` with the origin at the top-left of the camera
//! image, `z` a relative depth. Frames are validated on construction, so every
//! `HandFrame` holds exactly [`NUM_LANDMARKS`] points.

use glam::{Vec2, Vec3};

use crate::error::PerceptionError;

/// Number of landmarks in one hand skeleton.
pub const NUM_LANDMARKS: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Fingertips checked for curl (thumb excluded).
pub const FINGERTIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// One detected hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    landmarks: [Vec3; NUM_LANDMARKS],
    /// Capture time reported by the detector, in milliseconds.
    pub timestamp_ms: f64,
}

impl HandFrame {
    /// Build a frame from a full skeleton.
    pub fn new(landmarks: [Vec3; NUM_LANDMARKS], timestamp_ms: f64) -> Self {
        Self {
            landmarks,
            timestamp_ms,
        }
    }

    /// Build a frame from `[x, y, z]` triples, rejecting incomplete skeletons.
    pub fn from_points(points: &[[f32; 3]], timestamp_ms: f64) -> Result<Self, PerceptionError> {
        if points.len() != NUM_LANDMARKS {
            return Err(PerceptionError::LandmarkCount(points.len()));
        }
        let mut landmarks = [Vec3::ZERO; NUM_LANDMARKS];
        for (slot, p) in landmarks.iter_mut().zip(points) {
            *slot = Vec3::from_array(*p);
        }
        Ok(Self::new(landmarks, timestamp_ms))
    }

    /// Landmark `index` in normalized image space.
    ///
    /// # Panics
    ///
    /// Panics if `index >= NUM_LANDMARKS`.
    #[inline]
    pub fn landmark(&self, index: usize) -> Vec3 {
        self.landmarks[index]
    }

    /// Landmark `index` projected onto the image plane.
    #[inline]
    pub fn landmark_xy(&self, index: usize) -> Vec2 {
        self.landmarks[index].truncate()
    }

    /// Index fingertip on the image plane, the point that steers the target.
    #[inline]
    pub fn index_tip(&self) -> Vec2 {
        self.landmark_xy(INDEX_TIP)
    }

    /// All landmarks in skeleton order.
    pub fn landmarks(&self) -> &[Vec3; NUM_LANDMARKS] {
        &self.landmarks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_accepts_full_skeleton() {
        let mut points = [[0.0f32; 3]; NUM_LANDMARKS];
        points[INDEX_TIP] = [0.25, 0.75, -0.1];
        let frame = HandFrame::from_points(&points, 12.0).unwrap();

        assert_eq!(frame.index_tip(), Vec2::new(0.25, 0.75));
        assert_eq!(frame.landmark(INDEX_TIP).z, -0.1);
        assert_eq!(frame.timestamp_ms, 12.0);
    }

    #[test]
    fn test_from_points_rejects_partial_skeleton() {
        let points = [[0.5f32; 3]; 20];
        let err = HandFrame::from_points(&points, 0.0).unwrap_err();
        assert!(matches!(err, PerceptionError::LandmarkCount(20)));
    }
}
