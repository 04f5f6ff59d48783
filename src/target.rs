//! Mapping 2D hand or pointer positions onto the 3D attractor plane.

use glam::{Vec2, Vec3};

/// Depth of the plane the attractor moves on.
pub const TARGET_DEPTH: f32 = 2.0;

/// World-space half extents of the camera frustum at the focal plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub half_width: f32,
    pub half_height: f32,
}

impl Viewport {
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_width,
            half_height,
        }
    }

    /// Half extents of a perspective frustum `distance` units in front of
    /// the camera.
    pub fn from_perspective(fov_y: f32, aspect: f32, distance: f32) -> Self {
        let half_height = (fov_y * 0.5).tan() * distance;
        Self::new(half_height * aspect, half_height)
    }

    /// Scale an NDC point (`[-1, 1]`, y up) to world units on the target plane.
    #[inline]
    pub fn ndc_to_world(&self, ndc: Vec2) -> Vec3 {
        Vec3::new(ndc.x * self.half_width, ndc.y * self.half_height, TARGET_DEPTH)
    }
}

/// Which input produced the current target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetSource {
    Hand,
    #[default]
    Pointer,
}

/// The point ambient particles are drawn toward and the trail follows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPoint {
    pub position: Vec3,
    pub source: TargetSource,
}

impl Default for TargetPoint {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, TARGET_DEPTH),
            source: TargetSource::Pointer,
        }
    }
}

/// Map a normalized image position to the target plane.
///
/// The camera image is mirrored so moving the hand right moves the target
/// right on screen; image y grows downward.
pub fn map_hand(hand: Vec2, viewport: &Viewport) -> TargetPoint {
    let ndc = Vec2::new((1.0 - hand.x) * 2.0 - 1.0, -(hand.y * 2.0 - 1.0));
    TargetPoint {
        position: viewport.ndc_to_world(ndc),
        source: TargetSource::Hand,
    }
}

/// Map pointer NDC to the target plane, without mirroring.
pub fn map_pointer(ndc: Vec2, viewport: &Viewport) -> TargetPoint {
    TargetPoint {
        position: viewport.ndc_to_world(ndc),
        source: TargetSource::Pointer,
    }
}

/// The hand wins whenever it is tracked.
pub fn resolve(hand: Option<Vec2>, pointer_ndc: Vec2, viewport: &Viewport) -> TargetPoint {
    match hand {
        Some(h) => map_hand(h, viewport),
        None => map_pointer(pointer_ndc, viewport),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_hand_center_maps_to_origin() {
        let vp = Viewport::new(5.0, 3.0);
        let t = map_hand(Vec2::new(0.5, 0.5), &vp);
        assert!(approx(t.position, Vec3::new(0.0, 0.0, TARGET_DEPTH)));
        assert_eq!(t.source, TargetSource::Hand);
    }

    #[test]
    fn test_hand_is_mirrored() {
        let vp = Viewport::new(5.0, 3.0);
        let t = map_hand(Vec2::new(1.0, 0.0), &vp);
        assert!(approx(t.position, Vec3::new(-5.0, 3.0, TARGET_DEPTH)));

        let t = map_hand(Vec2::new(0.0, 1.0), &vp);
        assert!(approx(t.position, Vec3::new(5.0, -3.0, TARGET_DEPTH)));
    }

    #[test]
    fn test_pointer_is_not_mirrored() {
        let vp = Viewport::new(4.0, 2.0);
        let t = map_pointer(Vec2::new(1.0, -1.0), &vp);
        assert!(approx(t.position, Vec3::new(4.0, -2.0, TARGET_DEPTH)));
        assert_eq!(t.source, TargetSource::Pointer);
    }

    #[test]
    fn test_resolve_prefers_hand() {
        let vp = Viewport::new(1.0, 1.0);
        let pointer = Vec2::new(0.9, 0.9);

        assert_eq!(resolve(Some(Vec2::new(0.5, 0.5)), pointer, &vp).source, TargetSource::Hand);
        assert_eq!(resolve(None, pointer, &vp).source, TargetSource::Pointer);
    }

    #[test]
    fn test_viewport_from_perspective() {
        // 90 degree fov at distance 1 covers [-1, 1] vertically.
        let vp = Viewport::from_perspective(std::f32::consts::FRAC_PI_2, 2.0, 1.0);
        assert!((vp.half_height - 1.0).abs() < 1e-5);
        assert!((vp.half_width - 2.0).abs() < 1e-5);
    }
}
