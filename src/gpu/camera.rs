//! Orbit camera with auto-rotate and damped drag.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Vec2, Vec3};

use crate::target::Viewport;

pub const FOV_Y_DEGREES: f32 = 50.0;
pub const MIN_DISTANCE: f32 = 4.0;
pub const MAX_DISTANCE: f32 = 18.0;
/// Lowest elevation: just above the horizon.
pub const MIN_PITCH: f32 = 0.05;
const MAX_PITCH: f32 = FRAC_PI_2 - 0.001;

/// Speed in orbit-control units; 2.0 is one turn per 30 seconds.
pub const AUTO_ROTATE_SPEED: f32 = 0.5;
/// Share of the pending drag applied each frame.
pub const DAMPING: f32 = 0.05;
const ROTATE_SPEED: f32 = 0.5;
const ZOOM_STEP: f32 = 0.95;

const NEAR: f32 = 0.1;
const FAR: f32 = 500.0;

/// Orbit camera for viewing the tree.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Elevation above the horizon in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    pub fov_y: f32,
    pub auto_rotate: bool,
    /// Drag not yet applied.
    pending: Vec2,
}

impl Camera {
    /// Start at `(0, 1, 9)` looking at the origin.
    pub fn new() -> Self {
        Self::looking_from(Vec3::new(0.0, 1.0, 9.0), Vec3::ZERO)
    }

    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        let pitch = (offset.y / offset.length().max(f32::EPSILON))
            .asin()
            .clamp(MIN_PITCH, MAX_PITCH);
        Self {
            yaw: offset.x.atan2(offset.z),
            pitch,
            distance,
            target,
            fov_y: FOV_Y_DEGREES.to_radians(),
            auto_rotate: true,
            pending: Vec2::ZERO,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, NEAR, FAR)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view_matrix()
    }

    /// Frustum half extents at the orbit target.
    pub fn viewport(&self, aspect: f32) -> Viewport {
        Viewport::from_perspective(self.fov_y, aspect, self.distance)
    }

    /// Queue a drag of `delta` pixels in a window `height` pixels tall.
    pub fn drag(&mut self, delta: Vec2, height: f32) {
        if height <= 0.0 {
            return;
        }
        self.pending += delta * (TAU / height) * ROTATE_SPEED;
    }

    /// Wheel zoom; positive `lines` moves closer.
    pub fn zoom(&mut self, lines: f32) {
        self.distance = (self.distance * ZOOM_STEP.powf(lines)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Apply auto-rotate and a damped share of the pending drag.
    pub fn update(&mut self, delta: f32) {
        if self.auto_rotate {
            self.yaw += TAU / 60.0 * AUTO_ROTATE_SPEED * delta;
        }
        let step = self.pending * DAMPING;
        self.pending -= step;
        self.yaw -= step.x;
        self.pitch = (self.pitch + step.y).clamp(MIN_PITCH, MAX_PITCH);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_position() {
        let camera = Camera::new();
        assert!((camera.position() - Vec3::new(0.0, 1.0, 9.0)).length() < 1e-4);
    }

    #[test]
    fn test_viewport_at_orbit_distance() {
        let camera = Camera::new();
        let vp = camera.viewport(16.0 / 9.0);
        let expected = (FOV_Y_DEGREES.to_radians() / 2.0).tan() * 82f32.sqrt();
        assert!((vp.half_height - expected).abs() < 1e-4);
        assert!((vp.half_width - expected * 16.0 / 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::new();
        camera.zoom(1000.0);
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.zoom(-1000.0);
        assert_eq!(camera.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_pitch_stays_above_horizon() {
        let mut camera = Camera::new();
        camera.auto_rotate = false;
        camera.drag(Vec2::new(0.0, -100_000.0), 720.0);
        for _ in 0..500 {
            camera.update(1.0 / 60.0);
        }
        assert!(camera.pitch >= MIN_PITCH);
        assert!(camera.position().y > camera.target.y);
    }

    #[test]
    fn test_drag_is_damped() {
        let mut camera = Camera::new();
        camera.auto_rotate = false;
        let start = camera.yaw;
        camera.drag(Vec2::new(72.0, 0.0), 720.0);
        camera.update(0.0);
        let first = start - camera.yaw;
        let total = TAU / 720.0 * 72.0 * ROTATE_SPEED;
        assert!((first - total * DAMPING).abs() < 1e-5);

        for _ in 0..1000 {
            camera.update(0.0);
        }
        assert!((start - camera.yaw - total).abs() < 1e-3);
    }

    #[test]
    fn test_auto_rotate() {
        let mut camera = Camera::new();
        let start = camera.yaw;
        camera.update(60.0);
        assert!((camera.yaw - start - TAU * AUTO_ROTATE_SPEED).abs() < 1e-4);
    }
}
