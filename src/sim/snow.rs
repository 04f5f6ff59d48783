//! Falling snow.
//!
//! Flakes follow a closed parametric path driven by their phase `t`; the
//! pointer adds a slow drift. A flake that drops below the floor resets its
//! phase and is drawn at the top for that frame.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::instance::{FrameInstances, MeshKind, Transform};
use crate::spawn::SpawnRng;

pub const SNOW_COUNT: usize = 250;
pub const FLOOR: f32 = -10.0;
pub const CEILING: f32 = 10.0;

const DRIFT_EASE: f32 = 0.02;
const MESH_RADIUS: f32 = 0.05;
const OPACITY: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnowFlake {
    pub t: f32,
    pub factor: f32,
    pub speed: f32,
    pub offset: Vec3,
    /// Pointer-following drift.
    pub mx: f32,
    pub my: f32,
    /// Position computed by the last step.
    pub position: Vec3,
    /// Size pulse in `[-1, 1]` from the last step.
    pub pulse: f32,
}

#[derive(Debug, Clone)]
pub struct Snow {
    flakes: Vec<SnowFlake>,
}

impl Snow {
    pub fn new(count: usize, rng: &mut SpawnRng) -> Self {
        let flakes = (0..count)
            .map(|_| {
                let t = rng.random() * 100.0;
                let factor = 20.0 + rng.random() * 100.0;
                let speed = 0.01 + rng.random() / 200.0;
                let offset = Vec3::new(
                    rng.range(-5.0, 5.0),
                    rng.range(-5.0, 5.0),
                    rng.range(-5.0, 5.0),
                );
                SnowFlake {
                    t,
                    factor,
                    speed,
                    offset,
                    mx: 0.0,
                    my: 0.0,
                    position: offset,
                    pulse: 0.0,
                }
            })
            .collect();
        Self { flakes }
    }

    pub fn flakes(&self) -> &[SnowFlake] {
        &self.flakes
    }

    /// Advance one frame. `pointer` is in NDC.
    pub fn step(&mut self, pointer: Vec2, rng: &mut SpawnRng) {
        for f in &mut self.flakes {
            f.t += f.speed / 2.0;
            let t = f.t;
            let a = t.cos() + t.sin() / 10.0;
            let b = t.sin() + (t * 2.0).cos() / 10.0;
            f.pulse = t.cos();

            f.mx += (pointer.x * 10.0 - f.mx) * DRIFT_EASE;
            f.my += (pointer.y * 10.0 - 1.0 - f.my) * DRIFT_EASE;

            let wave = t / 10.0 * f.factor;
            let mut position = Vec3::new(
                f.mx / 10.0 * a + f.offset.x + wave.cos() + t.sin() * f.factor / 10.0,
                f.my / 10.0 * b + f.offset.y + wave.sin() + (t * 2.0).cos() * f.factor / 10.0,
                f.my / 10.0 * b + f.offset.z + wave.cos() + (t * 3.0).sin() * f.factor / 10.0,
            );

            if position.y < FLOOR {
                f.t = rng.random() * 100.0;
                position.y = CEILING;
            }
            f.position = position;
        }
    }

    pub fn write_instances(&self, out: &mut FrameInstances, parent: Mat4) {
        let color = Vec4::new(1.0, 1.0, 1.0, OPACITY);
        for f in &self.flakes {
            let s = f.pulse;
            let transform = Transform::at(f.position, (s * 0.5 + 0.5) * MESH_RADIUS)
                .with_rotation(Vec3::splat(s * 5.0));
            out.push_in(parent, MeshKind::Icosahedron, &transform, color);
        }
    }
}
