//! Sparkle trail left behind by the moving target.
//!
//! A fixed ring of slots: each spawn takes the slot under the cursor and
//! advances it, so the oldest sparkle is always the one overwritten.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::instance::{FrameInstances, MeshKind, Transform};
use crate::spawn::SpawnRng;

pub const TRAIL_CAPACITY: usize = 50;

/// Target movement (in the xy plane) needed before another sparkle spawns.
pub const SPAWN_DISTANCE: f32 = 0.1;

const SPAWN_SPEED: f32 = 0.05;
const DECAY: f32 = 0.02;
const GRAVITY: f32 = 0.02;

const MESH_RADIUS: f32 = 0.3;
const OPACITY: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrailParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// 1.0 at spawn, fading to 0.0.
    pub life: f32,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct Trail {
    slots: Vec<TrailParticle>,
    cursor: usize,
    spawned: u64,
    last_spawn: Vec2,
}

/// Slot used by the `n`th spawn.
#[inline]
pub fn slot_of(n: u64) -> usize {
    (n % TRAIL_CAPACITY as u64) as usize
}

impl Trail {
    pub fn new() -> Self {
        Self {
            slots: vec![TrailParticle::default(); TRAIL_CAPACITY],
            cursor: 0,
            spawned: 0,
            last_spawn: Vec2::ZERO,
        }
    }

    pub fn slots(&self) -> &[TrailParticle] {
        &self.slots
    }

    /// Next slot to be written.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Sparkles spawned since creation.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.active).count()
    }

    /// Spawn at `target` if it has moved far enough since the last spawn.
    /// Returns the slot written.
    pub fn maybe_spawn(&mut self, target: Vec3, rng: &mut SpawnRng) -> Option<usize> {
        if target.truncate().distance(self.last_spawn) <= SPAWN_DISTANCE {
            return None;
        }
        let slot = self.cursor;
        self.slots[slot] = TrailParticle {
            position: target,
            velocity: rng.jitter(SPAWN_SPEED),
            life: 1.0,
            active: true,
        };
        self.cursor = (self.cursor + 1) % TRAIL_CAPACITY;
        self.spawned += 1;
        self.last_spawn = target.truncate();
        Some(slot)
    }

    /// Age and move every active sparkle.
    pub fn step(&mut self) {
        for p in self.slots.iter_mut().filter(|p| p.active) {
            p.life -= DECAY;
            if p.life <= 0.0 {
                p.active = false;
            }
            p.position += p.velocity;
            p.position.y -= GRAVITY;
        }
    }

    /// One instance per slot; inactive slots collapse to zero scale so the
    /// instance count stays fixed.
    pub fn write_instances(&self, out: &mut FrameInstances, parent: Mat4) {
        let color = Vec4::new(1.0, 1.0, 1.0, OPACITY);
        for p in &self.slots {
            let transform = if p.active {
                let life = p.life.max(0.0);
                Transform::at(p.position, life * 0.8 * MESH_RADIUS)
                    .with_rotation(Vec3::new(life * 5.0, life * 5.0, 0.0))
            } else {
                Transform::at(p.position, 0.0)
            };
            out.push_in(parent, MeshKind::Octahedron, &transform, color);
        }
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Targets far enough apart that every call spawns.
    fn spawn_n(trail: &mut Trail, rng: &mut SpawnRng, n: usize) {
        for i in 0..n {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            trail.maybe_spawn(Vec3::new(x, 0.0, 2.0), rng);
        }
    }

    #[test]
    fn test_spawn_needs_movement() {
        let mut rng = SpawnRng::from_seed(0);
        let mut trail = Trail::new();

        assert_eq!(trail.maybe_spawn(Vec3::new(0.05, 0.0, 2.0), &mut rng), None);
        assert_eq!(trail.maybe_spawn(Vec3::new(0.5, 0.0, 2.0), &mut rng), Some(0));
        // Movement in z alone does not count.
        assert_eq!(trail.maybe_spawn(Vec3::new(0.5, 0.0, 9.0), &mut rng), None);
        assert_eq!(trail.active_count(), 1);

        let p = trail.slots()[0];
        assert_eq!(p.life, 1.0);
        assert!(p.velocity.abs().max_element() <= SPAWN_SPEED);
    }

    #[test]
    fn test_ring_wraps_at_capacity() {
        let mut rng = SpawnRng::from_seed(0);
        let mut trail = Trail::new();
        spawn_n(&mut trail, &mut rng, TRAIL_CAPACITY + 3);

        assert_eq!(trail.slots().len(), TRAIL_CAPACITY);
        assert_eq!(trail.cursor(), 3);
        assert_eq!(trail.spawned(), (TRAIL_CAPACITY + 3) as u64);
    }

    #[test]
    fn test_spawn_i_and_i_plus_capacity_share_slot() {
        for i in 0..10u64 {
            assert_eq!(slot_of(i), slot_of(i + TRAIL_CAPACITY as u64));
        }

        let mut rng = SpawnRng::from_seed(0);
        let mut trail = Trail::new();
        let mut slots = Vec::new();
        for i in 0..(TRAIL_CAPACITY * 2) {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            slots.push(trail.maybe_spawn(Vec3::new(x, 0.0, 2.0), &mut rng).unwrap());
        }
        for i in 0..TRAIL_CAPACITY {
            assert_eq!(slots[i], slots[i + TRAIL_CAPACITY]);
            assert_eq!(slots[i], slot_of(i as u64));
        }
    }

    #[test]
    fn test_oldest_is_overwritten() {
        let mut rng = SpawnRng::from_seed(0);
        let mut trail = Trail::new();
        spawn_n(&mut trail, &mut rng, TRAIL_CAPACITY);
        trail.step();
        assert!(trail.slots()[0].life < 1.0);

        trail.maybe_spawn(Vec3::new(3.0, 3.0, 2.0), &mut rng);
        assert_eq!(trail.slots()[0].life, 1.0);
        assert_eq!(trail.slots()[0].position, Vec3::new(3.0, 3.0, 2.0));
    }

    #[test]
    fn test_sparkles_fade_and_fall() {
        let mut rng = SpawnRng::from_seed(0);
        let mut trail = Trail::new();
        trail.maybe_spawn(Vec3::new(1.0, 0.0, 2.0), &mut rng);
        let start = trail.slots()[0];

        trail.step();
        let p = trail.slots()[0];
        assert!((p.life - 0.98).abs() < 1e-6);
        assert!((p.position.y - (start.position.y + start.velocity.y - GRAVITY)).abs() < 1e-6);

        for _ in 0..60 {
            trail.step();
        }
        assert!(!trail.slots()[0].active);
        assert_eq!(trail.active_count(), 0);
    }

    #[test]
    fn test_inactive_slots_have_zero_scale() {
        let trail = Trail::new();
        let mut out = FrameInstances::default();
        trail.write_instances(&mut out, Mat4::IDENTITY);
        assert_eq!(out.len(), TRAIL_CAPACITY);
        let m = Mat4::from_cols_array_2d(&out.instances()[0].model);
        assert_eq!(m.x_axis.truncate(), Vec3::ZERO);
    }
}
