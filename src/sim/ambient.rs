//! Ambient dust: free-floating motes drawn toward the target, or blown away
//! from the center while the hand is open.

use glam::{Mat4, Vec3};

use crate::instance::{FrameInstances, MeshKind, Transform};
use crate::spawn::SpawnRng;

pub const AMBIENT_COUNT: usize = 250;

/// Half extents of the initial spawn box.
pub const SPAWN_HALF_EXTENTS: Vec3 = Vec3::new(7.5, 7.5, 5.0);
/// Per-axis distance beyond which the soft restoring force applies.
pub const SOFT_BOUNDS: Vec3 = Vec3::new(15.0, 15.0, 10.0);

const EXPLODE_PUSH: f32 = 0.05;
const ATTRACT_STRENGTH: f32 = 0.03;
/// Attraction falls to zero at this distance from the target.
const ATTRACT_RADIUS: f32 = 6.0;
const JITTER: f32 = 0.01;
const FRICTION: f32 = 0.95;
const RESTORE: f32 = 0.01;

const MESH_RADIUS: f32 = 0.2;
const OPACITY: f32 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Base size in `[0.5, 1.0)`.
    pub size: f32,
    /// Where the mote was scattered at startup. Kept for reference only.
    pub origin: Vec3,
}

#[derive(Debug, Clone)]
pub struct AmbientField {
    particles: Vec<AmbientParticle>,
}

impl AmbientField {
    pub fn new(count: usize, rng: &mut SpawnRng) -> Self {
        let particles = (0..count)
            .map(|_| AmbientParticle {
                position: rng.in_box(SPAWN_HALF_EXTENTS),
                velocity: Vec3::ZERO,
                size: rng.random() * 0.5 + 0.5,
                origin: rng.in_box(SPAWN_HALF_EXTENTS),
            })
            .collect();
        Self { particles }
    }

    pub fn particles(&self) -> &[AmbientParticle] {
        &self.particles
    }

    /// Advance one frame.
    pub fn step(&mut self, exploding: bool, target: Vec3, rng: &mut SpawnRng) {
        for p in &mut self.particles {
            if exploding {
                let dist = p.position.length() + 0.1;
                p.velocity += p.position / dist * EXPLODE_PUSH;
            } else {
                let d = target - p.position;
                let force = ((ATTRACT_RADIUS - d.length()) / ATTRACT_RADIUS).max(0.0);
                p.velocity += d * ATTRACT_STRENGTH * force;
            }

            p.velocity += rng.jitter(JITTER);
            p.velocity *= FRICTION;
            p.position += p.velocity;

            // Velocity only; positions are never clamped.
            for axis in 0..3 {
                if p.position[axis].abs() > SOFT_BOUNDS[axis] {
                    p.velocity[axis] -= p.position[axis] * RESTORE;
                }
            }
        }
    }

    /// Emit one dodecahedral mote per particle. Sizes flicker while calm and
    /// swell while exploding.
    pub fn write_instances(
        &self,
        out: &mut FrameInstances,
        parent: Mat4,
        exploding: bool,
        elapsed: f32,
        color: Vec3,
        rng: &mut SpawnRng,
    ) {
        let color = color.extend(OPACITY);
        for (i, p) in self.particles.iter().enumerate() {
            let pulse = if exploding { 2.0 } else { 0.5 + rng.random() };
            let spin = elapsed + i as f32;
            let transform = Transform::at(p.position, p.size * pulse * MESH_RADIUS)
                .with_rotation(Vec3::new(spin, spin, 0.0));
            out.push_in(parent, MeshKind::Icosahedron, &transform, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> (AmbientField, SpawnRng) {
        let mut rng = SpawnRng::from_seed(42);
        (AmbientField::new(AMBIENT_COUNT, &mut rng), rng)
    }

    #[test]
    fn test_spawn_box() {
        let (field, _) = field();
        assert_eq!(field.particles().len(), AMBIENT_COUNT);
        for p in field.particles() {
            assert!(p.position.abs().cmple(SPAWN_HALF_EXTENTS).all());
            assert!((0.5..1.0).contains(&p.size));
            assert_eq!(p.velocity, Vec3::ZERO);
        }
    }

    #[test]
    fn test_attraction_pulls_nearby_particles() {
        let mut rng = SpawnRng::from_seed(1);
        let mut field = AmbientField {
            particles: vec![AmbientParticle {
                position: Vec3::new(3.0, 0.0, 2.0),
                velocity: Vec3::ZERO,
                size: 1.0,
                origin: Vec3::ZERO,
            }],
        };
        let target = Vec3::new(0.0, 0.0, 2.0);
        field.step(false, target, &mut rng);
        assert!(field.particles()[0].velocity.x < 0.0);
    }

    #[test]
    fn test_far_particles_only_drift() {
        let mut rng = SpawnRng::from_seed(1);
        let mut field = AmbientField {
            particles: vec![AmbientParticle {
                position: Vec3::new(10.0, 0.0, 2.0),
                velocity: Vec3::ZERO,
                size: 1.0,
                origin: Vec3::ZERO,
            }],
        };
        field.step(false, Vec3::new(0.0, 0.0, 2.0), &mut rng);
        // Only jitter, scaled by friction.
        assert!(field.particles()[0].velocity.abs().max_element() <= JITTER * FRICTION);
    }

    #[test]
    fn test_explosion_pushes_outward() {
        let mut rng = SpawnRng::from_seed(1);
        let mut field = AmbientField {
            particles: vec![AmbientParticle {
                position: Vec3::new(2.0, 0.0, 0.0),
                velocity: Vec3::ZERO,
                size: 1.0,
                origin: Vec3::ZERO,
            }],
        };
        field.step(true, Vec3::ZERO, &mut rng);
        assert!(field.particles()[0].velocity.x > 0.0);
        assert!(field.particles()[0].position.x > 2.0);
    }

    /// Overshoot allowed past the soft bound, which is a spring and not a wall.
    const BOUND_SLACK: f32 = 3.0;

    fn assert_bounded(field: &mut AmbientField, explode: bool, target: Vec3, rng: &mut SpawnRng) {
        let limit = SOFT_BOUNDS + Vec3::splat(BOUND_SLACK);
        for frame in 0..20_000 {
            field.step(explode, target, rng);
            for p in field.particles() {
                assert!(p.position.is_finite());
                assert!(
                    p.position.abs().cmple(limit).all(),
                    "escaped at frame {}: {:?}",
                    frame,
                    p.position
                );
            }
        }
    }

    #[test]
    fn test_bounded_while_exploding() {
        let (mut field, mut rng) = field();
        assert_bounded(&mut field, true, Vec3::ZERO, &mut rng);
    }

    #[test]
    fn test_bounded_while_attracted() {
        let (mut field, mut rng) = field();
        assert_bounded(&mut field, false, Vec3::new(4.0, -2.0, 2.0), &mut rng);
    }

    #[test]
    fn test_write_instances() {
        let (field, mut rng) = field();
        let mut out = FrameInstances::default();
        field.write_instances(&mut out, Mat4::IDENTITY, true, 0.0, Vec3::ONE, &mut rng);
        assert_eq!(out.len(), AMBIENT_COUNT);
        assert_eq!(out.instances()[0].color[3], OPACITY);
    }
}
