//! Cone-shaped particle layers that make up the tree.
//!
//! Each particle remembers its silhouette position and a fixed burst
//! direction. Every frame it eases toward one of the two: the silhouette
//! while gathered, `initial + direction * EXPANSION` while exploding.

use glam::{Mat4, Vec3};

use crate::instance::{FrameInstances, MeshKind, Transform};
use crate::spawn::SpawnRng;

pub const LAYER_POINTS: usize = 1500;

/// `(local y, scale)` of each stacked cone, bottom to top.
pub const LAYERS: [(f32, f32); 6] = [
    (-1.0, 2.8),
    (0.2, 2.4),
    (1.4, 2.0),
    (2.5, 1.5),
    (3.4, 1.0),
    (4.0, 0.6),
];

/// Cone height as a multiple of its base radius.
pub const CONE_ASPECT: f32 = 1.5;
pub const EXPANSION: f32 = 8.0;
pub const EXPLODE_RATE: f32 = 0.15;
pub const GATHER_RATE: f32 = 0.25;

const OPACITY: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeLayerParticle {
    pub initial: Vec3,
    pub direction: Vec3,
    pub position: Vec3,
}

impl TreeLayerParticle {
    /// Where the particle is heading this frame.
    #[inline]
    pub fn target(&self, exploding: bool) -> Vec3 {
        if exploding {
            self.initial + self.direction * EXPANSION
        } else {
            self.initial
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeLayer {
    /// Offset of the cone center inside the tree group.
    pub offset: Vec3,
    pub scale: f32,
    particles: Vec<TreeLayerParticle>,
}

impl TreeLayer {
    pub fn new(offset: Vec3, scale: f32, count: usize, rng: &mut SpawnRng) -> Self {
        let height = scale * CONE_ASPECT;
        let particles = (0..count)
            .map(|i| {
                let stratum = (i as f32 + rng.random()) / count as f32;
                let p = rng.in_cone(scale, height, stratum);
                let dist = p.length() + 0.1;
                let direction = Vec3::new(
                    p.x / dist * (1.0 + rng.random()),
                    p.y / dist * (1.0 + rng.random()) + (rng.random() - 0.5),
                    p.z / dist * (1.0 + rng.random()),
                );
                TreeLayerParticle {
                    initial: p,
                    direction,
                    position: p,
                }
            })
            .collect();
        Self {
            offset,
            scale,
            particles,
        }
    }

    pub fn particles(&self) -> &[TreeLayerParticle] {
        &self.particles
    }

    pub fn step(&mut self, exploding: bool) {
        let rate = if exploding { EXPLODE_RATE } else { GATHER_RATE };
        for p in &mut self.particles {
            let target = p.target(exploding);
            p.position += (target - p.position) * rate;
        }
    }
}

/// All tree layers.
#[derive(Debug, Clone)]
pub struct Tree {
    layers: Vec<TreeLayer>,
}

impl Tree {
    pub fn new(points_per_layer: usize, rng: &mut SpawnRng) -> Self {
        let layers = LAYERS
            .iter()
            .map(|&(y, scale)| TreeLayer::new(Vec3::new(0.0, y, 0.0), scale, points_per_layer, rng))
            .collect();
        Self { layers }
    }

    pub fn layers(&self) -> &[TreeLayer] {
        &self.layers
    }

    pub fn step(&mut self, exploding: bool) {
        for layer in &mut self.layers {
            layer.step(exploding);
        }
    }

    /// Largest distance of any particle from its current target.
    pub fn max_error(&self, exploding: bool) -> f32 {
        self.layers
            .iter()
            .flat_map(|l| l.particles())
            .map(|p| p.position.distance(p.target(exploding)))
            .fold(0.0, f32::max)
    }

    /// Points drawn as tiny octahedra whose size twinkles with time.
    pub fn write_instances(&self, out: &mut FrameInstances, group: Mat4, elapsed: f32, color: Vec3) {
        let size = 0.06 + (elapsed * 2.0).sin() * 0.02;
        let color = color.extend(OPACITY);
        for layer in &self.layers {
            let parent = group * Mat4::from_translation(layer.offset);
            for p in layer.particles() {
                out.push_in(parent, MeshKind::Octahedron, &Transform::at(p.position, size * 0.5), color);
            }
        }
    }

    pub fn point_count(&self) -> usize {
        self.layers.iter().map(|l| l.particles().len()).sum()
    }
}
