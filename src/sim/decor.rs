//! Static decorations: garland, ornaments, the top star, loose sparkles and
//! the distant starfield. Generated once; only their glow animates.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3, Vec4};

use crate::config::Rgb;
use crate::instance::{FrameInstances, MeshKind, Transform};
use crate::spawn::SpawnRng;

pub const GARLAND_BEADS: usize = 150;
const GARLAND_TURNS: f32 = 5.0;
const GARLAND_HEIGHT: f32 = 6.0;
const GARLAND_BASE_RADIUS: f32 = 2.8;
const GARLAND_BEAD_RADIUS: f32 = 0.04;

pub const ORNAMENT_COUNT: usize = 65;
/// Share of ornaments drawn as lights rather than gift boxes.
const LIGHT_SHARE: f32 = 0.4;
const GIFT_SCALE: f32 = 0.22;
const LIGHT_SCALE: f32 = 0.12;
/// Light bulbs are spheres of radius 1.5 before scaling.
const LIGHT_RADIUS: f32 = 1.5;

pub const GIFT_PALETTE: [Rgb; 5] = [
    Rgb::new(0xff, 0xcc, 0xe0),
    Rgb::new(0xff, 0xe5, 0xb4),
    Rgb::new(0xff, 0xff, 0xff),
    Rgb::new(0xff, 0xd7, 0x00),
    Rgb::new(0xe6, 0xe6, 0xfa),
];

pub const STAR_POSITION: Vec3 = Vec3::new(0.0, 4.8, 0.0);
const STAR_RADIUS: f32 = 0.6;
const STAR_SPARKLES: usize = 30;

pub const SPARKLE_COUNT: usize = 100;
const SPARKLE_BOX: f32 = 10.0;

pub const STARFIELD_COUNT: usize = 3000;
const STARFIELD_RADIUS: f32 = 100.0;
const STARFIELD_DEPTH: f32 = 50.0;

const GARLAND_COLOR: Rgb = Rgb::new(0xff, 0xf5, 0xe6);
const GARLAND_EMISSIVE: Rgb = Rgb::new(0xff, 0xd7, 0x00);
const STAR_COLOR: Rgb = Rgb::new(0xff, 0xf0, 0xf5);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrnamentKind {
    Gift { color: Rgb },
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ornament {
    pub position: Vec3,
    pub rotation: Vec3,
    pub kind: OrnamentKind,
}

impl Ornament {
    pub fn scale(&self) -> f32 {
        match self.kind {
            OrnamentKind::Gift { .. } => GIFT_SCALE,
            OrnamentKind::Light => LIGHT_SCALE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Twinkle {
    position: Vec3,
    phase: f32,
}

#[derive(Debug, Clone)]
pub struct Decorations {
    garland: Vec<Vec3>,
    ornaments: Vec<Ornament>,
    star_sparkles: Vec<Twinkle>,
    sparkles: Vec<Twinkle>,
    starfield: Vec<Twinkle>,
}

/// Point `t` in `[0, 1]` along the spiral garland, bottom to top.
pub fn garland_point(t: f32) -> Vec3 {
    let angle = t * TAU * GARLAND_TURNS;
    let radius = GARLAND_BASE_RADIUS * (1.0 - t) + 0.1;
    Vec3::new(angle.cos() * radius, -1.2 + t * GARLAND_HEIGHT, angle.sin() * radius)
}

impl Decorations {
    pub fn new(rng: &mut SpawnRng) -> Self {
        let garland = (0..=GARLAND_BEADS)
            .map(|i| garland_point(i as f32 / GARLAND_BEADS as f32))
            .collect();

        let ornaments = (0..ORNAMENT_COUNT)
            .map(|i| {
                let t = i as f32 / ORNAMENT_COUNT as f32;
                let h = -1.0 + t * 5.5;
                let r = 2.6 * (1.0 - t) + 0.3;
                let angle = t * PI * 12.0 + rng.random() * 0.8;
                let jitter_x = rng.symmetric(0.3);
                let jitter_z = rng.symmetric(0.3);
                let position = Vec3::new(angle.cos() * r + jitter_x, h, angle.sin() * r + jitter_z);
                let rotation = Vec3::new(rng.random(), rng.random(), rng.random());
                let color = *rng.choose(&GIFT_PALETTE);
                let kind = if rng.random() > LIGHT_SHARE {
                    OrnamentKind::Gift { color }
                } else {
                    OrnamentKind::Light
                };
                Ornament {
                    position,
                    rotation,
                    kind,
                }
            })
            .collect();

        let star_sparkles = (0..STAR_SPARKLES)
            .map(|_| Twinkle {
                position: STAR_POSITION + rng.in_box(Vec3::ONE),
                phase: rng.angle(),
            })
            .collect();

        let sparkles = (0..SPARKLE_COUNT)
            .map(|_| Twinkle {
                position: rng.in_box(Vec3::splat(SPARKLE_BOX / 2.0)),
                phase: rng.angle(),
            })
            .collect();

        let starfield = (0..STARFIELD_COUNT)
            .map(|_| {
                let dir = loop {
                    let v = rng.in_box(Vec3::ONE);
                    let len = v.length();
                    if len > 1e-3 && len <= 1.0 {
                        break v / len;
                    }
                };
                Twinkle {
                    position: dir * (STARFIELD_RADIUS + rng.random() * STARFIELD_DEPTH),
                    phase: rng.angle(),
                }
            })
            .collect();

        Self {
            garland,
            ornaments,
            star_sparkles,
            sparkles,
            starfield,
        }
    }

    pub fn garland(&self) -> &[Vec3] {
        &self.garland
    }

    pub fn ornaments(&self) -> &[Ornament] {
        &self.ornaments
    }

    /// Garland, ornaments and the star. `group` carries the tree rotation.
    pub fn write_tree_instances(&self, out: &mut FrameInstances, group: Mat4, elapsed: f32, light: Vec3) {
        let garland = (GARLAND_COLOR.to_linear() + GARLAND_EMISSIVE.to_linear() * 0.5).extend(1.0);
        for &p in &self.garland {
            out.push_in(group, MeshKind::Icosahedron, &Transform::at(p, GARLAND_BEAD_RADIUS), garland);
        }

        for o in &self.ornaments {
            let t = Transform::at(o.position, o.scale()).with_rotation(o.rotation);
            match o.kind {
                OrnamentKind::Gift { color } => {
                    // Unit cube mesh spans [-1, 1].
                    let t = Transform { scale: t.scale * 0.5, ..t };
                    out.push_in(group, MeshKind::Cube, &t, color.to_linear().extend(0.85));
                }
                OrnamentKind::Light => {
                    let t = Transform { scale: t.scale * LIGHT_RADIUS, ..t };
                    out.push_in(group, MeshKind::Icosahedron, &t, (light * 2.0).extend(1.0));
                }
            }
        }

        let bob = Vec3::new(0.0, (elapsed * 3.0).sin() * 0.1, 0.0);
        let star = Transform::at(STAR_POSITION + bob, STAR_RADIUS)
            .with_rotation(Vec3::new(0.0, elapsed * 0.5, (elapsed * 1.5).sin() * 0.2));
        out.push_in(group, MeshKind::Octahedron, &star, STAR_COLOR.to_linear().extend(0.9));

        let halo = Transform { scale: STAR_RADIUS * 1.2, ..star };
        out.push_in(group, MeshKind::Octahedron, &halo, STAR_COLOR.to_linear().extend(0.2));

        for s in &self.star_sparkles {
            let glow = twinkle(s.phase, elapsed, 0.5);
            let t = Transform::at(s.position + bob, 0.04 * glow);
            out.push_in(group, MeshKind::Octahedron, &t, STAR_COLOR.to_linear().extend(glow));
        }
    }

    /// Loose sparkles around the tree; they do not rotate with it.
    pub fn write_sparkles(&self, out: &mut FrameInstances, parent: Mat4, elapsed: f32, light: Vec3) {
        for s in &self.sparkles {
            let glow = twinkle(s.phase, elapsed, 0.2);
            let drift = Vec3::new(0.0, (elapsed * 0.2 + s.phase).sin() * 0.3, 0.0);
            let t = Transform::at(s.position + drift, 0.03);
            out.push_in(parent, MeshKind::Octahedron, &t, light.extend(0.3 * glow));
        }
    }

    /// Background stars in world space.
    pub fn write_starfield(&self, out: &mut FrameInstances, elapsed: f32) {
        for s in &self.starfield {
            let glow = twinkle(s.phase, elapsed, 0.5);
            let t = Transform::at(s.position, 0.25);
            out.push(MeshKind::Octahedron, &t, Vec4::new(1.0, 0.95, 0.97, 0.4 + 0.6 * glow));
        }
    }
}

/// Brightness in `[0, 1]` oscillating at `speed` Hz-ish.
fn twinkle(phase: f32, elapsed: f32, speed: f32) -> f32 {
    0.5 + 0.5 * (elapsed * speed * TAU + phase).sin()
}
