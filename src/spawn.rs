//! Random sampling helpers for particle layouts.
//!
//! Every particle system draws from one [`SpawnRng`], so a fixed seed
//! reproduces the whole scene.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Seedable RNG with the sampling shapes the scene uses.
#[derive(Debug, Clone)]
pub struct SpawnRng {
    rng: SmallRng,
}

impl SpawnRng {
    /// Deterministic generator.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is given, otherwise from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self {
                rng: SmallRng::from_entropy(),
            },
        }
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Uniform in `[min, max)`. Requires `min < max`.
    #[inline]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// Uniform in `[-amount, amount)`.
    #[inline]
    pub fn symmetric(&mut self, amount: f32) -> f32 {
        (self.random() - 0.5) * 2.0 * amount
    }

    /// Independent [`symmetric`](Self::symmetric) draw per axis.
    pub fn jitter(&mut self, amount: f32) -> Vec3 {
        Vec3::new(
            self.symmetric(amount),
            self.symmetric(amount),
            self.symmetric(amount),
        )
    }

    /// Uniform inside the axis-aligned box `[-half, half)`.
    pub fn in_box(&mut self, half: Vec3) -> Vec3 {
        Vec3::new(
            self.symmetric(half.x),
            self.symmetric(half.y),
            self.symmetric(half.z),
        )
    }

    /// Angle in `[0, 2π)`.
    #[inline]
    pub fn angle(&mut self) -> f32 {
        self.random() * TAU
    }

    /// Point inside a solid cone standing on the y axis, centered vertically.
    ///
    /// `stratum` in `[0, 1)` selects the height band: passing
    /// `(i + random) / count` spreads `count` points evenly from base to tip.
    /// The radius is area-uniform at each height.
    pub fn in_cone(&mut self, base_radius: f32, height: f32, stratum: f32) -> Vec3 {
        let h = stratum * height;
        let max_r = base_radius * (1.0 - h / height);
        let r = max_r * self.random().sqrt();
        let theta = self.angle();
        Vec3::new(r * theta.cos(), h - height / 2.0, r * theta.sin())
    }

    /// Pick one element of a non-empty slice.
    ///
    /// # Panics
    ///
    /// Panics if `items` is empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.gen_range(0..items.len())]
    }
}
