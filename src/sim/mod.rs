//! Particle simulation core.
//!
//! [`SceneSimulation`] owns every particle system and advances them once per
//! frame from a [`StepInputs`] snapshot. The simulation only reads gesture and
//! target; it never changes them.
//!
//! Integration constants are per frame, as the motion was tuned at display
//! rate. Only the tree spin uses the frame delta.
//!
//! # Frame order
//!
//! 1. trail spawn at the current target
//! 2. ambient dust
//! 3. trail aging
//! 4. tree layers
//! 5. snow (while enabled)
//! 6. tree group rotation

pub mod ambient;
pub mod decor;
pub mod snow;
pub mod trail;
pub mod tree;

use glam::{Mat4, Vec2, Vec3};

use crate::config::{Rgb, TreeConfig};
use crate::gesture::Gesture;
use crate::instance::FrameInstances;
use crate::spawn::SpawnRng;
use crate::target::TargetPoint;
use crate::time::FrameTime;

pub use ambient::{AmbientField, AmbientParticle, AMBIENT_COUNT};
pub use decor::Decorations;
pub use snow::{Snow, SnowFlake, SNOW_COUNT};
pub use trail::{Trail, TrailParticle, TRAIL_CAPACITY};
pub use tree::{Tree, TreeLayer, TreeLayerParticle, LAYER_POINTS};

/// Offset of the whole composition, so the tree sits slightly below
/// eye level.
pub const SCENE_OFFSET: Vec3 = Vec3::new(0.0, -1.0, 0.0);

/// Everything one step reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInputs {
    pub gesture: Gesture,
    pub target: TargetPoint,
    /// Pointer NDC, steering the snow drift.
    pub pointer_ndc: Vec2,
    pub time: FrameTime,
}

impl StepInputs {
    /// Open hand bursts the tree. `Gesture::Open` is only produced while a
    /// hand is tracked.
    #[inline]
    pub fn exploding(&self) -> bool {
        self.gesture.is_open()
    }
}

/// Particle counts, overridable for tests and benches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneCounts {
    pub ambient: usize,
    pub layer_points: usize,
    pub snow: usize,
}

impl Default for SceneCounts {
    fn default() -> Self {
        Self {
            ambient: AMBIENT_COUNT,
            layer_points: LAYER_POINTS,
            snow: SNOW_COUNT,
        }
    }
}

/// Colors used when packing instances. Changing them never touches the
/// simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub tree: Vec3,
    pub light: Vec3,
}

impl Palette {
    pub fn new(tree: Rgb, light: Rgb) -> Self {
        Self {
            tree: tree.to_linear(),
            light: light.to_linear(),
        }
    }

    pub fn from_config(config: &TreeConfig) -> Self {
        Self::new(config.tree_color, config.light_color)
    }
}

pub struct SceneSimulation {
    ambient: AmbientField,
    trail: Trail,
    tree: Tree,
    snow: Snow,
    decor: Decorations,
    rng: SpawnRng,
    tree_rotation: f32,
    rotation_speed: f32,
    show_snow: bool,
    last: Option<StepInputs>,
}

impl SceneSimulation {
    pub fn new(config: &TreeConfig, seed: Option<u64>) -> Self {
        Self::with_counts(config, seed, SceneCounts::default())
    }

    pub fn with_counts(config: &TreeConfig, seed: Option<u64>, counts: SceneCounts) -> Self {
        let mut rng = SpawnRng::new(seed);
        let ambient = AmbientField::new(counts.ambient, &mut rng);
        let tree = Tree::new(counts.layer_points, &mut rng);
        let snow = Snow::new(counts.snow, &mut rng);
        let decor = Decorations::new(&mut rng);
        tracing::debug!(
            ambient = counts.ambient,
            tree = tree.point_count(),
            snow = counts.snow,
            "Scene particles generated"
        );
        Self {
            ambient,
            trail: Trail::new(),
            tree,
            snow,
            decor,
            rng,
            tree_rotation: 0.0,
            rotation_speed: config.rotation_speed,
            show_snow: config.show_snow,
            last: None,
        }
    }

    /// Advance every system by one frame.
    pub fn step(&mut self, inputs: StepInputs) {
        let exploding = inputs.exploding();
        let target = inputs.target.position;

        self.trail.maybe_spawn(target, &mut self.rng);
        self.ambient.step(exploding, target, &mut self.rng);
        self.trail.step();
        self.tree.step(exploding);
        if self.show_snow {
            self.snow.step(inputs.pointer_ndc, &mut self.rng);
        }
        self.tree_rotation += inputs.time.delta * self.rotation_speed;
        self.last = Some(inputs);
    }

    /// Pack the current state into GPU instances.
    pub fn write_instances(&mut self, out: &mut FrameInstances, palette: &Palette) {
        out.clear();
        let (elapsed, exploding) = self
            .last
            .map(|i| (i.time.elapsed, i.exploding()))
            .unwrap_or((0.0, false));

        let scene = Mat4::from_translation(SCENE_OFFSET);
        let group = scene * Mat4::from_rotation_y(self.tree_rotation);

        self.decor.write_starfield(out, elapsed);
        self.tree.write_instances(out, group, elapsed, palette.tree);
        self.decor.write_tree_instances(out, group, elapsed, palette.light);
        self.decor.write_sparkles(out, scene, elapsed, palette.light);
        self.ambient
            .write_instances(out, scene, exploding, elapsed, palette.light, &mut self.rng);
        self.trail.write_instances(out, scene);
        if self.show_snow {
            self.snow.write_instances(out, scene);
        }
    }

    pub fn set_rotation_speed(&mut self, speed: f32) {
        self.rotation_speed = speed;
    }

    pub fn set_show_snow(&mut self, show: bool) {
        self.show_snow = show;
    }

    pub fn tree_rotation(&self) -> f32 {
        self.tree_rotation
    }

    pub fn ambient(&self) -> &AmbientField {
        &self.ambient
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn snow(&self) -> &Snow {
        &self.snow
    }

    /// Inputs of the most recent step.
    pub fn last_inputs(&self) -> Option<&StepInputs> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{TargetSource, TARGET_DEPTH};

    fn small_counts() -> SceneCounts {
        SceneCounts {
            ambient: 40,
            layer_points: 50,
            snow: 20,
        }
    }

    fn inputs(gesture: Gesture, frame: u64) -> StepInputs {
        StepInputs {
            gesture,
            target: TargetPoint {
                position: Vec3::new(1.0, 0.5, TARGET_DEPTH),
                source: TargetSource::Hand,
            },
            pointer_ndc: Vec2::ZERO,
            time: FrameTime::fixed(frame),
        }
    }

    #[test]
    fn test_tree_rotation_uses_delta() {
        let config = TreeConfig::default();
        let mut sim = SceneSimulation::with_counts(&config, Some(1), small_counts());
        for f in 1..=60 {
            sim.step(inputs(Gesture::None, f));
        }
        // One second at 0.2 rad/s.
        assert!((sim.tree_rotation() - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_open_explodes_closed_gathers() {
        let config = TreeConfig::default();
        let mut sim = SceneSimulation::with_counts(&config, Some(2), small_counts());
        for f in 1..=80 {
            sim.step(inputs(Gesture::Open, f));
        }
        assert!(sim.tree().max_error(true) < 0.01);

        for f in 81..=160 {
            sim.step(inputs(Gesture::Closed, f));
        }
        assert!(sim.tree().max_error(false) < 0.01);
    }

    #[test]
    fn test_snow_frozen_when_hidden() {
        let config = TreeConfig {
            show_snow: false,
            ..TreeConfig::default()
        };
        let mut sim = SceneSimulation::with_counts(&config, Some(3), small_counts());
        let before: Vec<f32> = sim.snow().flakes().iter().map(|f| f.t).collect();
        sim.step(inputs(Gesture::None, 1));
        let after: Vec<f32> = sim.snow().flakes().iter().map(|f| f.t).collect();
        assert_eq!(before, after);

        let mut out = FrameInstances::default();
        sim.write_instances(&mut out, &Palette::from_config(&config));
        sim.set_show_snow(true);
        let mut with_snow = FrameInstances::default();
        sim.write_instances(&mut with_snow, &Palette::from_config(&config));
        assert_eq!(with_snow.len(), out.len() + 20);
    }

    #[test]
    fn test_palette_does_not_change_motion() {
        let config = TreeConfig::default();
        let mut a = SceneSimulation::with_counts(&config, Some(4), small_counts());
        let mut b = SceneSimulation::with_counts(&config, Some(4), small_counts());
        let mut out = FrameInstances::default();
        let other = Palette::new(Rgb::new(0, 255, 0), Rgb::new(0, 0, 255));

        for f in 1..=30 {
            a.step(inputs(Gesture::None, f));
            b.step(inputs(Gesture::None, f));
            b.write_instances(&mut out, &other);
            a.write_instances(&mut out, &Palette::from_config(&config));
        }
        let pa: Vec<Vec3> = a.tree().layers()[0].particles().iter().map(|p| p.position).collect();
        let pb: Vec<Vec3> = b.tree().layers()[0].particles().iter().map(|p| p.position).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_instance_count_is_stable() {
        let config = TreeConfig::default();
        let mut sim = SceneSimulation::with_counts(&config, Some(5), small_counts());
        let palette = Palette::from_config(&config);
        let mut out = FrameInstances::default();

        sim.write_instances(&mut out, &palette);
        let first = out.len();
        for f in 1..=10 {
            sim.step(inputs(Gesture::Open, f));
            sim.write_instances(&mut out, &palette);
            assert_eq!(out.len(), first);
        }
    }
}
