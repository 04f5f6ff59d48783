//! Runtime settings and the optional settings panel.
//!
//! [`Settings`] holds what the user can change while the scene runs. Keyboard
//! shortcuts always work; the egui panel is an extra front end over the same
//! state.

use crate::config::{TreeConfig, MAX_ROTATION_SPEED};
use crate::gpu::PostParams;
use crate::input::{Shortcut, ROTATION_STEP};
use crate::sim::{Palette, SceneSimulation};

/// What a shortcut asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    /// Freeze or resume the scene. Handled by the frame timer.
    TogglePause,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub tree: TreeConfig,
}

impl Settings {
    pub fn new(tree: TreeConfig) -> Self {
        Self { tree }
    }

    pub fn apply(&mut self, shortcut: Shortcut) -> Outcome {
        match shortcut {
            Shortcut::ToggleSnow => {
                self.tree.show_snow = !self.tree.show_snow;
                tracing::info!("Snow {}", on_off(self.tree.show_snow));
            }
            Shortcut::ToggleGlow => {
                self.tree.is_shiny = !self.tree.is_shiny;
                tracing::info!("Glow {}", on_off(self.tree.is_shiny));
            }
            Shortcut::SlowerRotation => self.nudge_rotation(-ROTATION_STEP),
            Shortcut::FasterRotation => self.nudge_rotation(ROTATION_STEP),
            Shortcut::TogglePause => return Outcome::TogglePause,
            Shortcut::Quit => return Outcome::Quit,
        }
        Outcome::Changed
    }

    fn nudge_rotation(&mut self, step: f32) {
        let speed = (self.tree.rotation_speed + step).clamp(0.0, MAX_ROTATION_SPEED);
        // Snap to the step grid so repeated presses land on round values.
        self.tree.rotation_speed = (speed / ROTATION_STEP).round() * ROTATION_STEP;
        tracing::info!("Rotation speed {:.2}", self.tree.rotation_speed);
    }

    /// Push simulation-side settings into `sim`.
    pub fn sync(&self, sim: &mut SceneSimulation) {
        sim.set_rotation_speed(self.tree.rotation_speed);
        sim.set_show_snow(self.tree.show_snow);
    }

    pub fn palette(&self) -> Palette {
        Palette::from_config(&self.tree)
    }

    pub fn post_params(&self) -> PostParams {
        PostParams::for_glow(self.tree.is_shiny)
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

/// Draw the settings window. Returns true when anything changed.
#[cfg(feature = "egui")]
pub fn settings_panel(
    ctx: &egui::Context,
    settings: &mut Settings,
    status: &crate::control::TrackingStatus,
    fps: f32,
) -> bool {
    use crate::config::Rgb;

    let mut changed = false;
    egui::Window::new("Sparkle Tree")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(status.to_string());
            ui.separator();

            let mut color_row = |ui: &mut egui::Ui, label: &str, color: &mut Rgb| {
                ui.horizontal(|ui| {
                    let mut rgb = [color.r, color.g, color.b];
                    if egui::color_picker::color_edit_button_srgb(ui, &mut rgb).changed() {
                        *color = Rgb::new(rgb[0], rgb[1], rgb[2]);
                        changed = true;
                    }
                    ui.label(label);
                });
            };
            color_row(ui, "Tree color", &mut settings.tree.tree_color);
            color_row(ui, "Light color", &mut settings.tree.light_color);

            changed |= ui
                .add(
                    egui::Slider::new(&mut settings.tree.rotation_speed, 0.0..=MAX_ROTATION_SPEED)
                        .text("Rotation"),
                )
                .changed();
            changed |= ui.checkbox(&mut settings.tree.show_snow, "Snow").changed();
            changed |= ui.checkbox(&mut settings.tree.is_shiny, "Glow").changed();

            ui.separator();
            ui.small(format!("{:.0} fps", fps));
        });
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles() {
        let mut settings = Settings::new(TreeConfig::default());
        assert_eq!(settings.apply(Shortcut::ToggleSnow), Outcome::Changed);
        assert!(!settings.tree.show_snow);
        settings.apply(Shortcut::ToggleGlow);
        assert!(!settings.tree.is_shiny);
        assert_eq!(settings.post_params(), PostParams::plain());
    }

    #[test]
    fn test_rotation_is_clamped() {
        let mut settings = Settings::new(TreeConfig::default());
        for _ in 0..100 {
            settings.apply(Shortcut::FasterRotation);
        }
        assert!((settings.tree.rotation_speed - MAX_ROTATION_SPEED).abs() < 1e-6);
        for _ in 0..100 {
            settings.apply(Shortcut::SlowerRotation);
        }
        assert_eq!(settings.tree.rotation_speed, 0.0);
    }

    #[test]
    fn test_rotation_step() {
        let mut settings = Settings::new(TreeConfig::default());
        settings.apply(Shortcut::FasterRotation);
        assert!((settings.tree.rotation_speed - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_quit() {
        let mut settings = Settings::new(TreeConfig::default());
        assert_eq!(settings.apply(Shortcut::Quit), Outcome::Quit);
    }

    #[test]
    fn test_pause_leaves_settings_alone() {
        let mut settings = Settings::new(TreeConfig::default());
        assert_eq!(settings.apply(Shortcut::TogglePause), Outcome::TogglePause);
        assert_eq!(settings, Settings::new(TreeConfig::default()));
    }

    #[test]
    fn test_sync_pushes_into_simulation() {
        let mut settings = Settings::new(TreeConfig::default());
        settings.apply(Shortcut::ToggleSnow);
        let mut sim = SceneSimulation::with_counts(
            &settings.tree,
            Some(3),
            crate::sim::SceneCounts {
                ambient: 4,
                layer_points: 8,
                snow: 4,
            },
        );
        settings.sync(&mut sim);
        let snow_before: Vec<_> = sim.snow().flakes().iter().map(|f| f.position).collect();
        sim.step(crate::sim::StepInputs {
            gesture: crate::gesture::Gesture::None,
            target: Default::default(),
            pointer_ndc: glam::Vec2::ZERO,
            time: crate::time::FrameTime::fixed(1),
        });
        let snow_after: Vec<_> = sim.snow().flakes().iter().map(|f| f.position).collect();
        assert_eq!(snow_before, snow_after);
    }
}
