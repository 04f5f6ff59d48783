//! Window and event loop glue.
//!
//! [`App`] owns every runtime piece and drives one control-loop tick per
//! `RedrawRequested`, re-requesting a redraw each time so the loop keeps
//! itself going.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::config::Config;
use crate::control::{ControlLoop, TrackingStatus};
use crate::error::AppError;
use crate::gpu::{Camera, FrameData, GpuState, Overlay, PhotoImage};
use crate::input::Input;
use crate::instance::FrameInstances;
use crate::perception::Perception;
use crate::sim::SceneSimulation;
use crate::time::Time;
use crate::ui::{Outcome, Settings};

const TITLE: &str = "Sparkle Tree";
const INSTANCE_CAPACITY: usize = 16_384;

pub struct App {
    config: Config,
    settings: Settings,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    control: ControlLoop,
    sim: SceneSimulation,
    camera: Camera,
    input: Input,
    time: Time,
    instances: FrameInstances,
    #[cfg(feature = "egui")]
    egui: Option<crate::gpu::egui_integration::EguiIntegration>,
    error: Option<AppError>,
}

impl App {
    /// Build the app around an already initialized perception adapter.
    pub fn new(config: Config, perception: Perception) -> Self {
        let control = ControlLoop::new(perception, config.gesture);
        let sim = SceneSimulation::new(&config.tree, config.scene.seed);
        let input = Input::new(config.scene.window_width, config.scene.window_height);
        Self {
            settings: Settings::new(config.tree.clone()),
            config,
            window: None,
            gpu: None,
            control,
            sim,
            camera: Camera::new(),
            input,
            time: Time::new(),
            instances: FrameInstances::with_capacity(INSTANCE_CAPACITY),
            #[cfg(feature = "egui")]
            egui: None,
            error: None,
        }
    }

    /// The fatal error that ended the event loop, if any.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(title(&self.control.status()))
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.scene.window_width,
                self.config.scene.window_height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);

        let photo = PhotoImage::load_or_placeholder(&self.config.scene.photo);
        let gpu = pollster::block_on(GpuState::new(window.clone(), &photo))?;

        #[cfg(feature = "egui")]
        {
            self.egui = Some(crate::gpu::egui_integration::EguiIntegration::new(
                gpu.device(),
                gpu.surface_format(),
                &window,
            ));
        }

        tracing::info!("Window ready ({}x{})", size.width, size.height);
        self.window = Some(window);
        self.gpu = Some(gpu);
        Ok(())
    }

    fn apply_shortcuts(&mut self, event_loop: &ActiveEventLoop) {
        let mut changed = false;
        for &shortcut in self.input.shortcuts() {
            match self.settings.apply(shortcut) {
                Outcome::Changed => changed = true,
                Outcome::TogglePause => {
                    let paused = self.time.toggle_paused();
                    tracing::info!("{}", if paused { "Paused" } else { "Resumed" });
                }
                Outcome::Quit => {
                    tracing::info!("Quit requested");
                    event_loop.exit();
                }
            }
        }
        if changed {
            self.settings.sync(&mut self.sim);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let frame_time = self.time.tick();
        self.apply_shortcuts(event_loop);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let aspect = gpu.aspect();

        // Hovering the settings panel must not orbit the camera.
        #[cfg(feature = "egui")]
        let ui_has_pointer = self.egui.as_ref().is_some_and(|e| e.wants_pointer());
        #[cfg(not(feature = "egui"))]
        let ui_has_pointer = false;

        if !ui_has_pointer {
            self.camera
                .drag(self.input.drag_delta(), gpu.config.height as f32);
            self.camera.zoom(self.input.scroll_delta());
        }
        self.camera.update(frame_time.delta);

        // Paused: the scene keeps its last state and the tracker is not polled.
        if !self.time.is_paused() {
            let tick = self.control.tick(
                &mut self.sim,
                self.input.pointer_ndc(),
                &self.camera.viewport(aspect),
                frame_time,
            );
            if let (Some(status), Some(window)) = (tick.status_changed, &self.window) {
                window.set_title(&title(&status));
            }
        }
        self.input.begin_frame();

        #[cfg(feature = "egui")]
        if let (Some(egui), Some(window)) = (self.egui.as_mut(), &self.window) {
            let settings = &mut self.settings;
            let status = self.control.status();
            let fps = self.time.fps();
            let mut changed = false;
            egui.run(window, |ctx| {
                changed |= crate::ui::settings_panel(ctx, settings, &status, fps);
            });
            if changed {
                settings.sync(&mut self.sim);
            }
        }

        self.sim
            .write_instances(&mut self.instances, &self.settings.palette());

        let frame = FrameData {
            instances: &self.instances,
            view_proj: self.camera.view_proj(aspect),
            time: frame_time,
            post: self.settings.post_params(),
        };

        #[cfg(feature = "egui")]
        let overlay = self.egui.as_mut().map(|e| e as &mut dyn Overlay);
        #[cfg(not(feature = "egui"))]
        let overlay: Option<&mut dyn Overlay> = None;

        match gpu.render(&frame, overlay) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => tracing::warn!("Render error: {:?}", e),
        }
    }
}

fn title(status: &TrackingStatus) -> String {
    format!("{} - {}", TITLE, status)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                tracing::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        let consumed = match (self.egui.as_mut(), &self.window) {
            (Some(egui), Some(window)) => egui.on_window_event(window, &event),
            _ => false,
        };
        #[cfg(not(feature = "egui"))]
        let consumed = false;

        if !consumed {
            self.input.handle_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.control.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_follows_status() {
        assert_eq!(
            title(&TrackingStatus::default()),
            "Sparkle Tree - Show hand to control"
        );
    }
}
