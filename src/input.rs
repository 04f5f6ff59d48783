//! Pointer, orbit and keyboard input.
//!
//! [`Input`] folds raw window events into the per-frame state the app needs:
//! the pointer in NDC (the fallback attractor), the drag and scroll deltas that
//! steer the orbit camera, and the keyboard [`Shortcut`]s triggered this frame.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Rotation speed change per `[` / `]` press.
pub const ROTATION_STEP: f32 = 0.05;

/// Keyboard actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    ToggleSnow,
    ToggleGlow,
    SlowerRotation,
    FasterRotation,
    TogglePause,
    Quit,
}

impl Shortcut {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyS => Some(Shortcut::ToggleSnow),
            KeyCode::KeyG => Some(Shortcut::ToggleGlow),
            KeyCode::BracketLeft => Some(Shortcut::SlowerRotation),
            KeyCode::BracketRight => Some(Shortcut::FasterRotation),
            KeyCode::KeyP => Some(Shortcut::TogglePause),
            KeyCode::Escape => Some(Shortcut::Quit),
            _ => None,
        }
    }
}

/// Accumulated input for the current frame.
#[derive(Debug)]
pub struct Input {
    pointer_px: Vec2,
    pointer_ndc: Vec2,
    dragging: bool,
    drag_delta: Vec2,
    scroll_delta: f32,
    shortcuts: Vec<Shortcut>,
    held: Vec<KeyCode>,
    window_size: (u32, u32),
}

impl Input {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pointer_px: Vec2::ZERO,
            pointer_ndc: Vec2::ZERO,
            dragging: false,
            drag_delta: Vec2::ZERO,
            scroll_delta: 0.0,
            shortcuts: Vec::new(),
            held: Vec::new(),
            window_size: (width, height),
        }
    }

    /// Pointer in normalized device coordinates, y up. Starts at the center.
    #[inline]
    pub fn pointer_ndc(&self) -> Vec2 {
        self.pointer_ndc
    }

    /// Pointer movement in pixels while the left button is down.
    #[inline]
    pub fn drag_delta(&self) -> Vec2 {
        self.drag_delta
    }

    /// Wheel movement in lines, positive away from the user.
    #[inline]
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Shortcuts pressed since the last [`begin_frame`](Self::begin_frame),
    /// in order. Key repeat is ignored.
    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// Clear per-frame deltas. Call after the frame has consumed them.
    pub fn begin_frame(&mut self) {
        self.drag_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
        self.shortcuts.clear();
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
        self.pointer_ndc = self.to_ndc(self.pointer_px);
    }

    fn to_ndc(&self, px: Vec2) -> Vec2 {
        let (w, h) = self.window_size;
        if w == 0 || h == 0 {
            return self.pointer_ndc;
        }
        Vec2::new(
            (px.x / w as f32) * 2.0 - 1.0,
            1.0 - (px.y / h as f32) * 2.0,
        )
    }

    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.on_key(code, event.state);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => self.on_button(*button, *state),
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor(Vec2::new(position.x as f32, position.y as f32))
            }
            WindowEvent::CursorLeft { .. } => self.dragging = false,
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
            }
            WindowEvent::Resized(size) => self.set_window_size(size.width, size.height),
            _ => {}
        }
    }

    fn on_key(&mut self, code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.held.contains(&code) {
                    return;
                }
                self.held.push(code);
                if let Some(shortcut) = Shortcut::from_key(code) {
                    self.shortcuts.push(shortcut);
                }
            }
            ElementState::Released => self.held.retain(|k| *k != code),
        }
    }

    fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state == ElementState::Pressed;
        }
    }

    fn on_cursor(&mut self, px: Vec2) {
        if self.dragging {
            self.drag_delta += px - self.pointer_px;
        }
        self.pointer_px = px;
        self.pointer_ndc = self.to_ndc(px);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_ndc() {
        let mut input = Input::new(800, 600);
        input.on_cursor(Vec2::new(400.0, 300.0));
        assert!(input.pointer_ndc().length() < 1e-6);

        input.on_cursor(Vec2::new(800.0, 0.0));
        assert_eq!(input.pointer_ndc(), Vec2::new(1.0, 1.0));

        input.on_cursor(Vec2::new(0.0, 600.0));
        assert_eq!(input.pointer_ndc(), Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn test_resize_rescales_pointer() {
        let mut input = Input::new(800, 600);
        input.on_cursor(Vec2::new(400.0, 300.0));
        input.set_window_size(400, 300);
        assert_eq!(input.pointer_ndc(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_drag_only_while_pressed() {
        let mut input = Input::new(800, 600);
        input.on_cursor(Vec2::new(100.0, 100.0));
        input.on_cursor(Vec2::new(110.0, 100.0));
        assert_eq!(input.drag_delta(), Vec2::ZERO);

        input.on_button(MouseButton::Left, ElementState::Pressed);
        input.on_cursor(Vec2::new(130.0, 90.0));
        assert_eq!(input.drag_delta(), Vec2::new(20.0, -10.0));

        input.begin_frame();
        assert_eq!(input.drag_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_shortcuts_ignore_repeat() {
        let mut input = Input::new(800, 600);
        input.on_key(KeyCode::KeyS, ElementState::Pressed);
        input.on_key(KeyCode::KeyS, ElementState::Pressed);
        input.on_key(KeyCode::KeyQ, ElementState::Pressed);
        assert_eq!(input.shortcuts(), &[Shortcut::ToggleSnow]);

        input.begin_frame();
        input.on_key(KeyCode::KeyS, ElementState::Released);
        input.on_key(KeyCode::KeyS, ElementState::Pressed);
        assert_eq!(input.shortcuts(), &[Shortcut::ToggleSnow]);
    }

    #[test]
    fn test_shortcut_mapping() {
        assert_eq!(Shortcut::from_key(KeyCode::KeyG), Some(Shortcut::ToggleGlow));
        assert_eq!(Shortcut::from_key(KeyCode::BracketLeft), Some(Shortcut::SlowerRotation));
        assert_eq!(Shortcut::from_key(KeyCode::BracketRight), Some(Shortcut::FasterRotation));
        assert_eq!(Shortcut::from_key(KeyCode::KeyP), Some(Shortcut::TogglePause));
        assert_eq!(Shortcut::from_key(KeyCode::Escape), Some(Shortcut::Quit));
        assert_eq!(Shortcut::from_key(KeyCode::KeyA), None);
    }
}
