//! Frame timing.
//!
//! The simulation integrates once per rendered frame; wall-clock time only
//! feeds the animations that are specified per second (tree spin, camera
//! auto-rotate, twinkle). [`Time::tick`] produces a [`FrameTime`] snapshot
//! that is handed to the rest of the frame.
//!
//! ```ignore
//! let mut time = Time::new();
//! loop {
//!     let frame = time.tick();
//!     scene.step(&inputs, frame);
//! }
//! ```

use std::time::{Duration, Instant};

/// Longest delta a single frame may report. Stalls (window drags, debugger
/// breaks) are clamped so the tree does not jump.
pub const MAX_DELTA: f32 = 0.1;

/// Timing values for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since start, excluding pauses.
    pub elapsed: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Frames since start.
    pub frame: u64,
}

impl FrameTime {
    /// A frame at a fixed 60 Hz step, for tests and benches.
    pub fn fixed(frame: u64) -> Self {
        let delta = 1.0 / 60.0;
        Self {
            elapsed: frame as f32 * delta,
            delta,
            frame,
        }
    }
}

/// Wall-clock frame timer with pause and a fixed-step mode.
#[derive(Debug)]
pub struct Time {
    last_frame: Instant,
    elapsed: f64,
    delta: f32,
    frame: u64,
    fps: f32,
    fps_frames: u64,
    fps_since: Instant,
    fps_interval: Duration,
    paused: bool,
    fixed_delta: Option<f32>,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            elapsed: 0.0,
            delta: 0.0,
            frame: 0,
            fps: 0.0,
            fps_frames: 0,
            fps_since: now,
            fps_interval: Duration::from_millis(500),
            paused: false,
            fixed_delta: None,
        }
    }

    /// Advance one frame. Call once per redraw.
    ///
    /// While paused the delta is zero and elapsed time stands still, but the
    /// frame counter keeps running.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.delta = if self.paused {
            0.0
        } else {
            self.fixed_delta.unwrap_or_else(|| raw.min(MAX_DELTA))
        };
        self.elapsed += self.delta as f64;
        self.frame += 1;

        let window = now.duration_since(self.fps_since);
        if window >= self.fps_interval {
            self.fps = (self.frame - self.fps_frames) as f32 / window.as_secs_f32();
            self.fps_frames = self.frame;
            self.fps_since = now;
        }

        self.current()
    }

    /// The values produced by the last [`tick`](Self::tick).
    pub fn current(&self) -> FrameTime {
        FrameTime {
            elapsed: self.elapsed as f32,
            delta: self.delta,
            frame: self.frame,
        }
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Use a constant delta instead of wall-clock time. `None` restores
    /// real timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    pub fn toggle_paused(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
