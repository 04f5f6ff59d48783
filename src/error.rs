//! Error types for sparkle-tree.
//!
//! Each concern gets its own enum; [`AppError`] wraps them for the binary.
//! Only GPU and window setup failures stop the program. Perception and
//! asset failures are logged by their callers and degrade the scene instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// The surface reports no usable texture format.
    #[error("The window surface is not supported by the GPU adapter")]
    UnsupportedSurface,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors that can occur while loading the photo texture.
#[derive(Debug, Error)]
pub enum TextureError {
    /// Failed to decode the image file.
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),
    /// Failed to read the file from disk.
    #[error("Failed to read texture file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the hand-landmark perception adapter.
#[derive(Debug, Error)]
pub enum PerceptionError {
    /// The landmark socket could not be bound.
    #[error("Failed to bind landmark socket on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// Receiving from the socket failed for a reason other than "no data".
    #[error("Landmark receive error: {0}")]
    Receive(#[source] std::io::Error),
    /// A datagram was not valid landmark JSON.
    #[error("Malformed landmark packet: {0}")]
    Parse(#[from] serde_json::Error),
    /// A hand did not carry the full 21-point skeleton.
    #[error("Expected 21 hand landmarks, got {0}")]
    LandmarkCount(usize),
    /// The tracker helper process could not be started.
    #[error("Failed to launch hand tracker '{script}': {source}")]
    Launch {
        script: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors in the configuration file or command line overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for [`crate::config::Config`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A color string was not `#rrggbb`.
    #[error("Invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
    /// A value is out of its allowed range.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors that can occur when running the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to create the event loop or the event loop failed.
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// Configuration was invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
