//! Configuration loading.
//!
//! Settings come from a TOML file; every section and field is optional and
//! falls back to its default. The file is only ever read. Runtime changes made
//! from the keyboard or the settings panel live in memory for the session.
//!
//! ```toml
//! [tree]
//! tree_color = "#ff9ec6"
//! rotation_speed = 0.3
//!
//! [perception]
//! port = 39541
//! auto_launch = true
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gesture::GestureThresholds;

/// Files tried by [`Config::load`] when no explicit path is given.
pub const SEARCH_PATHS: [&str; 2] = ["sparkle-tree.toml", "config/default.toml"];

/// Upper bound for [`TreeConfig::rotation_speed`].
pub const MAX_ROTATION_SPEED: f32 = 1.0;

/// An sRGB color written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is required).
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Channels in `[0, 1]`, still sRGB encoded.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }

    /// Channels converted to linear light for an sRGB render target.
    pub fn to_linear(self) -> Vec3 {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let c = self.to_vec3();
        Vec3::new(decode(c.x), decode(c.y), decode(c.z))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tree: TreeConfig,
    pub perception: PerceptionConfig,
    pub gesture: GestureThresholds,
    pub scene: SceneConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from `explicit` if given, otherwise the first existing file in
    /// [`SEARCH_PATHS`], otherwise defaults. The result is validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => {
                tracing::info!("Loading config from: {}", path.display());
                Self::from_file(path)?
            }
            None => match SEARCH_PATHS.iter().map(Path::new).find(|p| p.exists()) {
                Some(path) => {
                    tracing::info!("Loading config from: {}", path.display());
                    Self::from_file(path)?
                }
                None => {
                    tracing::info!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges. Colors are already checked while parsing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, message: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.to_string(),
        };

        let speed = self.tree.rotation_speed;
        if !(0.0..=MAX_ROTATION_SPEED).contains(&speed) {
            return Err(invalid(
                "tree.rotation_speed",
                "Rotation speed must be between 0.0 and 1.0",
            ));
        }
        if !(self.gesture.curl_ratio > 0.0 && self.gesture.curl_ratio.is_finite()) {
            return Err(invalid("gesture.curl_ratio", "Curl ratio must be positive"));
        }
        if self.gesture.min_curled == 0 || self.gesture.min_curled > 4 {
            return Err(invalid(
                "gesture.min_curled",
                "Curled finger count must be between 1 and 4",
            ));
        }
        if self.perception.port == 0 {
            return Err(invalid("perception.port", "Port must be greater than 0"));
        }
        if self.scene.window_width == 0 || self.scene.window_height == 0 {
            return Err(invalid("scene.window_width", "Window size must be non-zero"));
        }

        if self.perception.auto_launch && !self.perception.tracker_script.exists() {
            tracing::warn!(
                "Tracker auto_launch enabled but script not found at: {}",
                self.perception.tracker_script.display()
            );
        }

        Ok(())
    }
}

/// Look of the tree and the runtime toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Tint of the tree-layer particles.
    pub tree_color: Rgb,
    /// Color of the dust, lights and garland glow.
    pub light_color: Rgb,
    /// Tree spin in radians per second.
    pub rotation_speed: f32,
    pub show_snow: bool,
    /// Glow post-process on or off.
    pub is_shiny: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            tree_color: Rgb::new(0xff, 0x9e, 0xc6),
            light_color: Rgb::new(0xff, 0xee, 0xb0),
            rotation_speed: 0.2,
            show_snow: true,
            is_shiny: true,
        }
    }
}

/// Hand tracking helper settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Use the hand tracker at all.
    pub enabled: bool,
    /// Address to listen on for landmark datagrams.
    pub host: String,
    pub port: u16,
    /// Start the helper script ourselves.
    pub auto_launch: bool,
    pub tracker_script: PathBuf,
    /// Interpreter used to run the helper.
    pub python: String,
    pub camera: u32,
    pub capture_width: u32,
    pub capture_height: u32,
    pub capture_fps: u32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 39541,
            auto_launch: false,
            tracker_script: PathBuf::from("scripts/hand_tracker.py"),
            python: "python3".to_string(),
            camera: 0,
            capture_width: 320,
            capture_height: 240,
            capture_fps: 30,
        }
    }
}

impl PerceptionConfig {
    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Window and asset settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Image shown in the floating frame.
    pub photo: PathBuf,
    pub window_width: u32,
    pub window_height: u32,
    /// Fixed RNG seed for reproducible particle layouts.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            photo: PathBuf::from("assets/photo.jpg"),
            window_width: 1280,
            window_height: 720,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tree.tree_color.to_string(), "#ff9ec6");
        assert_eq!(config.tree.light_color.to_string(), "#ffeeb0");
        assert_eq!(config.tree.rotation_speed, 0.2);
        assert!(config.tree.show_snow);
        assert!(config.tree.is_shiny);
        assert_eq!(config.perception.bind_addr(), "127.0.0.1:39541");
        assert_eq!(config.gesture.curl_ratio, 1.3);
        assert_eq!(config.gesture.min_curled, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r##"
            [tree]
            tree_color = "#00ff80"
            show_snow = false

            [perception]
            port = 40000
        "##;

        let config = Config::parse(toml_str).unwrap();
        assert_eq!(config.tree.tree_color, Rgb::new(0x00, 0xff, 0x80));
        assert!(!config.tree.show_snow);
        assert_eq!(config.tree.rotation_speed, 0.2);
        assert_eq!(config.perception.port, 40000);
        assert_eq!(config.scene.window_width, 1280);
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let err = Config::parse("[tree]\ntree_color = \"pink\"\n").unwrap_err();
        assert!(err.to_string().contains("pink"));
    }

    #[test]
    fn test_rgb_parse() {
        assert_eq!(Rgb::parse("#12050b").unwrap(), Rgb::new(0x12, 0x05, 0x0b));
        assert!(Rgb::parse("12050b").is_err());
        assert!(Rgb::parse("#12050").is_err());
        assert!(Rgb::parse("#zz050b").is_err());
        assert!(Rgb::parse("#ffé0ff").is_err());
        assert!(Rgb::parse("#+f+f+f").is_err());
        assert!(Rgb::parse("#-1-1-1").is_err());
    }

    #[test]
    fn test_rgb_linear() {
        let white = Rgb::new(255, 255, 255).to_linear();
        assert!((white - Vec3::ONE).length() < 1e-5);
        let mid = Rgb::new(128, 128, 128).to_linear();
        assert!(mid.x > 0.2 && mid.x < 0.23);
    }

    #[test]
    fn test_validate_rotation_speed() {
        let mut config = Config::default();
        config.tree.rotation_speed = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "tree.rotation_speed"
        ));
    }

    #[test]
    fn test_validate_thresholds() {
        let mut config = Config::default();
        config.gesture.curl_ratio = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gesture.min_curled = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_port_and_window() {
        let mut config = Config::default();
        config.perception.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scene.window_height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/sparkle.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = Config::parse(include_str!("../config/default.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
