// src/config.rs - Settings file
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::actions::InputBackend;
use crate::error::{Error, Result};

/// Top-level settings.
///
/// The gesture table is compiled in (see `actions::BINDINGS`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// trace, debug, info, warn or error
    pub log_level: String,
    pub camera: CameraConfig,
    pub detector: DetectorConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Flip frames horizontally before detection
    pub mirror: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Interpreter used to run the landmark helper
    pub python: String,
    pub script: PathBuf,
    pub max_num_hands: u32,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct InputConfig {
    pub backend: InputBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            camera: CameraConfig::default(),
            detector: DetectorConfig::default(),
            input: InputConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: 640,
            height: 480,
            fps: 30,
            mirror: true,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            script: PathBuf::from("scripts/hand_landmarks.py"),
            max_num_hands: 1,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.6,
        }
    }
}

impl AppConfig {
    /// Check values are usable; reports the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(Error::Config(format!(
                "camera resolution must be non-zero, got {}x{}",
                self.camera.width, self.camera.height
            )));
        }
        if self.camera.fps == 0 {
            return Err(Error::Config("camera fps must be > 0".to_string()));
        }
        if self.detector.max_num_hands != 1 {
            return Err(Error::Config(format!(
                "only single-hand tracking is supported, got max_num_hands = {}",
                self.detector.max_num_hands
            )));
        }
        for (name, value) in [
            ("min_detection_confidence", self.detector.min_detection_confidence),
            ("min_tracking_confidence", self.detector.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{} must be in [0, 1], got {}", name, value)));
            }
        }
        if self.detector.python.trim().is_empty() {
            return Err(Error::Config("detector python must not be empty".to_string()));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(Error::Config(format!("unknown log_level {:?}", self.log_level)));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from the default location; a missing file at the
    /// default location yields defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "gesturecontrol", "gesture_control")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
