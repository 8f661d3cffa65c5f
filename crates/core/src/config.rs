use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::apps::domain::finger_counter::FingerSettings;
use crate::apps::domain::trainer::TrainerSettings;
use crate::apps::domain::virtual_painter::PainterSettings;
use crate::apps::domain::volume_control::VolumeSettings;
use crate::landmarks::domain::detector_kind::DetectorKind;
use crate::rendering::domain::annotation_style::AnnotationStyle;
use crate::shared::constants::{
    APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CAMERA_HEIGHT, DEFAULT_CAMERA_WIDTH, DEFAULT_FPS,
    DEFAULT_OUTPUT_ROOT,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// User configuration, read from JSON. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Per-detector style replacing the built-in one, keyed by
    /// `face`, `faceMesh`, `hand` or `pose`.
    pub styles: HashMap<DetectorKind, AnnotationStyle>,
    /// TrueType/OpenType font for labels. Without one, text is skipped.
    pub font_path: Option<PathBuf>,
    pub default_fps: f64,
    pub output_root: PathBuf,
    pub camera_width: u32,
    pub camera_height: u32,
    pub trainer: TrainerSettings,
    pub volume: VolumeSettings,
    pub fingers: FingerSettings,
    pub painter: PainterSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            styles: HashMap::new(),
            font_path: None,
            default_fps: DEFAULT_FPS,
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            camera_width: DEFAULT_CAMERA_WIDTH,
            camera_height: DEFAULT_CAMERA_HEIGHT,
            trainer: TrainerSettings::default(),
            volume: VolumeSettings::default(),
            fingers: FingerSettings::default(),
            painter: PainterSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads the per-user config file. A missing or unreadable file yields
    /// the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("{e}; using defaults");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn style_for(&self, kind: DetectorKind) -> AnnotationStyle {
        self.styles
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| kind.default_style())
    }
}
