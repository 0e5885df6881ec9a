//! Configuration system

pub mod scene_config;

pub use scene_config::{CameraConfig, SceneConfig, ShaderPaths, TexturePaths, WindowConfig};
pub use serde::{Deserialize, Serialize};

use std::path::Path;

/// Configuration trait
///
/// The file format is chosen by extension: `.toml` or `.ron`.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&contents),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Parse TOML text
    fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `path` when it exists, otherwise fall back to defaults
    ///
    /// A file that exists but cannot be parsed is still an error.
    fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            log::info!("Loading configuration from {:?}", path);
            Self::load_from_file(path)
        } else {
            log::info!("No configuration at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
