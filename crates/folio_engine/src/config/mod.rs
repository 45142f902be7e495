//! Configuration system
//!
//! Configuration files are TOML or RON, picked by file extension.

pub use serde::{Serialize, Deserialize};

use crate::assets::LoaderConfig;
use std::path::{Path, PathBuf};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        parse_by_extension(path, &contents)
    }

    /// Load configuration from file, falling back to defaults when it does not exist
    fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Deserialize `contents` according to the extension of `path`
pub fn parse_by_extension<T>(path: &Path, contents: &str) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    match extension(path) {
        Some("toml") => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        Some("ron") => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
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

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Top-level world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Verbose per-tick logging of reveal values
    pub debug: bool,
    /// Start in touch mode (otherwise switched on by the first touch)
    pub touch: bool,
    /// Swap the car model for the truck variant
    pub cyber_truck: bool,
    /// Asset manifest to load at startup
    pub manifest: PathBuf,
    /// Asset loader settings
    pub loader: LoaderConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            debug: false,
            touch: false,
            cyber_truck: false,
            manifest: PathBuf::from("resources/manifest.ron"),
            loader: LoaderConfig::default(),
        }
    }
}

impl Config for WorldConfig {}
