use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod font;
pub mod formats;
pub mod layout;
pub mod metadata;
pub mod session;
pub mod startup_checks;
pub mod watermark;

pub use metadata::{CaptureTimestamp, MetadataEncoding, extract_capture_timestamp};
pub use session::{Session, SessionError, TimestampOrigin};
pub use watermark::{OutputFormat, Watermarker, WatermarkError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub watermark: WatermarkConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Settings for the timestamp overlay.
///
/// Placement, padding and opacity are fixed; only the font and the size search
/// bounds are tunable.
#[derive(Debug, Clone, Deserialize)]
pub struct WatermarkConfig {
    /// TrueType font used for the timestamp; the built-in face is used when it
    /// cannot be loaded
    #[serde(default = "default_font_path")]
    pub font_path: PathBuf,
    /// Fraction of the image width the text should stay under
    #[serde(default = "default_target_ratio")]
    pub target_ratio: f64,
    #[serde(default = "default_max_font_size")]
    pub max_font_size: u32,
    #[serde(default = "default_min_font_size")]
    pub min_font_size: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Copy the source ICC profile into the output when there is one
    #[serde(default = "default_preserve_icc_profile")]
    pub preserve_icc_profile: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_font_path() -> PathBuf {
    PathBuf::from("static/DejaVuSans.ttf")
}

fn default_target_ratio() -> f64 {
    0.2
}

fn default_max_font_size() -> u32 {
    200
}

fn default_min_font_size() -> u32 {
    10
}

fn default_jpeg_quality() -> u8 {
    75
}

fn default_preserve_icc_profile() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            font_path: default_font_path(),
            target_ratio: default_target_ratio(),
            max_font_size: default_max_font_size(),
            min_font_size: default_min_font_size(),
            jpeg_quality: default_jpeg_quality(),
            preserve_icc_profile: default_preserve_icc_profile(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ParseError(#[from] toml_edit::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Configuration loaded from: {:?}", path);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config = toml_edit::de::from_str::<Config>(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let wm = &self.watermark;

        if wm.min_font_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "watermark.min_font_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if wm.min_font_size > wm.max_font_size {
            return Err(ConfigError::InvalidValue {
                field: "watermark.min_font_size",
                reason: format!(
                    "{} is larger than max_font_size {}",
                    wm.min_font_size, wm.max_font_size
                ),
            });
        }
        if !(wm.target_ratio > 0.0 && wm.target_ratio <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "watermark.target_ratio",
                reason: format!("{} is outside (0, 1]", wm.target_ratio),
            });
        }
        if !(1..=100).contains(&wm.jpeg_quality) {
            return Err(ConfigError::InvalidValue {
                field: "watermark.jpeg_quality",
                reason: format!("{} is outside 1..=100", wm.jpeg_quality),
            });
        }

        Ok(())
    }
}
