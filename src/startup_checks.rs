use crate::font::{FileFont, FontError, FontProvider, builtin_face};
use crate::{Config, ConfigError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Font file does not exist: {0:?}")]
    FontMissing(PathBuf),

    #[error("Font file could not be parsed: {0:?}")]
    FontInvalid(PathBuf),

    #[error("Built-in font is unusable")]
    BuiltinFontUnusable,

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

impl StartupCheckError {
    /// A missing or broken font file only costs the requested face; the
    /// built-in face still renders.
    pub fn is_critical(&self) -> bool {
        !matches!(
            self,
            StartupCheckError::FontMissing(_) | StartupCheckError::FontInvalid(_)
        )
    }
}

pub fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    if let Err(e) = config.validate() {
        error!("Configuration is invalid: {}", e);
        errors.push(StartupCheckError::InvalidConfig(e));
    } else {
        info!("Configuration values are valid");
    }

    let font_path = &config.watermark.font_path;
    if !font_path.exists() {
        warn!("Font file does not exist: {:?}", font_path);
        warn!("The built-in face will be used for all timestamps");
        errors.push(StartupCheckError::FontMissing(font_path.clone()));
    } else {
        match FileFont::new(font_path.clone()).face_at(config.watermark.max_font_size) {
            Ok(_) => info!("Font file loads: {:?}", font_path),
            Err(FontError::Read { source, .. }) => {
                warn!("Font file is not readable: {:?}: {}", font_path, source);
                errors.push(StartupCheckError::FontMissing(font_path.clone()));
            }
            Err(e) => {
                warn!("{}", e);
                errors.push(StartupCheckError::FontInvalid(font_path.clone()));
            }
        }
    }

    if builtin_face().is_err() {
        error!("Built-in font failed to parse");
        errors.push(StartupCheckError::BuiltinFontUnusable);
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}
