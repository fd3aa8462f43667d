use std::path::{Path, PathBuf};

use super::WatermarkError;

const SUFFIX: &str = "_watermarked";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// JPEG-family and HEIF sources are written as JPEG, everything else as PNG.
    pub fn for_source(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "heic" | "heif" | "jpg" | "jpeg" | "gif" => OutputFormat::Jpeg,
            _ => OutputFormat::Png,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// `<dir>/<stem>_watermarked.<ext>` beside the source.
pub fn output_path(source: &Path, format: OutputFormat) -> Result<PathBuf, WatermarkError> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| WatermarkError::InvalidPath(source.to_path_buf()))?;

    Ok(source.with_file_name(format!("{}{}.{}", stem, SUFFIX, format.extension())))
}
