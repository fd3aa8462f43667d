// Timestamp watermark rendering - decode, overlay, composite, save
mod output;
mod overlay;

pub use output::{OutputFormat, output_path};
pub use overlay::{BOTTOM_MARGIN, LEFT_MARGIN, PADDING, PixelBox, Placement, draw_overlay};

use image::{DynamicImage, ImageFormat, ImageReader, RgbImage, RgbaImage, imageops};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::WatermarkConfig;
use crate::font::{FileFont, FitParams, FontError, fit_font};
use crate::formats::{self, is_heif};
use crate::layout::TextLayout;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Font error: {0}")]
    FontError(#[from] FontError),

    #[error("HEIF decoding is not enabled in this build: {0:?}")]
    HeifUnsupported(PathBuf),

    #[error("HEIF decode error: {0}")]
    HeifError(String),

    #[error("Invalid path: {0:?}")]
    InvalidPath(PathBuf),
}

/// One render: the source file and the text to burn into it.
#[derive(Debug, Clone)]
pub struct WatermarkRequest<'a> {
    pub source: &'a Path,
    pub timestamp: &'a str,
}

/// A watermarked image before it is written out.
pub struct Stamped {
    pub image: RgbaImage,
    pub placement: Placement,
    pub font_size: u32,
}

pub struct Watermarker {
    config: WatermarkConfig,
    font: FileFont,
}

impl Default for Watermarker {
    fn default() -> Self {
        Self::new(WatermarkConfig::default())
    }
}

impl Watermarker {
    pub fn new(config: WatermarkConfig) -> Self {
        let font = FileFont::new(config.font_path.clone());
        Self { config, font }
    }

    /// Burn `timestamp` into the image at `source` and save it beside the
    /// source. Returns the path written.
    pub fn render(&self, source: &Path, timestamp: &str) -> Result<PathBuf, WatermarkError> {
        self.render_request(&WatermarkRequest { source, timestamp })
    }

    pub fn render_request(&self, request: &WatermarkRequest<'_>) -> Result<PathBuf, WatermarkError> {
        let format = OutputFormat::for_source(request.source);
        let save_path = output_path(request.source, format)?;

        let data = std::fs::read(request.source)?;
        let image = decode_image(&data, request.source)?;
        debug!(
            "Decoded {} ({}x{})",
            request.source.display(),
            image.width(),
            image.height()
        );

        let stamped = self.stamp(&image, request.timestamp)?;
        // Both output formats are written without alpha
        let flattened: RgbImage = DynamicImage::ImageRgba8(stamped.image).to_rgb8();

        let icc_profile = if self.config.preserve_icc_profile {
            formats::extract_icc_profile(&data).filter(|profile| {
                let rgb = formats::is_rgb_profile(profile);
                if !rgb {
                    debug!("Dropping non-RGB ICC profile of {}", request.source.display());
                }
                rgb
            })
        } else {
            None
        };

        match format {
            OutputFormat::Jpeg => formats::jpeg::save(
                &flattened,
                &save_path,
                self.config.jpeg_quality,
                icc_profile.as_deref(),
            )?,
            OutputFormat::Png => formats::png::save(&flattened, &save_path, icc_profile.as_deref())?,
        }

        info!("Watermark added, saved at: {}", save_path.display());
        Ok(save_path)
    }

    /// Composite the timestamp overlay onto an image in memory.
    pub fn stamp(&self, image: &DynamicImage, timestamp: &str) -> Result<Stamped, WatermarkError> {
        let source = image.to_rgba8();
        let (width, height) = source.dimensions();

        let fitted = fit_font(timestamp, width, &self.font, &FitParams::from(&self.config))?;
        let layout = TextLayout::new(&fitted.font, fitted.scale(), timestamp);
        let (overlay, placement) = draw_overlay(width, height, &layout);

        let mut base = source.clone();
        imageops::overlay(&mut base, &overlay, 0, 0);
        // Blending rounds opaque alpha down by one
        for (out, src) in base.pixels_mut().zip(source.pixels()) {
            if src[3] == u8::MAX {
                out[3] = u8::MAX;
            }
        }

        Ok(Stamped {
            image: base,
            placement,
            font_size: fitted.size,
        })
    }
}

/// Render with default settings.
pub fn render(source: &Path, timestamp: &str) -> Result<PathBuf, WatermarkError> {
    Watermarker::default().render(source, timestamp)
}

/// Decode source bytes, sniffing the content rather than trusting the
/// extension.
pub fn decode_image(data: &[u8], path: &Path) -> Result<DynamicImage, WatermarkError> {
    if is_heif(data) {
        return decode_heif(data, path);
    }

    let mut reader = ImageReader::new(Cursor::new(data));
    if let Ok(format) = ImageFormat::from_path(path) {
        reader.set_format(format);
    }
    let reader = reader.with_guessed_format()?;
    Ok(reader.decode()?)
}

#[cfg(feature = "heif")]
fn decode_heif(data: &[u8], path: &Path) -> Result<DynamicImage, WatermarkError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let heif_err = |e: libheif_rs::HeifError| WatermarkError::HeifError(e.to_string());

    let lib_heif = LibHeif::new();
    let context = HeifContext::read_from_bytes(data).map_err(heif_err)?;
    let handle = context.primary_image_handle().map_err(heif_err)?;
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
        .map_err(heif_err)?;

    let planes = decoded.planes();
    let interleaved = planes
        .interleaved
        .ok_or_else(|| WatermarkError::HeifError("no interleaved RGBA plane".to_string()))?;

    let (width, height) = (interleaved.width, interleaved.height);
    let row_bytes = width as usize * 4;
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in interleaved.data.chunks(interleaved.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_bytes]);
    }

    debug!("Decoded HEIF {} ({}x{})", path.display(), width, height);
    let buffer = RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| WatermarkError::HeifError("decoded plane is too small".to_string()))?;
    Ok(DynamicImage::ImageRgba8(buffer))
}

#[cfg(not(feature = "heif"))]
fn decode_heif(_data: &[u8], path: &Path) -> Result<DynamicImage, WatermarkError> {
    Err(WatermarkError::HeifUnsupported(path.to_path_buf()))
}
