use ab_glyph::{FontArc, PxScale};
use std::cell::OnceCell;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::WatermarkConfig;
use crate::layout::measure_width;

/// DejaVu Sans, compiled in so text can always be drawn.
static BUILTIN_FONT: &[u8] = include_bytes!("../static/DejaVuSans.ttf");

#[derive(Debug, Error)]
pub enum FontError {
    #[error("Failed to read font {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse font {0:?}")]
    Invalid(PathBuf),

    #[error("Built-in font is unusable")]
    Builtin,
}

pub fn builtin_face() -> Result<FontArc, FontError> {
    FontArc::try_from_slice(BUILTIN_FONT).map_err(|_| FontError::Builtin)
}

/// Supplies the requested font face for a candidate size.
pub trait FontProvider {
    fn face_at(&self, size: u32) -> Result<FontArc, FontError>;
}

/// Loads a TrueType/OpenType font from disk. A successful load is reused;
/// failures are retried on the next request.
pub struct FileFont {
    path: PathBuf,
    loaded: OnceCell<FontArc>,
}

impl FileFont {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: OnceCell::new(),
        }
    }

    fn load(&self) -> Result<FontArc, FontError> {
        let data = std::fs::read(&self.path).map_err(|source| FontError::Read {
            path: self.path.clone(),
            source,
        })?;
        FontArc::try_from_vec(data).map_err(|_| FontError::Invalid(self.path.clone()))
    }
}

impl FontProvider for FileFont {
    fn face_at(&self, _size: u32) -> Result<FontArc, FontError> {
        if let Some(font) = self.loaded.get() {
            return Ok(font.clone());
        }
        let font = self.load()?;
        Ok(self.loaded.get_or_init(|| font).clone())
    }
}

/// Bounds and target for the font size search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    pub target_ratio: f64,
    pub min_size: u32,
    pub max_size: u32,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            target_ratio: 0.2,
            min_size: 10,
            max_size: 200,
        }
    }
}

impl From<&WatermarkConfig> for FitParams {
    fn from(config: &WatermarkConfig) -> Self {
        Self {
            target_ratio: config.target_ratio,
            min_size: config.min_font_size,
            max_size: config.max_font_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSource {
    Requested,
    Builtin,
}

/// A font face together with the size chosen for it.
pub struct FittedFont {
    pub font: FontArc,
    pub size: u32,
    pub source: FaceSource,
}

impl FittedFont {
    pub fn scale(&self) -> PxScale {
        scale_for(self.size)
    }
}

/// Font sizes are the pixel height of a line of text.
pub fn scale_for(size: u32) -> PxScale {
    PxScale::from(size as f32)
}

/// Binary search for the largest size in `[min_size, max_size]` whose
/// measured width stays strictly under `target_ratio` of `image_width`.
///
/// Returns `min_size` when no candidate qualifies.
pub fn search_font_size(
    image_width: u32,
    params: &FitParams,
    mut measure: impl FnMut(u32) -> u32,
) -> u32 {
    let mut best = params.min_size;
    if image_width == 0 || params.min_size > params.max_size {
        return best;
    }

    let target = params.target_ratio;
    let (mut low, mut high) = (params.min_size, params.max_size);
    while low <= high {
        let mid = low + (high - low) / 2;
        let width = measure(mid);

        if f64::from(width) / f64::from(image_width) < target {
            best = mid;
            low = mid + 1;
        } else if mid == 0 {
            break;
        } else {
            high = mid - 1;
        }
    }

    best
}

/// Pick a font size so `text` fills just under the target share of
/// `image_width`.
///
/// Whenever the requested face cannot be loaded, the built-in face is used for
/// that step instead. Measurements can therefore mix faces across steps, and
/// the face returned at the chosen size may differ from the one it was
/// measured with.
pub fn fit_font<P>(
    text: &str,
    image_width: u32,
    provider: &P,
    params: &FitParams,
) -> Result<FittedFont, FontError>
where
    P: FontProvider + ?Sized,
{
    let builtin = builtin_face()?;

    let size = search_font_size(image_width, params, |size| {
        let (face, _) = face_or_builtin(provider, size, &builtin);
        measure_width(&face, scale_for(size), text)
    });

    let (font, source) = face_or_builtin(provider, size, &builtin);
    debug!("Chose font size {} ({:?} face) for width {}", size, source, image_width);

    Ok(FittedFont { font, size, source })
}

fn face_or_builtin<P>(provider: &P, size: u32, builtin: &FontArc) -> (FontArc, FaceSource)
where
    P: FontProvider + ?Sized,
{
    match provider.face_at(size) {
        Ok(font) => (font, FaceSource::Requested),
        Err(e) => {
            debug!("Using built-in font at size {}: {}", size, e);
            (builtin.clone(), FaceSource::Builtin)
        }
    }
}
