use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

/// Pixel box of a line of text relative to its draw origin, the top-left
/// corner of the line. Right and bottom are exclusive.
///
/// The width is the pen travel across the text. The height is the font's line
/// height, ascent plus descent, so every glyph of the face fits vertically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBounds {
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }
}

/// Text measured with a face and scale, ready to draw.
pub struct TextLayout {
    font: FontArc,
    scale: PxScale,
    text: String,
    bounds: TextBounds,
}

impl TextLayout {
    pub fn new(font: &FontArc, scale: PxScale, text: &str) -> Self {
        let (width, _) = text_size(scale, font, text);
        let line_height = font.as_scaled(scale).height().ceil() as i32;

        Self {
            font: font.clone(),
            scale,
            text: text.to_string(),
            bounds: TextBounds {
                left: 0,
                top: 0,
                right: width as i32,
                bottom: line_height,
            },
        }
    }

    pub fn bounds(&self) -> TextBounds {
        self.bounds
    }

    pub fn width(&self) -> u32 {
        self.bounds.width()
    }

    /// Draw with the top-left of the line at `origin`. Pixels outside the
    /// image are skipped.
    pub fn draw(&self, image: &mut RgbaImage, origin: (i32, i32), color: Rgba<u8>) {
        draw_text_mut(
            image,
            color,
            origin.0,
            origin.1,
            self.scale,
            &self.font,
            &self.text,
        );
    }
}

/// Width in pixels of `text` at `scale`.
pub fn measure_width(font: &FontArc, scale: PxScale, text: &str) -> u32 {
    text_size(scale, font, text).0
}
