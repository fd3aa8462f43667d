use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::layout::{TextBounds, TextLayout};

/// Distance from the left image edge to the pen origin.
pub const LEFT_MARGIN: i32 = 10;
/// Distance from the bottom of the text to the bottom image edge.
pub const BOTTOM_MARGIN: i32 = 18;
/// Backdrop padding around the text box on every side.
pub const PADDING: i32 = 5;

const BACKDROP: Rgba<u8> = Rgba([0, 0, 0, 128]);
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Axis-aligned box in image coordinates; right and bottom are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelBox {
    fn from_bounds(bounds: &TextBounds, origin: (i32, i32)) -> Self {
        Self {
            left: origin.0 + bounds.left,
            top: origin.1 + bounds.top,
            right: origin.0 + bounds.right,
            bottom: origin.1 + bounds.bottom,
        }
    }

    fn expand(&self, by: i32) -> Self {
        Self {
            left: self.left - by,
            top: self.top - by,
            right: self.right + by,
            bottom: self.bottom + by,
        }
    }

    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Where the text and its backdrop land on an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Top-left of the text line
    pub origin: (i32, i32),
    pub text: PixelBox,
    pub backdrop: PixelBox,
}

impl Placement {
    /// Anchor text with the given bounds to the lower-left corner.
    pub fn lower_left(bounds: &TextBounds, image_height: u32) -> Self {
        let top = image_height as i32 - BOTTOM_MARGIN - bounds.bottom;
        let origin = (LEFT_MARGIN, top);
        let text = PixelBox::from_bounds(bounds, origin);

        Self {
            origin,
            text,
            backdrop: text.expand(PADDING),
        }
    }
}

/// Draw the backdrop and the text on a transparent layer the size of the image.
pub fn draw_overlay(width: u32, height: u32, layout: &TextLayout) -> (RgbaImage, Placement) {
    let mut overlay = RgbaImage::from_pixel(width, height, CLEAR);
    let placement = Placement::lower_left(&layout.bounds(), height);

    let backdrop = placement.backdrop;
    draw_filled_rect_mut(
        &mut overlay,
        Rect::at(backdrop.left, backdrop.top).of_size(backdrop.width(), backdrop.height()),
        BACKDROP,
    );
    layout.draw(&mut overlay, placement.origin, TEXT_COLOR);

    (overlay, placement)
}
