use std::path::Path;

use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

///
/// A canvas image with appropriate handling methods, to generate previews of plots.
///
/// # Fields:
/// - `width`: The width of the canvas, in pixels
/// - `height`: The height of the canvas, in pixels
/// - `scale`: Pixels per millimetre
/// - `buffer`: The greyscale image
///
pub struct PreviewCanvas {
    pub width: u32,
    pub height: u32,
    pub scale: u32,

    pub buffer: GrayImage,
}

impl PreviewCanvas {
    ///
    /// Creates a new white canvas.
    ///
    /// # Parameters:
    /// - `width`: The width of the canvas in millimetres
    /// - `height`: The height of the canvas in millimetres
    /// - `scale`: An optional number of pixels per millimetre, defaults to 1
    ///
    pub fn new(width: f64, height: f64, scale: Option<u32>) -> PreviewCanvas {
        let scale = scale.unwrap_or(1).max(1);

        let width = ((width * scale as f64).ceil() as u32).max(1);
        let height = ((height * scale as f64).ceil() as u32).max(1);

        PreviewCanvas { width, height, scale, buffer: GrayImage::from_pixel(width, height, Luma([255])) }
    }

    ///
    /// Saves the preview as a PNG.
    ///
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        self.buffer.save_with_format(path, image::ImageFormat::Png)
    }

    ///
    /// Draws a filled black dot. This function respects `scale`.
    ///
    /// # Parameters:
    /// - `x`, `y`: The centre of the dot, in millimetres from the top left of the canvas
    /// - `radius`: The radius of the dot, in millimetres
    ///
    pub fn dot(&mut self, x: f64, y: f64, radius: f64) {
        let radius = ((radius * self.scale as f64).round() as i32).max(1);
        draw_filled_circle_mut(&mut self.buffer, scale_floor_coordinates(x, y, self.scale), radius, Luma([0]));
    }

    ///
    /// Outlines a rectangle in grey, between two opposite corners in millimetres.
    ///
    pub fn outline(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let (left, top) = scale_floor_coordinates(x1.min(x2), y1.min(y2), self.scale);
        let (right, bottom) = scale_floor_coordinates(x1.max(x2), y1.max(y2), self.scale);
        let rect = Rect::at(left, top).of_size((right - left).max(1) as u32, (bottom - top).max(1) as u32);
        draw_hollow_rect_mut(&mut self.buffer, rect, Luma([160]));
    }
}

///
/// Scales and floors a pair of millimetre coordinates into pixel coordinates.
///
fn scale_floor_coordinates(x: f64, y: f64, scale: u32) -> (i32, i32) {
    ((x * scale as f64).floor() as i32, (y * scale as f64).floor() as i32)
}
