//!
//! The binary raster image consumed by the plotter
//!

use std::path::Path;

use image::GrayImage;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use error::ImageError;

pub mod error;

///
/// One image element. Serialized as `1` for a mark and `0` for a blank.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Element {
    #[default]
    Blank,
    Mark,
}

impl From<Element> for u8 {
    fn from(element: Element) -> u8 {
        match element {
            Element::Blank => 0,
            Element::Mark => 1,
        }
    }
}

impl TryFrom<u8> for Element {
    type Error = ImageError;

    fn try_from(value: u8) -> Result<Element, ImageError> {
        match value {
            0 => Ok(Element::Blank),
            1 => Ok(Element::Mark),
            other => Err(ImageError::InvalidElement(other)),
        }
    }
}

///
/// A fixed-size grid of elements, stored row-major. Every row is exactly `width` long and there
/// are exactly `height` rows.
///
/// The serialized form is `{"width": w, "height": h, "pixels": [[0, 1, ...], ...]}`, and
/// deserializing checks the metadata against the pixels.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SerializedImage")]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Vec<Element>>,
}

#[derive(Deserialize)]
struct SerializedImage {
    width: usize,
    height: usize,
    pixels: Vec<Vec<Element>>,
}

impl TryFrom<SerializedImage> for Image {
    type Error = ImageError;

    fn try_from(serialized: SerializedImage) -> Result<Image, ImageError> {
        // an empty pixel array can't carry a width, so the declared one is kept
        if serialized.pixels.is_empty() && serialized.height == 0 {
            return Ok(Image::new(serialized.width, 0));
        }

        let image = Image::from_rows(serialized.pixels)?;
        if image.width != serialized.width || image.height != serialized.height {
            return Err(ImageError::DimensionMismatch {
                declared_width: serialized.width,
                declared_height: serialized.height,
                width: image.width,
                height: image.height,
            });
        }
        Ok(image)
    }
}

/// The checkerboard plotted by the printer self test.
pub static CHECKER_13X13: Lazy<Image> = Lazy::new(|| Image::checker(13, 13));

impl Image {
    ///
    /// # Returns:
    /// - A blank image of the given size
    ///
    pub fn new(width: usize, height: usize) -> Image {
        Image { width, height, pixels: vec![vec![Element::Blank; width]; height] }
    }

    ///
    /// Builds an image from its rows. The width is taken from the first row.
    ///
    /// # Returns:
    /// - The image
    /// - `ImageError::RaggedRows` if any row differs in length from the first
    ///
    pub fn from_rows(rows: Vec<Vec<Element>>) -> Result<Image, ImageError> {
        let width = rows.first().map_or(0, |row| row.len());
        if let Some((row, found)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(ImageError::RaggedRows { row, expected: width, found: found.len() });
        }
        Ok(Image { width, height: rows.len(), pixels: rows })
    }

    ///
    /// A checkerboard with a mark in the top-left corner.
    ///
    pub fn checker(width: usize, height: usize) -> Image {
        let mut image = Image::new(width, height);
        for (y, row) in image.pixels.iter_mut().enumerate() {
            for (x, element) in row.iter_mut().enumerate() {
                if (x + y) % 2 == 0 {
                    *element = Element::Mark;
                }
            }
        }
        image
    }

    ///
    /// Thresholds a greyscale raster. Pixels darker than `threshold` become marks.
    ///
    pub fn from_luma(raster: &GrayImage, threshold: u8) -> Image {
        let mut image = Image::new(raster.width() as usize, raster.height() as usize);
        for (x, y, pixel) in raster.enumerate_pixels() {
            if pixel.0[0] < threshold {
                image.pixels[y as usize][x as usize] = Element::Mark;
            }
        }
        image
    }

    ///
    /// Opens a raster file (PNG or JPEG) and thresholds it, see `from_luma`.
    ///
    /// # Parameters:
    /// - `path`: The path to the raster file
    /// - `threshold`: The luma below which a pixel is marked
    ///
    pub fn open(path: impl AsRef<Path>, threshold: u8) -> Result<Image, ImageError> {
        let raster = image::open(path)?.to_luma8();
        Ok(Image::from_luma(&raster, threshold))
    }

    pub fn from_json(json: &str) -> Result<Image, ImageError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ImageError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Element> {
        self.pixels.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn set(&mut self, x: usize, y: usize, value: Element) -> Result<(), ImageError> {
        let (width, height) = (self.width, self.height);
        match self.pixels.get_mut(y).and_then(|row| row.get_mut(x)) {
            Some(element) => {
                *element = value;
                Ok(())
            }
            None => Err(ImageError::OutOfBounds { x, y, width, height }),
        }
    }

    pub fn row(&self, y: usize) -> Option<&[Element]> {
        self.pixels.get(y).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Element]> {
        self.pixels.iter().map(Vec::as_slice)
    }

    /// Sets every element to blank.
    pub fn clear(&mut self) {
        for row in self.pixels.iter_mut() {
            row.fill(Element::Blank);
        }
    }

    pub fn mark_count(&self) -> usize {
        self.rows().flatten().filter(|element| **element == Element::Mark).count()
    }

    pub fn is_blank(&self) -> bool {
        self.mark_count() == 0
    }

    ///
    /// # Returns:
    /// - A new image with rows and columns swapped, `height` x `width`
    ///
    pub fn transposed(&self) -> Image {
        let mut output = Image::new(self.height, self.width);
        for (y, row) in self.pixels.iter().enumerate() {
            for (x, element) in row.iter().enumerate() {
                output.pixels[x][y] = *element;
            }
        }
        output
    }

    ///
    /// # Returns:
    /// - A new image with every row reversed left to right
    ///
    pub fn mirrored(&self) -> Image {
        let pixels = self.pixels.iter().map(|row| row.iter().rev().copied().collect()).collect();
        Image { width: self.width, height: self.height, pixels }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    use super::Element::{Blank as O, Mark as X};

    fn sample() -> Image {
        Image::from_rows(vec![
            vec![X, O, O],
            vec![O, X, X],
        ]).unwrap()
    }

    #[test]
    fn new_image_is_blank() {
        let image = Image::new(4, 3);
        assert_eq!((image.width(), image.height()), (4, 3));
        assert!(image.is_blank());
        assert_eq!(image.rows().count(), 3);
        assert!(image.rows().all(|row| row.len() == 4));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = Image::from_rows(vec![vec![X, O], vec![O]]);
        assert!(matches!(result, Err(ImageError::RaggedRows { row: 1, expected: 2, found: 1 })));
    }

    #[test]
    fn get_and_set() {
        let mut image = sample();
        assert_eq!(image.get(2, 1), Some(X));
        assert_eq!(image.get(3, 0), None);

        image.set(2, 0, X).unwrap();
        assert_eq!(image.get(2, 0), Some(X));
        assert!(matches!(image.set(0, 2, X), Err(ImageError::OutOfBounds { x: 0, y: 2, .. })));
    }

    #[test]
    fn transposed_swaps_axes_without_touching_source() {
        let image = sample();
        let transposed = image.transposed();

        assert_eq!((transposed.width(), transposed.height()), (2, 3));
        assert_eq!(transposed, Image::from_rows(vec![
            vec![X, O],
            vec![O, X],
            vec![O, X],
        ]).unwrap());
        assert_eq!(image, sample());
    }

    #[test]
    fn mirrored_reverses_rows() {
        assert_eq!(sample().mirrored(), Image::from_rows(vec![
            vec![O, O, X],
            vec![X, X, O],
        ]).unwrap());
    }

    #[test]
    fn clear_blanks_everything() {
        let mut image = sample();
        image.clear();
        assert!(image.is_blank());
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[test]
    fn checker_alternates() {
        let image = &*CHECKER_13X13;
        assert_eq!((image.width(), image.height()), (13, 13));
        assert_eq!(image.get(0, 0), Some(X));
        assert_eq!(image.get(1, 0), Some(O));
        assert_eq!(image.get(0, 1), Some(O));
        assert_eq!(image.mark_count(), 85);
    }

    #[test]
    fn json_format() {
        let json = sample().to_json().unwrap();
        assert_eq!(json, r#"{"width":3,"height":2,"pixels":[[1,0,0],[0,1,1]]}"#);
        assert_eq!(Image::from_json(&json).unwrap(), sample());
    }

    #[test]
    fn json_keeps_the_width_of_an_empty_image() {
        let image = Image::new(5, 0);
        let json = image.to_json().unwrap();
        assert_eq!(json, r#"{"width":5,"height":0,"pixels":[]}"#);

        let parsed = Image::from_json(&json).unwrap();
        assert_eq!((parsed.width(), parsed.height()), (5, 0));
        assert_eq!(parsed, image);
        assert!(Image::from_json(r#"{"width":5,"height":2,"pixels":[]}"#).is_err());
    }

    #[test]
    fn json_metadata_must_match_pixels() {
        let result = Image::from_json(r#"{"width":2,"height":2,"pixels":[[1,0,0],[0,1,1]]}"#);
        assert!(result.is_err());
        assert!(Image::from_json(r#"{"width":1,"height":1,"pixels":[[2]]}"#).is_err());
        assert!(Image::from_json(r#"{"width":2,"height":2,"pixels":[[1,0],[1]]}"#).is_err());
    }

    #[test]
    fn thresholds_greyscale_rasters() {
        let mut raster = GrayImage::from_pixel(3, 2, Luma([255]));
        raster.put_pixel(0, 0, Luma([0]));
        raster.put_pixel(2, 1, Luma([100]));
        raster.put_pixel(1, 1, Luma([200]));

        let image = Image::from_luma(&raster, 128);
        assert_eq!(image, Image::from_rows(vec![
            vec![X, O, O],
            vec![O, O, X],
        ]).unwrap());
    }
}
