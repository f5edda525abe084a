use thiserror::Error;

///
/// All errors emitted from the bitmap module.
///
/// - `RaggedRows`: A row whose length differs from the first row
///     Parameters:
///     - `row`: The index of the offending row
///     - `expected`: The width of the image
///     - `found`: The length of the offending row
/// - `DimensionMismatch`: Serialized metadata which disagrees with the serialized pixels
/// - `OutOfBounds`: A coordinate outside the image
/// - `InvalidElement`: A serialized element other than 0 or 1
/// - `Json`: The document could not be (de)serialized
/// - `Raster`: A raster file could not be decoded or encoded
///
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Row {} has {} elements, expected {}", .row, .found, .expected)]
    RaggedRows { row: usize, expected: usize, found: usize },

    #[error("The image declares {}x{} but contains {}x{} elements", .declared_width, .declared_height, .width, .height)]
    DimensionMismatch { declared_width: usize, declared_height: usize, width: usize, height: usize },

    #[error("Element ({}, {}) is outside the {}x{} image", .x, .y, .width, .height)]
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },

    #[error("Invalid image element {}, expected 0 or 1", .0)]
    InvalidElement(u8),

    #[error("Invalid image document: {}", .0)]
    Json(#[from] serde_json::Error),

    #[error("Could not decode or encode raster file: {}", .0)]
    Raster(#[from] image::ImageError),
}
