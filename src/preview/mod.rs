//!
//! Image-based preview generation and related components
//!

use std::path::Path;

use crate::bitmap::error::ImageError;
use crate::bitmap::{Element, Image};
use crate::hardware::math::Distance;
use crate::printer::config::{AxisConfiguration, PrinterConfiguration};

pub mod canvas;

/// Pixels per millimetre of the saved preview.
const PREVIEW_SCALE: u32 = 20;

///
/// Computes where the plot sequence lowers the pen for every mark, replaying the equal-step
/// raster walk over each axis' usable travel.
///
/// # Parameters:
/// - `image`: The image to be plotted
/// - `configuration`: The printer configuration, which gives each axis' travel
///
/// # Returns:
/// - The (x, y) axis position of every dot, in plotting order
///
pub fn dot_positions(image: &Image, configuration: &PrinterConfiguration) -> Vec<(Distance, Distance)> {
    let (min_x, step_x) = travel_steps(configuration.x_axis(), image.width());
    let (min_y, step_y) = travel_steps(configuration.y_axis(), image.height());

    let mut positions = vec![];
    for (y, row) in image.rows().enumerate() {
        for (x, element) in row.iter().enumerate() {
            if *element == Element::Mark {
                positions.push((min_x + step_x * (x + 1) as f64, min_y + step_y * (y + 1) as f64));
            }
        }
    }
    positions
}

///
/// Renders a dry run of the plot and saves it as a PNG. The canvas spans the full cam travel of
/// both axes, with the usable (backlash compensated) travel outlined.
///
/// # Parameters:
/// - `image`: The image to preview
/// - `configuration`: The printer configuration
/// - `path`: The path to save the preview to - *no checks are done to confirm the directory exists*
///
/// # Returns:
/// - Void if the preview was saved
/// - An `ImageError` if the file could not be written
///
pub fn generate_preview(image: &Image, configuration: &PrinterConfiguration, path: impl AsRef<Path>) -> Result<(), ImageError> {
    let x_length = *configuration.x_axis().cam_length();
    let y_length = *configuration.y_axis().cam_length();
    let mut preview_canvas = canvas::PreviewCanvas::new(
        (x_length * 2.).millimetres(),
        (y_length * 2.).millimetres(),
        Some(PREVIEW_SCALE),
    );

    // canvas coordinates start at the fully retracted end of each cam
    let (min_x, step_x) = travel_steps(configuration.x_axis(), image.width());
    let (min_y, step_y) = travel_steps(configuration.y_axis(), image.height());
    preview_canvas.outline(
        (min_x + x_length).millimetres(),
        (min_y + y_length).millimetres(),
        (x_length * 2.).millimetres(),
        (y_length * 2.).millimetres(),
    );

    let radius = step_x.millimetres().min(step_y.millimetres()).abs() * 0.4;
    for (x, y) in dot_positions(image, configuration) {
        preview_canvas.dot((x + x_length).millimetres(), (y + y_length).millimetres(), radius);
    }

    preview_canvas.save(path)?;
    Ok(())
}

/// The usable minimum of an axis, and the size of one raster step across `steps` cells.
fn travel_steps(axis: &AxisConfiguration, steps: usize) -> (Distance, Distance) {
    let minimum = -*axis.cam_length() + *axis.backlash();
    let maximum = *axis.cam_length();
    (minimum, (maximum - minimum) / steps.max(1) as f64)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Element::{Blank as O, Mark as X};

    #[test]
    fn dots_land_on_raster_steps() {
        let image = Image::from_rows(vec![vec![X, O], vec![O, X]]).unwrap();
        let positions = dot_positions(&image, &PrinterConfiguration::default());

        assert_eq!(positions, vec![
            (Distance::from_millimetres(1.5), Distance::from_millimetres(1.5)),
            (Distance::from_millimetres(8.), Distance::from_millimetres(8.)),
        ]);
    }

    #[test]
    fn blank_image_has_no_dots() {
        assert!(dot_positions(&Image::new(4, 4), &PrinterConfiguration::default()).is_empty());
    }

    #[test]
    fn preview_canvas_covers_full_travel() {
        let canvas = canvas::PreviewCanvas::new(16., 16., Some(PREVIEW_SCALE));
        assert_eq!((canvas.width, canvas.height), (320, 320));
    }

    #[test]
    fn dot_darkens_its_centre() {
        let mut canvas = canvas::PreviewCanvas::new(16., 16., Some(PREVIEW_SCALE));
        canvas.dot(8., 8., 1.);
        assert_eq!(canvas.buffer.get_pixel(160, 160).0[0], 0);
        assert_eq!(canvas.buffer.get_pixel(5, 5).0[0], 255);
    }

    #[test]
    fn saves_a_png() {
        let path = std::env::temp_dir().join(format!("printy-preview-{}.png", std::process::id()));
        generate_preview(&Image::checker(4, 4), &PrinterConfiguration::default(), &path).unwrap();

        let raster = image::open(&path).unwrap().to_luma8();
        assert_eq!(raster.dimensions(), (320, 320));
        let _ = std::fs::remove_file(&path);
    }
}
