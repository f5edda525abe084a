use thiserror::Error;

use crate::hardware::error::MotionError;

///
/// Errors found while loading or validating a printer configuration.
///
/// - `InvalidGeometry`: An axis whose parameters cannot produce a usable travel range
///     Parameters:
///     - `axis`: The name of the axis, e.g. "x"
///     - `reason`: What is wrong with it
/// - `Io`: The configuration file could not be read
/// - `Json`: The configuration file is not valid JSON, or is missing fields
///
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("The {} axis is misconfigured: {}", .axis, .reason)]
    InvalidGeometry { axis: &'static str, reason: String },

    #[error("Could not read the printer configuration: {}", .0)]
    Io(#[from] std::io::Error),

    #[error("Could not parse the printer configuration: {}", .0)]
    Json(#[from] serde_json::Error),
}

///
/// All errors emitted from the printer.
///
#[derive(Error, Debug)]
pub enum PrinterError {
    #[error("A motor command failed: {}", .0)]
    Motion(#[from] MotionError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
