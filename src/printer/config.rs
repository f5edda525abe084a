use std::path::Path;

use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::hardware::MotorPort;
use crate::hardware::math::{Angle, Distance};

use super::error::ConfigurationError;

///
/// A motor, and the speed it is always driven at.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[get = "pub"]
pub struct MotorConfiguration {
    port: MotorPort,
    speed: i32,
}

impl MotorConfiguration {
    pub fn new(port: MotorPort, speed: i32) -> MotorConfiguration {
        MotorConfiguration { port, speed }
    }
}

///
/// A cam-driven linear axis, geared down from its motor.
/// All lengths are measured in millimetres, all angles in degrees.
///
/// # Fields:
/// - `motor`: The motor driving the gearbox
/// - `ratio`: Motor revolutions per cam revolution
/// - `cam_length`: The length of the cam arm, which is half the travel of the axis
/// - `resolution`: The full-scale angle of the motor
/// - `backlash`: The slack taken up when homing, removed from the bottom of the travel
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[get = "pub"]
pub struct AxisConfiguration {
    motor: MotorConfiguration,
    ratio: f64,
    cam_length: Distance,
    resolution: Angle,
    backlash: Distance,
}

impl AxisConfiguration {
    pub fn new(motor: MotorConfiguration, ratio: f64, cam_length: Distance, resolution: Angle, backlash: Distance) -> AxisConfiguration {
        AxisConfiguration { motor, ratio, cam_length, resolution, backlash }
    }

    fn validate(&self, axis: &'static str) -> Result<(), ConfigurationError> {
        let invalid = |reason: String| -> Result<(), ConfigurationError> { Err(ConfigurationError::InvalidGeometry { axis, reason }) };

        if self.motor.speed == 0 {
            return invalid("the motor speed is zero".to_owned());
        }
        if !(self.ratio > 0.) || !self.ratio.is_finite() {
            return invalid(format!("the gear ratio must be positive, got {}", self.ratio));
        }
        if !(self.cam_length > Distance::ZERO) || !self.cam_length.millimetres().is_finite() {
            return invalid(format!("the cam length must be positive, got {}", self.cam_length));
        }
        if !(self.resolution > Angle::from_degrees(1.)) || self.resolution > Angle::from_degrees(360.) {
            return invalid(format!("the resolution must be within (1°, 360°], got {}", self.resolution));
        }
        let backlash = self.backlash.millimetres();
        if !backlash.is_finite() || self.backlash < Distance::ZERO || self.backlash >= self.cam_length * 2. {
            return invalid(format!("the backlash {} leaves no travel on a {} cam", self.backlash, self.cam_length));
        }
        Ok(())
    }
}

///
/// The pen lift. A cam turned directly to one of two absolute shaft angles.
///
/// # Fields:
/// - `motor`: The pen motor
/// - `start_angle`: The raised, non-marking angle
/// - `end_angle`: The lowered, marking angle
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[get = "pub"]
pub struct PenConfiguration {
    motor: MotorConfiguration,
    start_angle: Angle,
    end_angle: Angle,
}

impl PenConfiguration {
    pub fn new(motor: MotorConfiguration, start_angle: Angle, end_angle: Angle) -> PenConfiguration {
        PenConfiguration { motor, start_angle, end_angle }
    }
}

///
/// The static layout of the plotter, read once at startup.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[get = "pub"]
pub struct PrinterConfiguration {
    x_axis: AxisConfiguration,
    y_axis: AxisConfiguration,
    pen_axis: PenConfiguration,
}

impl PrinterConfiguration {
    pub fn new(x_axis: AxisConfiguration, y_axis: AxisConfiguration, pen_axis: PenConfiguration) -> PrinterConfiguration {
        PrinterConfiguration { x_axis, y_axis, pen_axis }
    }

    ///
    /// Parses and validates a configuration.
    ///
    /// # Parameters:
    /// - `json`: The configuration, as a JSON document
    ///
    /// # Returns:
    /// - A valid `PrinterConfiguration`
    /// - A `ConfigurationError` if the document is malformed, or describes an unusable machine
    ///
    pub fn from_json_str(json: &str) -> Result<PrinterConfiguration, ConfigurationError> {
        let configuration: PrinterConfiguration = serde_json::from_str(json)?;
        configuration.validate()?;
        Ok(configuration)
    }

    ///
    /// Reads, parses and validates a configuration file.
    ///
    pub fn load(path: impl AsRef<Path>) -> Result<PrinterConfiguration, ConfigurationError> {
        let json = std::fs::read_to_string(path)?;
        PrinterConfiguration::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigurationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    ///
    /// Checks every composed axis has a non-empty travel range.
    ///
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.x_axis.validate("x")?;
        self.y_axis.validate("y")?;

        if self.pen_axis.motor.speed == 0 {
            return Err(ConfigurationError::InvalidGeometry { axis: "pen", reason: "the motor speed is zero".to_owned() });
        }
        Ok(())
    }
}

impl Default for PrinterConfiguration {
    fn default() -> Self {
        let axis = |port| AxisConfiguration {
            motor: MotorConfiguration::new(port, 10),
            ratio: 24.,
            cam_length: Distance::from_millimetres(8.),
            resolution: Angle::from_degrees(360.),
            backlash: Distance::from_millimetres(3.),
        };

        PrinterConfiguration {
            x_axis: axis(MotorPort::F),
            y_axis: axis(MotorPort::D),
            pen_axis: PenConfiguration {
                motor: MotorConfiguration::new(MotorPort::B, 30),
                start_angle: Angle::from_degrees(290.),
                end_angle: Angle::from_degrees(330.),
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let configuration = PrinterConfiguration::default();
        assert!(configuration.validate().is_ok());
        assert_eq!(*configuration.x_axis().motor().port(), MotorPort::F);
        assert_eq!(*configuration.pen_axis().end_angle(), Angle::from_degrees(330.));
    }

    #[test]
    fn json_round_trip() {
        let configuration = PrinterConfiguration::default();
        let json = configuration.to_json_string().unwrap();
        assert_eq!(PrinterConfiguration::from_json_str(&json).unwrap(), configuration);
    }

    #[test]
    fn parses_plain_numbers() {
        let json = r#"{
            "x_axis": { "motor": { "port": "A", "speed": 20 }, "ratio": 12, "cam_length": 10, "resolution": 360, "backlash": 2 },
            "y_axis": { "motor": { "port": "C", "speed": 20 }, "ratio": 12, "cam_length": 10, "resolution": 360, "backlash": 2 },
            "pen_axis": { "motor": { "port": "E", "speed": 50 }, "start_angle": 0, "end_angle": 45 }
        }"#;
        let configuration = PrinterConfiguration::from_json_str(json).unwrap();
        assert_eq!(*configuration.x_axis().cam_length(), Distance::from_millimetres(10.));
        assert_eq!(*configuration.y_axis().motor().port(), MotorPort::C);
    }

    #[test]
    fn rejects_backlash_wider_than_travel() {
        let mut configuration = PrinterConfiguration::default();
        configuration.y_axis.backlash = Distance::from_millimetres(16.);
        assert!(matches!(configuration.validate(), Err(ConfigurationError::InvalidGeometry { axis: "y", .. })));
    }

    #[test]
    fn rejects_non_positive_ratio() {
        let mut configuration = PrinterConfiguration::default();
        configuration.x_axis.ratio = 0.;
        assert!(matches!(configuration.validate(), Err(ConfigurationError::InvalidGeometry { axis: "x", .. })));
    }

    #[test]
    fn rejects_non_finite_geometry() {
        let mut configuration = PrinterConfiguration::default();
        configuration.x_axis.backlash = Distance::from_millimetres(f64::NAN);
        assert!(matches!(configuration.validate(), Err(ConfigurationError::InvalidGeometry { axis: "x", .. })));

        let mut configuration = PrinterConfiguration::default();
        configuration.y_axis.ratio = f64::INFINITY;
        assert!(matches!(configuration.validate(), Err(ConfigurationError::InvalidGeometry { axis: "y", .. })));

        let mut configuration = PrinterConfiguration::default();
        configuration.x_axis.cam_length = Distance::from_millimetres(f64::INFINITY);
        assert!(configuration.validate().is_err());

        let mut configuration = PrinterConfiguration::default();
        configuration.x_axis.resolution = Angle::from_degrees(f64::NAN);
        assert!(configuration.validate().is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(PrinterConfiguration::from_json_str("{"), Err(ConfigurationError::Json(_))));
    }
}
