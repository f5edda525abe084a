use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

///
/// A planar angle. Stored in degrees; radians are converted on demand.
///
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle {
    degrees: f64,
}

impl Angle {
    pub const ZERO: Angle = Angle { degrees: 0. };

    pub fn from_degrees(degrees: f64) -> Angle {
        Angle { degrees }
    }

    pub fn from_radians(radians: f64) -> Angle {
        Angle { degrees: radians.to_degrees() }
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    pub fn radians(&self) -> f64 {
        self.degrees.to_radians()
    }

    ///
    /// # Returns:
    /// - The angle rounded to the nearest whole degree, as sent to a motor
    ///
    pub fn whole_degrees(&self) -> i32 {
        self.degrees.round() as i32
    }

    ///
    /// # Returns:
    /// - The angle wrapped into [0°, 360°)
    ///
    pub fn normalized(&self) -> Angle {
        Angle { degrees: self.degrees.rem_euclid(360.) }
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees)
    }
}

///
/// A linear distance. Stored in millimetres.
///
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distance {
    millimetres: f64,
}

impl Distance {
    pub const ZERO: Distance = Distance { millimetres: 0. };

    pub fn from_millimetres(millimetres: f64) -> Distance {
        Distance { millimetres }
    }

    pub fn millimetres(&self) -> f64 {
        self.millimetres
    }

    ///
    /// Restricts the distance to the closed range `[min, max]`.
    /// `min` must not be greater than `max`.
    ///
    pub fn clamp(self, min: Distance, max: Distance) -> Distance {
        Distance { millimetres: self.millimetres.clamp(min.millimetres, max.millimetres) }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}mm", self.millimetres)
    }
}

macro_rules! impl_quantity_ops {
    ($ty:ident, $field:ident) => {
        impl Add for $ty {
            type Output = $ty;
            fn add(self, rhs: $ty) -> $ty {
                $ty { $field: self.$field + rhs.$field }
            }
        }

        impl AddAssign for $ty {
            fn add_assign(&mut self, rhs: $ty) {
                self.$field += rhs.$field;
            }
        }

        impl Sub for $ty {
            type Output = $ty;
            fn sub(self, rhs: $ty) -> $ty {
                $ty { $field: self.$field - rhs.$field }
            }
        }

        impl SubAssign for $ty {
            fn sub_assign(&mut self, rhs: $ty) {
                self.$field -= rhs.$field;
            }
        }

        impl Mul<f64> for $ty {
            type Output = $ty;
            fn mul(self, rhs: f64) -> $ty {
                $ty { $field: self.$field * rhs }
            }
        }

        impl Div<f64> for $ty {
            type Output = $ty;
            fn div(self, rhs: f64) -> $ty {
                $ty { $field: self.$field / rhs }
            }
        }

        impl Neg for $ty {
            type Output = $ty;
            fn neg(self) -> $ty {
                $ty { $field: -self.$field }
            }
        }
    };
}

impl_quantity_ops!(Angle, degrees);
impl_quantity_ops!(Distance, millimetres);

///
/// Converts a cam angle into the linear displacement of the cam follower.
/// The cam is fully retracted (`-cam_length`) at 0° and fully extended (`+cam_length`) at 180°.
///
/// # Parameters:
/// - `angle`: The angle of the cam shaft
/// - `cam_length`: The length of the cam arm
///
/// # Returns:
/// - The displacement of the follower, in the range [-cam_length, +cam_length]
///
pub fn angle_to_distance(angle: Angle, cam_length: Distance) -> Distance {
    Distance::from_millimetres(-angle.radians().cos() * cam_length.millimetres())
}

///
/// Converts a linear displacement back into the cam angle which produces it.
/// The displacement is clamped into [-cam_length, +cam_length] first, so floating point overshoot
/// never reaches `acos` outside of its domain.
///
/// # Parameters:
/// - `distance`: The requested displacement of the follower
/// - `cam_length`: The length of the cam arm
///
/// # Returns:
/// - The principal cam angle, in the range [0°, 180°]
///
pub fn distance_to_angle(distance: Distance, cam_length: Distance) -> Angle {
    let clamped = distance.clamp(-cam_length, cam_length);
    let ratio = (-clamped.millimetres() / cam_length.millimetres()).clamp(-1., 1.);
    Angle::from_radians(ratio.acos())
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn unit_conversions() {
        let angle = Angle::from_radians(std::f64::consts::PI);
        assert!((angle.degrees() - 180.).abs() < 1e-12);
        assert!((Angle::from_degrees(90.).radians() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(Angle::from_degrees(12.5).whole_degrees(), 13);
        assert_eq!(Angle::from_degrees(-12.4).whole_degrees(), -12);
    }

    #[test]
    fn normalized_wraps_negative_angles() {
        assert_eq!(Angle::from_degrees(-90.).normalized(), Angle::from_degrees(270.));
        assert_eq!(Angle::from_degrees(720.).normalized(), Angle::ZERO);
    }

    #[test]
    fn cam_extremes() {
        let length = Distance::from_millimetres(8.);
        assert!((angle_to_distance(Angle::ZERO, length).millimetres() + 8.).abs() < TOLERANCE);
        assert!((angle_to_distance(Angle::from_degrees(90.), length).millimetres()).abs() < TOLERANCE);
        assert!((angle_to_distance(Angle::from_degrees(180.), length).millimetres() - 8.).abs() < TOLERANCE);
    }

    #[test]
    fn cam_distance_round_trip() {
        let length = Distance::from_millimetres(8.);
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let d = Distance::from_millimetres(rng.random_range(-8.0..=8.0));
            let back = angle_to_distance(distance_to_angle(d, length), length);
            assert!((back - d).millimetres().abs() < TOLERANCE, "{} came back as {}", d, back);
        }
    }

    #[test]
    fn cam_angle_round_trip() {
        let length = Distance::from_millimetres(8.);
        for degrees in 0..=180 {
            let a = Angle::from_degrees(degrees as f64);
            let back = distance_to_angle(angle_to_distance(a, length), length);
            assert!((back - a).degrees().abs() < TOLERANCE, "{} came back as {}", a, back);
        }
    }

    #[test]
    fn cam_clamps_out_of_range_distances() {
        let length = Distance::from_millimetres(8.);
        let overshoot = distance_to_angle(Distance::from_millimetres(8.0000001), length);
        assert!((overshoot.degrees() - 180.).abs() < TOLERANCE);
        assert_eq!(distance_to_angle(Distance::from_millimetres(-50.), length), Angle::ZERO);
    }
}
