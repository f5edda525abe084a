use async_trait::async_trait;
use tracing::info;

use crate::axis::AngularAxis;
use crate::hardware::error::MotionError;
use crate::hardware::math::Angle;

///
/// Exposes the angle of a gearbox output shaft, given the motor (or axis) driving its input.
///
/// # Fields:
/// - `ratio`: Input revolutions per output revolution
/// - `motor`: The axis driving the input shaft
///
pub struct GearedMotorController<A: AngularAxis> {
    ratio: f64,
    motor: A,
}

impl<A: AngularAxis> GearedMotorController<A> {
    pub fn new(ratio: f64, motor: A) -> GearedMotorController<A> {
        GearedMotorController { ratio, motor }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn inner(&self) -> &A {
        &self.motor
    }
}

#[async_trait]
impl<A: AngularAxis> AngularAxis for GearedMotorController<A> {
    fn angle(&self) -> Angle {
        self.motor.angle() / self.ratio
    }

    fn minimum_angle(&self) -> Angle {
        self.motor.minimum_angle() / self.ratio
    }

    fn maximum_angle(&self) -> Angle {
        self.motor.maximum_angle() / self.ratio
    }

    async fn home(&mut self) -> Result<(), MotionError> {
        self.motor.home().await
    }

    async fn zero(&mut self) -> Result<(), MotionError> {
        self.motor.zero().await
    }

    // Always relative: an absolute move on the input would wrap at its own full turn, which does
    // not correspond to the output angle.
    async fn move_to(&mut self, angle: Angle) -> Result<(), MotionError> {
        info!("Geared output moving to angle {}", angle);
        let delta = angle - self.angle();
        self.motor.move_by(delta * self.ratio).await
    }

    async fn move_by(&mut self, angle: Angle) -> Result<(), MotionError> {
        info!("Geared output moving by angle {}", angle);
        self.motor.move_by(angle * self.ratio).await
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::axis::DirectMotorController;
    use crate::hardware::MotorPort;
    use crate::hardware::simulated::{MotorCommand, SimulatedRobot};

    fn geared(robot: &Arc<SimulatedRobot>, ratio: f64) -> GearedMotorController<DirectMotorController> {
        GearedMotorController::new(ratio, DirectMotorController::new(MotorPort::D, 10, Angle::from_degrees(360.), robot.clone()))
    }

    #[test]
    fn bounds_are_divided_by_ratio() {
        let robot = Arc::new(SimulatedRobot::new());
        let axis = geared(&robot, 24.);
        assert_eq!(axis.minimum_angle(), Angle::ZERO);
        assert_eq!(axis.maximum_angle(), Angle::from_degrees(359. / 24.));
        assert!(axis.minimum_angle() < axis.maximum_angle());
    }

    #[tokio::test]
    async fn output_angle_tracks_motor_angle() {
        let robot = Arc::new(SimulatedRobot::new());
        let mut axis = geared(&robot, 24.);

        let steps = [10., 2.5, -7.25, 0.01, 90., -45.];
        for step in steps {
            axis.move_by(Angle::from_degrees(step)).await.unwrap();
            assert_eq!(axis.angle(), axis.inner().angle() / 24.);
        }

        // drift is bounded by half a motor degree per move
        let requested: f64 = steps.iter().sum();
        let drift = (axis.angle().degrees() - requested).abs();
        assert!(drift <= steps.len() as f64 * 0.5 / 24.);
    }

    #[tokio::test]
    async fn move_to_is_relative_on_the_motor() {
        let robot = Arc::new(SimulatedRobot::new());
        let mut axis = geared(&robot, 24.);

        axis.move_to(Angle::from_degrees(30.)).await.unwrap();
        axis.move_to(Angle::from_degrees(20.)).await.unwrap();

        assert_eq!(axis.angle(), Angle::from_degrees(20.));
        assert_eq!(robot.commands(), vec![
            MotorCommand::RunForDegrees { port: MotorPort::D, degrees: 720, speed: 10 },
            MotorCommand::RunForDegrees { port: MotorPort::D, degrees: -240, speed: 10 },
        ]);
    }

    #[tokio::test]
    async fn zero_delegates_to_motor() {
        let robot = Arc::new(SimulatedRobot::new());
        let mut axis = geared(&robot, 3.);

        axis.move_by(Angle::from_degrees(100.)).await.unwrap();
        axis.zero().await.unwrap();
        assert_eq!(axis.angle(), Angle::ZERO);
        assert_eq!(robot.position(MotorPort::D), 0);
    }
}
