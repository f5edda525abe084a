use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, trace};

use crate::axis::AngularAxis;
use crate::hardware::error::MotionError;
use crate::hardware::math::Angle;
use crate::hardware::{MotorPort, Robot};

///
/// Drives one motor port with relative commands.
///
/// The hub has no persistent absolute encoder reference, so the absolute angle is a signed count
/// of every degree commanded since construction. It starts at zero, which is assumed to be the
/// physical zero at power-on. The counter moves by the commanded (rounded) value, never by what the
/// motor actually achieved.
///
/// # Fields:
/// - `port`: The hub port of the motor
/// - `speed`: The speed used for every move
/// - `degrees`: The software-tracked absolute angle, in whole degrees
/// - `resolution`: The full-scale angle of the motor
/// - `robot`: The hub which executes the commands
///
pub struct DirectMotorController {
    port: MotorPort,
    speed: i32,
    degrees: i32,
    resolution: Angle,
    robot: Arc<dyn Robot>,
}

impl DirectMotorController {
    ///
    /// # Parameters:
    /// - `port`: The hub port of the motor
    /// - `speed`: The speed used for every move
    /// - `resolution`: The full-scale angle, 360° for a standard motor
    /// - `robot`: The hub which executes the commands
    ///
    pub fn new(port: MotorPort, speed: i32, resolution: Angle, robot: Arc<dyn Robot>) -> DirectMotorController {
        DirectMotorController { port, speed, degrees: 0, resolution, robot }
    }

    pub fn port(&self) -> MotorPort {
        self.port
    }

    ///
    /// # Returns:
    /// - The tracked angle wrapped into [0°, 360°), for display
    ///
    pub fn heading(&self) -> Angle {
        self.angle().normalized()
    }

    async fn run_for_degrees(&mut self, degrees: i32) -> Result<(), MotionError> {
        if degrees == 0 {
            trace!("Port {}: skipping zero degree move", self.port);
            return Ok(());
        }

        debug!("Port {}: run for {} degrees at speed {}", self.port, degrees, self.speed);
        self.robot.motor_run_for_degrees(self.port, degrees, self.speed, true).await?;
        self.degrees += degrees;
        Ok(())
    }
}

#[async_trait]
impl AngularAxis for DirectMotorController {
    /// The unwrapped absolute angle. Decorators rely on this never wrapping.
    fn angle(&self) -> Angle {
        Angle::from_degrees(self.degrees as f64)
    }

    fn minimum_angle(&self) -> Angle {
        Angle::ZERO
    }

    fn maximum_angle(&self) -> Angle {
        self.resolution - Angle::from_degrees(1.)
    }

    async fn home(&mut self) -> Result<(), MotionError> {
        self.zero().await
    }

    async fn zero(&mut self) -> Result<(), MotionError> {
        self.run_for_degrees(-self.degrees).await
    }

    async fn move_to(&mut self, angle: Angle) -> Result<(), MotionError> {
        info!("Port {}: moving to angle {}", self.port, angle);
        let delta = angle.whole_degrees() - self.degrees;
        self.run_for_degrees(delta).await
    }

    async fn move_by(&mut self, angle: Angle) -> Result<(), MotionError> {
        info!("Port {}: moving by angle {}", self.port, angle);
        self.run_for_degrees(angle.whole_degrees()).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::simulated::{MotorCommand, SimulatedRobot};

    fn controller(robot: &Arc<SimulatedRobot>) -> DirectMotorController {
        DirectMotorController::new(MotorPort::F, 10, Angle::from_degrees(360.), robot.clone())
    }

    #[test]
    fn reports_full_scale_bounds() {
        let robot = Arc::new(SimulatedRobot::new());
        let motor = controller(&robot);
        assert_eq!(motor.minimum_angle(), Angle::ZERO);
        assert_eq!(motor.maximum_angle(), Angle::from_degrees(359.));
    }

    #[tokio::test]
    async fn move_to_issues_rounded_delta() {
        let robot = Arc::new(SimulatedRobot::new());
        let mut motor = controller(&robot);

        motor.move_to(Angle::from_degrees(90.4)).await.unwrap();
        motor.move_to(Angle::from_degrees(45.6)).await.unwrap();

        assert_eq!(motor.angle(), Angle::from_degrees(46.));
        assert_eq!(robot.commands(), vec![
            MotorCommand::RunForDegrees { port: MotorPort::F, degrees: 90, speed: 10 },
            MotorCommand::RunForDegrees { port: MotorPort::F, degrees: -44, speed: 10 },
        ]);
    }

    #[tokio::test]
    async fn move_by_accumulates_rounding() {
        let robot = Arc::new(SimulatedRobot::new());
        let mut motor = controller(&robot);

        for _ in 0..4 {
            motor.move_by(Angle::from_degrees(0.6)).await.unwrap();
        }

        // each 0.6° request is commanded as 1°
        assert_eq!(motor.angle(), Angle::from_degrees(4.));
        assert_eq!(robot.position(MotorPort::F), 4);
    }

    #[tokio::test]
    async fn zero_returns_to_power_on_reference() {
        let robot = Arc::new(SimulatedRobot::new());
        let mut motor = controller(&robot);

        motor.move_by(Angle::from_degrees(400.)).await.unwrap();
        assert_eq!(motor.angle(), Angle::from_degrees(400.));
        assert_eq!(motor.heading(), Angle::from_degrees(40.));

        motor.zero().await.unwrap();
        assert_eq!(motor.angle(), Angle::ZERO);
        assert_eq!(robot.position(MotorPort::F), 0);

        // already at zero: nothing reaches the hub
        motor.home().await.unwrap();
        assert_eq!(robot.commands().len(), 2);
    }

    #[tokio::test]
    async fn failed_command_leaves_counter_untouched() {
        let robot = Arc::new(SimulatedRobot::new());
        let mut motor = controller(&robot);
        robot.fail_on_command(1, MotionError::Stalled { port: MotorPort::F });

        let result = motor.move_by(Angle::from_degrees(30.)).await;
        assert_eq!(result, Err(MotionError::Stalled { port: MotorPort::F }));
        assert_eq!(motor.angle(), Angle::ZERO);
    }
}
