use std::sync::Arc;

use tracing::debug;

use crate::hardware::error::MotionError;
use crate::hardware::math::Angle;
use crate::hardware::{MotorDirection, MotorStop, Robot};

use super::config::PenConfiguration;

///
/// The pen lift. Unlike the X and Y axes it is not a composed chain: the cam is turned straight to
/// an absolute shaft angle, by the shortest direction, using the hub's own position feedback.
///
pub struct PenController {
    configuration: PenConfiguration,
    robot: Arc<dyn Robot>,
}

impl PenController {
    pub fn new(configuration: PenConfiguration, robot: Arc<dyn Robot>) -> PenController {
        PenController { configuration, robot }
    }

    ///
    /// Moves the pen to its raised, non-marking angle.
    ///
    pub async fn raise(&self) -> Result<(), MotionError> {
        self.go_to(*self.configuration.start_angle()).await
    }

    ///
    /// Marks one dot: lowers the pen onto the paper, then raises it again.
    ///
    pub async fn dot(&self) -> Result<(), MotionError> {
        self.go_to(*self.configuration.end_angle()).await?;
        self.go_to(*self.configuration.start_angle()).await
    }

    async fn go_to(&self, angle: Angle) -> Result<(), MotionError> {
        let motor = self.configuration.motor();
        debug!("Pen on port {} going to {}", motor.port(), angle);
        self.robot
            .motor_go_direction_to_position(*motor.port(), angle.whole_degrees(), MotorDirection::Shortest, *motor.speed(), true, MotorStop::Coast)
            .await
    }
}
