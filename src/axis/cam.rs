use async_trait::async_trait;
use tracing::info;

use crate::axis::{AngularAxis, LinearAxis};
use crate::hardware::error::MotionError;
use crate::hardware::math::{angle_to_distance, distance_to_angle, Distance};

///
/// Turns a rotating cam into a linear axis.
///
/// The follower sits at `-cos(angle) * cam_length`, which is monotonic across the half turn
/// [0°, 180°], so every position in [-cam_length, +cam_length] has exactly one cam angle.
///
/// # Fields:
/// - `cam_length`: The length of the cam arm
/// - `motor`: The axis rotating the cam
///
pub struct LinearCamMotorController<A: AngularAxis> {
    cam_length: Distance,
    motor: A,
}

impl<A: AngularAxis> LinearCamMotorController<A> {
    pub fn new(cam_length: Distance, motor: A) -> LinearCamMotorController<A> {
        LinearCamMotorController { cam_length, motor }
    }

    pub fn cam_length(&self) -> Distance {
        self.cam_length
    }

    pub fn inner(&self) -> &A {
        &self.motor
    }

    async fn go_to(&mut self, position: Distance) -> Result<(), MotionError> {
        let position = position.clamp(self.minimum_position(), self.maximum_position());
        let angle = distance_to_angle(position, self.cam_length);
        self.motor.move_to(angle).await
    }
}

#[async_trait]
impl<A: AngularAxis> LinearAxis for LinearCamMotorController<A> {
    fn position(&self) -> Distance {
        angle_to_distance(self.motor.angle(), self.cam_length)
    }

    fn minimum_position(&self) -> Distance {
        -self.cam_length
    }

    fn maximum_position(&self) -> Distance {
        self.cam_length
    }

    /// Returns the cam to 0°, fully retracted.
    async fn home(&mut self) -> Result<(), MotionError> {
        self.motor.zero().await
    }

    async fn zero(&mut self) -> Result<(), MotionError> {
        self.motor.zero().await
    }

    async fn move_to(&mut self, position: Distance) -> Result<(), MotionError> {
        info!("Cam moving to {}", position);
        self.go_to(position).await
    }

    async fn move_by(&mut self, distance: Distance) -> Result<(), MotionError> {
        info!("Cam moving by {}", distance);
        let position = self.position() + distance;
        self.go_to(position).await
    }
}
