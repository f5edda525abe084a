//!
//! Composable motor axes. A physical axis is built as a chain of decorators around one direct motor,
//! e.g. backlash → cam → gear → direct, each one owning the next.
//!

use async_trait::async_trait;

use crate::hardware::error::MotionError;
use crate::hardware::math::{Angle, Distance};

pub mod backlash;
pub mod cam;
pub mod direct;
pub mod geared;

pub use backlash::LinearBacklashMotorController;
pub use cam::LinearCamMotorController;
pub use direct::DirectMotorController;
pub use geared::GearedMotorController;

///
/// Anything which can be rotated to an angle.
///
/// # Functions:
/// - `angle`: The current angle, as tracked by the controller
/// - `minimum_angle`, `maximum_angle`: The closed range of reachable angles
/// - `home`: Moves to the mechanical reference of the implementation
/// - `zero`: Returns to the software-tracked zero angle
/// - `move_to`: Moves to an absolute angle
/// - `move_by`: Moves by a relative angle
///
#[async_trait]
pub trait AngularAxis: Send {
    fn angle(&self) -> Angle;
    fn minimum_angle(&self) -> Angle;
    fn maximum_angle(&self) -> Angle;

    async fn home(&mut self) -> Result<(), MotionError>;
    async fn zero(&mut self) -> Result<(), MotionError>;
    async fn move_to(&mut self, angle: Angle) -> Result<(), MotionError>;
    async fn move_by(&mut self, angle: Angle) -> Result<(), MotionError>;
}

///
/// Anything which can be driven to a linear position. Same shape as `AngularAxis`, over distances.
///
#[async_trait]
pub trait LinearAxis: Send {
    fn position(&self) -> Distance;
    fn minimum_position(&self) -> Distance;
    fn maximum_position(&self) -> Distance;

    async fn home(&mut self) -> Result<(), MotionError>;
    async fn zero(&mut self) -> Result<(), MotionError>;
    async fn move_to(&mut self, position: Distance) -> Result<(), MotionError>;
    async fn move_by(&mut self, distance: Distance) -> Result<(), MotionError>;
}
