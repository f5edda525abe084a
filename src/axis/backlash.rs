use async_trait::async_trait;
use tracing::{debug, info};

use crate::axis::LinearAxis;
use crate::hardware::error::MotionError;
use crate::hardware::math::Distance;

///
/// Absorbs the slack of a linear axis by only ever moving it in the positive direction.
///
/// Homing pre-loads the slack by zeroing the inner axis and then travelling up to the minimum, so
/// the usable range starts `backlash` above the inner minimum. After that any request which does
/// not increase the position is dropped. Reverse passes go through `zero` and `home` instead.
///
/// # Fields:
/// - `backlash`: The amount of slack to take up
/// - `motor`: The linear axis being compensated
///
pub struct LinearBacklashMotorController<L: LinearAxis> {
    backlash: Distance,
    motor: L,
}

impl<L: LinearAxis> LinearBacklashMotorController<L> {
    pub fn new(backlash: Distance, motor: L) -> LinearBacklashMotorController<L> {
        LinearBacklashMotorController { backlash, motor }
    }

    pub fn backlash(&self) -> Distance {
        self.backlash
    }

    pub fn inner(&self) -> &L {
        &self.motor
    }
}

#[async_trait]
impl<L: LinearAxis> LinearAxis for LinearBacklashMotorController<L> {
    fn position(&self) -> Distance {
        self.motor.position()
    }

    fn minimum_position(&self) -> Distance {
        self.motor.minimum_position() + self.backlash
    }

    fn maximum_position(&self) -> Distance {
        self.motor.maximum_position()
    }

    async fn home(&mut self) -> Result<(), MotionError> {
        let minimum = self.minimum_position();
        self.motor.zero().await?;
        self.motor.move_to(minimum).await
    }

    async fn zero(&mut self) -> Result<(), MotionError> {
        self.motor.zero().await
    }

    async fn move_to(&mut self, position: Distance) -> Result<(), MotionError> {
        info!("Backlash axis moving to {}", position);
        if position <= self.position() {
            debug!("Ignoring move to {}, not beyond current position {}", position, self.position());
            return Ok(());
        }
        let position = position.clamp(self.minimum_position(), self.maximum_position());
        self.motor.move_to(position).await
    }

    async fn move_by(&mut self, distance: Distance) -> Result<(), MotionError> {
        info!("Backlash axis moving by {}", distance);
        if distance <= Distance::ZERO {
            debug!("Ignoring non-positive move by {}", distance);
            return Ok(());
        }
        self.motor.move_by(distance).await
    }
}
