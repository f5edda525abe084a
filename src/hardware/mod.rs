//!
//! Physical hardware representations, and the contract of the hub which drives the motors
//!

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use error::MotionError;

pub mod error;
pub mod math;
pub mod simulated;

///
/// One of the motor connectors on the hub. Assigned in the configuration and never changed.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotorPort {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl fmt::Display for MotorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MotorPort::A => "A",
            MotorPort::B => "B",
            MotorPort::C => "C",
            MotorPort::D => "D",
            MotorPort::E => "E",
            MotorPort::F => "F",
        };
        f.write_str(name)
    }
}

///
/// The direction a motor takes when asked to go to an absolute position.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorDirection {
    Shortest,
    Clockwise,
    CounterClockwise,
}

///
/// What the motor does once it stops.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorStop {
    #[default]
    Coast,
    Brake,
    Hold,
}

///
/// The state of the link between this process and the hub.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    NotConnected,
    Connecting,
    Connected,
}

///
/// The hub transport which owns the physical motors.
///
/// Long running commands resolve once the hub reports the move as complete, or fail with a
/// `MotionError` when it reports a stall or the link drops. `motor_start` and `motor_stop` are
/// fire-and-forget: they resolve as soon as the hub has accepted the command.
///
/// Implementations must be shareable, since every motor controller holds a handle to the same hub.
///
#[async_trait]
pub trait Robot: Send + Sync {
    /// Starts connecting to the hub. Progress is reported on `connection_status`.
    async fn connect(&self);

    /// Drops any existing link and connects again.
    async fn reconnect(&self);

    /// A receiver which observes every change in the connection state.
    fn connection_status(&self) -> watch::Receiver<ConnectionStatus>;

    /// Turns the motor by a relative number of degrees.
    async fn motor_run_for_degrees(&self, port: MotorPort, degrees: i32, speed: i32, stall: bool) -> Result<(), MotionError>;

    /// Turns the motor to an absolute shaft position in whole degrees.
    async fn motor_go_direction_to_position(
        &self,
        port: MotorPort,
        position: i32,
        direction: MotorDirection,
        speed: i32,
        stall: bool,
        stop: MotorStop,
    ) -> Result<(), MotionError>;

    /// Starts continuous rotation. A negative speed reverses the motor.
    async fn motor_start(&self, port: MotorPort, speed: i32, stall: bool) -> Result<(), MotionError>;

    /// Stops continuous rotation.
    async fn motor_stop(&self, port: MotorPort, stop: MotorStop) -> Result<(), MotionError>;
}
