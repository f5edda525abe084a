use thiserror::Error;

use super::MotorPort;

///
/// All errors emitted by the hub transport while a motor command is in flight.
/// The error messages can be displayed to the operator. Recovery is always reconnect, then restart.
///
/// - `Stalled`: The motor did not reach its target, usually because the mechanism jammed
///     Parameters:
///     - `port`: The port of the stalled motor
/// - `Disconnected`: The hub dropped the connection, or was never connected
///     Parameters:
///     - `port`: The port the command was addressed to
/// - `Transport`: Any other failure reported by the hub
///     Parameters:
///     - `port`: The port the command was addressed to
///     - `reason`: The transport's description of the problem
///
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    #[error("The motor on port {} stalled.", .port)]
    Stalled { port: MotorPort },

    #[error("The hub is not connected, the command to port {} was not delivered.", .port)]
    Disconnected { port: MotorPort },

    #[error("The hub rejected the command to port {}: {}", .port, .reason)]
    Transport { port: MotorPort, reason: String },
}
