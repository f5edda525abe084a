use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::watch;

use super::error::MotionError;
use super::{ConnectionStatus, MotorDirection, MotorPort, MotorStop, Robot};

///
/// A single command, as received by the simulated hub.
///
#[derive(Debug, Clone, PartialEq)]
pub enum MotorCommand {
    RunForDegrees { port: MotorPort, degrees: i32, speed: i32 },
    GoToPosition { port: MotorPort, position: i32, direction: MotorDirection, speed: i32 },
    Start { port: MotorPort, speed: i32 },
    Stop { port: MotorPort },
}

impl MotorCommand {
    pub fn port(&self) -> MotorPort {
        match self {
            MotorCommand::RunForDegrees { port, .. }
            | MotorCommand::GoToPosition { port, .. }
            | MotorCommand::Start { port, .. }
            | MotorCommand::Stop { port } => *port,
        }
    }
}

type CommandObserver = Arc<dyn Fn(&MotorCommand) + Send + Sync>;

#[derive(Default)]
struct SimulatedState {
    commands: Vec<MotorCommand>,
    positions: HashMap<MotorPort, i32>,
    running: HashMap<MotorPort, i32>,
    fault: Option<(usize, MotionError)>,
}

///
/// An in-memory hub. It accepts every command instantly, keeps the shaft position of each port,
/// and records the command log so a plot can be dry-run or inspected.
///
/// A fault can be armed to fail the nth command, and an observer can watch each command as it
/// is accepted.
///
pub struct SimulatedRobot {
    state: Mutex<SimulatedState>,
    observer: Mutex<Option<CommandObserver>>,
    status: watch::Sender<ConnectionStatus>,
}

impl SimulatedRobot {
    ///
    /// # Returns:
    /// - A simulated hub which is already connected
    ///
    pub fn new() -> SimulatedRobot {
        let (status, _) = watch::channel(ConnectionStatus::Connected);
        SimulatedRobot { state: Mutex::new(SimulatedState::default()), observer: Mutex::new(None), status }
    }

    ///
    /// Arms a fault: the `nth` command from now on (1-based) fails with `error`, without moving.
    ///
    pub fn fail_on_command(&self, nth: usize, error: MotionError) {
        let mut state = self.lock_state();
        let target = state.commands.len() + nth;
        state.fault = Some((target, error));
    }

    ///
    /// Registers a callback which sees every accepted command, after it has been applied.
    ///
    pub fn on_command<F>(&self, observer: F)
    where
        F: Fn(&MotorCommand) + Send + Sync + 'static,
    {
        *self.lock_observer() = Some(Arc::new(observer));
    }

    /// Simulates the link dropping.
    pub fn disconnect(&self) {
        self.status.send_replace(ConnectionStatus::NotConnected);
    }

    pub fn commands(&self) -> Vec<MotorCommand> {
        self.lock_state().commands.clone()
    }

    pub fn commands_for(&self, port: MotorPort) -> Vec<MotorCommand> {
        self.lock_state().commands.iter().filter(|command| command.port() == port).cloned().collect()
    }

    ///
    /// # Returns:
    /// - The shaft position of the port in whole degrees, as the hub sees it
    ///
    pub fn position(&self, port: MotorPort) -> i32 {
        self.lock_state().positions.get(&port).copied().unwrap_or(0)
    }

    ///
    /// # Returns:
    /// - The speed of a continuously rotating port, `None` once stopped
    ///
    pub fn running_speed(&self, port: MotorPort) -> Option<i32> {
        self.lock_state().running.get(&port).copied()
    }

    fn lock_state(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_observer(&self) -> MutexGuard<'_, Option<CommandObserver>> {
        self.observer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn accept(&self, command: MotorCommand) -> Result<(), MotionError> {
        // let other tasks on the runtime (e.g. a stop request) interleave, as a real hub would
        tokio::task::yield_now().await;

        if *self.status.borrow() != ConnectionStatus::Connected {
            return Err(MotionError::Disconnected { port: command.port() });
        }

        {
            let mut state = self.lock_state();
            let index = state.commands.len() + 1;
            if state.fault.as_ref().is_some_and(|(target, _)| *target == index) {
                if let Some((_, error)) = state.fault.take() {
                    return Err(error);
                }
            }

            match &command {
                MotorCommand::RunForDegrees { port, degrees, .. } => {
                    *state.positions.entry(*port).or_insert(0) += degrees;
                }
                MotorCommand::GoToPosition { port, position, .. } => {
                    state.positions.insert(*port, *position);
                }
                MotorCommand::Start { port, speed } => {
                    state.running.insert(*port, *speed);
                }
                MotorCommand::Stop { port } => {
                    state.running.remove(port);
                }
            }
            state.commands.push(command.clone());
        }

        let observer = self.lock_observer().clone();
        if let Some(observer) = observer {
            observer(&command);
        }

        Ok(())
    }
}

impl Default for SimulatedRobot {
    fn default() -> Self {
        SimulatedRobot::new()
    }
}

#[async_trait]
impl Robot for SimulatedRobot {
    async fn connect(&self) {
        self.status.send_replace(ConnectionStatus::Connecting);
        tokio::task::yield_now().await;
        self.status.send_replace(ConnectionStatus::Connected);
    }

    async fn reconnect(&self) {
        self.status.send_replace(ConnectionStatus::NotConnected);
        self.connect().await;
    }

    fn connection_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    async fn motor_run_for_degrees(&self, port: MotorPort, degrees: i32, speed: i32, _stall: bool) -> Result<(), MotionError> {
        self.accept(MotorCommand::RunForDegrees { port, degrees, speed }).await
    }

    async fn motor_go_direction_to_position(
        &self,
        port: MotorPort,
        position: i32,
        direction: MotorDirection,
        speed: i32,
        _stall: bool,
        _stop: MotorStop,
    ) -> Result<(), MotionError> {
        self.accept(MotorCommand::GoToPosition { port, position, direction, speed }).await
    }

    async fn motor_start(&self, port: MotorPort, speed: i32, _stall: bool) -> Result<(), MotionError> {
        self.accept(MotorCommand::Start { port, speed }).await
    }

    async fn motor_stop(&self, port: MotorPort, _stop: MotorStop) -> Result<(), MotionError> {
        self.accept(MotorCommand::Stop { port }).await
    }
}
