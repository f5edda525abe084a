//!
//! The plotter: axis chains, pen, and the raster plotting state machine
//!

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::axis::{DirectMotorController, GearedMotorController, LinearAxis, LinearBacklashMotorController, LinearCamMotorController};
use crate::bitmap::{Element, Image, CHECKER_13X13};
use crate::hardware::error::MotionError;
use crate::hardware::math::Distance;
use crate::hardware::{ConnectionStatus, MotorStop, Robot};

use config::{AxisConfiguration, PrinterConfiguration};
use error::{ConfigurationError, PrinterError};
use pen::PenController;

pub mod config;
pub mod error;
pub mod pen;

///
/// Whether a plot is running. Observable through `Printer::printing_state`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintingState {
    #[default]
    Stopped,
    Printing,
}

///
/// How a call to `Printer::plot` ended, when no motor command failed.
///
/// - `Completed`: Every row was plotted and both axes were returned to zero
/// - `Cancelled`: `stop` was observed at a checkpoint; the axes are left where they were
/// - `Rejected`: Another plot was already running, nothing moved
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotOutcome {
    Completed,
    Cancelled,
    Rejected,
}

///
/// A cloneable handle which requests that the running plot stops.
/// The request is polled between motor commands, an in-flight command always completes.
///
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }
}

/// Marks the printer busy for as long as it lives, so a dropped plot future still releases it.
struct PrintingGuard<'p> {
    printer: &'p Printer,
}

impl<'p> PrintingGuard<'p> {
    fn acquire(printer: &'p Printer) -> Option<PrintingGuard<'p>> {
        printer.busy.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).ok()?;
        printer.stop_handle.reset();
        printer.state.send_replace(PrintingState::Printing);
        Some(PrintingGuard { printer })
    }
}

impl Drop for PrintingGuard<'_> {
    fn drop(&mut self) {
        self.printer.busy.store(false, Ordering::SeqCst);
        self.printer.state.send_replace(PrintingState::Stopped);
    }
}

///
/// The plotter. Owns one composed linear axis per physical axis (X and Y), plus the pen.
///
/// Every method takes `&self`. The axis chains are locked for the duration of a plot, so all moves
/// on a chain form one linear sequence; jog controls bypass the chains and talk to the raw motors.
///
/// # Fields:
/// - `configuration`: The static configuration the chains were built from
/// - `robot`: The hub
/// - `x_axis`, `y_axis`: backlash → cam → gear → direct chains
/// - `pen`: The pen lift
/// - `busy`: Set while a plot runs
/// - `stop_handle`: The cancellation flag, polled at every checkpoint
/// - `state`: Publishes the printing state
///
pub struct Printer {
    configuration: PrinterConfiguration,
    robot: Arc<dyn Robot>,
    x_axis: Mutex<Box<dyn LinearAxis>>,
    y_axis: Mutex<Box<dyn LinearAxis>>,
    pen: PenController,
    busy: AtomicBool,
    stop_handle: StopHandle,
    state: watch::Sender<PrintingState>,
}

impl Printer {
    ///
    /// Validates the configuration and builds the axis chains. Nothing is sent to the hub.
    ///
    /// # Parameters:
    /// - `configuration`: The layout of the plotter
    /// - `robot`: The hub driving the motors
    ///
    /// # Returns:
    /// - A stopped `Printer`
    /// - A `ConfigurationError` if an axis has no usable travel
    ///
    pub fn new(configuration: PrinterConfiguration, robot: Arc<dyn Robot>) -> Result<Printer, ConfigurationError> {
        configuration.validate()?;

        let x_axis = build_axis(configuration.x_axis(), &robot);
        let y_axis = build_axis(configuration.y_axis(), &robot);
        let pen = PenController::new(configuration.pen_axis().clone(), robot.clone());
        let (state, _) = watch::channel(PrintingState::Stopped);

        Ok(Printer {
            configuration,
            robot,
            x_axis: Mutex::new(x_axis),
            y_axis: Mutex::new(y_axis),
            pen,
            busy: AtomicBool::new(false),
            stop_handle: StopHandle::default(),
            state,
        })
    }

    pub fn configuration(&self) -> &PrinterConfiguration {
        &self.configuration
    }

    pub async fn connect(&self) {
        self.robot.connect().await;
    }

    pub async fn reconnect(&self) {
        self.robot.reconnect().await;
    }

    pub fn connection_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.robot.connection_status()
    }

    pub fn printing_state(&self) -> watch::Receiver<PrintingState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PrintingState {
        *self.state.borrow()
    }

    ///
    /// # Returns:
    /// - The current (x, y) position of the pen carriage, as tracked by the axis chains
    ///
    pub async fn position(&self) -> (Distance, Distance) {
        let x = self.x_axis.lock().await.position();
        let y = self.y_axis.lock().await.position();
        (x, y)
    }

    ///
    /// Requests the running plot to stop at its next checkpoint.
    ///
    pub fn stop(&self) {
        info!("Stop requested");
        self.stop_handle.stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    ///
    /// Returns both axes to their zero reference and raises the pen.
    ///
    pub async fn home(&self) -> Result<(), PrinterError> {
        let result = async {
            self.x_axis.lock().await.zero().await?;
            self.y_axis.lock().await.zero().await?;
            self.pen.raise().await
        }.await;

        if let Err(err) = &result {
            error!("Cannot home printer: {}", err);
        }
        Ok(result?)
    }

    ///
    /// Plots the 13x13 checkerboard.
    ///
    pub async fn test(&self) -> Result<PlotOutcome, PrinterError> {
        self.plot(&CHECKER_13X13).await
    }

    ///
    /// Plots an image as a raster: rows top to bottom, columns left to right, one pen dot per mark.
    ///
    /// Only one plot runs at a time; a call made while printing returns `PlotOutcome::Rejected`
    /// without moving anything. A motor fault aborts the plot and is returned; it is not retried.
    /// The printing state is `Printing` while this runs and `Stopped` once it returns.
    ///
    /// # Parameters:
    /// - `image`: The image to plot
    ///
    /// # Returns:
    /// - The `PlotOutcome`
    /// - A `PrinterError` if a motor command failed
    ///
    pub async fn plot(&self, image: &Image) -> Result<PlotOutcome, PrinterError> {
        let Some(_guard) = PrintingGuard::acquire(self) else {
            debug!("Plot requested while already printing, ignoring");
            return Ok(PlotOutcome::Rejected);
        };

        info!("Plotting {}x{} image with {} marks", image.width(), image.height(), image.mark_count());
        match self.plot_image(image).await {
            Ok(outcome) => {
                info!("Plot finished: {:?}", outcome);
                Ok(outcome)
            }
            Err(err) => {
                error!("Cannot print image: {}", err);
                Err(err.into())
            }
        }
    }

    ///
    /// Jogs the X motor: a positive direction turns it forwards at the configured speed, negative
    /// backwards, and zero stops it. This bypasses the axis chain, so it does not update the tracked
    /// position.
    ///
    pub async fn control_x_axis(&self, direction: i32) -> Result<(), PrinterError> {
        self.control_axis("X", self.configuration.x_axis(), direction).await
    }

    /// See `control_x_axis`.
    pub async fn control_y_axis(&self, direction: i32) -> Result<(), PrinterError> {
        self.control_axis("Y", self.configuration.y_axis(), direction).await
    }

    ///
    /// Sweeps the X axis to its minimum, maximum, then minimum again to check the configured travel.
    ///
    pub async fn range_x_axis(&self) -> Result<(), PrinterError> {
        let mut axis = self.x_axis.lock().await;
        range_axis("X", &mut **axis).await
    }

    /// See `range_x_axis`.
    pub async fn range_y_axis(&self) -> Result<(), PrinterError> {
        let mut axis = self.y_axis.lock().await;
        range_axis("Y", &mut **axis).await
    }

    fn should_stop(&self) -> bool {
        let requested = self.stop_handle.is_stop_requested();
        if requested {
            warn!("Plot cancelled");
        }
        requested
    }

    async fn plot_image(&self, image: &Image) -> Result<PlotOutcome, MotionError> {
        let mut x_axis = self.x_axis.lock().await;
        let mut y_axis = self.y_axis.lock().await;

        if self.should_stop() {
            return Ok(PlotOutcome::Cancelled);
        }
        self.pen.raise().await?;

        if self.should_stop() {
            return Ok(PlotOutcome::Cancelled);
        }
        y_axis.home().await?;

        for (y, row) in image.rows().enumerate() {
            if self.should_stop() {
                return Ok(PlotOutcome::Cancelled);
            }
            debug!("Row {}", y);
            step_axis(&mut **y_axis, image.height()).await?;

            if self.should_stop() {
                return Ok(PlotOutcome::Cancelled);
            }
            if row.contains(&Element::Mark) && self.plot_row(&mut **x_axis, row).await? == PlotOutcome::Cancelled {
                return Ok(PlotOutcome::Cancelled);
            }
        }

        x_axis.zero().await?;
        y_axis.zero().await?;
        Ok(PlotOutcome::Completed)
    }

    async fn plot_row(&self, x_axis: &mut dyn LinearAxis, row: &[Element]) -> Result<PlotOutcome, MotionError> {
        if self.should_stop() {
            return Ok(PlotOutcome::Cancelled);
        }
        x_axis.home().await?;

        for element in row {
            if self.should_stop() {
                return Ok(PlotOutcome::Cancelled);
            }
            step_axis(x_axis, row.len()).await?;

            if self.should_stop() {
                return Ok(PlotOutcome::Cancelled);
            }
            if *element == Element::Mark {
                self.pen.dot().await?;
            }
        }

        Ok(PlotOutcome::Completed)
    }

    async fn control_axis(&self, name: &str, axis: &AxisConfiguration, direction: i32) -> Result<(), PrinterError> {
        let port = *axis.motor().port();
        let result = if direction == 0 {
            debug!("Stopping {} axis motor", name);
            self.robot.motor_stop(port, MotorStop::Coast).await
        } else {
            let speed = *axis.motor().speed() * direction.signum();
            debug!("Starting {} axis motor at speed {}", name, speed);
            self.robot.motor_start(port, speed, true).await
        };

        if let Err(err) = &result {
            error!("Cannot control {} axis: {}", name, err);
        }
        Ok(result?)
    }
}

///
/// Builds backlash → cam → gear → direct for one axis.
///
fn build_axis(configuration: &AxisConfiguration, robot: &Arc<dyn Robot>) -> Box<dyn LinearAxis> {
    let motor = configuration.motor();
    let direct = DirectMotorController::new(*motor.port(), *motor.speed(), *configuration.resolution(), robot.clone());
    let geared = GearedMotorController::new(*configuration.ratio(), direct);
    let cam = LinearCamMotorController::new(*configuration.cam_length(), geared);
    Box::new(LinearBacklashMotorController::new(*configuration.backlash(), cam))
}

///
/// Advances an axis by one equal subdivision of its travel.
///
async fn step_axis(axis: &mut dyn LinearAxis, steps: usize) -> Result<(), MotionError> {
    let step = (axis.maximum_position() - axis.minimum_position()) / steps as f64;
    axis.move_by(step).await
}

async fn range_axis(name: &str, axis: &mut dyn LinearAxis) -> Result<(), PrinterError> {
    info!("Ranging {} axis over [{}, {}]", name, axis.minimum_position(), axis.maximum_position());
    let result = async {
        axis.move_to(axis.minimum_position()).await?;
        axis.move_to(axis.maximum_position()).await?;
        axis.move_to(axis.minimum_position()).await
    }.await;

    if let Err(err) = &result {
        error!("Cannot range {} axis: {}", name, err);
    }
    Ok(result?)
}
