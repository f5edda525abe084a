//!
//! Motion control for a two-axis cam plotter driven from a robotics hub.
//!
//! Each physical axis is a chain of decorators (`axis`) which turn linear position requests into
//! whole-degree motor commands, compensating for gear reduction, the cam's cosine displacement and
//! mechanical backlash. The `printer` walks a binary `bitmap::Image` as a raster over those chains,
//! dotting the pen at every mark.
//!

pub mod axis;
pub mod bitmap;
pub mod hardware;
pub mod preview;
pub mod printer;

pub use bitmap::{Element, Image};
pub use printer::{PlotOutcome, Printer, PrintingState, StopHandle};
