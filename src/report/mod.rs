//! Progress and outcome reporting
//!
//! - `console` - terminal reporter (spinner, progress bar, coloured lines)
//! - `rotating` - size-rotated log file backing the tracing file layer

pub mod console;
pub mod rotating;

use crate::engine::BuildOutcome;
use crate::matrix::FirmwareSpec;

pub use console::ConsoleReporter;
pub use rotating::RotatingFile;

/// Everything the engine tells the operator.
///
/// Implementations use interior mutability; the engine holds a shared
/// reference for the whole run.
pub trait Reporter: Send + Sync {
    /// Set the progress denominator
    fn begin(&self, total: usize);

    /// Replace the transient status line
    fn status(&self, message: &str);

    /// Blank separator line
    fn newline(&self);

    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    /// One line per finished firmware
    fn outcome(&self, firmware: &FirmwareSpec, outcome: &BuildOutcome);

    /// Advance the progress counter by one firmware
    fn advance(&self);

    /// Hide the transient status and progress widgets
    fn finish(&self);
}
