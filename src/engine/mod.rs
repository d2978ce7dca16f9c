//! Build matrix execution engine
//!
//! This module contains:
//! - `runner` - The matrix runner driving source control and the compiler
//! - `artifact` - Artifact discovery in compiler logs
//! - `error` - Engine error types
//! - `result` - Build outcome and progress counters

pub mod artifact;
pub mod error;
pub mod result;
pub mod runner;

pub use artifact::{find_artifact_name, read_artifact_name};
pub use error::EngineError;
pub use result::{AggregateProgress, BuildOutcome};
pub use runner::{run_matrix, MatrixRunner, INTERRUPTED_MESSAGE};
