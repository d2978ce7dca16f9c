//! Build matrix types and sources
//!
//! - `firmware` - FirmwareSpec, FirmwareBatch and BuildMatrix
//! - `catalog` - the built-in BastardKB release matrix
//! - `loader` - load a matrix from a YAML file

pub mod catalog;
pub mod firmware;
pub mod loader;

pub use catalog::bastardkb_release;
pub use firmware::{BuildMatrix, FirmwareBatch, FirmwareSpec, VENDOR};
pub use loader::{MatrixLoadError, MatrixLoader};
