//! # firmware-matrix
//!
//! Builds every firmware of a keyboard release, one after the other, from
//! the git worktrees of a bare QMK repository, and collects the binaries in
//! an output directory.
//!
//! ## Features
//!
//! - **Declarative matrix** - branches and the firmwares built off each one,
//!   built in (the BastardKB catalog) or loaded from YAML
//! - **Keep going** - a failed build is reported and the run moves on
//! - **Artifact discovery** - the produced file is found in the compiler log
//! - **Dry run** - walk the whole matrix without touching the tree
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use firmware_matrix::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let logs = LogDir::create()?;
//!     let reporter = ConsoleReporter::new(false);
//!     let git = GitWorktrees::open("qmk.git", logs.clone(), false)?;
//!     let qmk = QmkCompiler::new(QmkOptions::default(), logs);
//!
//!     let matrix = bastardkb_release();
//!     let progress = run_matrix(&matrix, &git, &qmk, &reporter, |artifact| {
//!         place_artifact(&reporter, "release".as_ref(), artifact);
//!     })
//!     .await?;
//!
//!     println!("built {} of {}", progress.built, progress.total_planned);
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod engine;
pub mod exec;
pub mod matrix;
pub mod placement;
pub mod report;
pub mod vcs;

// Re-export main types
pub use compiler::{CompileOutput, Compiler, CompilerError, QmkCompiler, QmkOptions};
pub use engine::{
    run_matrix, AggregateProgress, BuildOutcome, EngineError, MatrixRunner, INTERRUPTED_MESSAGE,
};
pub use exec::{ExecError, LogDir, StopSignal};
pub use matrix::{
    bastardkb_release, BuildMatrix, FirmwareBatch, FirmwareSpec, MatrixLoadError, MatrixLoader,
};
pub use placement::{copy_companion_assets, place_artifact, AssetOptions};
pub use report::{ConsoleReporter, Reporter, RotatingFile};
pub use vcs::{GitWorktrees, VcsError, VersionControl, Worktree};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::compiler::{CompileOutput, Compiler, CompilerError, QmkCompiler, QmkOptions};
    pub use crate::engine::{run_matrix, AggregateProgress, BuildOutcome, EngineError, MatrixRunner};
    pub use crate::exec::{LogDir, StopSignal};
    pub use crate::matrix::{
        bastardkb_release, BuildMatrix, FirmwareBatch, FirmwareSpec, MatrixLoader,
    };
    pub use crate::placement::{copy_companion_assets, place_artifact, AssetOptions};
    pub use crate::report::{ConsoleReporter, Reporter};
    pub use crate::vcs::{GitWorktrees, VersionControl, Worktree};
}
