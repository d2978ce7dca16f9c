//! Compiler seam
//!
//! - `qmk` - `qmk compile` driven as a subprocess

pub mod qmk;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::matrix::FirmwareSpec;

pub use qmk::{QmkCompiler, QmkOptions};

/// Result of one compiler invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub exit_code: i32,
    /// Combined stdout/stderr of the compiler
    pub log_file: PathBuf,
}

impl CompileOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompilerError {
    #[error("Failed to run {program}: {error} (logs: {})", .log_file.display())]
    Spawn {
        program: String,
        log_file: PathBuf,
        error: std::io::Error,
    },

    #[error("{program} was stopped (logs: {})", .log_file.display())]
    Interrupted { program: String, log_file: PathBuf },
}

impl CompilerError {
    pub fn log_file(&self) -> &Path {
        match self {
            CompilerError::Spawn { log_file, .. } => log_file,
            CompilerError::Interrupted { log_file, .. } => log_file,
        }
    }
}

#[async_trait]
pub trait Compiler: Send + Sync {
    /// Build `firmware` from the tree at `working_dir`
    async fn compile(
        &self,
        firmware: &FirmwareSpec,
        working_dir: &Path,
    ) -> Result<CompileOutput, CompilerError>;
}
