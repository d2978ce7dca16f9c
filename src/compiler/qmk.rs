//! `qmk compile` invocation
//!
//! Equivalent shell command for one firmware:
//!
//! ```text
//! qmk compile --clean --parallel 1 \
//!     --keyboard bastardkb/skeletyl/v2/elitec --keymap default \
//!     --env TARGET=bastardkb_skeletyl_v2_elitec_stock -e VIA_ENABLE=yes
//! ```

use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use super::{CompileOutput, Compiler, CompilerError};
use crate::exec::{run_logged, ExecError, LogDir, StopSignal};
use crate::matrix::FirmwareSpec;

#[derive(Debug, Clone)]
pub struct QmkOptions {
    /// Program to run, `qmk` from `PATH` by default
    pub program: String,
    /// Forwarded to `qmk compile --parallel`
    pub parallel: usize,
    pub dry_run: bool,
}

impl Default for QmkOptions {
    fn default() -> Self {
        Self {
            program: "qmk".to_string(),
            parallel: 1,
            dry_run: false,
        }
    }
}

pub struct QmkCompiler {
    options: QmkOptions,
    logs: LogDir,
    stop: StopSignal,
}

impl QmkCompiler {
    pub fn new(options: QmkOptions, logs: LogDir) -> Self {
        Self {
            options,
            logs,
            stop: StopSignal::new(),
        }
    }

    /// Kill a running compile once `stop` is raised
    pub fn stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn argv(&self, firmware: &FirmwareSpec) -> Vec<String> {
        let mut argv = vec![
            self.options.program.clone(),
            "compile".to_string(),
            "--clean".to_string(),
            "--parallel".to_string(),
            self.options.parallel.to_string(),
            "--keyboard".to_string(),
            firmware.qmk_keyboard(),
            "--keymap".to_string(),
            firmware.keymap.clone(),
            "--env".to_string(),
            format!("TARGET={}", firmware.artifact_base_name()),
        ];
        for var in &firmware.env {
            argv.push("-e".to_string());
            argv.push(var.clone());
        }
        argv
    }

    pub fn log_file_for(&self, firmware: &FirmwareSpec) -> std::path::PathBuf {
        self.logs
            .path_for(&format!("qmk-compile-{}", firmware.artifact_base_name()))
    }
}

#[async_trait]
impl Compiler for QmkCompiler {
    async fn compile(
        &self,
        firmware: &FirmwareSpec,
        working_dir: &Path,
    ) -> Result<CompileOutput, CompilerError> {
        info!("Compiling {}", firmware);
        let argv = self.argv(firmware);
        let log_file = self.log_file_for(firmware);

        let program = self.options.program.clone();
        match run_logged(&argv, &log_file, working_dir, self.options.dry_run, &self.stop).await {
            Ok(exit_code) => Ok(CompileOutput {
                exit_code,
                log_file,
            }),
            Err(ExecError::Io(error)) => Err(CompilerError::Spawn {
                program,
                log_file,
                error,
            }),
            Err(ExecError::Interrupted) => Err(CompilerError::Interrupted { program, log_file }),
        }
    }
}
