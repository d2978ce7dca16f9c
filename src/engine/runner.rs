//! Build matrix runner
//!
//! Walks the matrix strictly in order:
//! 1. Switches the source tree to each batch's branch
//! 2. Compiles every firmware of the batch, one at a time
//! 3. Classifies each build and hands located artifacts to the caller
//! 4. Keeps the progress counters and prints the final summary
//!
//! A failed build never stops the run. Only an unresolvable branch or an
//! interruption does.

use std::path::Path;
use tracing::{debug, instrument, warn};

use super::artifact::read_artifact_name;
use super::error::EngineError;
use super::result::{AggregateProgress, BuildOutcome};
use crate::compiler::{CompileOutput, Compiler, CompilerError};
use crate::exec::StopSignal;
use crate::matrix::{BuildMatrix, FirmwareSpec};
use crate::report::Reporter;
use crate::vcs::{VcsError, VersionControl, Worktree};

pub const INTERRUPTED_MESSAGE: &str = "Interrupted.  Exiting…";

/// Run `matrix` with default settings (submodule updates on, no cancellation)
pub async fn run_matrix<F>(
    matrix: &BuildMatrix,
    vcs: &dyn VersionControl,
    compiler: &dyn Compiler,
    reporter: &dyn Reporter,
    on_artifact: F,
) -> Result<AggregateProgress, EngineError>
where
    F: FnMut(&Path),
{
    MatrixRunner::new(vcs, compiler, reporter)
        .run(matrix, on_artifact)
        .await
}

pub struct MatrixRunner<'a> {
    vcs: &'a dyn VersionControl,
    compiler: &'a dyn Compiler,
    reporter: &'a dyn Reporter,
    stop: StopSignal,
    update_submodules: bool,
}

impl<'a> MatrixRunner<'a> {
    pub fn new(
        vcs: &'a dyn VersionControl,
        compiler: &'a dyn Compiler,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            vcs,
            compiler,
            reporter,
            stop: StopSignal::new(),
            update_submodules: true,
        }
    }

    /// Stop scheduling work once `stop` is raised. Pass the same signal to
    /// the collaborators so a running step is killed too.
    pub fn cancellation(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn update_submodules(mut self, enabled: bool) -> Self {
        self.update_submodules = enabled;
        self
    }

    #[instrument(skip_all, fields(batches = matrix.batches.len(), firmwares = matrix.total_firmwares()))]
    pub async fn run<F>(
        &self,
        matrix: &BuildMatrix,
        mut on_artifact: F,
    ) -> Result<AggregateProgress, EngineError>
    where
        F: FnMut(&Path),
    {
        let mut progress = AggregateProgress::new(matrix.total_firmwares());

        self.reporter.begin(progress.total_planned);
        self.reporter.info(&format!(
            "Preparing to build {} BastardKB firmwares",
            progress.total_planned
        ));

        for batch in &matrix.batches {
            self.check_cancelled(&progress)?;

            self.reporter.info(&format!(
                "  Building off branch {} ({} firmwares)",
                batch.branch,
                batch.len()
            ));
            self.reporter
                .status(&format!("Checking out {}…", batch.branch));

            let worktree = match self
                .vcs
                .switch_to(&batch.branch, self.update_submodules)
                .await
            {
                Ok(worktree) => worktree,
                Err(VcsError::Interrupted(_)) => return Err(self.interrupted(&progress)),
                Err(e) => {
                    self.reporter.error(&e.to_string());
                    self.reporter.finish();
                    return Err(e.into());
                }
            };
            debug!("Building {} from {}", batch.branch, worktree.path.display());
            self.check_cancelled(&progress)?;

            for firmware in &batch.firmwares {
                self.check_cancelled(&progress)?;

                self.reporter.status(&format!("Compiling {firmware}"));
                let compiled = self.compiler.compile(firmware, &worktree.path).await;
                if let Err(CompilerError::Interrupted { .. }) = compiled {
                    return Err(self.interrupted(&progress));
                }
                self.check_cancelled(&progress)?;

                let outcome = self.classify(firmware, &worktree, compiled, &mut on_artifact);
                progress.record(&outcome);
                self.reporter.outcome(firmware, &outcome);
                self.reporter.advance();
            }

            self.reporter.newline();
        }

        self.reporter.finish();
        self.reporter.info(&progress.summary_line());
        Ok(progress)
    }

    fn classify<F>(
        &self,
        firmware: &FirmwareSpec,
        worktree: &Worktree,
        compiled: Result<CompileOutput, CompilerError>,
        on_artifact: &mut F,
    ) -> BuildOutcome
    where
        F: FnMut(&Path),
    {
        let output = match compiled {
            Ok(output) => output,
            Err(e) => {
                self.reporter.error(&e.to_string());
                return BuildOutcome::Failed {
                    exit_code: None,
                    log_file: e.log_file().to_path_buf(),
                };
            }
        };

        if !output.success() {
            debug!("{} exited with {}", firmware, output.exit_code);
            return BuildOutcome::Failed {
                exit_code: Some(output.exit_code),
                log_file: output.log_file,
            };
        }

        let base_name = firmware.artifact_base_name();
        match read_artifact_name(&base_name, &output.log_file) {
            Ok(Some(filename)) => {
                let artifact = worktree.path.join(filename);
                debug!("{} produced {}", firmware, artifact.display());
                on_artifact(&artifact);
                BuildOutcome::Success(artifact)
            }
            Ok(None) => {
                debug!("No artifact announced for {} in {}", base_name, output.log_file.display());
                BuildOutcome::SucceededNoArtifact
            }
            Err(e) => {
                warn!("Cannot read {}: {}", output.log_file.display(), e);
                BuildOutcome::SucceededNoArtifact
            }
        }
    }

    fn check_cancelled(&self, progress: &AggregateProgress) -> Result<(), EngineError> {
        if self.stop.is_stopped() {
            return Err(self.interrupted(progress));
        }
        Ok(())
    }

    fn interrupted(&self, progress: &AggregateProgress) -> EngineError {
        self.reporter.finish();
        self.reporter.warn(INTERRUPTED_MESSAGE);
        EngineError::Interrupted {
            completed: progress.completed,
            total: progress.total_planned,
        }
    }
}
