//! Build outcome and run summary types

use std::path::PathBuf;

/// Result of one firmware build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Compiled, artifact located at the given path
    Success(PathBuf),
    /// Compiled, but the compiler log never named the artifact
    SucceededNoArtifact,
    /// Non-zero exit, or the compiler could not be started (`exit_code: None`)
    Failed {
        exit_code: Option<i32>,
        log_file: PathBuf,
    },
}

impl BuildOutcome {
    /// Whether the compile step itself succeeded
    pub fn is_built(&self) -> bool {
        !matches!(self, BuildOutcome::Failed { .. })
    }
}

/// Running counters for one matrix execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateProgress {
    pub total_planned: usize,
    pub completed: usize,
    pub built: usize,
}

impl AggregateProgress {
    pub fn new(total_planned: usize) -> Self {
        Self {
            total_planned,
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: &BuildOutcome) {
        self.completed += 1;
        if outcome.is_built() {
            self.built += 1;
        }
    }

    /// Everything planned that was not built, including never-attempted work
    pub fn failed(&self) -> usize {
        self.total_planned - self.built
    }

    pub fn summary_line(&self) -> String {
        format!("Done: built={}, failed={}", self.built, self.failed())
    }
}
