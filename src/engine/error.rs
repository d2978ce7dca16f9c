//! Engine error types

use crate::vcs::VcsError;

/// Conditions that stop the whole matrix.
///
/// Individual build failures never show up here; they are recorded as
/// [`BuildOutcome`](super::BuildOutcome)s and the run carries on.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Source control error: {0}")]
    Vcs(#[from] VcsError),

    #[error("Interrupted after {completed} of {total} firmwares")]
    Interrupted { completed: usize, total: usize },
}
