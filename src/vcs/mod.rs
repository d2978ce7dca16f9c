//! Source control seam
//!
//! The engine only needs "put the tree for branch B in place and tell me
//! where it is". [`GitWorktrees`] does that against a bare repository whose
//! branches are checked out as linked worktrees.

pub mod git;

use async_trait::async_trait;
use std::path::PathBuf;

pub use git::GitWorktrees;

/// A checked-out source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worktree {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("Failed to open repository {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Repository must be bare: {0}")]
    NotBare(PathBuf),

    #[error("Worktree does not exist: {0}")]
    WorktreeNotFound(String),

    #[error("Interrupted while updating {0}")]
    Interrupted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Make `branch` the current source tree, optionally updating its
    /// submodules. Fails with [`VcsError::WorktreeNotFound`] when the branch
    /// cannot be resolved.
    async fn switch_to(&self, branch: &str, update_submodules: bool) -> Result<Worktree, VcsError>;
}
