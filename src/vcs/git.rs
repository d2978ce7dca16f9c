//! Bare repository with linked worktrees
//!
//! Layout expected on disk:
//!
//! ```text
//! qmk.git/                      bare repository (HEAD, objects/, refs/)
//! qmk.git/worktrees/<name>/gitdir   -> /path/to/<name>/.git
//! ```
//!
//! A worktree is looked up by its administrative name; its root is the parent
//! of the `.git` file recorded in `gitdir`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{VcsError, VersionControl, Worktree};
use crate::exec::{run_logged, ExecError, LogDir, StopSignal};

pub struct GitWorktrees {
    repository: PathBuf,
    logs: LogDir,
    dry_run: bool,
    stop: StopSignal,
}

impl GitWorktrees {
    /// Open the bare repository at `path`
    pub fn open(path: impl AsRef<Path>, logs: LogDir, dry_run: bool) -> Result<Self, VcsError> {
        let path = path.as_ref();
        let repository = path.canonicalize().map_err(|e| VcsError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if repository.join(".git").exists() {
            return Err(VcsError::NotBare(repository));
        }
        if !repository.join("HEAD").is_file() || !repository.join("objects").is_dir() {
            return Err(VcsError::OpenFailed {
                path: repository,
                reason: "not a git repository".to_string(),
            });
        }

        debug!("Opened repository at {}", repository.display());
        Ok(Self {
            repository,
            logs,
            dry_run,
            stop: StopSignal::new(),
        })
    }

    /// Kill a running submodule update once `stop` is raised
    pub fn stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn repository(&self) -> &Path {
        &self.repository
    }

    /// Resolve the worktree registered under `name`
    pub fn lookup_worktree(&self, name: &str) -> Result<Worktree, VcsError> {
        let not_found = || VcsError::WorktreeNotFound(name.to_string());

        if name.is_empty() || name.contains('/') || name.contains("..") {
            return Err(not_found());
        }

        let gitdir_file = self.repository.join("worktrees").join(name).join("gitdir");
        let gitdir = std::fs::read_to_string(&gitdir_file).map_err(|_| not_found())?;
        let dot_git = PathBuf::from(gitdir.trim());
        let dot_git = if dot_git.is_relative() {
            self.repository.join("worktrees").join(name).join(dot_git)
        } else {
            dot_git
        };

        let path = dot_git.parent().ok_or_else(not_found)?.to_path_buf();
        if !path.is_dir() {
            return Err(not_found());
        }

        Ok(Worktree {
            name: name.to_string(),
            path,
        })
    }
}

#[async_trait]
impl VersionControl for GitWorktrees {
    async fn switch_to(&self, branch: &str, update_submodules: bool) -> Result<Worktree, VcsError> {
        let worktree = self.lookup_worktree(branch)?;
        info!("Using worktree {} at {}", worktree.name, worktree.path.display());

        if update_submodules {
            info!("({}) Updating submodules", worktree.name);
            let argv: Vec<String> = ["git", "submodule", "update", "--init", "--recursive"]
                .iter()
                .map(|s| s.to_string())
                .collect();
            let log_file = self
                .logs
                .path_for(&format!("git-submodule-update-{}", worktree.name));

            match run_logged(&argv, &log_file, &worktree.path, self.dry_run, &self.stop).await {
                Ok(0) => {}
                Ok(code) => warn!(
                    "Submodule update in {} exited with {} (logs: {})",
                    worktree.name,
                    code,
                    log_file.display()
                ),
                Err(ExecError::Interrupted) => return Err(VcsError::Interrupted(worktree.name)),
                Err(ExecError::Io(e)) => {
                    warn!("Failed to run submodule update in {}: {}", worktree.name, e)
                }
            }
        }

        Ok(worktree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn bare_repo_with_worktree(name: &str) -> (TempDir, PathBuf) {
        let root = tempdir().unwrap();
        let repo = root.path().join("qmk.git");
        fs::create_dir_all(repo.join("objects")).unwrap();
        fs::create_dir_all(repo.join("refs")).unwrap();
        fs::write(repo.join("HEAD"), "ref: refs/heads/main\n").unwrap();

        let tree = root.path().join(name);
        fs::create_dir_all(&tree).unwrap();
        fs::create_dir_all(repo.join("worktrees").join(name)).unwrap();
        fs::write(
            repo.join("worktrees").join(name).join("gitdir"),
            format!("{}\n", tree.join(".git").display()),
        )
        .unwrap();

        (root, repo)
    }

    #[test]
    fn test_lookup_existing_worktree() {
        let (root, repo) = bare_repo_with_worktree("bkb-master");
        let git = GitWorktrees::open(&repo, LogDir::at(root.path()), true).unwrap();

        let worktree = git.lookup_worktree("bkb-master").unwrap();
        assert_eq!(worktree.name, "bkb-master");
        assert!(worktree.path.ends_with("bkb-master"));
    }

    #[test]
    fn test_lookup_missing_worktree() {
        let (root, repo) = bare_repo_with_worktree("bkb-master");
        let git = GitWorktrees::open(&repo, LogDir::at(root.path()), true).unwrap();

        let err = git.lookup_worktree("bkb-develop").unwrap_err();
        assert!(matches!(err, VcsError::WorktreeNotFound(ref b) if b == "bkb-develop"));
        assert!(git.lookup_worktree("../bkb-master").is_err());
    }

    #[test]
    fn test_open_rejects_non_bare() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join(".git")).unwrap();
        let result = GitWorktrees::open(root.path(), LogDir::at(root.path()), true);
        assert!(matches!(result, Err(VcsError::NotBare(_))));
    }

    #[test]
    fn test_open_rejects_missing_path() {
        let root = tempdir().unwrap();
        let result = GitWorktrees::open(root.path().join("nope"), LogDir::at(root.path()), true);
        assert!(matches!(result, Err(VcsError::OpenFailed { .. })));
    }

    #[tokio::test]
    async fn test_switch_to_in_dry_run() {
        let (root, repo) = bare_repo_with_worktree("bkb-master");
        let logs = tempdir().unwrap();
        let git = GitWorktrees::open(&repo, LogDir::at(logs.path()), true).unwrap();

        let worktree = git.switch_to("bkb-master", true).await.unwrap();
        assert_eq!(worktree.path, root.path().join("bkb-master"));
        assert!(logs
            .path()
            .join("git-submodule-update-bkb-master.log")
            .exists());
    }

    #[tokio::test]
    async fn test_switch_to_after_stop() {
        let (root, repo) = bare_repo_with_worktree("bkb-master");
        let stop = StopSignal::new();
        stop.stop();
        let git = GitWorktrees::open(&repo, LogDir::at(root.path()), false)
            .unwrap()
            .stop_signal(stop);

        let err = git.switch_to("bkb-master", true).await.unwrap_err();
        assert!(matches!(err, VcsError::Interrupted(ref b) if b == "bkb-master"));

        // Nothing to run, nothing to interrupt.
        assert!(git.switch_to("bkb-master", false).await.is_ok());
    }
}
