//! Subprocess execution with output captured to a log file
//!
//! Every external command (git, qmk) runs with stdout and stderr both
//! redirected into one file under the per-run [`LogDir`]. A raised
//! [`StopSignal`] kills the running child.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Notify;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Interrupted")]
    Interrupted,
}

#[derive(Debug, Default)]
struct StopState {
    stopped: AtomicBool,
    notify: Notify,
}

/// Shared stop request, raised once (on Ctrl-C) and never cleared
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    state: Arc<StopState>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.state.stopped.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.state.stopped.load(Ordering::SeqCst)
    }

    /// Resolve once [`stop`](Self::stop) has been called
    pub async fn stopped(&self) {
        loop {
            let notified = self.state.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent stop() is not lost.
            notified.as_mut().enable();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}

/// Directory holding the per-command logs of one run
#[derive(Debug, Clone)]
pub struct LogDir {
    root: PathBuf,
}

impl LogDir {
    /// Create a fresh temporary directory that outlives the process
    pub fn create() -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("firmware-matrix-")
            .tempdir()?;
        Ok(Self { root: dir.keep() })
    }

    /// Use an existing directory
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<basename>.log`
    pub fn path_for(&self, basename: &str) -> PathBuf {
        self.root.join(format!("{basename}.log"))
    }
}

/// Render an argv the way a shell would accept it back
pub fn shell_join(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| {
            let plain = !arg.is_empty()
                && arg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
            if plain {
                arg.clone()
            } else {
                format!("'{}'", arg.replace('\'', r"'\''"))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `argv` in `cwd`, writing its combined output to `log_file`.
///
/// Returns the exit code, `-1` when the process was killed by a signal.
/// With `dry_run` nothing is spawned: an empty log is written and `0` returned.
/// If `stop` is raised while the child runs, the child is killed and
/// [`ExecError::Interrupted`] returned.
pub async fn run_logged(
    argv: &[String],
    log_file: &Path,
    cwd: &Path,
    dry_run: bool,
    stop: &StopSignal,
) -> Result<i32, ExecError> {
    debug!("exec: {}", shell_join(argv));
    debug!("output: {}", log_file.display());

    let stdout = File::create(log_file)?;
    if dry_run {
        return Ok(0);
    }
    if stop.is_stopped() {
        return Err(ExecError::Interrupted);
    }
    let stderr = stdout.try_clone()?;

    let (program, args) = argv
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .kill_on_drop(true)
        .spawn()?;

    let finished = tokio::select! {
        status = child.wait() => Some(status),
        () = stop.stopped() => None,
    };

    match finished {
        Some(status) => Ok(status?.code().unwrap_or(-1)),
        None => {
            warn!("Stopping {}", program);
            child.kill().await?;
            Err(ExecError::Interrupted)
        }
    }
}
