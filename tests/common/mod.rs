#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use firmware_matrix::prelude::*;
use firmware_matrix::{CompilerError, VcsError};
use tempfile::TempDir;

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn marker(base_name: &str, extension: &str) -> String {
    format!("Copying {base_name}.{extension} to qmk_firmware folder")
}

pub fn spec(keyboard: &str, keymap: &str, alias: Option<&str>) -> FirmwareSpec {
    let spec = FirmwareSpec::new(keyboard, keymap);
    match alias {
        Some(alias) => spec.alias(alias),
        None => spec,
    }
}

/// Lay out a bare repository with one linked worktree per branch
pub fn bare_repo(root: &Path, branches: &[&str]) -> PathBuf {
    let repo = root.join("qmk.git");
    fs::create_dir_all(repo.join("objects")).unwrap();
    fs::create_dir_all(repo.join("refs")).unwrap();
    fs::write(repo.join("HEAD"), "ref: refs/heads/main\n").unwrap();

    for branch in branches {
        let tree = root.join(branch);
        fs::create_dir_all(&tree).unwrap();
        let admin = repo.join("worktrees").join(branch);
        fs::create_dir_all(&admin).unwrap();
        fs::write(admin.join("gitdir"), format!("{}\n", tree.join(".git").display())).unwrap();
    }
    repo
}

/// Executable standing in for `qmk` that never finishes on its own
#[cfg(unix)]
pub fn hanging_program(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let program = dir.join("hanging-qmk");
    fs::write(&program, "#!/bin/sh\nsleep 30\n").unwrap();
    fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();
    program
}

// ============================================================================
// Version control
// ============================================================================

pub struct FakeVcs {
    root: PathBuf,
    known: HashSet<String>,
    switches: Mutex<Vec<(String, bool)>>,
}

impl FakeVcs {
    pub fn new(root: &Path, branches: &[&str]) -> Self {
        Self {
            root: root.to_path_buf(),
            known: branches.iter().map(|b| b.to_string()).collect(),
            switches: Mutex::new(Vec::new()),
        }
    }

    pub fn switches(&self) -> Vec<(String, bool)> {
        self.switches.lock().unwrap().clone()
    }
}

#[async_trait]
impl VersionControl for FakeVcs {
    async fn switch_to(&self, branch: &str, update_submodules: bool) -> Result<Worktree, VcsError> {
        self.switches
            .lock()
            .unwrap()
            .push((branch.to_string(), update_submodules));
        if !self.known.contains(branch) {
            return Err(VcsError::WorktreeNotFound(branch.to_string()));
        }
        Ok(Worktree {
            name: branch.to_string(),
            path: self.root.join(branch),
        })
    }
}

// ============================================================================
// Compiler
// ============================================================================

#[derive(Clone)]
pub enum Script {
    /// Exit 0 with this log content
    Succeed(String),
    /// Exit with this non-zero code
    Fail(i32),
    /// The compiler cannot be started
    SpawnError,
}

/// Compiler whose behaviour is scripted per artifact base name.
///
/// Unscripted firmwares succeed and announce `<base>.hex`.
pub struct ScriptedCompiler {
    logs: PathBuf,
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
    cancel_on_call: Option<StopSignal>,
}

impl ScriptedCompiler {
    pub fn new(logs: &Path) -> Self {
        Self {
            logs: logs.to_path_buf(),
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            cancel_on_call: None,
        }
    }

    pub fn script(mut self, base_name: &str, script: Script) -> Self {
        self.scripts.insert(base_name.to_string(), script);
        self
    }

    /// Raise `stop` while the first compile is running
    pub fn cancel_on_call(mut self, stop: StopSignal) -> Self {
        self.cancel_on_call = Some(stop);
        self
    }

    /// Base names compiled so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Compiler for ScriptedCompiler {
    async fn compile(
        &self,
        firmware: &FirmwareSpec,
        _working_dir: &Path,
    ) -> Result<CompileOutput, CompilerError> {
        let base = firmware.artifact_base_name();
        self.calls.lock().unwrap().push(base.clone());
        if let Some(stop) = &self.cancel_on_call {
            stop.stop();
        }

        let log_file = self.logs.join(format!("qmk-compile-{base}.log"));
        let script = self
            .scripts
            .get(&base)
            .cloned()
            .unwrap_or_else(|| Script::Succeed(format!("Compiling...\n{}\n", marker(&base, "hex"))));

        match script {
            Script::Succeed(log) => {
                fs::write(&log_file, log).unwrap();
                Ok(CompileOutput {
                    exit_code: 0,
                    log_file,
                })
            }
            Script::Fail(exit_code) => {
                fs::write(&log_file, "make: *** [build] Error 1\n").unwrap();
                Ok(CompileOutput {
                    exit_code,
                    log_file,
                })
            }
            Script::SpawnError => Err(CompilerError::Spawn {
                program: "qmk".to_string(),
                log_file,
                error: std::io::Error::new(std::io::ErrorKind::NotFound, "qmk not found"),
            }),
        }
    }
}

// ============================================================================
// Reporter
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Begin(usize),
    Status(String),
    Newline,
    Debug(String),
    Info(String),
    Warn(String),
    Error(String),
    Outcome(String, BuildOutcome),
    Advance,
    Finish,
}

#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Status(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn outcomes(&self) -> Vec<(String, BuildOutcome)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Outcome(name, outcome) => Some((name, outcome)),
                _ => None,
            })
            .collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Info(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Error(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }

    /// The last `Done: ...` line, if the run got that far
    pub fn summary(&self) -> Option<String> {
        self.infos().into_iter().rev().find(|l| l.starts_with("Done: "))
    }
}

impl Reporter for RecordingReporter {
    fn begin(&self, total: usize) {
        self.push(Event::Begin(total));
    }

    fn status(&self, message: &str) {
        self.push(Event::Status(message.to_string()));
    }

    fn newline(&self) {
        self.push(Event::Newline);
    }

    fn debug(&self, message: &str) {
        self.push(Event::Debug(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.push(Event::Info(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.push(Event::Warn(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Event::Error(message.to_string()));
    }

    fn outcome(&self, firmware: &FirmwareSpec, outcome: &BuildOutcome) {
        self.push(Event::Outcome(firmware.to_string(), outcome.clone()));
    }

    fn advance(&self) {
        self.push(Event::Advance);
    }

    fn finish(&self) {
        self.push(Event::Finish);
    }
}
