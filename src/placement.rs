//! Moving artifacts and companion assets into the output directory
//!
//! Neither routine can abort a release: filesystem errors are reported and
//! swallowed.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::report::Reporter;

/// Where companion assets live and how they are recognised
#[derive(Debug, Clone)]
pub struct AssetOptions {
    /// Relative to the repository root
    pub source_dir: PathBuf,
    /// File name suffix of the files to copy
    pub suffix: String,
    pub dry_run: bool,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("main").join("via"),
            suffix: ".via.json".to_string(),
            dry_run: false,
        }
    }
}

/// Move `artifact` to `output_dir/<file name>`.
///
/// Returns the destination on success. Already in place is a no-op.
pub fn place_artifact(reporter: &dyn Reporter, output_dir: &Path, artifact: &Path) -> Option<PathBuf> {
    let Some(file_name) = artifact.file_name() else {
        reporter.error(&format!("Not a file: {}", artifact.display()));
        return None;
    };
    let target = output_dir.join(file_name);

    if same_file(artifact, &target) {
        reporter.debug(&format!("firmware already at {}", artifact.display()));
        return Some(target);
    }

    reporter.debug(&format!("copy: {} -> {}", artifact.display(), target.display()));
    match fs::rename(artifact, &target) {
        Ok(()) => Some(target),
        Err(e) => {
            error!("rename {} -> {}: {}", artifact.display(), target.display(), e);
            reporter.error(&format!(
                "Failed to move {} to the output directory: {}",
                artifact.display(),
                e
            ));
            None
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy every `*<suffix>` file of `<repository>/<source_dir>` into
/// `output_dir`. Returns the number of files copied (or, in dry-run, that
/// would have been).
pub fn copy_companion_assets(
    reporter: &dyn Reporter,
    output_dir: &Path,
    repository: &Path,
    options: &AssetOptions,
) -> usize {
    reporter.newline();
    reporter.info("Copying BastardKB firmwares assets");

    let source_dir = repository.join(&options.source_dir);
    let source_dir = source_dir.canonicalize().unwrap_or(source_dir);
    if !source_dir.is_dir() {
        reporter.error(&format!("{} is not a directory", source_dir.display()));
        return 0;
    }

    let mut assets: Vec<PathBuf> = match fs::read_dir(&source_dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with(&options.suffix))
            })
            .collect(),
        Err(e) => {
            reporter.error(&format!("Cannot list {}: {}", source_dir.display(), e));
            return 0;
        }
    };
    assets.sort();

    reporter.info(&format!(
        "  Copying Via definition files ({} files)",
        assets.len()
    ));

    let mut copied = 0;
    for src in &assets {
        let Some(name) = src.file_name() else { continue };
        let dst = output_dir.join(name);

        if same_file(src, &dst) {
            debug!("{} already in the output directory", src.display());
        } else if !options.dry_run {
            if let Err(e) = fs::copy(src, &dst) {
                reporter.error(&format!(
                    "    {} ko ({})",
                    name.to_string_lossy(),
                    e
                ));
                continue;
            }
        }
        debug!("copy: {} -> {}", src.display(), dst.display());
        reporter.info(&format!("    {} ok", name.to_string_lossy()));
        copied += 1;
    }
    copied
}
