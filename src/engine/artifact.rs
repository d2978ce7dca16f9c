//! Artifact discovery in compiler logs
//!
//! `qmk compile` ends a successful build with a line such as
//!
//! ```text
//! Copying bastardkb_skeletyl_v2_elitec_stock.hex to qmk_firmware folder
//! ```
//!
//! The first such line naming the expected base name wins.

use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Build the marker pattern for `base_name`
pub fn marker_pattern(base_name: &str) -> Regex {
    let pattern = format!(
        r"^Copying (?P<filename>{}\.[a-z0-9]+) to qmk_firmware folder",
        regex::escape(base_name)
    );
    // The only dynamic part is escaped, so the pattern always compiles.
    Regex::new(&pattern).unwrap_or_else(|_| unreachable!("escaped pattern failed to compile"))
}

/// Scan `lines` in order and return the first artifact file name announced
pub fn find_artifact_name<I, S>(base_name: &str, lines: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pattern = marker_pattern(base_name);
    lines.into_iter().find_map(|line| {
        pattern
            .captures(line.as_ref())
            .and_then(|c| c.name("filename"))
            .map(|m| m.as_str().to_string())
    })
}

/// Read `log_file` and return the announced artifact file name, if any
pub fn read_artifact_name(base_name: &str, log_file: &Path) -> io::Result<Option<String>> {
    let reader = BufReader::new(File::open(log_file)?);
    let pattern = marker_pattern(base_name);

    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        if let Some(name) = pattern.captures(&line).and_then(|c| c.name("filename")) {
            return Ok(Some(name.as_str().to_string()));
        }
    }
    Ok(None)
}
