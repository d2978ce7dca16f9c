//! Firmware, batch, and matrix definitions
//!
//! Plain immutable records describing what gets built and in which order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vendor directory under `keyboards/` in the QMK tree, also used as the
/// prefix of every artifact name.
pub const VENDOR: &str = "bastardkb";

// ============================================================================
// FirmwareSpec
// ============================================================================

/// One buildable firmware variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareSpec {
    /// Board + adapter path, e.g. `charybdis/3x5/v2/elitec`
    pub keyboard: String,

    /// Keymap to compile, e.g. `via` or `default`
    pub keymap: String,

    /// Display name used instead of `keymap` in artifact names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keymap_alias: Option<String>,

    /// `KEY=VALUE` overrides handed to the compiler, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
}

impl FirmwareSpec {
    pub fn new(keyboard: impl Into<String>, keymap: impl Into<String>) -> Self {
        Self {
            keyboard: keyboard.into(),
            keymap: keymap.into(),
            keymap_alias: None,
            env: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.keymap_alias = Some(alias.into());
        self
    }

    pub fn env<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env.extend(vars.into_iter().map(Into::into));
        self
    }

    /// Keymap name as it appears in artifact names
    pub fn display_keymap(&self) -> &str {
        self.keymap_alias.as_deref().unwrap_or(&self.keymap)
    }

    /// Name the compiler gives the produced binary, without extension
    pub fn artifact_base_name(&self) -> String {
        format!(
            "{}_{}_{}",
            VENDOR,
            self.keyboard.replace('/', "_"),
            self.display_keymap()
        )
    }

    /// Board identifier passed to `qmk compile --keyboard`
    pub fn qmk_keyboard(&self) -> String {
        format!("{}/{}", VENDOR, self.keyboard)
    }
}

impl fmt::Display for FirmwareSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.keyboard, self.keymap)
    }
}

// ============================================================================
// FirmwareBatch
// ============================================================================

/// Firmwares built together after a single checkout of `branch`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareBatch {
    pub branch: String,

    #[serde(default)]
    pub firmwares: Vec<FirmwareSpec>,
}

impl FirmwareBatch {
    pub fn new(branch: impl Into<String>, firmwares: Vec<FirmwareSpec>) -> Self {
        Self {
            branch: branch.into(),
            firmwares,
        }
    }

    pub fn len(&self) -> usize {
        self.firmwares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.firmwares.is_empty()
    }
}

// ============================================================================
// BuildMatrix
// ============================================================================

/// Every batch of a release, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMatrix {
    #[serde(default)]
    pub batches: Vec<FirmwareBatch>,
}

impl BuildMatrix {
    pub fn new(batches: Vec<FirmwareBatch>) -> Self {
        Self { batches }
    }

    /// Number of firmwares across all batches
    pub fn total_firmwares(&self) -> usize {
        self.batches.iter().map(FirmwareBatch::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_firmwares() == 0
    }

    /// Keep only firmwares whose keyboard starts with `prefix`, dropping
    /// batches left with nothing to build.
    pub fn filter_keyboards(self, prefix: &str) -> Self {
        let batches = self
            .batches
            .into_iter()
            .filter_map(|mut batch| {
                batch.firmwares.retain(|f| f.keyboard.starts_with(prefix));
                (!batch.is_empty()).then_some(batch)
            })
            .collect();
        Self { batches }
    }

    /// Iterate `(branch, firmware)` pairs in build order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FirmwareSpec)> {
        self.batches
            .iter()
            .flat_map(|b| b.firmwares.iter().map(move |f| (b.branch.as_str(), f)))
    }
}
