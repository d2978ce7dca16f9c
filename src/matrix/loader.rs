//! Matrix file loader
//!
//! Load a build matrix from a YAML file in place of the built-in catalog:
//!
//! ```yaml
//! batches:
//!   - branch: bkb-master
//!     firmwares:
//!       - keyboard: skeletyl/v2/elitec
//!         keymap: default
//!         keymap_alias: stock
//!         env: [VIA_ENABLE=yes]
//! ```

use std::path::Path;

use super::BuildMatrix;

#[derive(Debug, thiserror::Error)]
pub enum MatrixLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error in {file}: {error}")]
    Yaml {
        file: String,
        error: serde_yaml::Error,
    },

    #[error("Invalid matrix in {file}: {reason}")]
    Invalid { file: String, reason: String },
}

pub struct MatrixLoader;

impl MatrixLoader {
    pub fn load_file(path: &Path) -> Result<BuildMatrix, MatrixLoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    pub fn parse(content: &str, file: &str) -> Result<BuildMatrix, MatrixLoadError> {
        let matrix: BuildMatrix =
            serde_yaml::from_str(content).map_err(|e| MatrixLoadError::Yaml {
                file: file.to_string(),
                error: e,
            })?;

        for batch in &matrix.batches {
            if batch.branch.trim().is_empty() {
                return Err(MatrixLoadError::Invalid {
                    file: file.to_string(),
                    reason: "batch with an empty branch name".to_string(),
                });
            }
            for firmware in &batch.firmwares {
                if let Some(var) = firmware.env.iter().find(|v| !v.contains('=')) {
                    return Err(MatrixLoadError::Invalid {
                        file: file.to_string(),
                        reason: format!("{firmware}: env override `{var}` is not KEY=VALUE"),
                    });
                }
            }
        }

        Ok(matrix)
    }
}
