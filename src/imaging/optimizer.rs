//! External SVG optimizer.
//!
//! SVGs are run through [scour](https://github.com/scour-project/scour)
//! before they are measured, so that `width`/`height`/`viewBox` are in a
//! canonical form and editor cruft is gone. The optimizer binary is
//! configured, never discovered from ambient state.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Arguments scour always receives, besides input and output.
pub const SCOUR_FLAGS: &[&str] = &[
    "--enable-viewboxing",
    "--enable-id-stripping",
    "--shorten-ids",
    "--indent=none",
];

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Failed to run optimizer '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("Optimizer '{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rewrites an SVG file in place.
pub trait SvgOptimizer {
    fn optimize(&self, path: &Path) -> Result<(), OptimizerError>;
}

/// Runs the `scour` command line tool.
#[derive(Debug, Clone)]
pub struct ScourOptimizer {
    program: PathBuf,
}

impl ScourOptimizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

/// Path the optimizer writes to before it replaces the input.
///
/// The name extends the input's, so cleanup by prefix also removes it.
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".scour");
    PathBuf::from(name)
}

impl SvgOptimizer for ScourOptimizer {
    fn optimize(&self, path: &Path) -> Result<(), OptimizerError> {
        let sidecar = sidecar_path(path);
        let program = self.program.display().to_string();

        let output = Command::new(&self.program)
            .arg("-i")
            .arg(path)
            .arg("-o")
            .arg(&sidecar)
            .args(SCOUR_FLAGS)
            .output()
            .map_err(|source| OptimizerError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OptimizerError::Failed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        std::fs::rename(&sidecar, path)?;
        log::debug!("Optimized {} with {}", path.display(), program);
        Ok(())
    }
}
