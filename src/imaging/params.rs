//! Parameter types for raster operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`resize`](crate::resize) coordinator (which decides
//! the target size) and the [`backend`](super::backend) (which does the
//! actual pixel work), so tests can swap in a recording backend.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    /// High enough that a second generation of JPEG loss stays invisible at
    /// the reduced size.
    fn default() -> Self {
        Self(95)
    }
}

/// Parameters for a downscale of one raster file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}
