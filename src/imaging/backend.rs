//! Raster backend trait and shared types.
//!
//! The [`RasterBackend`] trait covers the two raster operations the
//! downscaler needs: `probe` (header-only dimensions) and `resize`.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot decode image: {0}")]
    Decode(String),
    #[error("Cannot encode image: {0}")]
    Encode(String),
}

/// Result of a probe operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Trait for raster processing backends.
pub trait RasterBackend {
    /// Read image dimensions from the file header, without decoding pixels.
    fn probe(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode, resize and re-encode. The output format follows the output
    /// path's extension.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
