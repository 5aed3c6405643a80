//! The resize coordinator: one wiki file in, one [`ResizeOutcome`] out.
//!
//! ```text
//! name ──► GIF? ──yes──► Skipped
//!           │ no
//!           ▼
//!       download ──► <uuid><ext>          (ScratchFile, removed on drop)
//!           │
//!     ┌─────┴──────┐
//!    SVG         raster
//!  optimize      probe header ──► > 80 MP ──► TooLarge
//!  measure       (unreadable ──► DecodeError)
//!     │             │             (edge truncated to 0: SVG error, raster Skipped)
//!     │             │
//!     └──── calculate_new_size ───► < 5% ──► InsufficientChange
//!                   │
//!     rewrite root  │  resize + encode (q95)
//!                   ▼                 (failure ──► DecodeError)
//!          copy EXIF (best effort)
//!                   ▼
//!           Success(<stem><ext>)
//! ```
//!
//! Statuses are values, not errors. [`ResizeError`] is reserved for things
//! that mean the invocation itself failed: the download, the optimizer, or
//! SVG geometry that cannot be understood.

use crate::imaging::svg::{self, SvgError};
use crate::imaging::{
    NewSize, OptimizerError, Quality, RasterBackend, ResizeParams, SvgOptimizer,
    calculate_new_size, exceeds_pixel_limit,
};
use crate::metadata::copy_metadata;
use crate::naming::{self, FileKind};
use crate::scratch::ScratchFile;
use crate::source::{ImageSource, SourceError};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// Resized; the payload is the output file name inside the work dir.
    Success(String),
    /// Not touched: a GIF, or a raster whose aspect ratio cannot survive
    /// the pixel budget.
    Skipped,
    /// The image is already at or near the pixel budget.
    InsufficientChange,
    /// Decoded size beyond the safety limit.
    TooLarge,
    /// The downloaded bytes could not be decoded or re-encoded.
    DecodeError,
}

impl ResizeOutcome {
    /// The status string callers of the line-oriented interface expect:
    /// the output file name, or `SKIP`, `PIXEL`, `BOMB`, `ERROR`.
    pub fn status(&self) -> &str {
        match self {
            Self::Success(name) => name,
            Self::Skipped => "SKIP",
            Self::InsufficientChange => "PIXEL",
            Self::TooLarge => "BOMB",
            Self::DecodeError => "ERROR",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl fmt::Display for ResizeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status())
    }
}

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("Download failed: {0}")]
    Download(#[from] SourceError),
    #[error("SVG optimizer failed: {0}")]
    Optimizer(#[from] OptimizerError),
    #[error("Invalid SVG: {0}")]
    Svg(#[from] SvgError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one processing branch.
enum Branch {
    Resized(NewSize),
    Stopped(ResizeOutcome),
}

/// Runs the download → resize → metadata pipeline for single files.
pub struct Resizer<'a> {
    source: &'a dyn ImageSource,
    backend: &'a dyn RasterBackend,
    optimizer: &'a dyn SvgOptimizer,
    work_dir: PathBuf,
    quality: Quality,
}

impl<'a> Resizer<'a> {
    pub fn new(
        source: &'a dyn ImageSource,
        backend: &'a dyn RasterBackend,
        optimizer: &'a dyn SvgOptimizer,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            backend,
            optimizer,
            work_dir: work_dir.into(),
            quality: Quality::default(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Downscale the wiki file `name`, saving the result as
    /// `<output_stem><ext>` in the work dir.
    pub fn resize(&self, name: &str, output_stem: &str) -> Result<ResizeOutcome, ResizeError> {
        let extension = naming::extension(name);
        let kind = naming::classify(name);
        if kind == FileKind::Gif {
            log::info!("{name} is a GIF, skipping");
            return Ok(ResizeOutcome::Skipped);
        }

        let scratch = ScratchFile::new(&self.work_dir, naming::temp_file_name(extension));
        self.download(name, &scratch)?;

        let output_name = naming::output_file_name(output_stem, extension);
        let output = self.work_dir.join(&output_name);

        let branch = match kind {
            FileKind::Svg => self.resize_svg(&scratch.path(), &output)?,
            _ => self.resize_raster(name, &scratch.path(), &output),
        };
        let size = match branch {
            Branch::Resized(size) => size,
            Branch::Stopped(outcome) => return Ok(outcome),
        };
        log::info!(
            "Image saved to disk at {} ({}x{}, {:.1}% fewer pixels)",
            output.display(),
            size.width,
            size.height,
            size.percent_change
        );

        match copy_metadata(&scratch.path(), &output, size.width, size.height) {
            Ok(()) => log::info!("Image EXIF data copied"),
            Err(e) => log::warn!("EXIF copy failed, continuing without it: {e}"),
        }

        Ok(ResizeOutcome::Success(output_name))
    }

    fn download(&self, name: &str, scratch: &ScratchFile) -> Result<(), ResizeError> {
        let file = File::create(scratch.path())?;
        let mut writer = BufWriter::new(file);
        let bytes = self.source.download(name, &mut writer)?;
        writer.flush()?;
        log::info!("Downloaded {name} ({bytes} bytes) to {}", scratch.name());
        Ok(())
    }

    fn resize_svg(&self, path: &Path, output: &Path) -> Result<Branch, ResizeError> {
        self.optimizer.optimize(path)?;

        let document = fs::read_to_string(path)?;
        let attrs = svg::read_root_attributes(&document)?;
        let geometry = svg::resolve_geometry(&attrs)?;

        let size = calculate_new_size(geometry.width, geometry.height);
        log::debug!(
            "SVG {}x{} → {}x{} ({:.2}%)",
            geometry.width,
            geometry.height,
            size.width,
            size.height,
            size.percent_change
        );
        if size.is_empty() {
            return Err(SvgError::InvalidDimensions {
                width: geometry.width,
                height: geometry.height,
            }
            .into());
        }
        if !size.is_worthwhile() {
            log::info!("Less than 5% change in pixel count, skipping");
            return Ok(Branch::Stopped(ResizeOutcome::InsufficientChange));
        }

        let rewritten = svg::rewrite_root(&document, &geometry, size.width, size.height)?;
        fs::write(output, rewritten)?;
        Ok(Branch::Resized(size))
    }

    /// Decode problems are statuses here, never errors.
    fn resize_raster(&self, name: &str, path: &Path, output: &Path) -> Branch {
        let dims = match self.backend.probe(path) {
            Ok(dims) => dims,
            Err(e) => {
                log::warn!("Unable to open image {name} - aborting ({e})");
                return Branch::Stopped(ResizeOutcome::DecodeError);
            }
        };
        if exceeds_pixel_limit(dims.width, dims.height) {
            log::warn!(
                "{name} is {}x{} ({} pixels), refusing to decode",
                dims.width,
                dims.height,
                dims.area()
            );
            return Branch::Stopped(ResizeOutcome::TooLarge);
        }
        if dims.width == 0 || dims.height == 0 {
            log::warn!("{name} reports an empty canvas");
            return Branch::Stopped(ResizeOutcome::DecodeError);
        }

        let size = calculate_new_size(f64::from(dims.width), f64::from(dims.height));
        log::debug!(
            "Raster {}x{} → {}x{} ({:.2}%)",
            dims.width,
            dims.height,
            size.width,
            size.height,
            size.percent_change
        );
        if size.is_empty() {
            log::warn!(
                "{name} is {}x{}, too narrow to keep its shape at the pixel budget, skipping",
                dims.width,
                dims.height
            );
            return Branch::Stopped(ResizeOutcome::Skipped);
        }
        if !size.is_worthwhile() {
            log::info!("Less than 5% change in pixel count, skipping");
            return Branch::Stopped(ResizeOutcome::InsufficientChange);
        }

        let params = ResizeParams {
            source: path.to_path_buf(),
            output: output.to_path_buf(),
            width: size.width,
            height: size.height,
            quality: self.quality,
        };
        match self.backend.resize(&params) {
            Ok(()) => Branch::Resized(size),
            Err(e) => {
                log::warn!("Unable to resize image {name} - aborting ({e})");
                if output.exists() {
                    fs::remove_file(output).ok();
                }
                Branch::Stopped(ResizeOutcome::DecodeError)
            }
        }
    }
}
