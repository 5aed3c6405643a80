//! Carrying EXIF metadata from the downloaded original to the resized file.
//!
//! Non-free media pages rely on the embedded camera, author and licensing
//! tags, so they are copied across wholesale with `little_exif`. The only
//! tags rewritten are the EXIF pixel dimensions (`PixelXDimension`,
//! `PixelYDimension`), which would otherwise still describe the original.
//!
//! Copying is best effort. Formats `little_exif` cannot handle (SVG, BMP, a
//! PNG without an existing eXIf chunk, …) produce a [`MetadataError`] that
//! the coordinator logs and ignores; the resize itself still counts.
//!
//! Only EXIF travels. IPTC and XMP blocks in the original are not copied.

use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use std::panic;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Cannot read metadata from {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Cannot write metadata to {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("Metadata library rejected {0}")]
    Unsupported(String),
}

/// Copy all EXIF tags from `source` to `dest`, then set the pixel
/// dimension tags to `width` x `height`.
pub fn copy_metadata(
    source: &Path,
    dest: &Path,
    width: u32,
    height: u32,
) -> Result<(), MetadataError> {
    // little_exif panics on some malformed containers instead of erroring.
    let read = panic::catch_unwind(panic::AssertUnwindSafe(|| Metadata::new_from_path(source)))
        .map_err(|_| MetadataError::Unsupported(source.display().to_string()))?;
    let mut metadata = read.map_err(|source_err| MetadataError::Read {
        path: source.display().to_string(),
        source: source_err,
    })?;

    metadata.set_tag(ExifTag::ExifImageWidth(vec![width]));
    metadata.set_tag(ExifTag::ExifImageHeight(vec![height]));

    let written = panic::catch_unwind(panic::AssertUnwindSafe(|| metadata.write_to_file(dest)))
        .map_err(|_| MetadataError::Unsupported(dest.display().to_string()))?;
    written.map_err(|source_err| MetadataError::Write {
        path: dest.display().to_string(),
        source: source_err,
    })
}
