//! File naming: classifying wiki file names and naming the files we create.
//!
//! The extension of the wiki file name decides the processing branch and is
//! carried unchanged onto every file written locally:
//! - `Poster.JPG` → raster, temp `3f2c…-….JPG`, output `<stem>.JPG`
//! - `Logo.svg` → vector
//! - `Anim.gif` → skipped before anything is downloaded

use uuid::Uuid;

/// Processing branch chosen from a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Vector graphics, resized by rewriting the root element.
    Svg,
    /// GIFs are never touched: a static resize would destroy animation.
    Gif,
    /// Everything else goes to the raster backend, which decides by content.
    Raster,
}

/// Extension of `name` including the dot (`".JPG"`), or `""` if none.
///
/// Only the final path component counts, and a leading dot (`.hidden`) is
/// part of the name, not an extension.
pub fn extension(name: &str) -> &str {
    let base_start = name.rfind(|c: char| c == '/' || c == '\\').map_or(0, |i| i + 1);
    let base = &name[base_start..];
    match base.rfind('.') {
        Some(0) | None => "",
        Some(dot) => &base[dot..],
    }
}

/// Classify a file name by its extension, case-insensitively.
pub fn classify(name: &str) -> FileKind {
    let ext = extension(name).trim_start_matches('.');
    if ext.eq_ignore_ascii_case("svg") {
        FileKind::Svg
    } else if ext.eq_ignore_ascii_case("gif") {
        FileKind::Gif
    } else {
        FileKind::Raster
    }
}

/// A collision-free local name for the downloaded copy.
pub fn temp_file_name(extension: &str) -> String {
    format!("{}{}", Uuid::new_v4(), extension)
}

/// A fresh stem for outputs when the caller does not choose one.
pub fn random_stem() -> String {
    Uuid::new_v4().simple().to_string()
}

/// The name the resized file is saved under.
pub fn output_file_name(stem: &str, extension: &str) -> String {
    format!("{stem}{extension}")
}

/// Qualify a bare file name with the `File:` namespace for wiki queries.
///
/// Names that already carry `File:` or the legacy `Image:` prefix are
/// returned unchanged.
pub fn wiki_title(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.starts_with("file:") || lower.starts_with("image:") {
        name.to_string()
    } else {
        format!("File:{name}")
    }
}
