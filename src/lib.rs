//! # nonfree-resize
//!
//! Downscales non-free wiki images to roughly 0.1 megapixels, the size
//! fair-use policy allows, while keeping their aspect ratio and metadata.
//!
//! # Pipeline
//!
//! ```text
//! wiki file name ──► download ──► classify ──► SVG: optimize + rewrite root
//!                                    │
//!                                    └──────► raster: probe + resize (Lanczos3)
//!                                                     │
//!                              copy EXIF ◄────────────┘
//!                                    │
//!                                    ▼
//!                   <stem><ext> | SKIP | PIXEL | BOMB | ERROR
//! ```
//!
//! One invocation handles one file. The outcome is a status value, and only
//! failures of the run itself (network, optimizer, unreadable SVG geometry)
//! surface as errors.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`resize`] | The coordinator: branches on file type, enforces the policy, owns cleanup |
//! | [`imaging`] | Size policy, SVG length parsing and root rewriting, raster backend, SVG optimizer |
//! | [`source`] | Where originals come from: MediaWiki API or a local directory |
//! | [`metadata`] | Best-effort EXIF copy from the original to the output |
//! | [`naming`] | File classification, temp names, output names, wiki titles |
//! | [`scratch`] | Drop guard that removes the downloaded temp file and its sidecars |
//! | [`config`] | `config.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Outcomes Are Values
//!
//! `SKIP`, `PIXEL`, `BOMB` and `ERROR` are expected results for a bot working
//! through thousands of files, so they are [`resize::ResizeOutcome`]
//! variants rather than errors. The strings only appear at the CLI boundary.
//!
//! ## Check Size Before Decoding
//!
//! Raster dimensions come from the file header. Anything over 80 megapixels
//! is refused before a single pixel is decoded, which keeps decompression
//! bombs from exhausting memory.
//!
//! ## Injected Collaborators
//!
//! The download source, raster backend and SVG optimizer are traits handed
//! to the coordinator. Tests swap in recording mocks; production wires in
//! the MediaWiki API, the `image` crate and `scour`.

pub mod config;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod resize;
pub mod scratch;
pub mod source;

#[cfg(test)]
pub(crate) mod test_helpers;
