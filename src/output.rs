//! CLI output formatting.
//!
//! stdout is part of the interface: `resize` prints exactly one status line
//! so scripts can read it, while diagnostics go to the log on stderr.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! 6f0c2b1e9d8a4c7b8e3f5a1d2c4b6e8f.jpg
//! ```
//!
//! or one of `SKIP`, `PIXEL`, `BOMB`, `ERROR`.
//!
//! ## Plan
//!
//! ```text
//! 4000x3000 → 365x273
//!     Pixels: 12000000 → 99645 (99.17% fewer)
//!     Verdict: resize
//! ```
//!
//! ## Length
//!
//! ```text
//! 2in = 180 px
//! 50% = -0.5 (relative, 50% of the viewBox)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::imaging::{NewSize, exceeds_pixel_limit};
use crate::resize::ResizeOutcome;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Resize
// ============================================================================

/// The single status line for a resize.
pub fn format_outcome(outcome: &ResizeOutcome) -> Vec<String> {
    vec![outcome.status().to_string()]
}

pub fn print_outcome(outcome: &ResizeOutcome) {
    for line in format_outcome(outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan
// ============================================================================

/// What the coordinator would do with a raster image of this size.
fn verdict(width: u32, height: u32, size: &NewSize) -> &'static str {
    if exceeds_pixel_limit(width, height) {
        "BOMB (too many pixels to decode)"
    } else if !size.is_worthwhile() {
        "PIXEL (less than 5% change)"
    } else {
        "resize"
    }
}

/// Describe the size calculation for `width` x `height`.
pub fn format_plan(width: u32, height: u32, size: &NewSize) -> Vec<String> {
    let before = u64::from(width) * u64::from(height);
    let after = u64::from(size.width) * u64::from(size.height);
    vec![
        format!("{}x{} → {}x{}", width, height, size.width, size.height),
        format!(
            "{}Pixels: {} → {} ({:.2}% fewer)",
            indent(1),
            before,
            after,
            size.percent_change
        ),
        format!("{}Verdict: {}", indent(1), verdict(width, height, size)),
    ]
}

pub fn print_plan(width: u32, height: u32, size: &NewSize) {
    for line in format_plan(width, height, size) {
        println!("{}", line);
    }
}

// ============================================================================
// Length
// ============================================================================

/// Describe a parsed SVG length. Negative values are percentages.
pub fn format_length(text: &str, value: f64) -> Vec<String> {
    let text = text.trim();
    if value < 0.0 {
        vec![format!(
            "{} = {} (relative, {}% of the viewBox)",
            text,
            value,
            -value * 100.0
        )]
    } else {
        vec![format!("{} = {} px", text, value)]
    }
}

pub fn print_length(text: &str, value: f64) {
    for line in format_length(text, value) {
        println!("{}", line);
    }
}
