//! CSS-style length parsing for SVG `width`, `height` and `viewBox` values.
//!
//! Lengths are converted to pixels at 90 px per inch, the resolution SVG
//! editors such as Inkscape historically assumed.
//!
//! | Unit | Factor |
//! |---|---|
//! | `px` (or none) | 1 |
//! | `pt` | 1.25 |
//! | `pc` | 15 |
//! | `in` | 90 |
//! | `mm` | 3.543307 |
//! | `cm` | 35.43307 |
//! | `%` | relative, see [`parse_length`] |

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static LENGTH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*([A-Za-z%]*)").expect("length pattern must compile")
});

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LengthError {
    #[error("Unknown length format: \"{0}\"")]
    UnknownFormat(String),
    #[error("Unknown length units: {0}")]
    UnknownUnits(String),
}

/// Convert a textual length such as `"12.5mm"` into pixels.
///
/// - Empty input is `0.0`, which callers treat as "not given".
/// - Percentages are relative to a viewport this function knows nothing
///   about, so they come back as a *negative* fraction: `"50%"` → `-0.5`.
///   A negative result is therefore never a usable pixel length.
///
/// # Examples
/// ```
/// # use nonfree_resize::imaging::parse_length;
/// assert_eq!(parse_length("1in").unwrap(), 90.0);
/// assert_eq!(parse_length("50%").unwrap(), -0.5);
/// assert_eq!(parse_length("").unwrap(), 0.0);
/// ```
pub fn parse_length(value: &str) -> Result<f64, LengthError> {
    if value.is_empty() {
        return Ok(0.0);
    }
    let caps = LENGTH_PATTERN
        .captures(value)
        .ok_or_else(|| LengthError::UnknownFormat(value.to_string()))?;
    let num: f64 = caps[1]
        .parse()
        .map_err(|_| LengthError::UnknownFormat(value.to_string()))?;

    let factor = match &caps[2] {
        "" | "px" => 1.0,
        "pt" => 1.25,
        "pc" => 15.0,
        "in" => 90.0,
        "mm" => 3.543307,
        "cm" => 35.43307,
        "%" => return Ok(-num / 100.0),
        other => return Err(LengthError::UnknownUnits(other.to_string())),
    };
    Ok(num * factor)
}
