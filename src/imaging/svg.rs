//! SVG root-element geometry: read it, and write it back resized.
//!
//! Only the outermost `<svg>` element is touched; every other event in the
//! document is copied through unchanged. The viewBox keeps its origin but
//! takes the new pixel size, so user-space content beyond the reduced
//! viewBox falls outside the rendered area.

use super::length::{LengthError, parse_length};
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use thiserror::Error;

static VIEWBOX_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ ,\t]+").expect("viewBox separator must compile"));

#[derive(Error, Debug)]
pub enum SvgError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XML attribute error: {0}")]
    Attribute(#[from] AttrError),
    #[error("{0}")]
    Length(#[from] LengthError),
    #[error("Document has no root element")]
    NoRootElement,
    #[error("Malformed viewBox: \"{0}\"")]
    InvalidViewBox(String),
    #[error("Cannot determine a drawable size (width={width}, height={height})")]
    InvalidDimensions { width: f64, height: f64 },
}

/// Raw geometry attributes of the root element, as written in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootAttributes {
    pub width: String,
    pub height: String,
    pub view_box: String,
}

/// Geometry resolved to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgGeometry {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Read `width`, `height` and `viewBox` from the first element of `document`.
///
/// Missing attributes come back as empty strings.
pub fn read_root_attributes(document: &str) -> Result<RootAttributes, SvgError> {
    let mut reader = Reader::from_str(document);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => return root_attributes(&e),
            Event::Eof => return Err(SvgError::NoRootElement),
            _ => {}
        }
    }
}

fn root_attributes(element: &BytesStart<'_>) -> Result<RootAttributes, SvgError> {
    let mut attrs = RootAttributes::default();
    for attr in element.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_ref() {
            b"width" => attrs.width = value,
            b"height" => attrs.height = value,
            b"viewBox" => attrs.view_box = value,
            _ => {}
        }
    }
    Ok(attrs)
}

/// The four viewBox numbers: `(min_x, min_y, width, height)`.
pub fn parse_view_box(value: &str) -> Result<[f64; 4], SvgError> {
    let parts: Vec<&str> = VIEWBOX_SEPARATOR
        .split(value.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 4 {
        return Err(SvgError::InvalidViewBox(value.to_string()));
    }
    Ok([
        parse_length(parts[0])?,
        parse_length(parts[1])?,
        parse_length(parts[2])?,
        parse_length(parts[3])?,
    ])
}

/// Resolve the root element's size in pixels.
///
/// Explicit `width`/`height` win. When neither yields an absolute length
/// (both absent, percentages relative to some unknown viewport, or negative)
/// the viewBox supplies the size. The offsets always come from the viewBox
/// when it parses, and are zero otherwise.
pub fn resolve_geometry(attrs: &RootAttributes) -> Result<SvgGeometry, SvgError> {
    let width = parse_length(&attrs.width)?;
    let height = parse_length(&attrs.height)?;

    let relative = width < 0.0 || height < 0.0;
    if relative {
        log::warn!(
            "SVG size is not an absolute length (width=\"{}\", height=\"{}\"), falling back to viewBox",
            attrs.width,
            attrs.height
        );
    }

    let geometry = if relative || (width == 0.0 && height == 0.0) {
        let [offset_x, offset_y, width, height] = parse_view_box(&attrs.view_box)?;
        SvgGeometry {
            width,
            height,
            offset_x,
            offset_y,
        }
    } else {
        let (offset_x, offset_y) = match parse_view_box(&attrs.view_box) {
            Ok([x, y, _, _]) => (x, y),
            Err(_) => (0.0, 0.0),
        };
        SvgGeometry {
            width,
            height,
            offset_x,
            offset_y,
        }
    };

    if geometry.width <= 0.0 || geometry.height <= 0.0 {
        return Err(SvgError::InvalidDimensions {
            width: geometry.width,
            height: geometry.height,
        });
    }
    Ok(geometry)
}

/// Copy `document`, replacing the root element's `width`, `height` and
/// `viewBox`. Attributes that were missing are added.
pub fn rewrite_root(
    document: &str,
    geometry: &SvgGeometry,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, SvgError> {
    let width = width.to_string();
    let height = height.to_string();
    let view_box = format!(
        "{} {} {} {}",
        geometry.offset_x, geometry.offset_y, width, height
    );
    let replacements = [
        ("width", width.as_str()),
        ("height", height.as_str()),
        ("viewBox", view_box.as_str()),
    ];

    let mut reader = Reader::from_str(document);
    let mut writer = Writer::new(Vec::with_capacity(document.len()));
    let mut root_done = false;

    loop {
        let event = reader.read_event()?;
        let event = match event {
            Event::Eof => break,
            Event::Start(e) if !root_done => {
                root_done = true;
                Event::Start(with_geometry(&e, &replacements)?)
            }
            Event::Empty(e) if !root_done => {
                root_done = true;
                Event::Empty(with_geometry(&e, &replacements)?)
            }
            other => other,
        };
        writer.write_event(event)?;
    }

    if !root_done {
        return Err(SvgError::NoRootElement);
    }
    Ok(writer.into_inner())
}

fn with_geometry(
    element: &BytesStart<'_>,
    replacements: &[(&str, &str)],
) -> Result<BytesStart<'static>, SvgError> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut rebuilt = BytesStart::new(name);
    let mut seen = [false; 3];

    for attr in element.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        match replacements.iter().position(|(k, _)| *k == key) {
            Some(i) => {
                seen[i] = true;
                rebuilt.push_attribute((key.as_str(), replacements[i].1));
            }
            None => {
                let value: Cow<'_, str> = attr.unescape_value()?;
                rebuilt.push_attribute((key.as_str(), value.as_ref()));
            }
        }
    }
    for (i, (key, value)) in replacements.iter().enumerate() {
        if !seen[i] {
            rebuilt.push_attribute((*key, *value));
        }
    }
    Ok(rebuilt)
}
