//! End-to-end runs of the resize coordinator against real files.
//!
//! Originals come from a [`LocalSource`] directory and are decoded and
//! encoded by the real [`RustBackend`]. SVGs go through an optimizer that
//! leaves the file untouched, so these tests do not need scour installed.

use nonfree_resize::imaging::{OptimizerError, RustBackend, SvgOptimizer};
use nonfree_resize::resize::{ResizeError, ResizeOutcome, Resizer};
use nonfree_resize::source::LocalSource;
use std::path::Path;
use tempfile::TempDir;

struct NoopOptimizer;

impl SvgOptimizer for NoopOptimizer {
    fn optimize(&self, _path: &Path) -> Result<(), OptimizerError> {
        Ok(())
    }
}

struct Fixture {
    originals: TempDir,
    work: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            originals: TempDir::new().unwrap(),
            work: TempDir::new().unwrap(),
        }
    }

    fn add(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.originals.path().join(name), bytes).unwrap();
    }

    fn add_image(&self, name: &str, width: u32, height: u32) {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        img.save(self.originals.path().join(name)).unwrap();
    }

    fn run(&self, name: &str, stem: &str) -> Result<ResizeOutcome, ResizeError> {
        let source = LocalSource::new(self.originals.path());
        let backend = RustBackend::new();
        let optimizer = NoopOptimizer;
        Resizer::new(&source, &backend, &optimizer, self.work.path()).resize(name, stem)
    }

    fn work_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.work.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

#[test]
fn png_is_resized_to_budget() {
    let fx = Fixture::new();
    fx.add_image("Chart.png", 1024, 1024);

    let outcome = fx.run("File:Chart.png", "chart").unwrap();

    assert_eq!(outcome, ResizeOutcome::Success("chart.png".into()));
    let dims = image::image_dimensions(fx.work.path().join("chart.png")).unwrap();
    assert_eq!(dims, (316, 316));
    // only the output remains
    assert_eq!(fx.work_files(), vec!["chart.png"]);
}

#[test]
fn jpeg_keeps_aspect_ratio_and_extension_case() {
    let fx = Fixture::new();
    fx.add_image("Poster.JPG", 800, 600);

    let outcome = fx.run("Poster.JPG", "poster").unwrap();

    assert_eq!(outcome.status(), "poster.JPG");
    let path = fx.work.path().join("poster.JPG");
    assert_eq!(image::image_dimensions(&path).unwrap(), (365, 273));
    assert_eq!(
        image::ImageReader::open(&path)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format(),
        Some(image::ImageFormat::Jpeg)
    );
    assert_eq!(fx.work_files(), vec!["poster.JPG"]);
}

#[test]
fn small_image_is_pixel_and_writes_nothing() {
    let fx = Fixture::new();
    fx.add_image("Thumb.png", 300, 300);

    assert_eq!(
        fx.run("Thumb.png", "thumb").unwrap(),
        ResizeOutcome::InsufficientChange
    );
    assert!(fx.work_files().is_empty());
}

#[test]
fn corrupt_image_is_error_and_writes_nothing() {
    let fx = Fixture::new();
    fx.add("Broken.jpg", b"\xFF\xD8\xFF\xE0 definitely not a jpeg");

    assert_eq!(
        fx.run("Broken.jpg", "broken").unwrap(),
        ResizeOutcome::DecodeError
    );
    assert!(fx.work_files().is_empty());
}

#[test]
fn gif_is_skipped_even_when_absent() {
    let fx = Fixture::new();

    assert_eq!(fx.run("Missing.gif", "x").unwrap(), ResizeOutcome::Skipped);
    assert!(fx.work_files().is_empty());
}

#[test]
fn missing_original_is_an_error() {
    let fx = Fixture::new();

    let err = fx.run("Missing.png", "x").unwrap_err();

    assert!(matches!(err, ResizeError::Download(_)), "got {err:?}");
    assert!(fx.work_files().is_empty());
}

#[test]
fn svg_in_inches_is_rewritten() {
    let fx = Fixture::new();
    fx.add(
        "Diagram.svg",
        br#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="12in" height="9in" viewBox="0 0 1080 810"><circle cx="540" cy="405" r="300"/></svg>"#,
    );

    let outcome = fx.run("Diagram.svg", "diagram").unwrap();

    assert_eq!(outcome, ResizeOutcome::Success("diagram.svg".into()));
    let written = std::fs::read_to_string(fx.work.path().join("diagram.svg")).unwrap();
    assert!(written.starts_with("<?xml"));
    assert!(written.contains(r#"width="365""#), "{written}");
    assert!(written.contains(r#"height="273""#), "{written}");
    assert!(written.contains(r#"viewBox="0 0 365 273""#), "{written}");
    assert!(written.contains(r#"<circle cx="540" cy="405" r="300"/>"#));
    assert_eq!(fx.work_files(), vec!["diagram.svg"]);
}

#[test]
fn svg_with_percent_size_uses_view_box() {
    let fx = Fixture::new();
    fx.add(
        "Map.svg",
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="100%" height="100%" viewBox="10 20 2000 1000"/>"#,
    );

    fx.run("Map.svg", "map").unwrap();

    let written = std::fs::read_to_string(fx.work.path().join("map.svg")).unwrap();
    // sqrt(100000 * 2) = 447.2 → 447, 1000 * 0.2235 = 223.5 → 223
    assert!(written.contains(r#"width="447""#), "{written}");
    assert!(written.contains(r#"height="223""#), "{written}");
    // offsets survive, the size follows the new dimensions
    assert!(written.contains(r#"viewBox="10 20 447 223""#), "{written}");
}

#[test]
fn svg_with_unknown_units_is_an_error() {
    let fx = Fixture::new();
    fx.add(
        "Odd.svg",
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="10em" height="5em"/>"#,
    );

    assert!(matches!(
        fx.run("Odd.svg", "odd"),
        Err(ResizeError::Svg(_))
    ));
    assert!(fx.work_files().is_empty());
}

#[test]
fn svg_with_explicit_size_keeps_view_box_origin() {
    let fx = Fixture::new();
    fx.add(
        "Shifted.svg",
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="1000" height="500" viewBox="100 50 1000 500"/>"#,
    );

    fx.run("Shifted.svg", "shifted").unwrap();

    let written = std::fs::read_to_string(fx.work.path().join("shifted.svg")).unwrap();
    assert!(written.contains(r#"viewBox="100 50 447 223""#), "{written}");
}

#[test]
fn svg_too_thin_for_the_budget_is_an_error() {
    let fx = Fixture::new();
    fx.add(
        "Strip.svg",
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="200000"/>"#,
    );

    assert!(matches!(fx.run("Strip.svg", "strip"), Err(ResizeError::Svg(_))));
    assert!(fx.work_files().is_empty());
}

#[test]
fn raster_too_thin_for_the_budget_is_skipped() {
    let fx = Fixture::new();
    image::GrayImage::new(1, 200_000)
        .save(fx.originals.path().join("Strip.png"))
        .unwrap();

    assert_eq!(fx.run("Strip.png", "strip").unwrap(), ResizeOutcome::Skipped);
    assert!(fx.work_files().is_empty());
}
