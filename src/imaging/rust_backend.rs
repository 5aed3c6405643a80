//! Raster backend on top of the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe | `ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP, BMP) | `ImageReader::into_decoder` + `DynamicImage::from_decoder` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder` |
//! | Encode → indexed PNG | `color_quant::NeuQuant` + `imageops::index_colors` + `png::Encoder` |
//! | Encode → other | `DynamicImage::write_to` |
//!
//! The ICC profile reported by the decoder is handed to the JPEG and PNG
//! encoders so colour-managed images keep rendering the same way.
//!
//! `image` expands palettes on decode. A palette PNG is therefore resized in
//! truecolour and quantized back to an adaptive palette of at most 256
//! entries on save, so it stays a palette PNG.

use super::backend::{BackendError, Dimensions, RasterBackend};
use super::params::{Quality, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use color_quant::NeuQuant;
use image::imageops;
use image::{ColorType, DynamicImage, ImageDecoder, ImageEncoder, ImageError, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// NeuQuant sampling factor: 1 is slowest and best, 30 fastest.
const QUANTIZE_SAMPLE_FACTOR: i32 = 10;

/// Raster backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, err: ImageError) -> BackendError {
    match err {
        ImageError::IoError(e) => BackendError::Io(e),
        other => BackendError::Decode(format!("{}: {}", path.display(), other)),
    }
}

/// A decoded image plus what the source file said about its encoding.
struct LoadedImage {
    image: DynamicImage,
    icc_profile: Option<Vec<u8>>,
    /// The source stored palette indices rather than colours.
    indexed: bool,
}

/// Load and decode an image from disk, sniffing the format from content.
fn load_image(path: &Path) -> Result<LoadedImage, BackendError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let indexed = reader.format() == Some(ImageFormat::Png) && is_indexed_png(path);
    let mut decoder = reader.into_decoder().map_err(|e| decode_error(path, e))?;
    let icc_profile = decoder.icc_profile().unwrap_or_default();
    let image = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))?;
    Ok(LoadedImage {
        image,
        icc_profile,
        indexed,
    })
}

/// Whether the PNG at `path` declares palette colour in its header.
fn is_indexed_png(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    png::Decoder::new(BufReader::new(file))
        .read_info()
        .is_ok_and(|reader| reader.info().color_type == png::ColorType::Indexed)
}

/// Greyscale images resize badly in their native mode; they are widened to
/// RGBA for the filter and narrowed back afterwards.
fn is_reduced_color(color: ColorType) -> bool {
    matches!(
        color,
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16
    )
}

fn widen(img: DynamicImage) -> DynamicImage {
    match img.color() {
        ColorType::L16 | ColorType::La16 => DynamicImage::ImageRgba16(img.to_rgba16()),
        _ => DynamicImage::ImageRgba8(img.to_rgba8()),
    }
}

fn narrow(img: DynamicImage, original: ColorType) -> DynamicImage {
    match original {
        ColorType::L8 => DynamicImage::ImageLuma8(img.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
        ColorType::L16 => DynamicImage::ImageLuma16(img.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(img.to_luma_alpha16()),
        _ => img,
    }
}

/// Resize to exact dimensions, round-tripping reduced colour modes.
fn resize_image(img: DynamicImage, width: u32, height: u32) -> DynamicImage {
    let original = img.color();
    if is_reduced_color(original) {
        let resized = widen(img).resize_exact(width, height, FilterType::Lanczos3);
        narrow(resized, original)
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    }
}

/// JPEG has no alpha channel and no 16-bit mode.
fn jpeg_compatible(img: DynamicImage) -> DynamicImage {
    match img.color() {
        ColorType::L8 | ColorType::Rgb8 => img,
        ColorType::La8 | ColorType::L16 | ColorType::La16 => DynamicImage::ImageLuma8(img.to_luma8()),
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    }
}

fn attach_icc(encoder: &mut impl ImageEncoder, icc_profile: Option<Vec<u8>>) {
    if let Some(profile) = icc_profile {
        if encoder.set_icc_profile(profile).is_err() {
            log::debug!("Encoder does not accept an ICC profile, dropping it");
        }
    }
}

/// Encode to `path`, picking the format from its extension.
fn save_image(
    img: DynamicImage,
    path: &Path,
    quality: Quality,
    icc_profile: Option<Vec<u8>>,
) -> Result<(), BackendError> {
    let format = ImageFormat::from_path(path)
        .map_err(|e| BackendError::Encode(format!("{}: {}", path.display(), e)))?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let result = match format {
        ImageFormat::Jpeg => {
            let mut encoder = JpegEncoder::new_with_quality(writer, quality.value() as u8);
            attach_icc(&mut encoder, icc_profile);
            jpeg_compatible(img).write_with_encoder(encoder)
        }
        ImageFormat::Png => {
            let mut encoder = PngEncoder::new(writer);
            attach_icc(&mut encoder, icc_profile);
            img.write_with_encoder(encoder)
        }
        other => img.write_to(&mut writer, other),
    };

    result.map_err(|e| {
        std::fs::remove_file(path).ok();
        BackendError::Encode(format!("{}: {}", path.display(), e))
    })
}

/// Quantize to an adaptive palette and write an 8-bit indexed PNG.
///
/// ICC profiles are not carried on this path.
fn save_indexed_png(img: &DynamicImage, path: &Path) -> Result<(), BackendError> {
    let rgba = img.to_rgba8();
    let quantizer = NeuQuant::new(QUANTIZE_SAMPLE_FACTOR, 256, rgba.as_raw());
    let indices = imageops::index_colors(&rgba, &quantizer);

    let color_map = quantizer.color_map_rgba();
    let palette: Vec<u8> = color_map
        .chunks_exact(4)
        .flat_map(|c| [c[0], c[1], c[2]])
        .collect();
    let alpha: Vec<u8> = color_map.chunks_exact(4).map(|c| c[3]).collect();

    let encode_error = |e: png::EncodingError| {
        std::fs::remove_file(path).ok();
        BackendError::Encode(format!("{}: {}", path.display(), e))
    };

    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), rgba.width(), rgba.height());
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette);
    if alpha.iter().any(|&a| a != u8::MAX) {
        encoder.set_trns(alpha);
    }
    let mut writer = encoder.write_header().map_err(encode_error)?;
    writer
        .write_image_data(indices.as_raw())
        .map_err(encode_error)?;
    writer.finish().map_err(encode_error)
}

impl RasterBackend for RustBackend {
    fn probe(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| decode_error(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let LoadedImage {
            image,
            icc_profile,
            indexed,
        } = load_image(&params.source)?;
        let resized = resize_image(image, params.width, params.height);
        if indexed && ImageFormat::from_path(&params.output).ok() == Some(ImageFormat::Png) {
            return save_indexed_png(&resized, &params.output);
        }
        save_image(resized, &params.output, params.quality, icc_profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, GrayImage, Luma, Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_rgb(path: &Path, width: u32, height: u32) {
        RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn probe_reads_header_dimensions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("probe.png");
        write_rgb(&path, 640, 480);

        let dims = RustBackend::new().probe(&path).unwrap();
        assert_eq!(dims, Dimensions { width: 640, height: 480 });
    }

    #[test]
    fn probe_sniffs_format_regardless_of_extension() {
        let tmp = TempDir::new().unwrap();
        let png = tmp.path().join("real.png");
        write_rgb(&png, 50, 40);
        let mislabeled = tmp.path().join("real.jpg");
        std::fs::rename(&png, &mislabeled).unwrap();

        let dims = RustBackend::new().probe(&mislabeled).unwrap();
        assert_eq!((dims.width, dims.height), (50, 40));
    }

    #[test]
    fn probe_garbage_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let err = RustBackend::new().probe(&path).unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn probe_missing_file_is_io_error() {
        let err = RustBackend::new()
            .probe(Path::new("/nonexistent/nowhere.png"))
            .unwrap_err();
        assert!(matches!(err, BackendError::Io(_)));
    }

    #[test]
    fn resize_writes_jpeg_at_requested_size() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("output.jpg");
        write_rgb(&source, 800, 600);

        RustBackend::new()
            .resize(&ResizeParams {
                source: source.clone(),
                output: output.clone(),
                width: 365,
                height: 273,
                quality: Quality::default(),
            })
            .unwrap();

        let out = image::open(&output).unwrap();
        assert_eq!(out.dimensions(), (365, 273));
    }

    #[test]
    fn resize_keeps_greyscale_mode() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("grey.png");
        let output = tmp.path().join("grey-small.png");
        GrayImage::from_fn(400, 400, |x, _| Luma([(x % 256) as u8]))
            .save(&source)
            .unwrap();

        RustBackend::new()
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 316,
                height: 316,
                quality: Quality::default(),
            })
            .unwrap();

        let out = image::open(&output).unwrap();
        assert_eq!(out.color(), ColorType::L8);
        assert_eq!(out.dimensions(), (316, 316));
    }

    fn write_indexed(path: &Path, width: u32, height: u32) {
        let palette = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let data: Vec<u8> = (0..width * height)
            .map(|i| ((i % width) / 50 % 4) as u8)
            .collect();
        let file = File::create(path).unwrap();
        let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(palette.to_vec());
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&data).unwrap();
        writer.finish().unwrap();
    }

    fn png_color_type(path: &Path) -> png::ColorType {
        let file = File::open(path).unwrap();
        let reader = png::Decoder::new(BufReader::new(file)).read_info().unwrap();
        reader.info().color_type
    }

    #[test]
    fn resize_keeps_palette_png_indexed() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("pal.png");
        let output = tmp.path().join("pal-small.png");
        write_indexed(&source, 1000, 1000);
        assert!(is_indexed_png(&source));

        RustBackend::new()
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 316,
                height: 316,
                quality: Quality::default(),
            })
            .unwrap();

        assert_eq!(png_color_type(&output), png::ColorType::Indexed);
        assert_eq!(image::open(&output).unwrap().dimensions(), (316, 316));
    }

    #[test]
    fn truecolor_png_is_not_indexed() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("rgb.png");
        let output = tmp.path().join("rgb-small.png");
        write_rgb(&source, 400, 400);
        assert!(!is_indexed_png(&source));

        RustBackend::new()
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 316,
                height: 316,
                quality: Quality::default(),
            })
            .unwrap();

        assert_eq!(png_color_type(&output), png::ColorType::Rgb);
    }

    #[test]
    fn palette_png_saved_as_jpeg_is_truecolor() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("pal.png");
        let output = tmp.path().join("pal.jpg");
        write_indexed(&source, 400, 400);

        RustBackend::new()
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 316,
                height: 316,
                quality: Quality::default(),
            })
            .unwrap();

        assert_eq!(image::open(&output).unwrap().color(), ColorType::Rgb8);
    }

    #[test]
    fn resize_corrupt_source_leaves_no_output() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("corrupt.png");
        let output = tmp.path().join("out.png");
        std::fs::write(&source, b"\x89PNG\r\n\x1a\nthen garbage").unwrap();

        let result = RustBackend::new().resize(&ResizeParams {
            source,
            output: output.clone(),
            width: 10,
            height: 10,
            quality: Quality::default(),
        });

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn jpeg_compatible_drops_alpha() {
        let rgba = DynamicImage::new_rgba8(4, 4);
        assert_eq!(jpeg_compatible(rgba).color(), ColorType::Rgb8);
        let la = DynamicImage::new_luma_a8(4, 4);
        assert_eq!(jpeg_compatible(la).color(), ColorType::L8);
    }

    #[test]
    fn reduced_color_detection() {
        assert!(is_reduced_color(ColorType::L8));
        assert!(is_reduced_color(ColorType::La16));
        assert!(!is_reduced_color(ColorType::Rgb8));
        assert!(!is_reduced_color(ColorType::Rgba8));
    }
}
