//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only, no full decode) |
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Downscale | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the configured quality |
//! | Encode → PNG | `image::codecs::png::PngEncoder`, best compression, adaptive filter |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//! | GIF | byte copy |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::fit_to_width;
use super::params::{CompressParams, Encoding};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
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

/// Load and decode an image from disk, trusting content over extension.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

fn downscale(img: DynamicImage, max_width: Option<u32>) -> DynamicImage {
    match fit_to_width((img.width(), img.height()), max_width) {
        Some((width, height)) => img.resize_exact(width, height, FilterType::Lanczos3),
        None => img,
    }
}

fn encode_failed(format: &str, e: image::ImageError) -> BackendError {
    BackendError::ProcessingFailed(format!("{format} encode failed: {e}"))
}

/// Encode `img` to `path` in the given format.
fn save_image(
    img: DynamicImage,
    encoding: Encoding,
    path: &Path,
    quality: u32,
) -> Result<(), BackendError> {
    let writer = BufWriter::new(File::create(path)?);
    match encoding {
        Encoding::Jpeg => {
            // JPEG has no alpha channel
            let encoder = JpegEncoder::new_with_quality(writer, quality as u8);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| encode_failed("JPEG", e))
        }
        Encoding::Png => {
            let encoder =
                PngEncoder::new_with_quality(writer, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)
                .map_err(|e| encode_failed("PNG", e))
        }
        Encoding::WebP => {
            let encoder = WebPEncoder::new_lossless(writer);
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_with_encoder(encoder)
                .map_err(|e| encode_failed("WebP", e))
        }
        Encoding::Verbatim => Err(BackendError::ProcessingFailed(
            "verbatim files are copied, not encoded".to_string(),
        )),
    }
}

fn write_partial(params: &CompressParams, partial: &Path) -> Result<(), BackendError> {
    match params.encoding() {
        Encoding::Verbatim => {
            fs::copy(&params.source, partial)?;
            Ok(())
        }
        encoding => {
            let img = downscale(load_image(&params.source)?, params.max_width);
            save_image(img, encoding, partial, params.quality.value())
        }
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn compress(&self, params: &CompressParams) -> Result<(), BackendError> {
        let partial = params.partial_output();
        if let Err(e) = write_partial(params, &partial) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        fs::rename(&partial, &params.output)?;
        Ok(())
    }
}
