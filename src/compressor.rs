//! The compression routine behind the per-item pipeline.
//!
//! Accepts raw image bytes plus a run configuration, and produces re-encoded
//! bytes that fit the byte budget when possible: lossy formats step quality
//! down between passes, lossless formats scale dimensions down. The result of
//! the final pass is returned even if still over budget (best effort).

use crate::constants::{
    DOWNSCALE_FACTOR, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, MAX_COMPRESS_PASSES,
    MAX_IMAGE_DIMENSION, MIN_QUALITY, QUALITY_STEP, ZOPFLI_ITERATIONS,
};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::item::CompressedImage;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageFormat, ImageReader};
use oxipng::Deflaters;
use std::io::Cursor;
use std::num::NonZeroU8;

/// Run configuration handed to the compression routine, derived from the
/// global options by the orchestrator.
#[derive(Debug, Clone)]
pub struct CompressConfig {
    pub max_output_bytes: u64,
    /// Longest-side constraint. `None` when the input already has exact
    /// target dimensions from a fixed preset.
    pub max_dimension: Option<u32>,
    pub output_format: OutputFormat,
    pub quality: f32,
}

const PROGRESS_DECODED: u8 = 10;
const PROGRESS_PRESCALED: u8 = 25;
const PROGRESS_ENCODE_SPAN: u32 = 70;

/// Compress raw image bytes according to `config`.
///
/// `on_progress` observes non-decreasing percentages and sees 100 only when
/// the routine is about to return success.
pub fn compress_bytes(
    input: &[u8],
    config: &CompressConfig,
    on_progress: impl Fn(u8),
) -> Result<CompressedImage> {
    let img = ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| CompressionError::Encoding(format!("Failed to read image: {}", e)))?
        .decode()
        .map_err(|e| CompressionError::Encoding(format!("Failed to decode image: {}", e)))?;
    on_progress(PROGRESS_DECODED);

    let (width, height) = img.dimensions();
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(CompressionError::InvalidDimensions(
            width,
            height,
            MAX_IMAGE_DIMENSION,
        ));
    }

    let mut current = match config.max_dimension {
        Some(max_dim) if width.max(height) > max_dim => {
            img.resize(max_dim, max_dim, image::imageops::FilterType::Lanczos3)
        }
        _ => img,
    };
    on_progress(PROGRESS_PRESCALED);

    let mut quality = config.quality;
    let mut pass = 0u32;
    let encoded = loop {
        pass += 1;
        let bytes = encode_image(&current, config.output_format, quality)?;
        let pct =
            PROGRESS_PRESCALED + (PROGRESS_ENCODE_SPAN * pass / MAX_COMPRESS_PASSES).min(70) as u8;
        on_progress(pct);

        if bytes.len() as u64 <= config.max_output_bytes || pass >= MAX_COMPRESS_PASSES {
            break bytes;
        }

        if config.output_format.is_lossy() && quality - QUALITY_STEP >= MIN_QUALITY {
            quality -= QUALITY_STEP;
        } else {
            let (w, h) = current.dimensions();
            if w <= 1 || h <= 1 {
                break bytes;
            }
            let new_w = ((w as f64 * DOWNSCALE_FACTOR) as u32).max(1);
            let new_h = ((h as f64 * DOWNSCALE_FACTOR) as u32).max(1);
            current = current.resize_exact(new_w, new_h, image::imageops::FilterType::Lanczos3);
        }
    };

    let (width, height) = current.dimensions();
    on_progress(100);

    Ok(CompressedImage {
        bytes: encoded,
        format: config.output_format,
        width,
        height,
    })
}

fn quality_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

fn encode_image(img: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Jpeg => {
            let rgb = img.to_rgb8();
            let mut buf = Vec::new();
            let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality_percent(quality));
            encoder
                .encode(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(|e| CompressionError::Encoding(format!("JPEG encoding failed: {}", e)))?;
            Ok(buf)
        }
        OutputFormat::Png => {
            let mut buf = Vec::new();
            img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .map_err(|e| CompressionError::Encoding(format!("PNG encoding failed: {}", e)))?;
            optimize_png(&buf, quality)
        }
        OutputFormat::WebP => {
            let mut buf = Vec::new();
            img.write_to(&mut Cursor::new(&mut buf), ImageFormat::WebP)
                .map_err(|e| CompressionError::Encoding(format!("WebP encoding failed: {}", e)))?;
            Ok(buf)
        }
    }
}

/// Optimize encoded PNG bytes with oxipng, picking the deflater tier from the
/// quality factor: >= 0.9 Zopfli, >= 0.7 high libdeflater, otherwise low.
fn optimize_png(bytes: &[u8], quality: f32) -> Result<Vec<u8>> {
    let mut oxipng_options = oxipng::Options::from_preset(4);
    oxipng_options.force = true;

    if quality >= 0.9 {
        oxipng_options.deflate = Deflaters::Zopfli {
            iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap(),
        };
    } else if quality >= 0.7 {
        oxipng_options.deflate = Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        };
    } else {
        oxipng_options.deflate = Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        };
    }

    oxipng::optimize_from_memory(bytes, &oxipng_options)
        .map_err(|e| CompressionError::PngOptimization(e.to_string()))
}
