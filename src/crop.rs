use crate::constants::MAX_IMAGE_DIMENSION;
use crate::error::{CompressionError, Result};
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

/// Compute the centered source rectangle (x, y, width, height) that matches
/// the target aspect ratio.
///
/// If the source is relatively wider than the target, the full height is kept
/// and the width is trimmed symmetrically; otherwise the full width is kept
/// and the height is trimmed. Leftover margin splits evenly within one pixel.
pub fn crop_region(
    source_width: u32,
    source_height: u32,
    target_width: u32,
    target_height: u32,
) -> (u32, u32, u32, u32) {
    let source_ratio = source_width as f64 / source_height as f64;
    let target_ratio = target_width as f64 / target_height as f64;

    if source_ratio > target_ratio {
        let crop_height = source_height;
        let crop_width = ((source_height as f64 * target_ratio).round() as u32)
            .clamp(1, source_width);
        let offset_x = (source_width - crop_width) / 2;
        (offset_x, 0, crop_width, crop_height)
    } else {
        let crop_width = source_width;
        let crop_height = ((source_width as f64 / target_ratio).round() as u32)
            .clamp(1, source_height);
        let offset_y = (source_height - crop_height) / 2;
        (0, offset_y, crop_width, crop_height)
    }
}

/// Center-crop to the target aspect ratio, then scale to exactly
/// (target_width x target_height).
pub fn crop_to_fill(img: &DynamicImage, target_width: u32, target_height: u32) -> DynamicImage {
    let (source_width, source_height) = img.dimensions();
    let (x, y, w, h) = crop_region(source_width, source_height, target_width, target_height);

    img.crop_imm(x, y, w, h).resize_exact(
        target_width,
        target_height,
        image::imageops::FilterType::Lanczos3,
    )
}

/// Crop raw image bytes to exact target dimensions and re-encode losslessly.
///
/// This is the intermediate step before compression; PNG keeps it lossless so
/// the final lossiness is controlled by the compression pass alone. Decode or
/// encode failure maps to a render error.
pub fn crop_to_preset(bytes: &[u8], target_width: u32, target_height: u32) -> Result<Vec<u8>> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CompressionError::Render(format!("Failed to read source image: {}", e)))?
        .decode()
        .map_err(|e| CompressionError::Render(format!("Failed to decode source image: {}", e)))?;

    let (width, height) = img.dimensions();
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(CompressionError::InvalidDimensions(
            width,
            height,
            MAX_IMAGE_DIMENSION,
        ));
    }

    let cropped = crop_to_fill(&img, target_width, target_height);

    let mut out = Vec::new();
    cropped
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| CompressionError::Render(format!("Failed to render cropped image: {}", e)))?;

    Ok(out)
}
