use crate::error::{CompressionError, Result};
use crate::utils::format_file_size;
use image::{GenericImageView, ImageReader};
use std::fs;
use std::path::Path;

pub fn get_image_info(input_path: &Path) -> Result<()> {
    if !input_path.exists() {
        return Err(CompressionError::FileNotFound(input_path.to_path_buf()));
    }

    println!("📊 Analyzing image: {:?}", input_path);

    let reader = ImageReader::open(input_path)?;
    let format = reader.format();
    let img = reader.decode()?;
    let metadata = fs::metadata(input_path)?;

    println!("📋 Basic Information:");
    println!("  📁 File: {:?}", input_path);
    println!("  📏 Dimensions: {}x{} pixels", img.width(), img.height());
    println!(
        "  📦 File size: {} bytes ({})",
        metadata.len(),
        format_file_size(metadata.len())
    );
    println!("  🎨 Color type: {:?}", img.color());
    println!("  🎭 Image format: {:?}", format);

    let total_pixels = img.width() as u64 * img.height() as u64;
    let megapixels = total_pixels as f64 / 1_000_000.0;
    let aspect_ratio = img.width() as f64 / img.height() as f64;
    println!("  🔢 Total pixels: {} ({:.2} MP)", total_pixels, megapixels);
    println!("  📐 Aspect ratio: {:.2}:1", aspect_ratio);
    println!(
        "  💾 Estimated decode memory: {:.2} MB",
        estimate_memory_usage(&img)
    );

    println!("\n💡 Compression Suggestions:");

    if metadata.len() > 5 * 1024 * 1024 {
        println!("  🎯 Large file (>5MB): Consider a low quality factor (0.6-0.8)");
    } else if metadata.len() > 1024 * 1024 {
        println!("  🎯 Medium file (1-5MB): Consider a medium quality factor (0.7-0.85)");
    } else {
        println!("  🎯 Small file (<1MB): Consider a high quality factor (0.85-0.95)");
    }

    if img.width() > 1920 || img.height() > 1080 {
        println!("  📏 Large dimensions: Consider --max-dimension 1920 or smaller");
    }

    match format {
        Some(image::ImageFormat::Png) => {
            println!("  🎭 PNG format: oxipng optimization is applied on PNG output");
        }
        Some(image::ImageFormat::Jpeg) => {
            println!("  🎭 JPEG format: Adjust the quality factor for size/quality balance");
        }
        Some(image::ImageFormat::WebP) => {
            println!("  🎭 WebP format: Already well compressed");
        }
        _ => {
            println!("  🎭 Other format: Consider converting to JPEG/WebP output");
        }
    }

    Ok(())
}

/// Estimate decoded in-memory size in MB.
pub fn estimate_memory_usage(img: &image::DynamicImage) -> f64 {
    let (width, height) = img.dimensions();
    let bytes_per_pixel = match img.color() {
        image::ColorType::Rgb8 => 3,
        image::ColorType::Rgba8 => 4,
        image::ColorType::L8 => 1,
        image::ColorType::La8 => 2,
        image::ColorType::Rgb16 => 6,
        image::ColorType::Rgba16 => 8,
        image::ColorType::L16 => 2,
        image::ColorType::La16 => 4,
        _ => 4,
    };

    let total_bytes = (width as u64 * height as u64 * bytes_per_pixel as u64) as f64;
    total_bytes / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_image_info_not_found() {
        let result = get_image_info(Path::new("nonexistent.jpg"));
        assert!(matches!(result, Err(CompressionError::FileNotFound(_))));
    }

    #[test]
    fn test_estimate_memory_usage() {
        let img = image::DynamicImage::new_rgb8(1024, 1024);
        let mb = estimate_memory_usage(&img);
        assert_eq!(mb, 3.0);
    }
}
