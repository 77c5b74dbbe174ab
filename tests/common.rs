use image::{DynamicImage, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// A deterministic non-uniform test image; uniform fills compress to almost
/// nothing and hide sizing behavior.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let buf = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(buf)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    gradient_image(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn write_test_png(path: &Path, width: u32, height: u32) {
    gradient_image(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient_image(width, height)
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}
