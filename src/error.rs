use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("Invalid quality factor: {0}. Must be between 0.1 and 1.0")]
    InvalidQuality(f32),

    #[error("Invalid max output size: {0} MB. Must be positive")]
    InvalidMaxSize(f64),

    #[error("Invalid max dimension: {0}. Must be positive")]
    InvalidMaxDimension(u32),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Batch memory limit exceeded: estimated {0}MiB, maximum allowed {1}MiB")]
    BatchMemoryLimitExceeded(u64, u64),

    #[error("Batch file count limit exceeded: {0} files, maximum allowed {1}")]
    BatchFileLimitExceeded(usize, usize),

    #[error(
        "Insufficient available memory: estimated batch requires {0}MiB, but only {1}MiB available"
    )]
    InsufficientMemory(u64, u64),
}

pub type Result<T> = std::result::Result<T, CompressionError>;
