pub const DEFAULT_QUALITY: f32 = 0.9;
pub const MIN_QUALITY: f32 = 0.1;
pub const MAX_QUALITY: f32 = 1.0;

pub const DEFAULT_MAX_OUTPUT_SIZE_MB: f64 = 5.0;
pub const DEFAULT_MAX_DIMENSION: u32 = 2560;

/// Fixed ID-photo target sizes in pixels (width, height).
pub const ONE_INCH_PHOTO: (u32, u32) = (295, 413);
pub const TWO_INCH_PHOTO: (u32, u32) = (413, 579);

pub const COMPRESSED_SUFFIX: &str = "_compressed";
pub const ARCHIVE_FILE_NAME: &str = "compressed_images.zip";
pub const PASTED_NAME_PREFIX: &str = "pasted_image";

/// Upper bound on re-encode passes before the compressor settles for
/// whatever it has (best effort, like the browser collaborator).
pub const MAX_COMPRESS_PASSES: u32 = 10;
/// Per-pass quality reduction for lossy formats.
pub const QUALITY_STEP: f32 = 0.1;
/// Per-pass dimension scale for lossless formats.
pub const DOWNSCALE_FACTOR: f64 = 0.9;

pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;

pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 20_000;

pub const MAX_BATCH_FILES: usize = 1000;
pub const MAX_BATCH_MEMORY_MIB: u64 = 4096;
pub const LARGE_IMAGE_THRESHOLD_MIB: f64 = 50.0;
pub const MIN_AVAILABLE_MEMORY_MIB: u64 = 512;

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
pub const PROGRESS_BAR_TEMPLATE: &str = "{msg:24!} [{bar:40.cyan/blue}] {pos:>3}%";
