use crate::constants::{
    DEFAULT_MAX_DIMENSION, DEFAULT_MAX_OUTPUT_SIZE_MB, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY,
    ONE_INCH_PHOTO, TWO_INCH_PHOTO,
};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use std::fmt;
use std::str::FromStr;

/// Global compression options, applied uniformly to every item in a run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Target upper bound on output size in megabytes.
    pub max_output_size_mb: f64,
    /// Longest-side limit in pixels. Not applied when a fixed preset is selected.
    pub max_dimension: u32,
    /// Offload the CPU-bound pipeline to the blocking thread pool.
    pub use_background_worker: bool,
    pub output_format: OutputFormat,
    /// Quality factor in [0.1, 1.0].
    pub quality: f32,
}

impl Options {
    pub fn new(
        max_output_size_mb: f64,
        max_dimension: u32,
        use_background_worker: bool,
        output_format: OutputFormat,
        quality: f32,
    ) -> Result<Self> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }
        if max_output_size_mb <= 0.0 || !max_output_size_mb.is_finite() {
            return Err(CompressionError::InvalidMaxSize(max_output_size_mb));
        }
        if max_dimension == 0 {
            return Err(CompressionError::InvalidMaxDimension(max_dimension));
        }

        Ok(Self {
            max_output_size_mb,
            max_dimension,
            use_background_worker,
            output_format,
            quality,
        })
    }

    pub fn max_output_bytes(&self) -> u64 {
        (self.max_output_size_mb * 1024.0 * 1024.0) as u64
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_output_size_mb: DEFAULT_MAX_OUTPUT_SIZE_MB,
            max_dimension: DEFAULT_MAX_DIMENSION,
            use_background_worker: true,
            output_format: OutputFormat::Jpeg,
            quality: DEFAULT_QUALITY,
        }
    }
}

/// Target output sizing mode for a run.
///
/// A fixed preset forces a center-crop to exact ID-photo pixel dimensions
/// before compression and suppresses the `max_dimension` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetPreset {
    #[default]
    Original,
    OneInch,
    TwoInch,
    Custom,
}

impl TargetPreset {
    /// Exact target pixel dimensions, present only for the fixed presets.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            TargetPreset::OneInch => Some(ONE_INCH_PHOTO),
            TargetPreset::TwoInch => Some(TWO_INCH_PHOTO),
            TargetPreset::Original | TargetPreset::Custom => None,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.dimensions().is_some()
    }

    pub fn preset_names() -> Vec<&'static str> {
        vec!["original", "1inch", "2inch", "custom"]
    }
}

impl fmt::Display for TargetPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetPreset::Original => "original",
            TargetPreset::OneInch => "1inch",
            TargetPreset::TwoInch => "2inch",
            TargetPreset::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TargetPreset {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "original" => Ok(TargetPreset::Original),
            "1inch" | "one-inch" => Ok(TargetPreset::OneInch),
            "2inch" | "two-inch" => Ok(TargetPreset::TwoInch),
            "custom" => Ok(TargetPreset::Custom),
            _ => Err(CompressionError::UnsupportedFormat(s.to_string())),
        }
    }
}
