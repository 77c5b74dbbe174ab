pub mod batch;
pub mod cli;
pub mod compressor;
pub mod constants;
pub mod crop;
pub mod error;
pub mod export;
pub mod formats;
pub mod info;
pub mod item;
pub mod logger;
pub mod options;
pub mod processing;
pub mod store;
pub mod utils;

pub use batch::{run_all, BatchSummary};
pub use compressor::{compress_bytes, CompressConfig};
pub use crop::{crop_region, crop_to_fill, crop_to_preset};
pub use error::{CompressionError, Result};
pub use export::{export_all, output_file_name, ExportOutcome};
pub use formats::OutputFormat;
pub use item::{CompressedImage, Item, ItemId, ItemStatus, SourceImage};
pub use options::{Options, TargetPreset};
pub use processing::compress_item;
pub use store::{collect_image_files, ItemStore};
