//! Per-item compression orchestration: decide on the pre-crop, build the run
//! configuration, drive the compression routine and fold the outcome back
//! into the shared store.

use crate::compressor::{compress_bytes, CompressConfig};
use crate::crop::crop_to_preset;
use crate::error::Result;
use crate::item::{CompressedImage, Item, ItemId, ItemStatus};
use crate::options::{Options, TargetPreset};
use crate::store::ItemStore;
use std::borrow::Cow;
use std::sync::Arc;

/// Build the configuration handed to the compression routine.
///
/// A fixed preset omits the longest-side constraint: the image already has
/// exact target pixel dimensions and constraining it again could re-shrink
/// or distort it.
pub fn build_compress_config(options: &Options, preset: TargetPreset) -> CompressConfig {
    CompressConfig {
        max_output_bytes: options.max_output_bytes(),
        max_dimension: if preset.is_fixed() {
            None
        } else {
            Some(options.max_dimension)
        },
        output_format: options.output_format,
        quality: options.quality,
    }
}

fn run_pipeline(
    item: &Item,
    options: &Options,
    preset: TargetPreset,
    on_progress: impl Fn(u8),
) -> Result<CompressedImage> {
    let input: Cow<'_, [u8]> = match preset.dimensions() {
        Some((width, height)) => Cow::Owned(crop_to_preset(&item.original.bytes, width, height)?),
        None => Cow::Borrowed(&item.original.bytes),
    };

    let config = build_compress_config(options, preset);
    compress_bytes(&input, &config, on_progress)
}

/// Compress one item, recording status, progress and outcome on the store.
///
/// Every failure is caught here and becomes the item's error state; nothing
/// propagates to sibling items. A missing id (item removed while queued) is
/// a no-op.
pub fn compress_item(store: &ItemStore, id: ItemId, options: &Options, preset: TargetPreset) {
    let Some(item) = store.get(id) else {
        return;
    };

    store.update(id, |it| {
        it.status = ItemStatus::Compressing;
        it.progress = 0;
        it.error = None;
        it.compressed = None;
    });

    let progress_store = store.clone();
    let result = run_pipeline(&item, options, preset, move |percent| {
        progress_store.update(id, |it| {
            // Callbacks may interleave with re-encode passes; never go backwards.
            if percent > it.progress {
                it.progress = percent;
            }
        });
    });

    match result {
        Ok(compressed) => {
            store.update(id, |it| {
                it.status = ItemStatus::Done;
                it.compressed = Some(Arc::new(compressed));
                it.progress = 100;
            });
        }
        Err(e) => {
            store.update(id, |it| {
                it.status = ItemStatus::Error;
                it.error = Some(e.to_string());
                it.compressed = None;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::OutputFormat;
    use image::GenericImageView;
    use std::io::Cursor;

    fn png_item_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_build_config_fixed_preset_omits_max_dimension() {
        let options = Options::default();

        let config = build_compress_config(&options, TargetPreset::OneInch);
        assert_eq!(config.max_dimension, None);

        let config = build_compress_config(&options, TargetPreset::Original);
        assert_eq!(config.max_dimension, Some(options.max_dimension));

        let config = build_compress_config(&options, TargetPreset::Custom);
        assert_eq!(config.max_dimension, Some(options.max_dimension));
    }

    #[test]
    fn test_compress_item_success() {
        let store = ItemStore::new();
        let id = store.add_image("a.png", "image/png", png_item_bytes(320, 240));

        compress_item(&store, id, &Options::default(), TargetPreset::Original);

        let item = store.get(id).unwrap();
        assert_eq!(item.status, ItemStatus::Done);
        assert_eq!(item.progress, 100);
        assert!(item.compressed.is_some());
        assert!(item.error.is_none());
    }

    #[test]
    fn test_compress_item_fixed_preset_yields_exact_dimensions() {
        let store = ItemStore::new();
        let id = store.add_image("a.png", "image/png", png_item_bytes(640, 480));

        compress_item(&store, id, &Options::default(), TargetPreset::OneInch);

        let item = store.get(id).unwrap();
        assert_eq!(item.status, ItemStatus::Done);
        let compressed = item.compressed.unwrap();
        assert_eq!((compressed.width, compressed.height), (295, 413));

        let decoded = image::load_from_memory(&compressed.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (295, 413));
        assert_eq!(compressed.format, OutputFormat::Jpeg);
    }

    #[test]
    fn test_compress_item_failure_sets_error() {
        let store = ItemStore::new();
        let id = store.add_image("bad.png", "image/png", b"not an image".to_vec());

        compress_item(&store, id, &Options::default(), TargetPreset::Original);

        let item = store.get(id).unwrap();
        assert_eq!(item.status, ItemStatus::Error);
        assert!(item.compressed.is_none());
        assert!(item.error.is_some());
    }

    #[test]
    fn test_compress_item_crop_failure_sets_error() {
        let store = ItemStore::new();
        let id = store.add_image("bad.png", "image/png", b"not an image".to_vec());

        compress_item(&store, id, &Options::default(), TargetPreset::TwoInch);

        let item = store.get(id).unwrap();
        assert_eq!(item.status, ItemStatus::Error);
        let message = item.error.unwrap();
        assert!(message.contains("Render error"));
    }

    #[test]
    fn test_compress_item_missing_id_is_noop() {
        let store = ItemStore::new();
        let id = store.add_image("a.png", "image/png", png_item_bytes(32, 32));
        store.remove(id);

        compress_item(&store, id, &Options::default(), TargetPreset::Original);
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_item_keeps_partial_progress_below_100() {
        let store = ItemStore::new();
        let id = store.add_image("bad.png", "image/png", b"not an image".to_vec());

        compress_item(&store, id, &Options::default(), TargetPreset::Original);

        let item = store.get(id).unwrap();
        assert_eq!(item.status, ItemStatus::Error);
        assert!(item.progress < 100);
    }
}
