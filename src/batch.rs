//! Concurrent fan-out of the compression pipeline over the working set.

use crate::constants::{
    LARGE_IMAGE_THRESHOLD_MIB, MAX_BATCH_FILES, MAX_BATCH_MEMORY_MIB, MIN_AVAILABLE_MEMORY_MIB,
};
use crate::error::{CompressionError, Result};
use crate::item::{Item, ItemId, ItemStatus};
use crate::options::{Options, TargetPreset};
use crate::processing::compress_item;
use crate::store::ItemStore;
use std::time::Instant;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};
use tokio::task::JoinSet;

/// Outcome statistics for one batch run.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub total: usize,
    /// Items already done before the run started.
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_bytes_before: u64,
    pub total_bytes_after: u64,
    pub elapsed: std::time::Duration,
}

/// Estimate decode memory for one item without decoding it.
///
/// Uncompressed pixel data typically runs 3-4x the encoded size for
/// well-compressed formats and close to 1x for raw-ish ones.
fn estimate_item_memory_mib(item: &Item) -> f64 {
    let size_mib = item.original.size() as f64 / (1024.0 * 1024.0);

    let multiplier = match item.original.media_type.as_str() {
        "image/jpeg" => 4.0,
        "image/png" => 3.0,
        "image/webp" => 3.5,
        "image/bmp" | "image/tiff" => 1.2,
        "image/gif" => 2.0,
        _ => 3.0,
    };

    size_mib * multiplier
}

/// Validate batch limits before any task starts: item count, estimated
/// decode memory, and actually-available system memory.
fn validate_batch_memory_limits(items: &[&Item]) -> Result<(f64, usize)> {
    if items.len() > MAX_BATCH_FILES {
        return Err(CompressionError::BatchFileLimitExceeded(
            items.len(),
            MAX_BATCH_FILES,
        ));
    }

    let mut total_memory_mib = 0.0;
    let mut large_image_count = 0;

    for item in items {
        let memory_estimate = estimate_item_memory_mib(item);
        total_memory_mib += memory_estimate;

        if memory_estimate > LARGE_IMAGE_THRESHOLD_MIB {
            large_image_count += 1;
        }
    }

    let total_memory_mib_u64 = total_memory_mib.ceil() as u64;
    if total_memory_mib_u64 > MAX_BATCH_MEMORY_MIB {
        return Err(CompressionError::BatchMemoryLimitExceeded(
            total_memory_mib_u64,
            MAX_BATCH_MEMORY_MIB,
        ));
    }

    // sysinfo reports bytes; convert to MiB.
    let mut sys =
        System::new_with_specifics(RefreshKind::new().with_memory(MemoryRefreshKind::new()));
    sys.refresh_memory();
    let available_mem_mib = sys.available_memory() / (1024 * 1024);
    let required_with_buffer = total_memory_mib_u64 + MIN_AVAILABLE_MEMORY_MIB;
    if required_with_buffer > available_mem_mib {
        return Err(CompressionError::InsufficientMemory(
            total_memory_mib_u64,
            available_mem_mib,
        ));
    }

    Ok((total_memory_mib, large_image_count))
}

/// Compress every non-`done` item in the set concurrently and wait for all
/// of them to settle.
///
/// Each item runs as its own task with no concurrency cap; one item's
/// failure never aborts its siblings, and there is no cancellation once the
/// run has started. Items already `done` are left untouched, so re-running
/// after a partial failure retries only the remainder.
pub async fn run_all(
    store: &ItemStore,
    options: &Options,
    preset: TargetPreset,
) -> Result<BatchSummary> {
    let start_time = Instant::now();
    let snapshot = store.snapshot();
    let total = snapshot.len();

    let pending: Vec<&Item> = snapshot.iter().filter(|item| !item.is_done()).collect();
    let skipped = total - pending.len();

    if !pending.is_empty() {
        let (estimated_memory_mib, large_image_count) = validate_batch_memory_limits(&pending)?;
        crate::verbose!(
            "Batch estimate: {:.1} MiB decode memory, {} large images",
            estimated_memory_mib,
            large_image_count
        );
    }

    let pending_ids: Vec<ItemId> = pending.iter().map(|item| item.id).collect();
    let mut tasks = JoinSet::new();

    for id in pending_ids {
        let store = store.clone();
        let options = options.clone();

        tasks.spawn(async move {
            if options.use_background_worker {
                let worker_store = store.clone();
                let worker_options = options.clone();
                let joined = tokio::task::spawn_blocking(move || {
                    compress_item(&worker_store, id, &worker_options, preset);
                })
                .await;

                // A panicked worker settles only its own item.
                if joined.is_err() {
                    store.update(id, |it| {
                        it.status = ItemStatus::Error;
                        it.error = Some("compression task aborted".to_string());
                        it.compressed = None;
                    });
                }
            } else {
                compress_item(&store, id, &options, preset);
            }
        });
    }

    while tasks.join_next().await.is_some() {}

    let final_snapshot = store.snapshot();
    let succeeded = final_snapshot
        .iter()
        .filter(|item| item.is_done())
        .count()
        .saturating_sub(skipped);
    let failed = final_snapshot
        .iter()
        .filter(|item| item.status == ItemStatus::Error)
        .count();
    let total_bytes_before: u64 = final_snapshot.iter().map(|item| item.original.size()).sum();
    let total_bytes_after: u64 = final_snapshot
        .iter()
        .filter_map(|item| item.compressed.as_ref())
        .map(|compressed| compressed.size())
        .sum();

    Ok(BatchSummary {
        total,
        skipped,
        succeeded,
        failed,
        total_bytes_before,
        total_bytes_after,
        elapsed: start_time.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SourceImage;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_estimate_item_memory() {
        let item = Item::new(
            ItemId(0),
            SourceImage::new("a.jpg", "image/jpeg", vec![0u8; 1024 * 1024]),
        );
        let estimate = estimate_item_memory_mib(&item);
        assert_eq!(estimate, 4.0);
    }

    #[test]
    fn test_validate_batch_file_limit() {
        let items: Vec<Item> = (0..MAX_BATCH_FILES + 1)
            .map(|i| {
                Item::new(
                    ItemId(i as u64),
                    SourceImage::new(format!("{}.jpg", i), "image/jpeg", vec![0u8; 16]),
                )
            })
            .collect();
        let refs: Vec<&Item> = items.iter().collect();

        let result = validate_batch_memory_limits(&refs);
        assert!(matches!(
            result,
            Err(CompressionError::BatchFileLimitExceeded(_, _))
        ));
    }

    #[test]
    fn test_validate_batch_counts_large_images() {
        let small = Item::new(
            ItemId(0),
            SourceImage::new("small.jpg", "image/jpeg", vec![0u8; 1024]),
        );
        // 20 MiB encoded jpeg estimates to 80 MiB, above the large threshold.
        let big = Item::new(
            ItemId(1),
            SourceImage::new("big.jpg", "image/jpeg", vec![0u8; 20 * 1024 * 1024]),
        );

        let refs = vec![&small, &big];
        let (total_mib, large_count) = validate_batch_memory_limits(&refs).unwrap();
        assert!(total_mib > LARGE_IMAGE_THRESHOLD_MIB);
        assert_eq!(large_count, 1);
    }

    #[tokio::test]
    async fn test_run_all_compresses_everything() {
        let store = ItemStore::new();
        for i in 0..4 {
            store.add_image(format!("img{}.png", i), "image/png", png_bytes(64, 64));
        }

        let summary = run_all(&store, &Options::default(), TargetPreset::Original)
            .await
            .unwrap();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 4);
        assert_eq!(summary.failed, 0);
        assert!(store.snapshot().iter().all(|item| item.is_done()));
    }

    #[tokio::test]
    async fn test_run_all_isolates_failures() {
        let store = ItemStore::new();
        let good = store.add_image("good.png", "image/png", png_bytes(64, 64));
        let bad = store.add_image("bad.png", "image/png", b"garbage".to_vec());

        let summary = run_all(&store, &Options::default(), TargetPreset::Original)
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(store.get(good).unwrap().status, ItemStatus::Done);
        assert_eq!(store.get(bad).unwrap().status, ItemStatus::Error);
        assert!(store.get(bad).unwrap().compressed.is_none());
    }

    #[tokio::test]
    async fn test_run_all_idempotent_for_done_items() {
        let store = ItemStore::new();
        let id = store.add_image("a.png", "image/png", png_bytes(64, 64));

        run_all(&store, &Options::default(), TargetPreset::Original)
            .await
            .unwrap();
        let first = store.get(id).unwrap();
        let first_bytes = first.compressed.clone().unwrap();

        let summary = run_all(&store, &Options::default(), TargetPreset::Original)
            .await
            .unwrap();
        let second = store.get(id).unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.succeeded, 0);
        // Untouched: same allocation, not merely equal bytes.
        assert!(std::sync::Arc::ptr_eq(
            &first_bytes,
            second.compressed.as_ref().unwrap()
        ));
    }

    #[tokio::test]
    async fn test_run_all_retries_failed_items() {
        let store = ItemStore::new();
        let id = store.add_image("bad.png", "image/png", b"garbage".to_vec());

        run_all(&store, &Options::default(), TargetPreset::Original)
            .await
            .unwrap();
        assert_eq!(store.get(id).unwrap().status, ItemStatus::Error);

        // The second run picks the failed item up again.
        let summary = run_all(&store, &Options::default(), TargetPreset::Original)
            .await
            .unwrap();
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_run_all_inline_when_worker_disabled() {
        let store = ItemStore::new();
        store.add_image("a.png", "image/png", png_bytes(64, 64));

        let options = Options {
            use_background_worker: false,
            ..Options::default()
        };

        let summary = run_all(&store, &options, TargetPreset::Original)
            .await
            .unwrap();
        assert_eq!(summary.succeeded, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_completions_are_not_lost() {
        let store = ItemStore::new();
        let n = 12;
        for i in 0..n {
            // Mix of sizes so completions interleave.
            let side = 32 + (i % 4) * 48;
            store.add_image(
                format!("img{}.png", i),
                "image/png",
                png_bytes(side as u32, side as u32),
            );
        }

        run_all(&store, &Options::default(), TargetPreset::Original)
            .await
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), n);
        for item in snapshot {
            assert!(
                matches!(item.status, ItemStatus::Done | ItemStatus::Error),
                "item {} stuck in {}",
                item.id,
                item.status
            );
            assert_eq!(item.compressed.is_some(), item.status == ItemStatus::Done);
        }
    }
}
