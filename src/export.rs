//! Export of compressed results: one direct file, or a zip archive when
//! several items qualify.

use crate::constants::{ARCHIVE_FILE_NAME, COMPRESSED_SUFFIX};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::item::Item;
use crate::options::Options;
use crate::store::ItemStore;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// What an export run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// No item was in `done` state; nothing was written.
    Nothing,
    Single(PathBuf),
    Archive { path: PathBuf, entries: usize },
}

/// Output name for one item: original stem plus the compressed suffix and
/// the configured format's extension.
pub fn output_file_name(original_name: &str, format: OutputFormat) -> String {
    let stem = match original_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original_name,
    };
    format!("{}{}.{}", stem, COMPRESSED_SUFFIX, format.extension())
}

/// Export every successfully compressed item into `out_dir`.
///
/// Zero qualifying items: no-op. Exactly one: a direct file. More than one:
/// a single archive. Entry-name collisions inside the archive are not
/// de-duplicated; the last entry written wins.
pub fn export_all(store: &ItemStore, options: &Options, out_dir: &Path) -> Result<ExportOutcome> {
    let snapshot = store.snapshot();
    let done: Vec<&Item> = snapshot
        .iter()
        .filter(|item| item.is_done() && item.compressed.is_some())
        .collect();

    if done.is_empty() {
        return Ok(ExportOutcome::Nothing);
    }

    fs::create_dir_all(out_dir)
        .map_err(|_| CompressionError::DirectoryCreationFailed(out_dir.to_path_buf()))?;

    if done.len() == 1 {
        let item = done[0];
        let compressed = item.compressed.as_ref().unwrap();
        let path = out_dir.join(output_file_name(
            &item.original.name,
            options.output_format,
        ));
        fs::write(&path, &compressed.bytes)?;
        return Ok(ExportOutcome::Single(path));
    }

    let path = out_dir.join(ARCHIVE_FILE_NAME);
    let entries = write_archive(&done, options.output_format, &path)?;

    Ok(ExportOutcome::Archive { path, entries })
}

fn write_archive(items: &[&Item], format: OutputFormat, path: &Path) -> Result<usize> {
    let file = File::create(path)?;
    let mut archive = ZipWriter::new(file);
    // Entries are already-compressed images; store them uncompressed.
    let entry_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut entries = 0;
    for item in items {
        let compressed = item.compressed.as_ref().unwrap();
        let name = output_file_name(&item.original.name, format);

        archive
            .start_file(name, entry_options)
            .map_err(|e| CompressionError::Archive(format!("Failed to add entry: {}", e)))?;
        archive.write_all(&compressed.bytes)?;
        entries += 1;
    }

    archive
        .finish()
        .map_err(|e| CompressionError::Archive(format!("Failed to finalize archive: {}", e)))?;

    Ok(entries)
}
