use crate::constants::{MAX_FILE_SIZE, PASTED_NAME_PREFIX};
use crate::error::{CompressionError, Result};
use crate::formats::{extension_for_media_type, media_type_for_path};
use crate::item::{Item, ItemId, SourceImage};
use crate::utils::is_image_file;
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

/// The ordered working set of items.
///
/// Cheaply cloneable handle; all mutation goes through the enumerated
/// operations. Readers take whole-set snapshots, writers apply per-item
/// transforms under the lock, so two items finishing in close succession
/// cannot lose each other's updates.
#[derive(Clone, Default)]
pub struct ItemStore {
    items: Arc<Mutex<Vec<Item>>>,
    next_id: Arc<AtomicU64>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&self) -> ItemId {
        ItemId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Append a new pending item, assigning it a fresh identifier.
    pub fn add_image(
        &self,
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> ItemId {
        let id = self.fresh_id();
        let item = Item::new(id, SourceImage::new(name, media_type, bytes));
        self.items.lock().unwrap().push(item);
        id
    }

    /// Read an image file from disk and append it to the set.
    pub fn add_file(&self, path: &Path) -> Result<ItemId> {
        if !path.exists() {
            return Err(CompressionError::FileNotFound(path.to_path_buf()));
        }

        let file_size = fs::metadata(path)?.len();
        if file_size > MAX_FILE_SIZE {
            return Err(CompressionError::FileTooLarge(file_size, MAX_FILE_SIZE));
        }

        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(self.add_image(name, media_type_for_path(path), bytes))
    }

    /// Bulk add; returns the new ids in arrival order.
    pub fn add_paths(&self, paths: &[PathBuf]) -> Result<Vec<ItemId>> {
        let mut ids = Vec::with_capacity(paths.len());
        for path in paths {
            ids.push(self.add_file(path)?);
        }
        Ok(ids)
    }

    /// Append pasted image data that arrived without a usable name.
    ///
    /// The synthesized name carries the capture timestamp and the fresh item
    /// id, so it is unique within the set even when two pastes land in the
    /// same millisecond.
    pub fn add_pasted(&self, media_type: &str, bytes: Vec<u8>) -> ItemId {
        let id = self.fresh_id();
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let name = format!(
            "{}_{}_{}.{}",
            PASTED_NAME_PREFIX,
            millis,
            id.0,
            extension_for_media_type(media_type)
        );
        let item = Item::new(id, SourceImage::new(name, media_type, bytes));
        self.items.lock().unwrap().push(item);
        id
    }

    /// Remove exactly the item with this id; no-op if absent.
    pub fn remove(&self, id: ItemId) {
        self.items.lock().unwrap().retain(|item| item.id != id);
    }

    /// Empty the set entirely.
    pub fn clear(&self) {
        self.items.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<Item> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// Clone of the current working set, in arrival order.
    pub fn snapshot(&self) -> Vec<Item> {
        self.items.lock().unwrap().clone()
    }

    /// Atomic merge-update by id against the latest state. Returns false if
    /// the item has been removed in the meantime.
    pub fn update(&self, id: ItemId, f: impl FnOnce(&mut Item)) -> bool {
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }
}

/// Expand a CLI input token into image file paths: a single file, a directory
/// (optionally walked recursively, hidden entries skipped) or a glob pattern.
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();

    let input_path = Path::new(input);

    if input_path.is_file() {
        image_files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path).into_iter()
        } else {
            WalkDir::new(input_path).max_depth(1).into_iter()
        };

        for entry in walker.filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.')) {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && is_image_file(path) {
                image_files.push(path.to_path_buf());
            }
        }
    } else if let Ok(glob_pattern) = glob(input) {
        for entry in glob_pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                image_files.push(entry);
            }
        }
    } else {
        return Err(CompressionError::NoImageFilesFound(input.to_string()));
    }

    Ok(image_files)
}
