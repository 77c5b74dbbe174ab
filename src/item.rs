use crate::formats::OutputFormat;
use std::fmt;
use std::sync::Arc;

/// Stable opaque identifier for an item in the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A user-supplied source image. Bytes are shared so snapshots stay cheap.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// The output of a successful compression run for one item.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

impl CompressedImage {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Pending,
    Compressing,
    Done,
    Error,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Compressing => "compressing",
            ItemStatus::Done => "done",
            ItemStatus::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// One image and its processing state.
///
/// Invariant: `compressed` is `Some` iff `status == Done`. `progress` is
/// meaningful only while `Compressing` and never decreases during that state.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    pub original: SourceImage,
    pub compressed: Option<Arc<CompressedImage>>,
    pub status: ItemStatus,
    pub progress: u8,
    pub error: Option<String>,
}

impl Item {
    pub fn new(id: ItemId, original: SourceImage) -> Self {
        Self {
            id,
            original,
            compressed: None,
            status: ItemStatus::Pending,
            progress: 0,
            error: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == ItemStatus::Done
    }

    /// Fraction of bytes saved by compression, as a percentage. Negative when
    /// the output grew.
    pub fn savings_percent(&self) -> Option<f64> {
        let compressed = self.compressed.as_ref()?;
        let original = self.original.size();
        if original == 0 {
            return None;
        }
        Some(((original as f64 - compressed.size() as f64) / original as f64) * 100.0)
    }
}
