//! Content categories and per-category byte histograms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumCount, EnumIter, IntoEnumIterator};

/// Coarse content category of a file, derived from its extension.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
    EnumCount,
)]
pub enum ContentCategory {
    Image,
    Video,
    Audio,
    Archive,
    Document,
    Application,
    Code,
    Log,
    Database,
    Backup,
    #[strum(to_string = "Disk Image")]
    DiskImage,
    Configuration,
    Font,
    Web,
    Spreadsheet,
    Presentation,
    Other,
}

const CATEGORY_COUNT: usize = <ContentCategory as EnumCount>::COUNT;

/// Bytes per content category.
///
/// Backed by a fixed array indexed by category, so merging two histograms is
/// a plain element-wise add and the type stays `Copy`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<ContentCategory, u64>",
    from = "BTreeMap<ContentCategory, u64>"
)]
pub struct TypeHistogram([u64; CATEGORY_COUNT]);

impl TypeHistogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `bytes` to `category`.
    pub fn add(&mut self, category: ContentCategory, bytes: u64) {
        let slot = &mut self.0[category as usize];
        *slot = slot.saturating_add(bytes);
    }

    /// Bytes recorded for `category`.
    pub fn get(&self, category: ContentCategory) -> u64 {
        self.0[category as usize]
    }

    /// Add every category of `other` into this histogram.
    pub fn merge(&mut self, other: &TypeHistogram) {
        for (slot, bytes) in self.0.iter_mut().zip(other.0) {
            *slot = slot.saturating_add(bytes);
        }
    }

    /// Sum over all categories.
    pub fn total(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, b| acc.saturating_add(*b))
    }

    /// Check if no bytes were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Iterate over categories with a non-zero byte count.
    pub fn iter(&self) -> impl Iterator<Item = (ContentCategory, u64)> + '_ {
        ContentCategory::iter()
            .zip(self.0.iter().copied())
            .filter(|(_, bytes)| *bytes > 0)
    }

    /// Non-zero categories, largest first. Ties keep category order.
    pub fn sorted_by_size(&self) -> Vec<(ContentCategory, u64)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1));
        pairs
    }
}

impl From<TypeHistogram> for BTreeMap<ContentCategory, u64> {
    fn from(histogram: TypeHistogram) -> Self {
        histogram.iter().collect()
    }
}

impl From<BTreeMap<ContentCategory, u64>> for TypeHistogram {
    fn from(map: BTreeMap<ContentCategory, u64>) -> Self {
        let mut histogram = TypeHistogram::new();
        for (category, bytes) in map {
            histogram.add(category, bytes);
        }
        histogram
    }
}
