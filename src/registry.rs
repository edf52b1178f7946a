//! Sprite registry keyed by priority
//!
//! The registry owns every [`SpriteEntry`]. Priorities are unique and double
//! as paint order, so entries are kept in a `BTreeMap` and iterate
//! back-to-front.

use std::collections::BTreeMap;

use crate::bitmap::Bitmap;
use crate::error::LayerError;
use crate::sprite::SpriteEntry;

/// Ordered map from priority to sprite entry.
#[derive(Debug, Clone, Default)]
pub struct SpriteRegistry {
    entries: BTreeMap<i32, SpriteEntry>,
}

impl SpriteRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { entries: BTreeMap::new() }
    }

    /// Insert an entry at its priority.
    ///
    /// # Errors
    ///
    /// [`LayerError::DuplicatePriority`] if the priority is taken; the
    /// existing entry is left untouched.
    pub fn insert(&mut self, entry: SpriteEntry) -> Result<(), LayerError> {
        use std::collections::btree_map::Entry;

        match self.entries.entry(entry.priority()) {
            Entry::Occupied(_) => Err(LayerError::DuplicatePriority(entry.priority())),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Remove an entry. Returns whether one existed.
    pub fn remove(&mut self, priority: i32) -> bool {
        self.entries.remove(&priority).is_some()
    }

    pub fn get(&self, priority: i32) -> Option<&SpriteEntry> {
        self.entries.get(&priority)
    }

    pub fn get_mut(&mut self, priority: i32) -> Option<&mut SpriteEntry> {
        self.entries.get_mut(&priority)
    }

    /// Look up an entry or fail with [`LayerError::NotFound`].
    pub fn require(&self, priority: i32) -> Result<&SpriteEntry, LayerError> {
        self.get(priority).ok_or(LayerError::NotFound(priority))
    }

    pub fn require_mut(&mut self, priority: i32) -> Result<&mut SpriteEntry, LayerError> {
        self.get_mut(priority).ok_or(LayerError::NotFound(priority))
    }

    /// Swap the bitmap of an entry, returning the previous one.
    ///
    /// The slice resets to the new bitmap's full extent when the dimensions
    /// differ and is preserved otherwise.
    pub fn replace_bitmap(&mut self, priority: i32, bitmap: Bitmap) -> Result<Bitmap, LayerError> {
        Ok(self.require_mut(priority)?.replace_bitmap(bitmap))
    }

    /// Check if a priority is registered
    pub fn contains(&self, priority: i32) -> bool {
        self.entries.contains_key(&priority)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending priority (back to front)
    pub fn iter(&self) -> impl Iterator<Item = &SpriteEntry> {
        self.entries.values()
    }

    /// Registered priorities in ascending order
    pub fn priorities(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::PixelFormat;
    use crate::blend::BlendMode;
    use crate::sprite::SpriteOptions;

    fn entry(priority: i32, w: u32, h: u32) -> SpriteEntry {
        let bmp = Bitmap::new(w, h, PixelFormat::Indexed8, vec![0u8; (w * h) as usize]).unwrap();
        SpriteEntry::new(priority, bmp, SpriteOptions::default(), BlendMode::Alpha).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let mut registry = SpriteRegistry::new();
        registry.insert(entry(5, 4, 4)).unwrap();
        assert!(registry.contains(5));
        assert_eq!(registry.get(5).map(SpriteEntry::priority), Some(5));
        assert!(registry.get(6).is_none());
        assert_eq!(registry.require(6).unwrap_err(), LayerError::NotFound(6));
    }

    #[test]
    fn test_duplicate_priority_rejected() {
        let mut registry = SpriteRegistry::new();
        registry.insert(entry(1, 4, 4)).unwrap();
        let err = registry.insert(entry(1, 8, 8)).unwrap_err();
        assert_eq!(err, LayerError::DuplicatePriority(1));
        // Original survives
        assert_eq!(registry.get(1).unwrap().source_size(), (4, 4));
    }

    #[test]
    fn test_remove_is_noop_safe() {
        let mut registry = SpriteRegistry::new();
        registry.insert(entry(1, 4, 4)).unwrap();
        assert!(registry.remove(1));
        assert!(!registry.remove(1));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_iteration_is_ascending() {
        let mut registry = SpriteRegistry::new();
        for p in [7, -3, 2, 100, 0] {
            registry.insert(entry(p, 1, 1)).unwrap();
        }
        assert_eq!(registry.priorities().collect::<Vec<_>>(), vec![-3, 0, 2, 7, 100]);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_replace_bitmap_missing() {
        let mut registry = SpriteRegistry::new();
        let bmp = Bitmap::unloaded(2, 2, PixelFormat::Indexed4).unwrap();
        assert_eq!(registry.replace_bitmap(9, bmp).unwrap_err(), LayerError::NotFound(9));
    }

    #[test]
    fn test_clear() {
        let mut registry = SpriteRegistry::new();
        registry.insert(entry(1, 1, 1)).unwrap();
        registry.insert(entry(2, 1, 1)).unwrap();
        registry.clear();
        assert_eq!(registry.len(), 0);
    }
}
