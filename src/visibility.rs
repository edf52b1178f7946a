//! Viewport and the derived set of visible priorities

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::registry::SpriteRegistry;
use crate::sprite::SpriteEntry;

/// Scrollable window onto the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_x: i32,
    pub scroll_y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { scroll_x: 0, scroll_y: 0, width, height }
    }

    /// Visible region in layer coordinates.
    pub fn rect(&self) -> Rect {
        Rect::from_xywh(self.scroll_x, self.scroll_y, self.width, self.height)
    }
}

/// Whether an entry can contribute pixels to the viewport.
pub fn is_entry_visible(entry: &SpriteEntry, viewport: &Viewport) -> bool {
    !entry.is_empty() && entry.bounds().overlaps(&viewport.rect())
}

/// Priorities currently intersecting the viewport, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilitySet {
    visible: BTreeSet<i32>,
}

impl VisibilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-run the overlap test for one entry. Returns the new state.
    pub fn recheck(&mut self, entry: &SpriteEntry, viewport: &Viewport) -> bool {
        if is_entry_visible(entry, viewport) {
            self.visible.insert(entry.priority());
            true
        } else {
            self.visible.remove(&entry.priority());
            false
        }
    }

    /// Drop a priority that left the registry.
    pub fn forget(&mut self, priority: i32) {
        self.visible.remove(&priority);
    }

    /// Recompute from scratch, used after scrolling.
    pub fn rebuild(&mut self, registry: &SpriteRegistry, viewport: &Viewport) {
        self.visible.clear();
        self.visible.extend(
            registry.iter().filter(|e| is_entry_visible(e, viewport)).map(SpriteEntry::priority),
        );
    }

    pub fn clear(&mut self) {
        self.visible.clear();
    }

    pub fn contains(&self, priority: i32) -> bool {
        self.visible.contains(&priority)
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Visible priorities back to front
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.visible.iter().copied()
    }
}
