//! The sprite layer: registry, viewport and compositor behind one API
//!
//! Every mutation re-runs the visibility test for the entry it touched before
//! returning, and scrolling or resizing the viewport rebuilds the visibility
//! set, so [`SpriteLayer::is_visible`] always reflects the current geometry.
//!
//! ```
//! use spritelayer::{Bitmap, PixelFormat, SpriteLayer};
//!
//! let mut layer = SpriteLayer::new(640, 480);
//! let bitmap = Bitmap::new(16, 16, PixelFormat::Indexed8, vec![1u8; 256]).unwrap();
//! layer.add_sprite(bitmap, 5, 0, 0).unwrap();
//! assert!(layer.is_visible(5));
//! assert_eq!(layer.scale_sprite_horiz(5, 2048).unwrap(), 32);
//!
//! let mut frame = vec![0u32; 640 * 480];
//! let report = layer.render(&mut frame, 640, &[0, 0xFFFF_FFFF]);
//! assert!(report.is_clean());
//! ```

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::bitmap::Bitmap;
use crate::blend::{BlendMode, BlendRegistry, BlendStrategy};
use crate::compositor::{RasterCompositor, RenderOptions, RenderReport};
use crate::config::SpriteLayerConfig;
use crate::error::Result;
use crate::geometry::Rect;
use crate::registry::SpriteRegistry;
use crate::scale::Scale;
use crate::sprite::{SpriteEntry, SpriteOptions};
use crate::visibility::{Viewport, VisibilitySet};

/// A layered sprite compositor.
#[derive(Debug, Clone)]
pub struct SpriteLayer {
    registry: SpriteRegistry,
    visibility: VisibilitySet,
    viewport: Viewport,
    blends: BlendRegistry,
    default_blend: BlendMode,
    /// Template for [`add_sprite`](Self::add_sprite)
    defaults: SpriteOptions,
    options: RenderOptions,
}

impl SpriteLayer {
    /// Create an empty layer with a `width` x `height` raster scrolled to the origin.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            registry: SpriteRegistry::new(),
            visibility: VisibilitySet::new(),
            viewport: Viewport::new(width, height),
            blends: BlendRegistry::new(),
            default_blend: BlendMode::default(),
            defaults: SpriteOptions::default(),
            options: RenderOptions::default(),
        }
    }

    /// Create an empty layer from a loaded configuration.
    pub fn from_config(config: &SpriteLayerConfig) -> Self {
        let mut layer = Self::new(config.raster.width, config.raster.height);
        layer.default_blend = config.render.blend;
        layer.defaults.master_alpha = config.defaults.master_alpha;
        layer.defaults.palette_shift = config.defaults.palette_shift;
        layer.options = config.render_options();
        layer
    }

    pub fn render_options(&self) -> RenderOptions {
        self.options
    }

    pub fn set_render_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    /// Blend mode given to sprites that do not choose one.
    pub fn default_blend(&self) -> BlendMode {
        self.default_blend
    }

    pub fn set_default_blend(&mut self, mode: BlendMode) {
        self.default_blend = mode;
    }

    /// Defaults used by [`add_sprite`](Self::add_sprite), including the
    /// configured master alpha and palette shift.
    pub fn sprite_defaults(&self) -> SpriteOptions {
        self.defaults.clone()
    }

    /// Register the strategy used by [`BlendMode::Custom`].
    pub fn set_custom_blend<S>(&mut self, strategy: S)
    where
        S: BlendStrategy + 'static,
    {
        self.blends.set_custom(Arc::new(strategy));
    }

    pub fn clear_custom_blend(&mut self) {
        self.blends.clear_custom();
    }

    // ------------------------------------------------------------------
    // Sprite management
    // ------------------------------------------------------------------

    /// Add a sprite at `(x, y)` with the layer defaults.
    pub fn add_sprite(&mut self, bitmap: Bitmap, priority: i32, x: i32, y: i32) -> Result<()> {
        let options = SpriteOptions { x, y, ..self.defaults.clone() };
        self.add_sprite_with(bitmap, priority, options)
    }

    /// Add a sprite with explicit options.
    ///
    /// # Errors
    ///
    /// `DuplicatePriority` if the priority is taken, `InvalidScale` for a zero
    /// scale and `InvalidPaletteShift` for a shift above 16. The layer is
    /// unchanged on error.
    pub fn add_sprite_with(
        &mut self,
        bitmap: Bitmap,
        priority: i32,
        options: SpriteOptions,
    ) -> Result<()> {
        let entry = SpriteEntry::new(priority, bitmap, options, self.default_blend)?;
        self.registry.insert(entry)?;
        let visible = self.recheck(priority);
        tracing::debug!(priority, visible, "sprite added");
        Ok(())
    }

    /// Remove a sprite. Removing an absent priority is a no-op that returns `false`.
    pub fn remove_sprite(&mut self, priority: i32) -> bool {
        self.visibility.forget(priority);
        let removed = self.registry.remove(priority);
        if removed {
            tracing::debug!(priority, "sprite removed");
        }
        removed
    }

    /// Swap a sprite's bitmap, returning the previous one.
    ///
    /// The slice is kept when the new bitmap has the same dimensions and is
    /// reset to its full extent otherwise.
    pub fn replace_sprite_bitmap(&mut self, priority: i32, bitmap: Bitmap) -> Result<Bitmap> {
        self.update(priority, |entry| Ok(entry.replace_bitmap(bitmap)))
    }

    /// Swap a sprite's bitmap and move it in one step.
    pub fn replace_sprite_bitmap_at(
        &mut self,
        priority: i32,
        bitmap: Bitmap,
        x: i32,
        y: i32,
    ) -> Result<Bitmap> {
        self.update(priority, |entry| {
            entry.set_position(x, y);
            Ok(entry.replace_bitmap(bitmap))
        })
    }

    pub fn move_sprite(&mut self, priority: i32, x: i32, y: i32) -> Result<()> {
        self.update(priority, |entry| {
            entry.set_position(x, y);
            Ok(())
        })
    }

    pub fn rel_move_sprite(&mut self, priority: i32, dx: i32, dy: i32) -> Result<()> {
        self.update(priority, |entry| {
            let (x, y) = entry.position();
            entry.set_position(x.saturating_add(dx), y.saturating_add(dy));
            Ok(())
        })
    }

    /// Set the horizontal scale. Returns the new on-screen width.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown priority, then `InvalidScale` for zero.
    pub fn scale_sprite_horiz(&mut self, priority: i32, scale: i32) -> Result<u32> {
        self.update(priority, |entry| {
            entry.set_scale_horiz(Scale::new(scale)?);
            Ok(entry.scaled_width())
        })
    }

    /// Set the vertical scale. Returns the new on-screen height.
    pub fn scale_sprite_vert(&mut self, priority: i32, scale: i32) -> Result<u32> {
        self.update(priority, |entry| {
            entry.set_scale_vert(Scale::new(scale)?);
            Ok(entry.scaled_height())
        })
    }

    /// Show only `rect` of the sprite's bitmap.
    ///
    /// The request is clamped to the bitmap; the stored slice is returned,
    /// which is [`Rect::EMPTY`] when the request lies entirely outside. An
    /// empty slice hides the sprite wherever it is placed.
    pub fn set_slice(&mut self, priority: i32, rect: Rect) -> Result<Rect> {
        self.update(priority, |entry| {
            let slice = entry.set_slice(rect);
            Ok(if slice.is_empty() { Rect::EMPTY } else { slice })
        })
    }

    pub fn set_blend_mode(&mut self, priority: i32, mode: BlendMode) -> Result<()> {
        self.update(priority, |entry| {
            entry.set_blend_mode(mode);
            Ok(())
        })
    }

    pub fn set_master_alpha(&mut self, priority: i32, alpha: u8) -> Result<()> {
        self.update(priority, |entry| {
            entry.set_master_alpha(alpha);
            Ok(())
        })
    }

    /// Select the palette bank: base slot is `selector << shift`.
    pub fn set_palette(&mut self, priority: i32, selector: u32, shift: u8) -> Result<()> {
        self.update(priority, |entry| entry.set_palette(selector, shift))
    }

    /// Remove every sprite.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.visibility.clear();
        tracing::debug!("layer cleared");
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    /// Scroll the viewport to an absolute position.
    pub fn scroll(&mut self, x: i32, y: i32) {
        self.viewport.scroll_x = x;
        self.viewport.scroll_y = y;
        self.rebuild_visibility();
    }

    pub fn rel_scroll(&mut self, dx: i32, dy: i32) {
        let (x, y) = (self.viewport.scroll_x, self.viewport.scroll_y);
        self.scroll(x.saturating_add(dx), y.saturating_add(dy));
    }

    /// Change the raster dimensions.
    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.rebuild_visibility();
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Composite every visible sprite into `dest`.
    ///
    /// `dest` holds rows of `stride` pixels in `0xAARRGGBB`; `palette` is the
    /// table indexed formats resolve through. Never fails: problems are
    /// collected in the returned report.
    pub fn render(&self, dest: &mut [u32], stride: usize, palette: &[u32]) -> RenderReport {
        let compositor = RasterCompositor::new(
            &self.registry,
            &self.visibility,
            self.viewport,
            &self.blends,
            self.options,
        );
        compositor.render(dest, stride, palette)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// On-screen placement box in layer coordinates.
    pub fn sprite_bounds(&self, priority: i32) -> Result<Rect> {
        Ok(self.registry.require(priority)?.bounds())
    }

    pub fn slice_of(&self, priority: i32) -> Result<Rect> {
        Ok(self.registry.require(priority)?.slice())
    }

    /// Horizontal and vertical scale.
    pub fn scale_of(&self, priority: i32) -> Result<(Scale, Scale)> {
        Ok(self.registry.require(priority)?.scale())
    }

    pub fn sprite(&self, priority: i32) -> Option<&SpriteEntry> {
        self.registry.get(priority)
    }

    /// All sprites back to front
    pub fn sprites(&self) -> impl Iterator<Item = &SpriteEntry> {
        self.registry.iter()
    }

    pub fn is_visible(&self, priority: i32) -> bool {
        self.visibility.contains(priority)
    }

    /// Visible priorities in paint order.
    pub fn visible_priorities(&self) -> Vec<i32> {
        self.visibility.iter().collect()
    }

    pub fn contains(&self, priority: i32) -> bool {
        self.registry.contains(priority)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Apply `f` to one entry and re-run its visibility test.
    ///
    /// `f` must not mutate the entry before failing.
    fn update<T>(
        &mut self,
        priority: i32,
        f: impl FnOnce(&mut SpriteEntry) -> Result<T>,
    ) -> Result<T> {
        let entry = self.registry.require_mut(priority)?;
        let out = f(entry)?;
        self.visibility.recheck(entry, &self.viewport);
        Ok(out)
    }

    fn recheck(&mut self, priority: i32) -> bool {
        match self.registry.get(priority) {
            Some(entry) => self.visibility.recheck(entry, &self.viewport),
            None => false,
        }
    }

    fn rebuild_visibility(&mut self) {
        self.visibility.rebuild(&self.registry, &self.viewport);
        tracing::debug!(
            scroll_x = self.viewport.scroll_x,
            scroll_y = self.viewport.scroll_y,
            visible = self.visibility.len(),
            "viewport changed"
        );
    }
}

/// A [`SpriteLayer`] shared between threads.
///
/// Mutations take the write lock, renders take the read lock, so any number
/// of renders may run while no mutation is in flight. Locks are recovered
/// after a panic in another holder: every layer mutation restores its
/// invariants before returning.
#[derive(Debug, Clone)]
pub struct SharedSpriteLayer {
    inner: Arc<RwLock<SpriteLayer>>,
}

impl SharedSpriteLayer {
    pub fn new(layer: SpriteLayer) -> Self {
        Self { inner: Arc::new(RwLock::new(layer)) }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, SpriteLayer> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, SpriteLayer> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Render under the read lock.
    pub fn render(&self, dest: &mut [u32], stride: usize, palette: &[u32]) -> RenderReport {
        self.read().render(dest, stride, palette)
    }

    /// Run a mutation under the write lock.
    pub fn update<T>(&self, f: impl FnOnce(&mut SpriteLayer) -> T) -> T {
        f(&mut self.write())
    }
}

impl From<SpriteLayer> for SharedSpriteLayer {
    fn from(layer: SpriteLayer) -> Self {
        Self::new(layer)
    }
}
