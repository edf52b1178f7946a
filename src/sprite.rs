//! Sprite entries held by the registry

use crate::bitmap::{Bitmap, PixelFormat};
use crate::blend::BlendMode;
use crate::error::LayerError;
use crate::geometry::Rect;
use crate::scale::Scale;

/// Largest accepted palette shift.
pub const MAX_PALETTE_SHIFT: u8 = 16;

/// Palette shift for sprites added without one: 16-color banks.
pub const DEFAULT_PALETTE_SHIFT: u8 = 4;

/// Optional parameters for adding a sprite.
///
/// `Default` gives the documented defaults: palette selector 0, shift 4,
/// identity scale on both axes, opaque master alpha, full-bitmap slice and
/// the layer's default blend mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteOptions {
    pub x: i32,
    pub y: i32,
    pub palette_selector: u32,
    pub palette_shift: u8,
    pub scale_horiz: i32,
    pub scale_vert: i32,
    pub master_alpha: u8,
    /// Initial slice; `None` shows the whole bitmap
    pub slice: Option<Rect>,
    /// Blend mode; `None` uses the layer default
    pub blend: Option<BlendMode>,
}

impl Default for SpriteOptions {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            palette_selector: 0,
            palette_shift: DEFAULT_PALETTE_SHIFT,
            scale_horiz: Scale::UNIT,
            scale_vert: Scale::UNIT,
            master_alpha: 255,
            slice: None,
            blend: None,
        }
    }
}

impl SpriteOptions {
    pub fn at(x: i32, y: i32) -> Self {
        Self { x, y, ..Self::default() }
    }

    pub fn with_scale(mut self, horiz: i32, vert: i32) -> Self {
        self.scale_horiz = horiz;
        self.scale_vert = vert;
        self
    }

    pub fn with_palette(mut self, selector: u32, shift: u8) -> Self {
        self.palette_selector = selector;
        self.palette_shift = shift;
        self
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.master_alpha = alpha;
        self
    }

    pub fn with_slice(mut self, slice: Rect) -> Self {
        self.slice = Some(slice);
        self
    }

    pub fn with_blend(mut self, mode: BlendMode) -> Self {
        self.blend = Some(mode);
        self
    }
}

/// One registered raster object.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteEntry {
    priority: i32,
    x: i32,
    y: i32,
    slice: Rect,
    scale_horiz: Scale,
    scale_vert: Scale,
    palette_selector: u32,
    palette_shift: u8,
    master_alpha: u8,
    blend: BlendMode,
    bitmap: Bitmap,
}

impl SpriteEntry {
    /// Build an entry, validating scales and palette shift.
    ///
    /// # Errors
    ///
    /// [`LayerError::InvalidScale`] for a zero scale,
    /// [`LayerError::InvalidPaletteShift`] for a shift above [`MAX_PALETTE_SHIFT`].
    pub fn new(
        priority: i32,
        bitmap: Bitmap,
        options: SpriteOptions,
        default_blend: BlendMode,
    ) -> Result<Self, LayerError> {
        let scale_horiz = Scale::new(options.scale_horiz)?;
        let scale_vert = Scale::new(options.scale_vert)?;
        validate_shift(options.palette_shift)?;
        let full = full_extent(&bitmap);
        let slice = options.slice.map_or(full, |s| s.intersect(&full));
        Ok(Self {
            priority,
            x: options.x,
            y: options.y,
            slice,
            scale_horiz,
            scale_vert,
            palette_selector: options.palette_selector,
            palette_shift: options.palette_shift,
            master_alpha: options.master_alpha,
            blend: options.blend.unwrap_or(default_blend),
            bitmap,
        })
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn slice(&self) -> Rect {
        self.slice
    }

    pub fn scale(&self) -> (Scale, Scale) {
        (self.scale_horiz, self.scale_vert)
    }

    pub fn palette(&self) -> (u32, u8) {
        (self.palette_selector, self.palette_shift)
    }

    pub fn master_alpha(&self) -> u8 {
        self.master_alpha
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn format(&self) -> PixelFormat {
        self.bitmap.format()
    }

    pub fn source_size(&self) -> (u32, u32) {
        (self.bitmap.width(), self.bitmap.height())
    }

    /// On-screen width after scaling the slice.
    pub fn scaled_width(&self) -> u32 {
        self.scale_horiz.extent(self.slice.width())
    }

    /// On-screen height after scaling the slice.
    pub fn scaled_height(&self) -> u32 {
        self.scale_vert.extent(self.slice.height())
    }

    /// Placement box in layer coordinates: `(x, y)` plus the scaled slice size.
    pub fn bounds(&self) -> Rect {
        Rect::from_xywh(self.x, self.y, self.scaled_width(), self.scaled_height())
    }

    /// True when nothing of the sprite can reach the screen.
    pub fn is_empty(&self) -> bool {
        self.slice.is_empty() || self.scaled_width() == 0 || self.scaled_height() == 0
    }

    pub(crate) fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub(crate) fn set_scale_horiz(&mut self, scale: Scale) {
        self.scale_horiz = scale;
    }

    pub(crate) fn set_scale_vert(&mut self, scale: Scale) {
        self.scale_vert = scale;
    }

    /// Clamp `requested` to the bitmap and store it. Returns the stored slice.
    pub(crate) fn set_slice(&mut self, requested: Rect) -> Rect {
        self.slice = requested.intersect(&full_extent(&self.bitmap));
        self.slice
    }

    pub(crate) fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    pub(crate) fn set_master_alpha(&mut self, alpha: u8) {
        self.master_alpha = alpha;
    }

    pub(crate) fn set_palette(&mut self, selector: u32, shift: u8) -> Result<(), LayerError> {
        validate_shift(shift)?;
        self.palette_selector = selector;
        self.palette_shift = shift;
        Ok(())
    }

    /// Swap the backing bitmap. The slice resets to the full extent when the
    /// dimensions change and is kept otherwise.
    pub(crate) fn replace_bitmap(&mut self, bitmap: Bitmap) -> Bitmap {
        if !self.bitmap.same_dimensions(&bitmap) {
            self.slice = full_extent(&bitmap);
        }
        std::mem::replace(&mut self.bitmap, bitmap)
    }
}

fn full_extent(bitmap: &Bitmap) -> Rect {
    Rect::from_xywh(0, 0, bitmap.width(), bitmap.height())
}

fn validate_shift(shift: u8) -> Result<(), LayerError> {
    if shift > MAX_PALETTE_SHIFT {
        Err(LayerError::InvalidPaletteShift(shift))
    } else {
        Ok(())
    }
}
