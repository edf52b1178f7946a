//! JSON scene files
//!
//! A scene names a palette, a set of bitmaps and the sprites placed from
//! them. Bitmaps are decoded once and shared between every sprite that uses
//! them.
//!
//! ```json
//! {
//!   "palette": ["#00000000", "#FF0000", "#00FF00"],
//!   "bitmaps": [
//!     { "name": "block", "width": 2, "height": 2, "depth": 8, "pixels": [1, 2, 2, 1] }
//!   ],
//!   "sprites": [
//!     { "priority": 1, "bitmap": "block", "x": 4, "y": 4, "scale": [2048, 2048] }
//!   ],
//!   "scroll": [0, 0]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bitmap::{Bitmap, PixelFormat};
use crate::blend::BlendMode;
use crate::color::{parse_color, ColorError};
use crate::config::SpriteLayerConfig;
use crate::error::LayerError;
use crate::geometry::Rect;
use crate::layer::SpriteLayer;

/// Error loading or building a scene
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Failed to read scene: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse scene: {0}")]
    Json(#[from] serde_json::Error),
    #[error("palette entry {index}: {source}")]
    Color {
        index: usize,
        #[source]
        source: ColorError,
    },
    #[error("sprite {priority} references unknown bitmap '{name}'")]
    UnknownBitmap { priority: i32, name: String },
    #[error(transparent)]
    Layer(#[from] LayerError),
}

/// A bitmap definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitmapDef {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Bits per pixel: 4, 8, 16 or 32
    pub depth: u8,
    /// Bytes per row; tightly packed when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<usize>,
    /// Raw pixel bytes; an absent array declares a bitmap whose pixels are not loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixels: Option<Vec<u8>>,
}

impl BitmapDef {
    /// Decode into a [`Bitmap`].
    pub fn to_bitmap(&self) -> Result<Bitmap, LayerError> {
        let format = PixelFormat::from_depth(self.depth)?;
        match &self.pixels {
            Some(pixels) => {
                let pitch = self.pitch.unwrap_or_else(|| format.min_pitch(self.width));
                Bitmap::with_pitch(self.width, self.height, format, pitch, pixels.as_slice())
            }
            None => Bitmap::unloaded(self.width, self.height, format),
        }
    }
}

/// A sprite placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteDef {
    pub priority: i32,
    /// Name of a bitmap in the same scene
    pub bitmap: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// `[horizontal, vertical]` in 1/1024 units; negative mirrors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[i32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice: Option<Rect>,
    /// Palette bank selector
    #[serde(default)]
    pub palette: u32,
    /// Palette shift; the configured default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette_shift: Option<u8>,
    /// Master alpha; the configured default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<u8>,
    /// Blend mode; the configured default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend: Option<BlendMode>,
}

/// A complete scene file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub palette: Vec<String>,
    #[serde(default)]
    pub bitmaps: Vec<BitmapDef>,
    #[serde(default)]
    pub sprites: Vec<SpriteDef>,
    /// Initial viewport scroll `[x, y]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<[i32; 2]>,
}

impl Scene {
    /// Read a scene from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse the palette into packed colors.
    pub fn resolve_palette(&self) -> Result<Vec<u32>, SceneError> {
        self.palette
            .iter()
            .enumerate()
            .map(|(index, s)| parse_color(s).map_err(|source| SceneError::Color { index, source }))
            .collect()
    }

    /// Build a layer holding every sprite, plus the resolved palette.
    pub fn build(&self, config: &SpriteLayerConfig) -> Result<(SpriteLayer, Vec<u32>), SceneError> {
        let palette = self.resolve_palette()?;

        let mut bitmaps: HashMap<&str, Bitmap> = HashMap::with_capacity(self.bitmaps.len());
        for def in &self.bitmaps {
            bitmaps.insert(def.name.as_str(), def.to_bitmap()?);
        }

        let mut layer = SpriteLayer::from_config(config);
        let defaults = layer.sprite_defaults();

        for def in &self.sprites {
            let bitmap = bitmaps.get(def.bitmap.as_str()).cloned().ok_or_else(|| {
                SceneError::UnknownBitmap { priority: def.priority, name: def.bitmap.clone() }
            })?;

            let mut options = defaults.clone();
            options.x = def.x;
            options.y = def.y;
            if let Some([h, v]) = def.scale {
                options.scale_horiz = h;
                options.scale_vert = v;
            }
            options.slice = def.slice;
            options.palette_selector = def.palette;
            options.palette_shift = def.palette_shift.unwrap_or(defaults.palette_shift);
            options.master_alpha = def.alpha.unwrap_or(defaults.master_alpha);
            options.blend = def.blend;

            layer.add_sprite_with(bitmap, def.priority, options)?;
        }

        if let Some([x, y]) = self.scroll {
            layer.scroll(x, y);
        }

        tracing::debug!(
            sprites = layer.len(),
            bitmaps = bitmaps.len(),
            colors = palette.len(),
            "scene built"
        );
        Ok((layer, palette))
    }
}
