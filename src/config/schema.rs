//! Configuration schema types for `spritelayer.toml`
//!
//! Defines the structure and validation rules for sprite layer configuration.

use serde::{Deserialize, Serialize};

use crate::blend::BlendMode;
use crate::color::parse_color;
use crate::compositor::{RenderOptions, DEFAULT_BAND_HEIGHT};
use crate::sprite::{DEFAULT_PALETTE_SHIFT, MAX_PALETTE_SHIFT};

/// Raster (viewport) dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterConfig {
    /// Raster width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Raster height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self { width: default_width(), height: default_height() }
    }
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

/// Render pass settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Default blend mode for new sprites
    #[serde(default)]
    pub blend: BlendMode,
    /// Band-parallel compositing
    #[serde(default)]
    pub parallel: bool,
    /// Rows per parallel band
    #[serde(default = "default_band_height")]
    pub band_height: u32,
    /// Fill the raster before drawing
    #[serde(default = "default_true")]
    pub clear: bool,
    /// Fill color as `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`
    #[serde(default = "default_clear_color")]
    pub clear_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            blend: BlendMode::default(),
            parallel: false,
            band_height: default_band_height(),
            clear: true,
            clear_color: default_clear_color(),
        }
    }
}

fn default_band_height() -> u32 {
    DEFAULT_BAND_HEIGHT
}

fn default_true() -> bool {
    true
}

fn default_clear_color() -> String {
    "#000000".to_string()
}

/// Defaults applied to sprites that do not set them explicitly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Master alpha for new sprites
    #[serde(default = "default_master_alpha")]
    pub master_alpha: u8,
    /// Palette shift for new sprites
    #[serde(default = "default_palette_shift")]
    pub palette_shift: u8,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { master_alpha: default_master_alpha(), palette_shift: default_palette_shift() }
    }
}

fn default_master_alpha() -> u8 {
    255
}

fn default_palette_shift() -> u8 {
    DEFAULT_PALETTE_SHIFT
}

/// Complete spritelayer.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteLayerConfig {
    #[serde(default)]
    pub raster: RasterConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "render.band_height")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "spritelayer.toml: '{}' {}", self.field, self.message)
    }
}

impl SpriteLayerConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.raster.width == 0 || self.raster.height == 0 {
            errors.push(ConfigValidationError {
                field: "raster".to_string(),
                message: "dimensions must be positive".to_string(),
            });
        }

        if self.render.band_height == 0 {
            errors.push(ConfigValidationError {
                field: "render.band_height".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if let Err(e) = parse_color(&self.render.clear_color) {
            errors.push(ConfigValidationError {
                field: "render.clear_color".to_string(),
                message: e.to_string(),
            });
        }

        if self.defaults.palette_shift > MAX_PALETTE_SHIFT {
            errors.push(ConfigValidationError {
                field: "defaults.palette_shift".to_string(),
                message: format!("must be at most {}", MAX_PALETTE_SHIFT),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Render options described by the `[render]` section.
    ///
    /// An unparseable clear color disables clearing; [`validate`](Self::validate)
    /// reports it before a config ever reaches the layer.
    pub fn render_options(&self) -> RenderOptions {
        let clear_color =
            if self.render.clear { parse_color(&self.render.clear_color).ok() } else { None };
        RenderOptions {
            clear_color,
            parallel: self.render.parallel,
            band_height: self.render.band_height.max(1),
        }
    }
}
