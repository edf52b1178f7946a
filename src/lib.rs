//! Spritelayer - a layered sprite compositor
//!
//! A [`SpriteLayer`] owns a set of sprites keyed by unique priority and
//! composites the ones intersecting a scrollable viewport into a
//! caller-owned `0xAARRGGBB` frame buffer:
//!
//! - 4/8-bit indexed bitmaps resolved through a palette bank
//!   (`selector << shift`), 16-bit RGB565 and 32-bit ARGB direct bitmaps
//! - fixed-point nearest-neighbor scaling (1024 = 1.0x, negative mirrors)
//!   and sub-rectangle slices
//! - copy, alpha, palette and color-keyed blending plus one custom strategy
//! - optional band-parallel rendering with identical output
//!
//! Scenes can be described in JSON ([`scene`]) and rendered to PNG by the
//! `sprl` binary.

pub mod bitmap;
pub mod blend;
pub mod cli;
pub mod color;
pub mod compositor;
pub mod config;
pub mod error;
pub mod format;
pub mod geometry;
pub mod layer;
pub mod output;
pub mod registry;
pub mod scale;
pub mod scene;
pub mod sprite;
pub mod visibility;

pub use bitmap::{Bitmap, PixelFormat};
pub use blend::{BlendMode, BlendStrategy};
pub use compositor::{RenderOptions, RenderReport};
pub use error::{LayerError, Result, Warning};
pub use format::{PaletteContext, SourceRun};
pub use geometry::Rect;
pub use layer::{SharedSpriteLayer, SpriteLayer};
pub use scale::Scale;
pub use sprite::{SpriteEntry, SpriteOptions};
pub use visibility::Viewport;
