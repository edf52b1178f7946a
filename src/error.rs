//! Error and diagnostic types for the sprite layer

use thiserror::Error;

use crate::sprite::MAX_PALETTE_SHIFT;

/// A non-fatal diagnostic produced while rendering a frame.
///
/// Render passes never abort; conditions that would skip an entry or clip the
/// destination are collected as warnings on the [`RenderReport`](crate::compositor::RenderReport).
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    /// Priority of the sprite the warning refers to, if any
    pub priority: Option<i32>,
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { priority: None, message: message.into() }
    }

    pub fn for_sprite(priority: i32, message: impl Into<String>) -> Self {
        Self { priority: Some(priority), message: message.into() }
    }
}

/// Error returned by sprite layer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    /// No sprite is registered at this priority
    #[error("no sprite registered at priority {0}")]
    NotFound(i32),
    /// A sprite is already registered at this priority
    #[error("priority {0} is already in use")]
    DuplicatePriority(i32),
    /// A scale factor of zero was requested
    #[error("scale must be non-zero")]
    InvalidScale,
    /// Bit depth does not map to a known pixel format
    #[error("unsupported pixel format: {0} bits per pixel")]
    UnsupportedFormat(u8),
    /// A sprite has no usable backing pixels
    #[error("sprite at priority {0} has no pixel data")]
    MissingPixelData(i32),
    /// Palette shift exceeds the supported range
    #[error("palette shift {0} exceeds the maximum of {max}", max = MAX_PALETTE_SHIFT)]
    InvalidPaletteShift(u8),
    /// Bitmap geometry is inconsistent
    #[error("invalid bitmap {width}x{height} with pitch {pitch}: {reason}")]
    InvalidBitmap { width: u32, height: u32, pitch: usize, reason: &'static str },
}

/// Result alias for sprite layer operations
pub type Result<T> = std::result::Result<T, LayerError>;
