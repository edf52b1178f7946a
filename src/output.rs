//! PNG output for rendered frames

use image::imageops::FilterType;
use image::RgbaImage;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::color::to_rgba;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Copy a frame buffer of packed ARGB rows into an RGBA image.
///
/// Rows are `stride` pixels apart; only the first `width` of each are used.
/// Rows missing from a short buffer stay transparent.
pub fn frame_to_image(frame: &[u32], width: u32, height: u32, stride: usize) -> RgbaImage {
    let mut image = RgbaImage::new(width, height);
    if stride == 0 {
        return image;
    }
    let width = (width as usize).min(stride);
    for (y, row) in frame.chunks(stride).take(height as usize).enumerate() {
        for (x, &c) in row.iter().take(width).enumerate() {
            image.put_pixel(x as u32, y as u32, to_rgba(c));
        }
    }
    image
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save(path)?;
    Ok(())
}

/// Scale image by integer factor using nearest-neighbor interpolation.
///
/// Keeps hard pixel edges. A factor of 0 or 1 returns the image unchanged.
pub fn scale_image(image: RgbaImage, factor: u8) -> RgbaImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    image::imageops::resize(&image, w * factor as u32, h * factor as u32, FilterType::Nearest)
}
