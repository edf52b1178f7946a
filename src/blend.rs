//! Blend modes for sprite scanlines
//!
//! Every strategy takes a fetched source run, the sprite's palette context,
//! the destination run it covers and the sprite's master alpha, and writes
//! the destination in place. Strategies are not commutative; the compositor
//! applies them in ascending priority so higher priorities paint last.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::{argb, channels};
use crate::format::{PaletteContext, SourceRun};

/// Blend modes for sprites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Opaque copy, source replaces destination including alpha
    Copy,
    /// Source over destination weighted by master alpha and pixel alpha
    #[default]
    Alpha,
    /// Indices resolved through the palette, index 0 transparent, then alpha
    Palette,
    /// Index 0 / alpha 0 pixels are transparent, the rest are copied
    Keyed,
    /// Caller-supplied strategy registered on the layer
    Custom,
}

impl BlendMode {
    /// Parse a blend mode from string
    pub fn from_str(s: &str) -> Option<BlendMode> {
        match s.to_lowercase().as_str() {
            "copy" | "opaque" => Some(BlendMode::Copy),
            "alpha" | "normal" => Some(BlendMode::Alpha),
            "palette" | "indexed" => Some(BlendMode::Palette),
            "keyed" | "masked" => Some(BlendMode::Keyed),
            "custom" => Some(BlendMode::Custom),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlendMode::Copy => "copy",
            BlendMode::Alpha => "alpha",
            BlendMode::Palette => "palette",
            BlendMode::Keyed => "keyed",
            BlendMode::Custom => "custom",
        }
    }

    /// Built-in strategy for this mode, `None` for [`BlendMode::Custom`].
    pub fn builtin(self) -> Option<BlendFn> {
        match self {
            BlendMode::Copy => Some(blend_copy),
            BlendMode::Alpha => Some(blend_alpha),
            BlendMode::Palette => Some(blend_palette),
            BlendMode::Keyed => Some(blend_keyed),
            BlendMode::Custom => None,
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signature shared by the built-in strategies.
pub type BlendFn = fn(SourceRun<'_>, &PaletteContext<'_>, &mut [u32], u8);

/// A caller-supplied blend strategy.
///
/// Implemented for any matching closure, so a plain `Fn` can be registered.
pub trait BlendStrategy: Send + Sync {
    fn blend(&self, src: SourceRun<'_>, palette: &PaletteContext<'_>, dst: &mut [u32], alpha: u8);
}

impl<F> BlendStrategy for F
where
    F: Fn(SourceRun<'_>, &PaletteContext<'_>, &mut [u32], u8) + Send + Sync,
{
    fn blend(&self, src: SourceRun<'_>, palette: &PaletteContext<'_>, dst: &mut [u32], alpha: u8) {
        self(src, palette, dst, alpha)
    }
}

/// Strategy table: the closed set of built-ins plus one custom slot.
#[derive(Clone, Default)]
pub struct BlendRegistry {
    custom: Option<Arc<dyn BlendStrategy>>,
}

impl BlendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the strategy used by [`BlendMode::Custom`], returning the previous one.
    pub fn set_custom(
        &mut self,
        strategy: Arc<dyn BlendStrategy>,
    ) -> Option<Arc<dyn BlendStrategy>> {
        self.custom.replace(strategy)
    }

    pub fn clear_custom(&mut self) -> Option<Arc<dyn BlendStrategy>> {
        self.custom.take()
    }

    pub fn has_custom(&self) -> bool {
        self.custom.is_some()
    }

    /// Blend one run. Returns `false` when `Custom` was requested without a
    /// registered strategy; the run is then blended with `Alpha`.
    pub fn apply(
        &self,
        mode: BlendMode,
        src: SourceRun<'_>,
        palette: &PaletteContext<'_>,
        dst: &mut [u32],
        alpha: u8,
    ) -> bool {
        match (mode.builtin(), &self.custom) {
            (Some(f), _) => {
                f(src, palette, dst, alpha);
                true
            }
            (None, Some(custom)) => {
                custom.blend(src, palette, dst, alpha);
                true
            }
            (None, None) => {
                blend_alpha(src, palette, dst, alpha);
                false
            }
        }
    }
}

impl fmt::Debug for BlendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlendRegistry").field("custom", &self.custom.is_some()).finish()
    }
}

/// Linear interpolation of one channel, rounded: `round((s*a + d*(255-a)) / 255)`.
#[inline]
fn mix(src: u8, dst: u8, a: u32) -> u8 {
    ((u32::from(src) * a + u32::from(dst) * (255 - a) + 127) / 255) as u8
}

/// Source-over of `src` onto `dst` with weight `a` (0-255).
#[inline]
pub fn mix_pixel(src: u32, dst: u32, a: u8) -> u32 {
    match a {
        0 => dst,
        255 => src | 0xFF00_0000,
        _ => {
            let a = u32::from(a);
            let [_, sr, sg, sb] = channels(src);
            let [da, dr, dg, db] = channels(dst);
            argb(mix(255, da, a), mix(sr, dr, a), mix(sg, dg, a), mix(sb, db, a))
        }
    }
}

/// `master * pixel_alpha / 255`, rounded.
#[inline]
fn effective_alpha(master: u8, pixel_alpha: u8) -> u8 {
    ((u32::from(master) * u32::from(pixel_alpha) + 127) / 255) as u8
}

fn blend_copy(src: SourceRun<'_>, palette: &PaletteContext<'_>, dst: &mut [u32], _alpha: u8) {
    match src {
        SourceRun::Indices(indices) => {
            for (d, &i) in dst.iter_mut().zip(indices) {
                *d = palette.lookup(i);
            }
        }
        SourceRun::Colors(colors) => {
            let n = colors.len().min(dst.len());
            dst[..n].copy_from_slice(&colors[..n]);
        }
    }
}

fn blend_alpha(src: SourceRun<'_>, palette: &PaletteContext<'_>, dst: &mut [u32], alpha: u8) {
    if alpha == 0 {
        return;
    }
    match src {
        SourceRun::Indices(indices) => {
            for (d, &i) in dst.iter_mut().zip(indices) {
                let c = palette.lookup(i);
                *d = mix_pixel(c, *d, effective_alpha(alpha, (c >> 24) as u8));
            }
        }
        SourceRun::Colors(colors) => {
            for (d, &c) in dst.iter_mut().zip(colors) {
                *d = mix_pixel(c, *d, effective_alpha(alpha, (c >> 24) as u8));
            }
        }
    }
}

fn blend_palette(src: SourceRun<'_>, palette: &PaletteContext<'_>, dst: &mut [u32], alpha: u8) {
    match src {
        SourceRun::Indices(indices) => {
            if alpha == 0 {
                return;
            }
            for (d, &i) in dst.iter_mut().zip(indices) {
                if i == 0 {
                    continue;
                }
                let c = palette.lookup(i);
                *d = mix_pixel(c, *d, effective_alpha(alpha, (c >> 24) as u8));
            }
        }
        // Direct colors carry no index; alpha 0 already leaves dst untouched
        SourceRun::Colors(_) => blend_alpha(src, palette, dst, alpha),
    }
}

fn blend_keyed(src: SourceRun<'_>, palette: &PaletteContext<'_>, dst: &mut [u32], _alpha: u8) {
    match src {
        SourceRun::Indices(indices) => {
            for (d, &i) in dst.iter_mut().zip(indices) {
                if i != 0 {
                    *d = palette.lookup(i);
                }
            }
        }
        SourceRun::Colors(colors) => {
            for (d, &c) in dst.iter_mut().zip(colors) {
                if c >> 24 != 0 {
                    *d = c;
                }
            }
        }
    }
}
