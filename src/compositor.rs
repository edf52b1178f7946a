//! Full-frame raster compositing
//!
//! A render pass walks the visibility set in ascending priority. For each
//! visible sprite it clips the scaled placement box against the screen,
//! builds the horizontal column map once, then for every covered screen row
//! picks the source row with the vertical step accumulator, fetches the
//! pixels and hands them to the sprite's blend strategy.
//!
//! # Parallel rendering
//!
//! With [`RenderOptions::parallel`] set, the destination is split into
//! horizontal bands rendered on the rayon pool. Each band replays the whole
//! visible set in priority order, clipped to its rows, so every pixel sees
//! the same sequence of writes as in a sequential pass and the output is
//! byte-identical.

use std::ops::Range;

use rayon::prelude::*;

use crate::blend::{BlendMode, BlendRegistry};
use crate::error::{LayerError, Warning};
use crate::format::{PaletteContext, RowFetcher};
use crate::geometry::Rect;
use crate::registry::SpriteRegistry;
use crate::scale::{column_map, sample_map};
use crate::sprite::SpriteEntry;
use crate::visibility::{Viewport, VisibilitySet};

/// Default rows per band for parallel rendering
pub const DEFAULT_BAND_HEIGHT: u32 = 32;

/// Per-pass rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Fill the covered destination with this color before drawing
    pub clear_color: Option<u32>,
    /// Render horizontal bands on the rayon pool
    pub parallel: bool,
    /// Rows per band when rendering in parallel
    pub band_height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { clear_color: Some(0xFF00_0000), parallel: false, band_height: DEFAULT_BAND_HEIGHT }
    }
}

/// Outcome of one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Number of sprites drawn
    pub drawn: usize,
    /// Priorities skipped this frame
    pub skipped: Vec<i32>,
    /// Diagnostics for skipped sprites and clipped destinations
    pub warnings: Vec<Warning>,
}

impl RenderReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.warnings.is_empty()
    }
}

/// A visible sprite prepared for drawing.
struct SpritePlan<'a> {
    entry: &'a SpriteEntry,
    /// Screen-space rectangle the sprite covers after clipping
    clip: Rect,
    /// Destination rows hidden above the screen (top obscured amount)
    top_skip: u32,
    /// Absolute source column for each covered destination column
    columns: Vec<u32>,
    palette: PaletteContext<'a>,
    mode: BlendMode,
}

/// Renders a registry through a viewport.
#[derive(Debug)]
pub struct RasterCompositor<'a> {
    registry: &'a SpriteRegistry,
    visibility: &'a VisibilitySet,
    viewport: Viewport,
    blends: &'a BlendRegistry,
    options: RenderOptions,
}

impl<'a> RasterCompositor<'a> {
    pub fn new(
        registry: &'a SpriteRegistry,
        visibility: &'a VisibilitySet,
        viewport: Viewport,
        blends: &'a BlendRegistry,
        options: RenderOptions,
    ) -> Self {
        Self { registry, visibility, viewport, blends, options }
    }

    /// Render one frame into `dest`, whose rows are `stride` pixels apart.
    ///
    /// Never fails: sprites that cannot be drawn are skipped and reported,
    /// and a destination smaller than the raster is clipped to what fits.
    pub fn render(&self, dest: &mut [u32], stride: usize, palette: &[u32]) -> RenderReport {
        let mut report = RenderReport::default();

        let screen = self.usable_screen(dest.len(), stride, &mut report);
        if screen.is_empty() {
            return report;
        }

        let plans = self.plan(screen, palette, &mut report);
        let rows = screen.height() as usize;
        let target = &mut dest[..rows * stride];

        if let Some(color) = self.options.clear_color {
            for row in target.chunks_mut(stride) {
                row[..screen.width() as usize].fill(color);
            }
        }

        let band_height = self.options.band_height.max(1) as usize;
        if self.options.parallel && rows > band_height && !plans.is_empty() {
            target.par_chunks_mut(band_height * stride).enumerate().for_each(|(i, band)| {
                let first = (i * band_height) as i32;
                let last = first + (band.len() / stride) as i32;
                draw_band(&plans, self.blends, band, stride, first..last);
            });
        } else {
            draw_band(&plans, self.blends, target, stride, 0..rows as i32);
        }

        report.drawn = plans.len();
        tracing::debug!(
            drawn = report.drawn,
            skipped = report.skipped.len(),
            parallel = self.options.parallel,
            "frame rendered"
        );
        report
    }

    /// Screen rectangle that fits both the viewport and the buffer.
    fn usable_screen(&self, len: usize, stride: usize, report: &mut RenderReport) -> Rect {
        let vp = self.viewport;
        if stride == 0 {
            warn(report, Warning::new("destination stride is zero, nothing rendered"));
            return Rect::EMPTY;
        }

        let width = (vp.width as usize).min(stride);
        if width < vp.width as usize {
            warn(
                report,
                Warning::new(format!(
                    "stride {} is narrower than the raster width {}, clipping to {} columns",
                    stride, vp.width, width
                )),
            );
        }

        let rows = (vp.height as usize).min(len / stride);
        if rows < vp.height as usize {
            warn(
                report,
                Warning::new(format!(
                    "destination holds {} rows of stride {}, raster needs {}, clipping",
                    len / stride,
                    stride,
                    vp.height
                )),
            );
        }

        Rect::from_xywh(0, 0, width as u32, rows as u32)
    }

    /// Clip every visible sprite against the screen and precompute its column map.
    fn plan<'p>(
        &self,
        screen: Rect,
        palette: &'p [u32],
        report: &mut RenderReport,
    ) -> Vec<SpritePlan<'p>>
    where
        'a: 'p,
    {
        let mut plans = Vec::with_capacity(self.visibility.len());

        for priority in self.visibility.iter() {
            let Some(entry) = self.registry.get(priority) else {
                continue;
            };

            if entry.bitmap().complete_pixels().is_none() {
                report.skipped.push(priority);
                let message = LayerError::MissingPixelData(priority).to_string();
                warn(report, Warning::for_sprite(priority, message));
                continue;
            }

            // Clip in world space, then move the clip to the screen origin
            let (sx, sy) = (self.viewport.scroll_x, self.viewport.scroll_y);
            let bounds = entry.bounds();
            let world = bounds.intersect(&Rect::from_xywh(sx, sy, screen.width(), screen.height()));
            if world.is_empty() {
                continue;
            }
            let clip = world.relative_to(sx, sy);

            // Obscured amounts on each edge; right/bottom fall out of the clip width/height
            let left_skip = (i64::from(world.left) - i64::from(bounds.left)) as u32;
            let top_skip = (i64::from(world.top) - i64::from(bounds.top)) as u32;

            let slice = entry.slice();
            let (scale_h, _) = entry.scale();
            let mut columns = Vec::with_capacity(clip.width() as usize);
            let origin = slice.left as u32;
            column_map(slice.width(), scale_h, left_skip, clip.width(), origin, &mut columns);

            let mode = entry.blend_mode();
            if mode == BlendMode::Custom && !self.blends.has_custom() {
                let message = "custom blend requested but none registered, using alpha";
                warn(report, Warning::for_sprite(priority, message));
            }

            let (selector, shift) = entry.palette();
            plans.push(SpritePlan {
                entry,
                clip,
                top_skip,
                columns,
                palette: PaletteContext::new(palette, selector, shift),
                mode,
            });
        }

        plans
    }
}

/// Draw every plan into a band covering screen rows `rows`.
fn draw_band(
    plans: &[SpritePlan<'_>],
    blends: &BlendRegistry,
    band: &mut [u32],
    stride: usize,
    rows: Range<i32>,
) {
    let mut fetcher = RowFetcher::new();
    let mut source_rows = Vec::new();

    for plan in plans {
        let y0 = plan.clip.top.max(rows.start);
        let y1 = plan.clip.bottom.min(rows.end);
        if y0 >= y1 {
            continue;
        }

        let entry = plan.entry;
        let slice = entry.slice();
        let (_, scale_v) = entry.scale();
        let skip = plan.top_skip + (y0 - plan.clip.top) as u32;
        sample_map(slice.height(), scale_v, skip, (y1 - y0) as u32, &mut source_rows);

        let x0 = plan.clip.left as usize;
        let x1 = x0 + plan.columns.len();
        let bitmap = entry.bitmap();

        for (y, &src_row) in (y0..y1).zip(&source_rows) {
            let Some(row) = bitmap.row(slice.top as u32 + src_row) else {
                continue;
            };
            let offset = (y - rows.start) as usize * stride;
            let dst = &mut band[offset + x0..offset + x1];
            let run = fetcher.fetch(entry.format(), row, &plan.columns, &plan.palette);
            blends.apply(plan.mode, run, &plan.palette, dst, entry.master_alpha());
        }
    }
}

fn warn(report: &mut RenderReport, warning: Warning) {
    match warning.priority {
        Some(p) => tracing::warn!(priority = p, "{}", warning.message),
        None => tracing::warn!("{}", warning.message),
    }
    report.warnings.push(warning);
}
