// this_file: src/context.rs

//! Mutable rendering state bound to one destination canvas.
//!
//! A [`RenderContext`] carries the clip region, destination, paint, DPI,
//! active font and point size. Every setting is read at draw time, so
//! changing the font or size between two blocks only affects later draws.
//!
//! Drawing before a destination and a font are bound fails with
//! [`Error::UnconfiguredContext`] instead of producing garbage.

use crate::canvas::{Canvas, Point, Rect};
use crate::error::{Error, Result};
use crate::glyph_source::GlyphSource;
use crate::raster::{composite_mask, GlyphRasterizer};
use crate::vertical::TextTarget;
use image::Rgba;
use log::debug;
use skrifa::{GlyphId, MetadataProvider};
use std::sync::Arc;

/// Resolution at which one point equals one pixel.
pub const DEFAULT_DPI: f32 = 72.0;

/// Point size used until `set_font_size` is called.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Opaque black.
pub const DEFAULT_PAINT: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Rendering state for one canvas.
pub struct RenderContext<'c> {
    clip: Option<Rect>,
    dst: Option<&'c mut Canvas>,
    paint: Rgba<u8>,
    dpi: f32,
    font: Option<Arc<GlyphSource>>,
    font_size: f32,
    rasterizer: GlyphRasterizer,
}

impl<'c> RenderContext<'c> {
    /// Create an unbound context with default paint, DPI and size.
    pub fn new() -> Self {
        Self {
            clip: None,
            dst: None,
            paint: DEFAULT_PAINT,
            dpi: DEFAULT_DPI,
            font: None,
            font_size: DEFAULT_FONT_SIZE,
            rasterizer: GlyphRasterizer::new(),
        }
    }

    /// Restrict drawing to `clip` (intersected with the canvas bounds).
    pub fn set_clip(&mut self, clip: Rect) {
        self.clip = Some(clip);
    }

    /// Bind the destination canvas. Without a clip, draws cover its bounds.
    pub fn set_dst(&mut self, dst: &'c mut Canvas) {
        self.dst = Some(dst);
    }

    pub fn set_paint(&mut self, paint: Rgba<u8>) {
        self.paint = paint;
    }

    pub fn set_dpi(&mut self, dpi: f32) {
        self.dpi = dpi;
    }

    pub fn set_font(&mut self, font: Arc<GlyphSource>) {
        self.font = Some(font);
    }

    /// Set the point size.
    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    pub fn clip(&self) -> Option<Rect> {
        self.clip
    }

    pub fn paint(&self) -> Rgba<u8> {
        self.paint
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    pub fn font(&self) -> Option<&Arc<GlyphSource>> {
        self.font.as_ref()
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Bound canvas, if any.
    pub fn dst(&self) -> Option<&Canvas> {
        self.dst.as_deref()
    }

    /// Point size converted to device pixels at the current DPI.
    pub fn pixel_size(&self) -> f32 {
        self.font_size * self.dpi / DEFAULT_DPI
    }

    /// Draw `text` as one horizontal run with its baseline origin at `origin`.
    ///
    /// Characters the font does not map fall back to glyph 0 (`.notdef`).
    /// Returns the number of glyphs drawn.
    pub fn draw_string(&mut self, text: &str, origin: Point) -> Result<usize> {
        let pixel_size = self.pixel_size();
        let paint = self.paint;
        let rasterizer = self.rasterizer;
        let font_source = self
            .font
            .clone()
            .ok_or(Error::UnconfiguredContext("font"))?;
        let canvas = self
            .dst
            .as_deref_mut()
            .ok_or(Error::UnconfiguredContext("destination canvas"))?;
        let clip = match self.clip {
            Some(clip) => clip.intersect(&canvas.bounds()),
            None => Some(canvas.bounds()),
        };

        let font = font_source.font_ref()?;
        let charmap = font.charmap();

        let mut pen_x = origin.x as f32;
        let pen_y = origin.y as f32;
        let mut drawn = 0;

        for ch in text.chars() {
            let glyph_id = charmap.map(ch).unwrap_or_else(|| {
                debug!(
                    "No glyph for U+{:04X} in {}, using .notdef",
                    ch as u32,
                    font_source.origin()
                );
                GlyphId::NOTDEF
            });

            if let Some(clip) = clip {
                if let Some(mask) = rasterizer.rasterize(&font, glyph_id, pixel_size, pen_x, pen_y)? {
                    composite_mask(canvas, &mask, paint, clip);
                }
            }

            pen_x += rasterizer.advance(&font, glyph_id, pixel_size);
            drawn += 1;
        }

        Ok(drawn)
    }
}

impl Default for RenderContext<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTarget for RenderContext<'_> {
    fn draw_string(&mut self, text: &str, origin: Point) -> Result<usize> {
        RenderContext::draw_string(self, text, origin)
    }
}
