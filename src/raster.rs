// this_file: src/raster.rs

//! Glyph rasterization and compositing using zeno.
//!
//! Outlines are extracted with skrifa at the requested pixel size, flipped
//! into y-down device space, rasterized into an 8-bit coverage mask, and
//! blended into the canvas in the paint color.

use crate::canvas::{Canvas, Rect};
use crate::error::{Error, Result};
use image::Rgba;
use log::{debug, trace};
use read_fonts::FontRef;
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{GlyphId, MetadataProvider};
use zeno::{Command, Mask, Transform};

/// Coverage mask for one positioned glyph.
#[derive(Debug, Clone)]
pub struct GlyphMask {
    /// Left edge in device pixels
    pub left: i32,
    /// Top edge in device pixels
    pub top: i32,
    /// Mask width in pixels
    pub width: u32,
    /// Mask height in pixels
    pub height: u32,
    /// Row-major 8-bit coverage
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    /// Device-space rectangle covered by the mask.
    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}

/// Glyph rasterizer using zeno.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlyphRasterizer;

impl GlyphRasterizer {
    /// Create a new glyph rasterizer.
    pub fn new() -> Self {
        Self
    }

    /// Rasterize `glyph_id` with its baseline origin at `(x, y)`.
    ///
    /// Returns `Ok(None)` for glyphs without an outline or with an empty one
    /// (spaces and the like).
    pub fn rasterize(
        &self,
        font: &FontRef<'_>,
        glyph_id: GlyphId,
        pixel_size: f32,
        x: f32,
        y: f32,
    ) -> Result<Option<GlyphMask>> {
        let outlines = font.outline_glyphs();
        let Some(outline) = outlines.get(glyph_id) else {
            debug!("Glyph {} has no outline", glyph_id.to_u32());
            return Ok(None);
        };

        let mut commands = Vec::new();
        let mut pen = ZenoPen::new(&mut commands);
        let settings = DrawSettings::unhinted(Size::new(pixel_size), LocationRef::default());
        outline
            .draw(settings, &mut pen)
            .map_err(|e| Error::GlyphRender {
                glyph_id: glyph_id.to_u32(),
                reason: format!("Failed to draw outline: {}", e),
            })?;

        if commands.is_empty() {
            return Ok(None);
        }

        let transform = Transform::translation(x, y);
        let mut mask = Mask::new(commands.as_slice());
        mask.transform(Some(transform));
        let (coverage, placement) = mask.render();

        if placement.width == 0 || placement.height == 0 {
            return Ok(None);
        }

        trace!(
            "Glyph {} mask {}x{} at ({}, {})",
            glyph_id.to_u32(),
            placement.width,
            placement.height,
            placement.left,
            placement.top
        );

        Ok(Some(GlyphMask {
            left: placement.left,
            top: placement.top,
            width: placement.width,
            height: placement.height,
            coverage,
        }))
    }

    /// Horizontal advance of `glyph_id` in pixels.
    pub fn advance(&self, font: &FontRef<'_>, glyph_id: GlyphId, pixel_size: f32) -> f32 {
        font.glyph_metrics(Size::new(pixel_size), LocationRef::default())
            .advance_width(glyph_id)
            .unwrap_or(0.0)
    }
}

/// Blend a coverage mask into the canvas, restricted to `clip`.
pub fn composite_mask(canvas: &mut Canvas, mask: &GlyphMask, paint: Rgba<u8>, clip: Rect) {
    let Some(area) = mask.rect().intersect(&clip) else {
        return;
    };

    for py in area.y as i64..area.bottom() {
        let my = (py - mask.top as i64) as usize;
        for px in area.x as i64..area.right() {
            let mx = (px - mask.left as i64) as usize;
            let idx = my * mask.width as usize + mx;
            if let Some(&alpha) = mask.coverage.get(idx) {
                canvas.blend_pixel(px, py, paint, alpha);
            }
        }
    }
}

/// Adapter to convert skrifa OutlinePen to zeno command vector.
struct ZenoPen<'a> {
    commands: &'a mut Vec<Command>,
}

impl<'a> ZenoPen<'a> {
    fn new(commands: &'a mut Vec<Command>) -> Self {
        Self { commands }
    }
}

impl OutlinePen for ZenoPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(Command::MoveTo([x, -y].into())); // Flip Y for graphics coordinates
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(Command::LineTo([x, -y].into()));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.commands
            .push(Command::QuadTo([cx0, -cy0].into(), [x, -y].into()));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.commands.push(Command::CurveTo(
            [cx0, -cy0].into(),
            [cx1, -cy1].into(),
            [x, -y].into(),
        ));
    }

    fn close(&mut self) {
        self.commands.push(Command::Close);
    }
}
