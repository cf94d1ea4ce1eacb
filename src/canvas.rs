// this_file: src/canvas.rs

//! Working canvas and device-pixel geometry.
//!
//! The canvas is an RGBA8 buffer sized to the template image. Its
//! dimensions never change after [`Canvas::prepare`]; text is drawn into it
//! in place and the result is written once at the end of a session.

use crate::error::{Error, Result};
use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};
use log::{debug, info};
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Device-pixel point, y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Integer rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x as i64 && x < self.right() && y >= self.y as i64 && y < self.bottom()
    }

    /// Overlap of two rectangles, `None` when they do not touch.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = (self.x as i64).max(other.x as i64);
        let y0 = (self.y as i64).max(other.y as i64);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect {
            x: x0 as i32,
            y: y0 as i32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// RGBA compositing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// Allocate a transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Allocate a canvas with the template's bounds and copy the template
    /// onto it at full opacity.
    pub fn prepare(template: &DynamicImage) -> Self {
        let mut canvas = Self::new(template.width(), template.height());
        let source = template.to_rgba8();
        // Over a fully transparent base, straight copy is exact.
        imageops::replace(&mut canvas.pixels, &source, 0, 0);
        debug!(
            "Prepared {}x{} canvas from template",
            canvas.width(),
            canvas.height()
        );
        canvas
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Full canvas rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Blend `color` into one pixel with `coverage` (0-255) using straight
    /// alpha source-over. Out-of-bounds coordinates are ignored.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba<u8>, coverage: u8) {
        if !self.bounds().contains(x, y) {
            return;
        }
        let src_a = color[3] as u32 * coverage as u32 / 255;
        if src_a == 0 {
            return;
        }

        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        let inv = 255 - src_a;
        let dst_a = dst[3] as u32 * inv / 255;
        let out_a = src_a + dst_a;
        for c in 0..3 {
            let blended = (color[c] as u32 * src_a + dst[c] as u32 * dst_a) / out_a;
            dst[c] = blended.min(255) as u8;
        }
        dst[3] = out_a.min(255) as u8;
    }

    /// Encode by the path's extension and write the file.
    ///
    /// The image is encoded in memory, written to a temporary file next to
    /// `path` and renamed into place, so a failure never leaves a partial
    /// file behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let format = output_format(path)?;

        let image = match format {
            // JPEG has no alpha channel
            ImageFormat::Jpeg => {
                DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(self.pixels.clone()).to_rgb8())
            }
            _ => DynamicImage::ImageRgba8(self.pixels.clone()),
        };

        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, format)
            .map_err(|e| Error::Encode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let bytes = buffer.into_inner();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| Error::io(path, e))?;
        staged
            .write_all(&bytes)
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| Error::io(path, e))?;
        staged.persist(path).map_err(|e| Error::io(path, e.error))?;
        info!(
            "Wrote {}x{} image to {} ({} bytes)",
            self.width(),
            self.height(),
            path.display(),
            bytes.len()
        );
        Ok(())
    }
}

/// Output format from the file extension (`png`, `jpg`, `jpeg`).
pub fn output_format(path: &Path) -> Result<ImageFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => Ok(ImageFormat::Png),
        Some("jpg") | Some("jpeg") => Ok(ImageFormat::Jpeg),
        _ => Err(Error::Encode {
            path: path.to_path_buf(),
            reason: "Output must end in .png, .jpg or .jpeg".into(),
        }),
    }
}
