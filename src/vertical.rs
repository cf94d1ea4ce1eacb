// this_file: src/vertical.rs
//! Vertical text compositing.
//!
//! Vertical columns are produced from a horizontal drawing primitive: every
//! character of a block is drawn as its own one-character string, with the
//! origin moved down by a fixed advance per character. One code point is one
//! rendering unit; there is no grapheme clustering, which matches how CJK
//! text is written in practice.

use crate::canvas::Point;
use crate::error::Result;
use log::debug;
use serde::{Deserialize, Serialize};

/// Anything that can draw a horizontal glyph run at a baseline origin.
///
/// [`RenderContext`](crate::context::RenderContext) is the production
/// implementation.
pub trait TextTarget {
    /// Draw `text` with its baseline origin at `origin`, returning the number
    /// of glyphs drawn.
    fn draw_string(&mut self, text: &str, origin: Point) -> Result<usize>;
}

/// One column of text at a fixed position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Characters, top to bottom
    pub text: String,
    /// Anchor x in device pixels
    pub left: i32,
    /// Anchor y (baseline of the first character) in device pixels
    pub top: i32,
    /// Distance between consecutive baselines; applies to every character
    pub line_height: i32,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, left: i32, top: i32, line_height: i32) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            line_height,
        }
    }

    /// Baseline origin of the `index`-th character.
    pub fn origin_of(&self, index: usize) -> Point {
        char_origin(self.left, self.top, self.line_height, index)
    }
}

fn char_origin(left: i32, top: i32, line_height: i32, index: usize) -> Point {
    let step = i32::try_from(index).unwrap_or(i32::MAX);
    Point::new(left, top.saturating_add(step.saturating_mul(line_height)))
}

/// Draw `text` as a vertical column anchored at `(left, top)`.
///
/// The i-th character lands at `(left, top + i * line_height)`. A zero
/// advance stacks every character on one point and a negative one stacks
/// upwards. Returns the total number of glyphs drawn.
pub fn draw_vertical<T>(
    target: &mut T,
    text: &str,
    left: i32,
    top: i32,
    line_height: i32,
) -> Result<usize>
where
    T: TextTarget + ?Sized,
{
    let mut drawn = 0;
    let mut utf8 = [0u8; 4];

    for (i, ch) in text.chars().enumerate() {
        let origin = char_origin(left, top, line_height, i);
        drawn += target.draw_string(ch.encode_utf8(&mut utf8), origin)?;
    }

    debug!(
        "Drew vertical block at ({}, {}) advance {}: {} glyphs",
        left, top, line_height, drawn
    );
    Ok(drawn)
}

/// Draw a [`TextBlock`].
pub fn draw_block<T>(target: &mut T, block: &TextBlock) -> Result<usize>
where
    T: TextTarget + ?Sized,
{
    draw_vertical(target, &block.text, block.left, block.top, block.line_height)
}
