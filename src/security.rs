// this_file: src/security.rs
//! Input size limits and validation

use crate::error::{Error, Result};
use log::warn;

/// Maximum allowed font file size (50MB)
pub const MAX_FONT_SIZE: usize = 50 * 1024 * 1024;

/// Maximum allowed encoded image size (64MB)
pub const MAX_IMAGE_BYTES: usize = 64 * 1024 * 1024;

/// Maximum canvas side length in pixels
pub const MAX_CANVAS_DIMENSION: u32 = 16_384;

/// Maximum number of characters in a single text block
pub const MAX_TEXT_LENGTH: usize = 1_000;

/// Validate font byte length before parsing
pub fn validate_font_size(origin: &str, len: usize) -> Result<()> {
    if len > MAX_FONT_SIZE {
        warn!("Rejecting oversized font {} ({} bytes)", origin, len);
        return Err(Error::FontParse {
            origin: origin.to_string(),
            reason: format!(
                "Font file too large: {} bytes (max: {} bytes)",
                len, MAX_FONT_SIZE
            ),
        });
    }
    Ok(())
}

/// Validate encoded image byte length before decoding
pub fn validate_image_size(name: &str, len: usize) -> Result<()> {
    if len > MAX_IMAGE_BYTES {
        warn!("Rejecting oversized image {} ({} bytes)", name, len);
        return Err(Error::Decode {
            name: name.to_string(),
            reason: format!(
                "Image too large: {} bytes (max: {} bytes)",
                len, MAX_IMAGE_BYTES
            ),
        });
    }
    Ok(())
}

/// Validate decoded canvas dimensions
pub fn validate_canvas_dimensions(name: &str, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 || width > MAX_CANVAS_DIMENSION || height > MAX_CANVAS_DIMENSION
    {
        return Err(Error::Decode {
            name: name.to_string(),
            reason: format!(
                "Image dimensions {}x{} outside 1..={} pixels",
                width, height, MAX_CANVAS_DIMENSION
            ),
        });
    }
    Ok(())
}

/// Validate text input for a block
pub fn validate_text_input(text: &str) -> Result<()> {
    let chars = text.chars().count();
    if chars > MAX_TEXT_LENGTH {
        return Err(Error::InvalidConfig(format!(
            "Text too long: {} characters (max: {} characters)",
            chars, MAX_TEXT_LENGTH
        )));
    }

    // Check for control characters that would render as stray notdef boxes
    if text.chars().any(|c| c.is_control()) {
        return Err(Error::InvalidConfig(
            "Text contains control characters".into(),
        ));
    }

    Ok(())
}
