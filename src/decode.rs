// this_file: src/decode.rs
//! Tolerant decoding of template images from raw bytes.
//!
//! Format selection is driven by the claimed file name, not by the bytes:
//!
//! - `.jpg` / `.jpeg`: JPEG first, PNG as fallback (mislabeled files are
//!   common in the wild)
//! - `.png`: PNG only
//! - anything else: rejected without a decode attempt
//!
//! Known limitation: content whose real format disagrees with its name in any
//! other way (a PNG named `.gif`, a JPEG named `.png`) is not recovered.
//! Sniffing the magic bytes would fix this but would change which inputs
//! are accepted.

use crate::error::{Error, Result};
use crate::security;
use image::{DynamicImage, ImageFormat};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

/// Format family implied by a claimed file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimedFormat {
    Jpeg,
    Png,
}

impl ClaimedFormat {
    /// Classify a file name or URL by suffix (ASCII case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            Some(Self::Jpeg)
        } else if lower.ends_with(".png") {
            Some(Self::Png)
        } else {
            None
        }
    }
}

/// Decoded pixels plus the decoder that accepted them.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Decoded pixel buffer
    pub image: DynamicImage,
    /// Format that actually decoded the bytes
    pub format: ImageFormat,
    /// True when the name said JPEG but the PNG fallback succeeded
    pub used_fallback: bool,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Decode `bytes` according to the suffix of `claimed_name`.
pub fn decode(bytes: &[u8], claimed_name: &str) -> Result<DecodedImage> {
    let claimed = ClaimedFormat::from_name(claimed_name).ok_or_else(|| {
        warn!("Unsupported image type: {}", claimed_name);
        Error::UnsupportedFormat {
            name: claimed_name.to_string(),
        }
    })?;

    security::validate_image_size(claimed_name, bytes.len())?;

    let decoded = match claimed {
        ClaimedFormat::Jpeg => match try_decode(bytes, ImageFormat::Jpeg) {
            Ok(image) => DecodedImage {
                image,
                format: ImageFormat::Jpeg,
                used_fallback: false,
            },
            Err(jpeg_err) => {
                debug!(
                    "JPEG decode of {} failed ({}), retrying as PNG",
                    claimed_name, jpeg_err
                );
                let image = try_decode(bytes, ImageFormat::Png).map_err(|png_err| {
                    Error::Decode {
                        name: claimed_name.to_string(),
                        reason: format!("jpeg: {}; png fallback: {}", jpeg_err, png_err),
                    }
                })?;
                warn!("{} is labeled JPEG but decoded as PNG", claimed_name);
                DecodedImage {
                    image,
                    format: ImageFormat::Png,
                    used_fallback: true,
                }
            }
        },
        ClaimedFormat::Png => {
            let image = try_decode(bytes, ImageFormat::Png).map_err(|e| Error::Decode {
                name: claimed_name.to_string(),
                reason: format!("png: {}", e),
            })?;
            DecodedImage {
                image,
                format: ImageFormat::Png,
                used_fallback: false,
            }
        }
    };

    info!(
        "Decoded {} as {:?} ({}x{})",
        claimed_name,
        decoded.format,
        decoded.width(),
        decoded.height()
    );
    Ok(decoded)
}

/// Read a local image file and decode it with its file name as the claim.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<DecodedImage> {
    let path = path.as_ref();
    let name = path.display().to_string();
    // Reject by name before touching the disk
    if ClaimedFormat::from_name(&name).is_none() {
        return Err(Error::UnsupportedFormat { name });
    }
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    decode(&bytes, &name)
}

fn try_decode(bytes: &[u8], format: ImageFormat) -> image::ImageResult<DynamicImage> {
    image::load_from_memory_with_format(bytes, format)
}
