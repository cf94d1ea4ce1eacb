// this_file: src/error.rs
//! Error types for the shuhua library

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for shuhua operations
#[derive(Debug, Error)]
pub enum Error {
    /// Font bytes could not be parsed as an outline font
    #[error("Font parse error ({origin}): {reason}")]
    FontParse {
        /// Where the bytes came from (file path or "<memory>")
        origin: String,
        /// Underlying parser message
        reason: String,
    },

    /// Draw issued before the context had a destination or a font
    #[error("Render context is not configured: missing {0}")]
    UnconfiguredContext(&'static str),

    /// Outline extraction failed for a glyph that exists in the font
    #[error("Failed to render glyph {glyph_id}: {reason}")]
    GlyphRender {
        /// Glyph identifier inside the active font
        glyph_id: u32,
        /// Underlying outline error
        reason: String,
    },

    /// Claimed file name does not carry a supported image extension
    #[error("Unsupported image type for '{name}' (only .jpg, .jpeg and .png are supported)")]
    UnsupportedFormat {
        /// Claimed file name or URL
        name: String,
    },

    /// Image bytes could not be decoded
    #[error("Failed to decode image '{name}': {reason}")]
    Decode {
        /// Claimed file name or URL
        name: String,
        /// Decoder message(s), one per attempted decoder
        reason: String,
    },

    /// Canvas could not be encoded for output
    #[error("Failed to encode image {}: {reason}", path.display())]
    Encode {
        /// Destination path
        path: PathBuf,
        /// Encoder message
        reason: String,
    },

    /// IO operation error with the path involved
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// File that was being read or written
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Remote fetch failed
    #[error("Failed to fetch '{url}': {reason}")]
    Network {
        /// Requested URL
        url: String,
        /// Transport or status message
        reason: String,
    },

    /// Composition config failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for shuhua operations
pub type Result<T> = std::result::Result<T, Error>;
