// this_file: src/lib.rs
//! Shuhua - vertical CJK text compositing onto raster templates
//!
//! This library provides functionality for:
//! - Outline font loading and parsing (skrifa / read-fonts)
//! - Glyph rasterization with zeno into an RGBA canvas
//! - Vertical column layout, one glyph run per character
//! - Tolerant, suffix-driven JPEG/PNG template decoding
//! - JSON-configured compositing sessions

pub mod canvas;
pub mod config;
pub mod context;
pub mod decode;
pub mod error;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod glyph_source;
pub mod logging;
pub mod raster;
pub mod security;
pub mod session;
pub mod vertical;

// Re-export commonly used types
pub use canvas::{Canvas, Point, Rect};
pub use config::{BlockConfig, CompositionConfig, TemplateSource};
pub use context::RenderContext;
pub use decode::{decode, DecodedImage};
pub use error::{Error, Result};
pub use glyph_source::GlyphSource;
pub use session::{Session, SessionReport};
pub use vertical::{draw_block, draw_vertical, TextBlock, TextTarget};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
