// this_file: src/glyph_source.rs

//! Parsed outline fonts shared across draw calls.
//!
//! A [`GlyphSource`] owns the raw font bytes and the metrics read at load
//! time. It is immutable once built, so a session loads each font file once
//! and hands out `Arc<GlyphSource>` clones to every block that uses it.

use crate::error::{Error, Result};
use crate::security;
use log::{debug, info};
use read_fonts::{FileRef, FontRef, TableProvider};
use skrifa::instance::{LocationRef, Size};
use skrifa::string::StringId;
use skrifa::MetadataProvider;
use std::fmt;
use std::fs;
use std::path::Path;

/// Origin label used for fonts built from in-memory bytes.
const MEMORY_ORIGIN: &str = "<memory>";

/// Immutable handle over a parsed outline font.
pub struct GlyphSource {
    /// Raw font file bytes
    data: Vec<u8>,
    /// Where the bytes came from, for diagnostics
    origin: String,
    /// Family name from the `name` table, if present
    family_name: Option<String>,
    units_per_em: u16,
    glyph_count: u16,
    /// Ascender in font units
    ascent: f32,
    /// Descender in font units (usually negative)
    descent: f32,
}

impl GlyphSource {
    /// Parse font bytes held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::parse(data, MEMORY_ORIGIN.to_string())
    }

    /// Read and parse a font file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading font: {}", path.display());
        let data = fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::parse(data, path.display().to_string())
    }

    fn parse(data: Vec<u8>, origin: String) -> Result<Self> {
        security::validate_font_size(&origin, data.len())?;

        if data.is_empty() {
            return Err(Error::FontParse {
                origin,
                reason: "Font data is empty".into(),
            });
        }

        if !is_valid_font_signature(&data) {
            return Err(Error::FontParse {
                origin,
                reason: "Invalid font file format (expected TTF/OTF/TTC)".into(),
            });
        }

        let parsed = {
            let font = open_face(&data, &origin)?;
            read_face_info(&font).map_err(|reason| Error::FontParse {
                origin: origin.clone(),
                reason,
            })?
        };

        debug!(
            "Parsed font {} (family: {:?}, upem: {}, glyphs: {})",
            origin, parsed.family_name, parsed.units_per_em, parsed.glyph_count
        );

        Ok(Self {
            data,
            origin,
            family_name: parsed.family_name,
            units_per_em: parsed.units_per_em,
            glyph_count: parsed.glyph_count,
            ascent: parsed.ascent,
            descent: parsed.descent,
        })
    }

    /// Zero-copy view of the face for outline and metrics queries.
    pub fn font_ref(&self) -> Result<FontRef<'_>> {
        // Collections always use their first face
        FontRef::from_index(&self.data, 0).map_err(|e| Error::FontParse {
            origin: self.origin.clone(),
            reason: format!("Failed to create font reference: {}", e),
        })
    }

    /// Whether the font maps `ch` to a real glyph.
    pub fn has_glyph(&self, ch: char) -> bool {
        self.font_ref()
            .map(|font| font.charmap().map(ch).is_some())
            .unwrap_or(false)
    }

    /// File path or `<memory>`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Family name from the `name` table.
    pub fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    /// Design units per em.
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Number of glyphs in the face.
    pub fn glyph_count(&self) -> u16 {
        self.glyph_count
    }

    /// Ascender in font units.
    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    /// Descender in font units.
    pub fn descent(&self) -> f32 {
        self.descent
    }
}

impl fmt::Debug for GlyphSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphSource")
            .field("origin", &self.origin)
            .field("family_name", &self.family_name)
            .field("units_per_em", &self.units_per_em)
            .field("glyph_count", &self.glyph_count)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Metadata gathered once at load time.
struct FaceInfo {
    family_name: Option<String>,
    units_per_em: u16,
    glyph_count: u16,
    ascent: f32,
    descent: f32,
}

/// Open the first face of a font or collection.
fn open_face<'a>(data: &'a [u8], origin: &str) -> Result<FontRef<'a>> {
    let file_ref = FileRef::new(data).map_err(|e| Error::FontParse {
        origin: origin.to_string(),
        reason: format!("Failed to parse font file: {}", e),
    })?;

    match file_ref {
        FileRef::Font(f) => Ok(f),
        FileRef::Collection(c) => c.get(0).map_err(|e| Error::FontParse {
            origin: origin.to_string(),
            reason: format!("Failed to get font from collection: {}", e),
        }),
    }
}

fn read_face_info(font: &FontRef<'_>) -> std::result::Result<FaceInfo, String> {
    let head = font
        .head()
        .map_err(|e| format!("Failed to read head table: {}", e))?;
    let units_per_em = head.units_per_em();
    if units_per_em == 0 {
        return Err("head table reports zero units per em".into());
    }

    let has_outlines = font.glyf().is_ok() || font.cff().is_ok() || font.cff2().is_ok();
    if !has_outlines {
        return Err("Font has no glyph outlines (glyf/CFF/CFF2)".into());
    }

    let metrics = font.metrics(Size::unscaled(), LocationRef::default());
    let family_name = font
        .localized_strings(StringId::FAMILY_NAME)
        .english_or_first()
        .map(|name| name.chars().collect::<String>());

    Ok(FaceInfo {
        family_name,
        units_per_em,
        glyph_count: metrics.glyph_count,
        ascent: metrics.ascent,
        descent: metrics.descent,
    })
}

/// Check if data has valid font signature
fn is_valid_font_signature(data: &[u8]) -> bool {
    if data.len() < 4 {
        return false;
    }

    matches!(
        &data[0..4],
        // TrueType
        b"\x00\x01\x00\x00" |
        // Apple TrueType
        b"true" |
        // OpenType
        b"OTTO" |
        // TrueType Collection
        b"ttcf"
    )
}
