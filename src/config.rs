// this_file: src/config.rs
//! JSON composition document.
//!
//! A config names the template, the output file, the fonts (by key), the
//! paint and DPI, and the ordered list of text blocks to draw. Relative
//! paths are resolved against the directory of the config file.

use crate::error::{Error, Result};
use crate::security;
use crate::vertical::TextBlock;
use camino::{Utf8Path, Utf8PathBuf};
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

/// Supported config version.
pub const CONFIG_VERSION: &str = "1.0";

/// Largest accepted point size.
pub const MAX_POINT_SIZE: f32 = 1000.0;

/// Largest accepted resolution.
pub const MAX_DPI: f32 = 2400.0;

/// Full composition document
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompositionConfig {
    /// Document version (expected: "1.0")
    pub version: String,
    /// Base image to draw on
    pub template: TemplateSource,
    /// Where the composited image is written (.png, .jpg, .jpeg)
    pub output: Utf8PathBuf,
    /// Font files keyed by the name blocks refer to
    pub fonts: BTreeMap<String, Utf8PathBuf>,
    /// Foreground RGBA color
    #[serde(default = "default_color")]
    pub color: [u8; 4],
    /// Rendering resolution
    #[serde(default = "default_dpi")]
    pub dpi: f32,
    /// Text columns, drawn in order
    pub blocks: Vec<BlockConfig>,
}

/// Where the template image comes from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    /// Local file
    Path(Utf8PathBuf),
    /// Remote URL fetched over HTTP
    Url(String),
}

impl TemplateSource {
    /// Name used for suffix-based decoding and diagnostics.
    pub fn claimed_name(&self) -> &str {
        match self {
            Self::Path(path) => path.as_str(),
            Self::Url(url) => url.as_str(),
        }
    }
}

/// One text column plus the font and size it is drawn with
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BlockConfig {
    /// Characters, top to bottom
    pub text: String,
    /// Anchor x in device pixels
    pub left: i32,
    /// Baseline y of the first character in device pixels
    pub top: i32,
    /// Baseline-to-baseline advance in pixels
    pub line_height: i32,
    /// Key into `fonts`
    pub font: String,
    /// Point size
    pub size: f32,
}

impl BlockConfig {
    /// Layout part of the block.
    pub fn text_block(&self) -> TextBlock {
        TextBlock::new(self.text.clone(), self.left, self.top, self.line_height)
    }
}

fn default_color() -> [u8; 4] {
    [0, 0, 0, 255]
}

fn default_dpi() -> f32 {
    72.0
}

impl CompositionConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file, resolving relative paths against its directory.
    pub fn from_path<P: AsRef<Utf8Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| Error::io(path.as_std_path(), e))?;
        let mut config = Self::from_json(&json)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Paint as an RGBA pixel.
    pub fn paint(&self) -> Rgba<u8> {
        Rgba(self.color)
    }

    /// Prefix every relative path with `base`.
    pub fn resolve_relative_to(&mut self, base: &Utf8Path) {
        let resolve = |p: &Utf8PathBuf| {
            if p.is_relative() {
                base.join(p)
            } else {
                p.clone()
            }
        };

        if let TemplateSource::Path(p) = &mut self.template {
            *p = resolve(p);
        }
        self.output = resolve(&self.output);
        for path in self.fonts.values_mut() {
            *path = resolve(path);
        }
    }

    /// Validate the document.
    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(Error::InvalidConfig(format!(
                "Unsupported config version: '{}' (expected '{}')",
                self.version, CONFIG_VERSION
            )));
        }

        if self.fonts.is_empty() {
            return Err(Error::InvalidConfig(
                "Config must declare at least one font".into(),
            ));
        }

        if self.blocks.is_empty() {
            return Err(Error::InvalidConfig(
                "Config must contain at least one block".into(),
            ));
        }

        if !(self.dpi > 0.0 && self.dpi <= MAX_DPI) {
            return Err(Error::InvalidConfig(format!(
                "DPI must be in (0, {}] (got {})",
                MAX_DPI, self.dpi
            )));
        }

        let ext = self.output.extension().map(|e| e.to_ascii_lowercase());
        if !matches!(ext.as_deref(), Some("png" | "jpg" | "jpeg")) {
            return Err(Error::InvalidConfig(format!(
                "Output must be a .png, .jpg or .jpeg file (got {})",
                self.output
            )));
        }

        if let TemplateSource::Url(url) = &self.template {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::InvalidConfig(format!(
                    "Template URL must be http(s): {}",
                    url
                )));
            }
        }

        for (i, block) in self.blocks.iter().enumerate() {
            self.validate_block(i, block)?;
        }

        Ok(())
    }

    fn validate_block(&self, index: usize, block: &BlockConfig) -> Result<()> {
        if !self.fonts.contains_key(&block.font) {
            return Err(Error::InvalidConfig(format!(
                "Block {}: unknown font '{}'",
                index, block.font
            )));
        }

        if !(block.size > 0.0 && block.size <= MAX_POINT_SIZE) {
            return Err(Error::InvalidConfig(format!(
                "Block {}: size must be in (0, {}] (got {})",
                index, MAX_POINT_SIZE, block.size
            )));
        }

        security::validate_text_input(&block.text).map_err(|e| match e {
            Error::InvalidConfig(reason) => {
                Error::InvalidConfig(format!("Block {}: {}", index, reason))
            }
            other => other,
        })
    }
}
