// this_file: src/session.rs
//! End-to-end compositing session.
//!
//! A session loads every distinct font once, prepares the canvas from the
//! template, binds one render context to it and draws the configured blocks
//! in order. The output file is written only after every block succeeded,
//! so a failed session never leaves a partial image behind.

use crate::canvas::Canvas;
use crate::config::{BlockConfig, CompositionConfig, TemplateSource};
use crate::context::RenderContext;
use crate::decode::{self, DecodedImage};
use crate::error::{Error, Result};
use crate::glyph_source::GlyphSource;
use crate::logging::Timer;
use crate::security;
use crate::vertical::draw_block;
use camino::Utf8PathBuf;
use image::Rgba;
use log::{debug, info, Level};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// Fonts keyed by the names blocks refer to
pub type FontSet = BTreeMap<String, Arc<GlyphSource>>;

/// Summary of a finished session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Written file
    pub output: Utf8PathBuf,
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Number of blocks drawn
    pub blocks: usize,
    /// Number of glyphs drawn across all blocks
    pub glyphs: usize,
    /// Distinct font files loaded
    pub fonts_loaded: usize,
    /// Wall time in milliseconds
    pub elapsed_ms: f64,
}

/// One compositing run described by a config
pub struct Session {
    config: CompositionConfig,
}

impl Session {
    pub fn new(config: CompositionConfig) -> Self {
        Self { config }
    }

    /// Render and write the output file.
    pub fn run(&self) -> Result<SessionReport> {
        let timer = Timer::with_level("session", Level::Info);
        let fonts = self.load_fonts()?;
        let (canvas, glyphs) = self.render_with(&fonts)?;
        canvas.save(self.config.output.as_std_path())?;

        let report = SessionReport {
            output: self.config.output.clone(),
            width: canvas.width(),
            height: canvas.height(),
            blocks: self.config.blocks.len(),
            glyphs,
            fonts_loaded: distinct_sources(&fonts),
            elapsed_ms: timer.elapsed_ms(),
        };
        info!(
            "Composed {} blocks ({} glyphs) into {}",
            report.blocks, report.glyphs, report.output
        );
        Ok(report)
    }

    /// Render into a canvas without writing anything.
    pub fn render(&self) -> Result<Canvas> {
        let fonts = self.load_fonts()?;
        self.render_with(&fonts).map(|(canvas, _)| canvas)
    }

    fn render_with(&self, fonts: &FontSet) -> Result<(Canvas, usize)> {
        let template = self.load_template()?;
        let mut canvas = {
            let _timer = Timer::new("canvas preparation");
            Canvas::prepare(&template.image)
        };
        let glyphs = compose(
            &mut canvas,
            fonts,
            &self.config.blocks,
            self.config.paint(),
            self.config.dpi,
        )?;
        Ok((canvas, glyphs))
    }

    /// Load each configured font, sharing one source per distinct path.
    pub fn load_fonts(&self) -> Result<FontSet> {
        let _timer = Timer::new("font loading");
        let mut by_path: HashMap<&Utf8PathBuf, Arc<GlyphSource>> = HashMap::new();
        let mut fonts = FontSet::new();

        for (name, path) in &self.config.fonts {
            let source = match by_path.get(path) {
                Some(source) => Arc::clone(source),
                None => {
                    let source = Arc::new(GlyphSource::from_path(path.as_std_path())?);
                    by_path.insert(path, Arc::clone(&source));
                    source
                }
            };
            debug!("Font '{}' -> {}", name, source.origin());
            fonts.insert(name.clone(), source);
        }

        Ok(fonts)
    }

    /// Load and decode the template from disk or the network.
    pub fn load_template(&self) -> Result<DecodedImage> {
        let _timer = Timer::new("template loading");
        let decoded = match &self.config.template {
            TemplateSource::Path(path) => decode::decode_file(path.as_std_path())?,
            TemplateSource::Url(url) => fetch_template(url)?,
        };
        security::validate_canvas_dimensions(
            self.config.template.claimed_name(),
            decoded.width(),
            decoded.height(),
        )?;
        Ok(decoded)
    }
}

#[cfg(feature = "fetch")]
fn fetch_template(url: &str) -> Result<DecodedImage> {
    crate::fetch::fetch_image(url)
}

#[cfg(not(feature = "fetch"))]
fn fetch_template(url: &str) -> Result<DecodedImage> {
    Err(Error::Network {
        url: url.to_string(),
        reason: "built without the `fetch` feature".into(),
    })
}

/// Draw `blocks` onto `canvas` in order, switching font and size per block.
///
/// Returns the number of glyphs drawn.
pub fn compose(
    canvas: &mut Canvas,
    fonts: &FontSet,
    blocks: &[BlockConfig],
    paint: Rgba<u8>,
    dpi: f32,
) -> Result<usize> {
    let _timer = Timer::new("compositing");
    let mut ctx = RenderContext::new();
    ctx.set_dst(canvas);
    ctx.set_paint(paint);
    ctx.set_dpi(dpi);

    let mut glyphs = 0;
    for block in blocks {
        let font = fonts.get(&block.font).ok_or_else(|| {
            Error::InvalidConfig(format!("Block references unknown font '{}'", block.font))
        })?;
        ctx.set_font(Arc::clone(font));
        ctx.set_font_size(block.size);
        glyphs += draw_block(&mut ctx, &block.text_block())?;
    }
    Ok(glyphs)
}

fn distinct_sources(fonts: &FontSet) -> usize {
    fonts
        .values()
        .map(|font| font.origin())
        .collect::<BTreeSet<_>>()
        .len()
}
