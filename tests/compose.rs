// this_file: tests/compose.rs
//! End-to-end compositing tests using real font files

use image::{DynamicImage, Rgba, RgbaImage};
use shuhua::{
    draw_vertical, Canvas, CompositionConfig, GlyphSource, Point, RenderContext, Session,
    TextTarget,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Helper to get test font path
fn get_test_font_path(font_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata/fonts")
        .join(font_name)
}

fn load_font(font_name: &str) -> Option<Arc<GlyphSource>> {
    let path = get_test_font_path(font_name);
    if !path.exists() {
        eprintln!("Skipping test: font file not found at {:?}", path);
        return None;
    }
    Some(Arc::new(GlyphSource::from_path(path).unwrap()))
}

fn white_template(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, WHITE))
}

/// Rows containing at least one non-white pixel inside `x_range`
fn inked_rows(canvas: &Canvas, x_range: std::ops::Range<u32>) -> Vec<u32> {
    (0..canvas.height())
        .filter(|&y| x_range.clone().any(|x| canvas.pixel(x, y) != WHITE))
        .collect()
}

/// Wraps the real context and records where each draw landed.
struct Tracing<'a, 'c> {
    inner: &'a mut RenderContext<'c>,
    origins: Vec<(String, Point)>,
}

impl TextTarget for Tracing<'_, '_> {
    fn draw_string(&mut self, text: &str, origin: Point) -> shuhua::Result<usize> {
        self.origins.push((text.to_string(), origin));
        self.inner.draw_string(text, origin)
    }
}

#[test]
fn abc_column_on_large_template() {
    let Some(font) = load_font("DejaVuSans.ttf") else {
        return;
    };

    let mut canvas = Canvas::prepare(&DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        1000,
        1200,
        Rgba([240, 230, 200, 255]),
    )));
    let origins = {
        let mut ctx = RenderContext::new();
        ctx.set_dst(&mut canvas);
        ctx.set_font(font);
        ctx.set_font_size(40.0);
        let mut tracing = Tracing {
            inner: &mut ctx,
            origins: Vec::new(),
        };
        let drawn = draw_vertical(&mut tracing, "ABC", 100, 100, 50).unwrap();
        assert_eq!(drawn, 3);
        tracing.origins
    };

    assert_eq!(
        origins,
        vec![
            ("A".to_string(), Point::new(100, 100)),
            ("B".to_string(), Point::new(100, 150)),
            ("C".to_string(), Point::new(100, 200)),
        ]
    );
    assert_eq!((canvas.width(), canvas.height()), (1000, 1200));

    // Each glyph sits just above its own baseline
    let background = Rgba([240, 230, 200, 255]);
    let ink_in = |y0: u32, y1: u32| {
        (y0..y1).any(|y| (100..150).any(|x| canvas.pixel(x, y) != background))
    };
    assert!(ink_in(60, 101), "A missing");
    assert!(ink_in(110, 151), "B missing");
    assert!(ink_in(160, 201), "C missing");
    assert!(!ink_in(205, 1200), "ink below the last baseline");
    assert!(!ink_in(0, 55), "ink above the first glyph");
}

#[test]
fn empty_text_leaves_canvas_unchanged() {
    let Some(font) = load_font("DejaVuSans.ttf") else {
        return;
    };
    let template = white_template(64, 64);
    let mut canvas = Canvas::prepare(&template);
    {
        let mut ctx = RenderContext::new();
        ctx.set_dst(&mut canvas);
        ctx.set_font(font);
        assert_eq!(draw_vertical(&mut ctx, "", 10, 10, 20).unwrap(), 0);
    }
    assert_eq!(canvas.pixels(), &template.to_rgba8());
}

#[test]
fn swapping_fonts_between_blocks_changes_only_later_draws() {
    let (Some(sans), Some(serif)) = (load_font("DejaVuSans.ttf"), load_font("DejaVuSerif.ttf"))
    else {
        return;
    };

    let render = |second: Arc<GlyphSource>| {
        let mut canvas = Canvas::prepare(&white_template(200, 200));
        {
            let mut ctx = RenderContext::new();
            ctx.set_dst(&mut canvas);
            ctx.set_font(Arc::clone(&sans));
            ctx.set_font_size(48.0);
            draw_vertical(&mut ctx, "T", 10, 60, 0).unwrap();
            ctx.set_font(second);
            draw_vertical(&mut ctx, "T", 110, 60, 0).unwrap();
        }
        canvas
    };

    let both_sans = render(Arc::clone(&sans));
    let mixed = render(serif);

    // The left half is identical, the right half differs
    let same = |xs: std::ops::Range<u32>| {
        (0..200).all(|y| xs.clone().all(|x| both_sans.pixel(x, y) == mixed.pixel(x, y)))
    };
    let left_equal = same(0..100);
    let right_equal = same(100..200);
    assert!(left_equal);
    assert!(!right_equal);
}

#[test]
fn size_change_applies_to_later_blocks() {
    let Some(font) = load_font("DejaVuSans.ttf") else {
        return;
    };
    let mut canvas = Canvas::prepare(&white_template(300, 200));
    {
        let mut ctx = RenderContext::new();
        ctx.set_dst(&mut canvas);
        ctx.set_font(font);
        ctx.set_font_size(20.0);
        draw_vertical(&mut ctx, "H", 10, 150, 0).unwrap();
        ctx.set_font_size(100.0);
        draw_vertical(&mut ctx, "H", 100, 150, 0).unwrap();
    }
    let small = inked_rows(&canvas, 0..90).len();
    let large = inked_rows(&canvas, 100..300).len();
    assert!(large > small * 3, "small {} large {}", small, large);
}

#[test]
fn cjk_text_with_latin_font_draws_notdef_without_failing() {
    let Some(font) = load_font("DejaVuSans.ttf") else {
        return;
    };
    let mut canvas = Canvas::prepare(&white_template(120, 400));
    {
        let mut ctx = RenderContext::new();
        ctx.set_dst(&mut canvas);
        ctx.set_font(font);
        ctx.set_font_size(30.0);
        let drawn = draw_vertical(&mut ctx, "正是男儿读书时", 40, 40, 50).unwrap();
        assert_eq!(drawn, 7);
    }
    assert!(!inked_rows(&canvas, 0..120).is_empty());
}

fn fixtures_present() -> bool {
    let present = ["DejaVuSans.ttf", "DejaVuSerif.ttf"]
        .iter()
        .all(|name| get_test_font_path(name).exists());
    if !present {
        eprintln!("Skipping test: fixture fonts missing");
    }
    present
}

fn write_fixture_config(dir: &std::path::Path, output: &str) -> PathBuf {
    let template = dir.join("back.png");
    white_template(320, 480).save(&template).unwrap();

    let config = serde_json::json!({
        "version": "1.0",
        "template": { "path": "back.png" },
        "output": output,
        "fonts": {
            "kai": get_test_font_path("DejaVuSerif.ttf"),
            "song": get_test_font_path("DejaVuSans.ttf"),
            "song2": get_test_font_path("DejaVuSans.ttf")
        },
        "color": [20, 20, 20, 255],
        "blocks": [
            { "text": "Quan", "left": 40, "top": 60, "line_height": 50, "font": "kai", "size": 40.0 },
            { "text": "Xue", "left": 140, "top": 60, "line_height": 40, "font": "song", "size": 28.0 },
            { "text": "Tang", "left": 240, "top": 100, "line_height": 30, "font": "song2", "size": 24.0 }
        ]
    });
    let path = dir.join("poem.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

#[test]
fn session_writes_output_and_reports() {
    if !fixtures_present() {
        return;
    }
    let dir = tempdir().unwrap();
    let config_path = write_fixture_config(dir.path(), "dst.png");
    let config = CompositionConfig::from_path(config_path.to_str().unwrap()).unwrap();

    let report = Session::new(config).run().unwrap();
    assert_eq!((report.width, report.height), (320, 480));
    assert_eq!(report.blocks, 3);
    assert_eq!(report.glyphs, 11);
    assert_eq!(report.fonts_loaded, 2);

    let written = image::open(dir.path().join("dst.png")).unwrap().to_rgba8();
    assert_eq!(written.dimensions(), (320, 480));
    assert!(written.pixels().any(|p| *p != WHITE));
}

#[test]
fn failed_session_writes_nothing() {
    if !fixtures_present() {
        return;
    }
    let dir = tempdir().unwrap();
    let config_path = write_fixture_config(dir.path(), "dst.png");
    // Corrupt the template so decoding fails after fonts load
    fs::write(dir.path().join("back.png"), b"not a png").unwrap();

    let config = CompositionConfig::from_path(config_path.to_str().unwrap()).unwrap();
    let err = Session::new(config).run().unwrap_err();
    assert!(matches!(err, shuhua::Error::Decode { .. }));
    assert!(!dir.path().join("dst.png").exists());
}

#[test]
fn render_without_writing() {
    if !fixtures_present() {
        return;
    }
    let dir = tempdir().unwrap();
    let config_path = write_fixture_config(dir.path(), "never.png");
    let config = CompositionConfig::from_path(config_path.to_str().unwrap()).unwrap();
    let canvas = Session::new(config).render().unwrap();
    assert_eq!((canvas.width(), canvas.height()), (320, 480));
    assert!(!dir.path().join("never.png").exists());
}

#[test]
fn demo_poem_columns_leave_room_for_each_glyph() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/poem.json");
    let config = CompositionConfig::from_path(path.to_str().unwrap()).unwrap();
    assert_eq!(config.blocks.len(), 6);
    for block in &config.blocks {
        let pixel_size = block.size * config.dpi / 72.0;
        assert!(
            block.line_height as f32 >= pixel_size,
            "'{}' advances {} for {}px glyphs",
            block.text,
            block.line_height,
            pixel_size
        );
    }
}
