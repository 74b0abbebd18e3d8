//! Icon atlas rasterization.
//!
//! Icon-mode layers render every point feature with the same glyph texture.
//! The atlas is a single 128x128 PNG with the glyph centered in bold type,
//! returned as a data URI so the map surface can consume it without any file
//! I/O. Atlases depend only on the glyph, so they are cached for the process
//! lifetime and never re-rasterized per frame.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::RwLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{ImageBuffer, ImageOutputFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_text_mut};
use once_cell::sync::Lazy;
use rusttype::{point, Font, Scale};

/// Atlas canvas is a fixed square texture.
pub const ATLAS_SIZE: u32 = 128;

const GLYPH_SCALE: f32 = 96.0;

/// Cache of rendered atlases, keyed by glyph.
static ATLAS_CACHE: Lazy<RwLock<HashMap<String, String>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Bold TTF used for glyph rendering. Loaded once; `GLYPH_FONT_PATH` wins,
/// then a few common system locations.
static GLYPH_FONT: Lazy<Option<Font<'static>>> = Lazy::new(load_font);

fn load_font() -> Option<Font<'static>> {
    let mut candidates: Vec<String> = Vec::new();
    if let Ok(path) = std::env::var("GLYPH_FONT_PATH") {
        candidates.push(path);
    }
    candidates.extend(
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
            "/Library/Fonts/Arial Bold.ttf",
        ]
        .iter()
        .map(|s| s.to_string()),
    );

    for path in candidates {
        if let Ok(bytes) = std::fs::read(&path) {
            if let Some(font) = Font::try_from_vec(bytes) {
                tracing::debug!(path = %path, "Loaded glyph font");
                return Some(font);
            }
        }
    }
    tracing::warn!("No glyph font found, icon atlases fall back to disc markers");
    None
}

/// PNG data URI for a glyph, cached per distinct glyph.
///
/// Deterministic pure function of the glyph. Returns an empty string when no
/// glyph is configured, which disables icon mode for that style.
pub fn atlas_for(glyph: &str) -> String {
    if glyph.is_empty() {
        return String::new();
    }

    {
        let cache = ATLAS_CACHE.read().unwrap();
        if let Some(uri) = cache.get(glyph) {
            return uri.clone();
        }
    }

    let mut cache = ATLAS_CACHE.write().unwrap();
    if let Some(uri) = cache.get(glyph) {
        return uri.clone();
    }

    let uri = encode_data_uri(&rasterize(glyph));
    cache.insert(glyph.to_string(), uri.clone());
    uri
}

/// Rasterize the glyph centered on a transparent square canvas.
fn rasterize(glyph: &str) -> RgbaImage {
    let mut img = ImageBuffer::from_pixel(ATLAS_SIZE, ATLAS_SIZE, Rgba([0, 0, 0, 0]));
    let white = Rgba([255u8, 255, 255, 255]);

    match GLYPH_FONT.as_ref() {
        Some(font) => {
            let scale = Scale::uniform(GLYPH_SCALE);
            let (text_width, text_height) = measure(font, scale, glyph);
            let x = ((ATLAS_SIZE as f32 - text_width) / 2.0).max(0.0) as i32;
            let y = ((ATLAS_SIZE as f32 - text_height) / 2.0).max(0.0) as i32;
            draw_text_mut(&mut img, white, x, y, scale, font, glyph);
        }
        None => {
            // No usable font on this host: a filled disc keeps icon mode
            // deterministic and visible.
            let center = (ATLAS_SIZE / 2) as i32;
            draw_filled_circle_mut(&mut img, (center, center), (ATLAS_SIZE / 3) as i32, white);
        }
    }

    img
}

/// Pixel extent of laid-out text at the given scale.
fn measure(font: &Font<'_>, scale: Scale, text: &str) -> (f32, f32) {
    let v_metrics = font.v_metrics(scale);
    let width = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .filter_map(|g| g.pixel_bounding_box())
        .map(|bb| bb.max.x as f32)
        .fold(0.0, f32::max);
    (width, v_metrics.ascent - v_metrics.descent)
}

fn encode_data_uri(img: &RgbaImage) -> String {
    let mut png = Vec::new();
    let dynamic = image::DynamicImage::ImageRgba8(img.clone());
    if let Err(e) = dynamic.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png) {
        tracing::warn!(error = %e, "Atlas PNG encoding failed");
        return String::new();
    }
    format!("data:image/png;base64,{}", BASE64.encode(png))
}
