//! Label rasterization: CSS-like font specs resolved through fontdb, glyphs
//! drawn with ab_glyph into a straight-alpha RGBA canvas.

use std::collections::HashMap;

use ab_glyph::{Font, FontArc, FontVec, PxScale, ScaleFont, point};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use palette::Srgba;
use thiserror::Error;
use tracing::debug;

use crate::error::GalleryError;

/// Blank margin added around the measured text on each axis.
pub const CANVAS_PADDING: u32 = 20;
/// Canvas height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FontSpecError {
    #[error("font spec '{0}' has no pixel size (e.g. 30px)")]
    MissingSize(String),
    #[error("font spec '{0}' has an invalid pixel size")]
    InvalidSize(String),
    #[error("font spec '{0}' names no font family")]
    MissingFamily(String),
}

/// Parsed form of `"[style] [weight] <size>px <family>[, <family>...]"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub italic: bool,
    pub weight: u16,
    pub size_px: f32,
    pub families: Vec<String>,
}

impl FontSpec {
    pub fn parse(input: &str) -> Result<Self, FontSpecError> {
        let mut italic = false;
        let mut weight = Weight::NORMAL.0;
        let mut rest = input.trim();

        let size_px = loop {
            let (token, tail) = rest
                .split_once(char::is_whitespace)
                .unwrap_or((rest, ""));
            if token.is_empty() {
                return Err(FontSpecError::MissingSize(input.to_string()));
            }
            rest = tail.trim_start();
            match token.to_ascii_lowercase().as_str() {
                "normal" => {}
                "italic" | "oblique" => italic = true,
                "bold" => weight = Weight::BOLD.0,
                "lighter" => weight = Weight::LIGHT.0,
                "bolder" => weight = Weight::EXTRA_BOLD.0,
                other => {
                    if let Some(px) = other.strip_suffix("px") {
                        let size: f32 = px
                            .parse()
                            .map_err(|_| FontSpecError::InvalidSize(input.to_string()))?;
                        if !(size.is_finite() && size > 0.0) {
                            return Err(FontSpecError::InvalidSize(input.to_string()));
                        }
                        break size;
                    }
                    match other.parse::<u16>() {
                        Ok(w) if (1..=1000).contains(&w) => weight = w,
                        _ => return Err(FontSpecError::MissingSize(input.to_string())),
                    }
                }
            }
        };

        let families: Vec<String> = rest
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if families.is_empty() {
            return Err(FontSpecError::MissingFamily(input.to_string()));
        }

        Ok(Self {
            italic,
            weight,
            size_px,
            families,
        })
    }
}

/// Straight-alpha RGBA8 pixels of one rendered label.
#[derive(Debug, Clone)]
pub struct LabelRaster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl LabelRaster {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Canvas size for text of the given measured width.
pub fn canvas_size(text_width: f32, size_px: f32) -> (u32, u32) {
    (
        text_width.max(0.0).ceil() as u32 + CANVAS_PADDING,
        (size_px * LINE_HEIGHT_FACTOR).ceil() as u32 + CANVAS_PADDING,
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FaceKey {
    families: Vec<String>,
    weight: u16,
    italic: bool,
}

pub struct TextRasterizer {
    db: Database,
    faces: HashMap<FaceKey, FontArc>,
}

impl TextRasterizer {
    pub fn with_system_fonts() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "font_database_loaded");
        Self::from_database(db)
    }

    pub fn from_database(db: Database) -> Self {
        Self {
            db,
            faces: HashMap::new(),
        }
    }

    /// Finds a face for `spec`, falling back to any sans-serif face.
    pub fn resolve(&mut self, spec: &FontSpec) -> Result<FontArc, GalleryError> {
        let key = FaceKey {
            families: spec.families.clone(),
            weight: spec.weight,
            italic: spec.italic,
        };
        if let Some(font) = self.faces.get(&key) {
            return Ok(font.clone());
        }

        let mut families: Vec<Family<'_>> = spec.families.iter().map(|f| family(f)).collect();
        families.push(Family::SansSerif);
        let query = Query {
            families: &families,
            weight: Weight(spec.weight),
            stretch: Stretch::Normal,
            style: if spec.italic { Style::Italic } else { Style::Normal },
        };

        let font = self
            .db
            .query(&query)
            .and_then(|id| load_face(&self.db, id))
            .ok_or_else(|| GalleryError::TextRaster(spec.families.join(", ")))?;
        self.faces.insert(key, font.clone());
        Ok(font)
    }

    /// Renders `text` centred on a padded canvas.
    pub fn rasterize(
        &mut self,
        text: &str,
        spec: &FontSpec,
        color: Srgba<u8>,
    ) -> Result<LabelRaster, GalleryError> {
        let font = self.resolve(spec)?;
        let scale = PxScale::from(spec.size_px);
        let text_width = measure_text(text, &font, scale);
        let (width, height) = canvas_size(text_width, spec.size_px);
        let mut pixels = vec![0u8; (width * height * 4) as usize];

        let scaled = font.as_scaled(scale);
        let left = (width as f32 - text_width) / 2.0;
        let baseline = height as f32 / 2.0 + (scaled.ascent() + scaled.descent()) / 2.0;
        draw_text(&mut pixels, width, height, &font, text, color, left, baseline, scale);

        Ok(LabelRaster {
            width,
            height,
            pixels,
        })
    }
}

fn family(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "sans-serif" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

fn load_face(db: &Database, id: fontdb::ID) -> Option<FontArc> {
    db.with_face_data(id, |data, index| {
        FontVec::try_from_vec_and_index(data.to_vec(), index).ok()
    })
    .flatten()
    .map(FontArc::new)
}

fn measure_text(text: &str, font: &FontArc, scale: PxScale) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut previous = None;
    for ch in text.chars().filter(|c| !c.is_control()) {
        let glyph = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            width += scaled.kern(prev, glyph);
        }
        width += scaled.h_advance(glyph);
        previous = Some(glyph);
    }
    width.max(0.0)
}

#[allow(clippy::too_many_arguments)]
fn draw_text(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    font: &FontArc,
    text: &str,
    color: Srgba<u8>,
    left: f32,
    baseline: f32,
    scale: PxScale,
) {
    let scaled = font.as_scaled(scale);
    let mut cursor_x = left;
    let mut previous = None;
    for ch in text.chars().filter(|c| !c.is_control()) {
        let glyph = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            cursor_x += scaled.kern(prev, glyph);
        }
        let mut positioned = scaled.scaled_glyph(ch);
        positioned.position = point(cursor_x, baseline);
        if let Some(outline) = font.outline_glyph(positioned) {
            let bounds = outline.px_bounds();
            outline.draw(|x, y, coverage| {
                let px = bounds.min.x as i32 + x as i32;
                let py = bounds.min.y as i32 + y as i32;
                put_coverage(pixels, width, height, px, py, color, coverage);
            });
        }
        cursor_x += scaled.h_advance(glyph);
        previous = Some(glyph);
    }
}

fn put_coverage(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    color: Srgba<u8>,
    coverage: f32,
) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let idx = ((y as u32 * width + x as u32) * 4) as usize;
    let alpha = (coverage.clamp(0.0, 1.0) * color.alpha as f32).round() as u8;
    let texel = &mut pixels[idx..idx + 4];
    texel[0] = color.red;
    texel[1] = color.green;
    texel[2] = color.blue;
    texel[3] = texel[3].max(alpha);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_weight_size_and_family() {
        let spec = FontSpec::parse("bold 30px DejaVu Sans").unwrap();
        assert_eq!(spec.weight, 700);
        assert!(!spec.italic);
        assert_eq!(spec.size_px, 30.0);
        assert_eq!(spec.families, vec!["DejaVu Sans".to_string()]);
    }

    #[test]
    fn parses_style_numeric_weight_and_family_list() {
        let spec = FontSpec::parse("italic 600 18.5px 'Inter', \"Noto Sans\", sans-serif").unwrap();
        assert!(spec.italic);
        assert_eq!(spec.weight, 600);
        assert_eq!(spec.size_px, 18.5);
        assert_eq!(spec.families, vec!["Inter", "Noto Sans", "sans-serif"]);
    }

    #[test]
    fn rejects_incomplete_specs() {
        assert!(matches!(
            FontSpec::parse("bold Arial"),
            Err(FontSpecError::MissingSize(_))
        ));
        assert!(matches!(
            FontSpec::parse("12px"),
            Err(FontSpecError::MissingFamily(_))
        ));
        assert!(matches!(
            FontSpec::parse("0px Arial"),
            Err(FontSpecError::InvalidSize(_))
        ));
        assert!(FontSpec::parse("").is_err());
    }

    #[test]
    fn canvas_pads_measured_text() {
        assert_eq!(canvas_size(101.2, 31.0), (122, 58));
        assert_eq!(canvas_size(0.0, 11.0), (20, 34));
    }

    #[test]
    fn empty_database_reports_text_raster_error() {
        let mut raster = TextRasterizer::from_database(Database::new());
        let spec = FontSpec::parse("24px Nowhere Sans").unwrap();
        let err = raster
            .rasterize("hello", &spec, Srgba::new(255, 255, 255, 255))
            .unwrap_err();
        assert!(matches!(err, GalleryError::TextRaster(_)));
    }

    #[test]
    fn coverage_keeps_strongest_alpha() {
        let mut pixels = vec![0u8; 2 * 2 * 4];
        let white = Srgba::new(255, 255, 255, 255);
        put_coverage(&mut pixels, 2, 2, 1, 1, white, 1.0);
        put_coverage(&mut pixels, 2, 2, 1, 1, white, 0.25);
        assert_eq!(&pixels[12..16], &[255, 255, 255, 255]);
        put_coverage(&mut pixels, 2, 2, 5, -1, white, 1.0);
        assert_eq!(pixels[..12].iter().filter(|b| **b != 0).count(), 0);
    }
}
