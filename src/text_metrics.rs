//! Label extents in pixels.
//!
//! Placement only needs a width and height per label, so measurement sits
//! behind [`LabelMeasure`]. [`FontMetrics`] reads advances from system fonts;
//! [`EstimatedMetrics`] uses fixed per-character factors and gives identical
//! results on every machine.

use crate::config::{LabelStyle, Rotation};
#[cfg(feature = "fonts")]
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
#[cfg(feature = "fonts")]
use once_cell::sync::Lazy;
#[cfg(feature = "fonts")]
use std::collections::HashMap;
#[cfg(feature = "fonts")]
use std::sync::Mutex;
#[cfg(feature = "fonts")]
use ttf_parser::Face;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.2;

/// Extent of a label box in pixels, after rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    pub width: f32,
    pub height: f32,
}

impl TextExtent {
    pub fn rotated(self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::Horizontal => self,
            Rotation::Vertical => Self {
                width: self.height,
                height: self.width,
            },
        }
    }
}

pub trait LabelMeasure {
    /// Pixel extent of `text` drawn with `style` at its measuring size,
    /// rotated as the style says.
    fn measure(&self, text: &str, style: &LabelStyle) -> TextExtent;
}

/// Per-character width estimate. Deterministic, needs no fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMetrics;

impl LabelMeasure for EstimatedMetrics {
    fn measure(&self, text: &str, style: &LabelStyle) -> TextExtent {
        let font_size = style.measure_font_size();
        block_extent(text, font_size, |line| estimated_width(line, font_size))
            .rotated(style.rotation)
    }
}

/// System font measurement. Falls back to [`EstimatedMetrics`] for families
/// that do not resolve to a face.
#[cfg(feature = "fonts")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FontMetrics;

#[cfg(feature = "fonts")]
impl LabelMeasure for FontMetrics {
    fn measure(&self, text: &str, style: &LabelStyle) -> TextExtent {
        let font_size = style.measure_font_size();
        block_extent(text, font_size, |line| {
            measure_text_width(line, font_size, &style.font_family)
                .unwrap_or_else(|| estimated_width(line, font_size))
        })
        .rotated(style.rotation)
    }
}

fn block_extent(text: &str, font_size: f32, line_width: impl Fn(&str) -> f32) -> TextExtent {
    let lines = split_lines(text);
    let width = lines
        .iter()
        .map(|&line| line_width(line))
        .fold(0.0, f32::max);
    TextExtent {
        width,
        height: lines.len() as f32 * font_size * LINE_HEIGHT,
    }
}

pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').map(str::trim_end).collect()
}

pub(crate) fn estimated_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Advance widths as a fraction of the font size for a common sans-serif.
pub(crate) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' => 0.321,
        'I' => 0.272,
        'M' => 0.903,
        'W' => 0.958,
        'A'..='Z' => 0.660,
        'f' => 0.340,
        'i' => 0.235,
        'j' => 0.227,
        'l' => 0.239,
        'm' => 0.867,
        'r' => 0.364,
        't' => 0.305,
        'w' => 0.811,
        'a'..='z' => 0.570,
        '1' => 0.396,
        '0'..='9' => 0.605,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}

#[cfg(feature = "fonts")]
static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

#[cfg(feature = "fonts")]
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

#[cfg(feature = "fonts")]
struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

#[cfg(feature = "fonts")]
impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let family_key = normalize_family_key(font_family);
        if !self.cache.contains_key(&family_key) {
            let face = self.load_face(font_family);
            if face.is_none() {
                tracing::debug!(family = %family_key, "no font face found; estimating widths");
            }
            self.cache.insert(family_key.clone(), face);
        }
        let face = self.cache.get_mut(&family_key)?.as_mut()?;
        Some(face.measure_width(&text.replace('\t', "    "), font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let mut families: Vec<Family<'_>> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            let family = match raw.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" => Family::SansSerif,
                "monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(raw),
            };
            families.push(family);
        }
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
            .flatten()
    }
}

#[cfg(feature = "fonts")]
struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

#[cfg(feature = "fonts")]
impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn advance(&mut self, ch: char) -> Option<u16> {
        if ch.is_ascii() {
            let advance = self.ascii_advances[ch as usize];
            return (advance != 0).then_some(advance);
        }
        if let Some(cached) = self.advance_cache.get(&ch) {
            return *cached;
        }
        let advance = Face::parse(&self.data, self.index).ok().and_then(|face| {
            face.glyph_index(ch)
                .and_then(|glyph_id| face.glyph_hor_advance(glyph_id))
        });
        self.advance_cache.insert(ch, advance);
        advance
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / f32::from(self.units_per_em);
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            width += match self.advance(ch) {
                Some(advance) => f32::from(advance) * scale,
                None => fallback,
            };
        }
        width.max(0.0)
    }
}

#[cfg(feature = "fonts")]
fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(rotation: Rotation) -> LabelStyle {
        LabelStyle {
            font_size: 9.0,
            measure_size_bump: 1.0,
            rotation,
            ..LabelStyle::default()
        }
    }

    #[test]
    fn char_width_factor_returns_positive_values() {
        for ch in ['a', 'Z', ' ', '0', '@', '\u{4e2d}'] {
            assert!(char_width_factor(ch) > 0.0, "char {:?} has zero width", ch);
        }
    }

    #[test]
    fn estimated_width_scales_with_font_size() {
        let w10 = estimated_width("Si II", 10.0);
        let w20 = estimated_width("Si II", 20.0);
        assert!((w20 - w10 * 2.0).abs() < 0.01);
    }

    #[test]
    fn estimate_measures_at_bumped_size() {
        let extent = EstimatedMetrics.measure("N V", &style(Rotation::Horizontal));
        assert!((extent.width - estimated_width("N V", 10.0)).abs() < 1e-4);
        assert!((extent.height - 10.0 * LINE_HEIGHT).abs() < 1e-4);
    }

    #[test]
    fn vertical_rotation_swaps_extent() {
        let text = "Si II 1260.420";
        let flat = EstimatedMetrics.measure(text, &style(Rotation::Horizontal));
        let upright = EstimatedMetrics.measure(text, &style(Rotation::Vertical));
        assert_eq!(upright.width, flat.height);
        assert_eq!(upright.height, flat.width);
    }

    #[test]
    fn multi_line_labels_stack() {
        let one = EstimatedMetrics.measure("Fe II", &style(Rotation::Horizontal));
        let two = EstimatedMetrics.measure("Fe II\n2600", &style(Rotation::Horizontal));
        assert!((two.height - one.height * 2.0).abs() < 1e-4);
        assert_eq!(two.width, one.width.max(estimated_width("2600", 10.0)));
    }

    #[cfg(feature = "fonts")]
    #[test]
    fn font_metrics_produce_positive_width() {
        let extent = FontMetrics.measure("Si II", &style(Rotation::Horizontal));
        assert!(extent.width > 0.0);
        assert!(extent.height > 0.0);
    }
}
