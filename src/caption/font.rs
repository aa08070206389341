use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use ttf_parser::{Face, GlyphId, name_id};
use usvg::fontdb;

use crate::error::CaptionError;

/// Pixel metrics of a font at integer sizes (72 DPI, so 1pt == 1px).
pub trait TextMetrics {
    /// Nominal line height: the em size in pixels.
    fn line_height(&self, size: u32) -> i32;

    /// Advance of the space glyph, rounded to the nearest pixel.
    fn space_advance(&self, size: u32) -> i32;

    /// Summed glyph advances of `text`, floored to whole pixels.
    fn text_width(&self, size: u32, text: &str) -> i32;

    /// Height of a block of `line_count` lines: one line height plus one
    /// line step per additional line.
    fn block_height(&self, size: u32, spacing: f32, line_count: usize) -> i32 {
        self.line_height(size) + (line_count as i32 - 1) * line_step(size, spacing)
    }
}

/// Baseline-to-baseline distance for `size` at the given spacing multiplier.
pub fn line_step(size: u32, spacing: f32) -> i32 {
    (size as f32 * spacing).round() as i32
}

/// A parsed font file. Loaded once, then shared read-only between renders.
#[derive(Clone)]
pub struct FontResource {
    data: Arc<Vec<u8>>,
    face_index: u32,
    units_per_em: u16,
    space_advance: u16,
    family: Option<String>,
}

impl std::fmt::Debug for FontResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResource")
            .field("family", &self.family)
            .field("face_index", &self.face_index)
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

impl FontResource {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, CaptionError> {
        load_from_data(data, None)
    }

    pub fn load(path: &Path) -> Result<Self, CaptionError> {
        let data = std::fs::read(path).map_err(|err| {
            CaptionError::Font(format!("failed to read font {}: {}", path.display(), err))
        })?;
        load_from_data(data, None).map_err(|err| {
            CaptionError::Font(format!("failed to parse font {}: {}", path.display(), err))
        })
    }

    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    /// Re-parses the face table directory. Cheap; the bytes were validated at load.
    pub(crate) fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.face_index).ok()
    }

    pub(crate) fn scale(&self, size: u32) -> f32 {
        size as f32 / f32::from(self.units_per_em.max(1))
    }

    /// Glyph used to draw `ch`; characters the font lacks fall back to `.notdef`.
    pub(crate) fn glyph_for(face: &Face<'_>, ch: char) -> GlyphId {
        face.glyph_index(ch).unwrap_or(GlyphId(0))
    }

    pub(crate) fn advance_units(&self, face: &Face<'_>, glyph: GlyphId) -> u16 {
        face.glyph_hor_advance(glyph).unwrap_or(self.space_advance)
    }
}

impl TextMetrics for FontResource {
    fn line_height(&self, size: u32) -> i32 {
        size as i32
    }

    fn space_advance(&self, size: u32) -> i32 {
        (f32::from(self.space_advance) * self.scale(size)).round() as i32
    }

    fn text_width(&self, size: u32, text: &str) -> i32 {
        let Some(face) = self.face() else {
            return text.chars().count() as i32 * self.space_advance(size);
        };
        let mut advance = 0u32;
        for ch in text.chars() {
            let glyph = Self::glyph_for(&face, ch);
            advance = advance.saturating_add(u32::from(self.advance_units(&face, glyph)));
        }
        (advance as f32 * self.scale(size)).floor() as i32
    }
}

/// Resolves a font from an explicit file, a family name, or the first
/// installed fallback family.
pub fn resolve_font(
    font_path: Option<&Path>,
    font_family: Option<&str>,
    fallback: &[&str],
) -> Result<FontResource, CaptionError> {
    if let Some(path) = font_path {
        return FontResource::load(path);
    }

    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    if let Some(family) = font_family {
        return load_from_family(&db, family);
    }

    for candidate in fallback {
        if let Ok(font) = load_from_family(&db, candidate) {
            return Ok(font);
        }
    }

    Err(CaptionError::Font(format!(
        "none of the fallback fonts are installed: {}",
        fallback.join(", ")
    )))
}

fn load_from_data(data: Vec<u8>, face_index: Option<u32>) -> Result<FontResource, CaptionError> {
    let data = Arc::new(data);
    let count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
    let indices = match face_index {
        Some(index) => index..index + 1,
        None => 0..count,
    };
    for index in indices {
        let Ok(face) = Face::parse(&data, index) else {
            continue;
        };
        let units_per_em = face.units_per_em().max(1);
        let space_advance = face
            .glyph_index(' ')
            .and_then(|id| face.glyph_hor_advance(id))
            .unwrap_or(units_per_em / 2);
        let family = extract_family_name(&face);
        return Ok(FontResource {
            data: Arc::clone(&data),
            face_index: index,
            units_per_em,
            space_advance,
            family,
        });
    }
    Err(CaptionError::Font("failed to parse font data".to_string()))
}

fn load_from_family(db: &fontdb::Database, family: &str) -> Result<FontResource, CaptionError> {
    let families = match family.to_ascii_lowercase().as_str() {
        "sans-serif" => vec![fontdb::Family::SansSerif],
        "serif" => vec![fontdb::Family::Serif],
        "monospace" => vec![fontdb::Family::Monospace],
        _ => vec![fontdb::Family::Name(family)],
    };
    let query = fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db
        .query(&query)
        .ok_or_else(|| CaptionError::Font(format!("font not found: {family}")))?;
    let (data, face_index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| CaptionError::Font(format!("failed to load font data: {family}")))?;
    let font = load_from_data(data, Some(face_index))?;
    debug!(requested = family, resolved = ?font.family(), "resolved system font");
    Ok(font)
}

fn extract_family_name(face: &Face<'_>) -> Option<String> {
    let mut fallback = None;
    for name in face.names() {
        if name.name_id == name_id::TYPOGRAPHIC_FAMILY {
            if let Some(value) = name.to_string() {
                return Some(value);
            }
        } else if name.name_id == name_id::FAMILY && fallback.is_none() {
            fallback = name.to_string();
        }
    }
    fallback
}
