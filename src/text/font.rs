use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};
use ttf_parser::Face;
use usvg::fontdb;

use super::layout::TextMetrics;
use crate::config::TextStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontSlant {
    Normal,
    Italic,
    Oblique,
}

impl FontSlant {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "italic" => FontSlant::Italic,
            "oblique" => FontSlant::Oblique,
            _ => FontSlant::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontSlant::Normal => "normal",
            FontSlant::Italic => "italic",
            FontSlant::Oblique => "oblique",
        }
    }

    fn to_fontdb(self) -> fontdb::Style {
        match self {
            FontSlant::Normal => fontdb::Style::Normal,
            FontSlant::Italic => fontdb::Style::Italic,
            FontSlant::Oblique => fontdb::Style::Oblique,
        }
    }
}

/// OpenType weight for a CSS-like weight name or a numeric string. Unknown names are 400.
pub fn weight_value(name: &str) -> u16 {
    let lower = name.trim().to_ascii_lowercase();
    if let Ok(numeric) = lower.parse::<u16>() {
        return numeric.clamp(1, 1000);
    }
    match lower.as_str() {
        "thin" | "hairline" => 100,
        "ultralight" | "extralight" => 200,
        "light" => 300,
        "normal" | "regular" => 400,
        "medium" => 500,
        "semibold" | "demibold" => 600,
        "bold" => 700,
        "extrabold" | "ultrabold" => 800,
        "black" | "heavy" => 900,
        _ => 400,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    pub family: String,
    pub weight: u16,
    pub slant: FontSlant,
}

impl FontKey {
    pub fn for_style(style: &TextStyle) -> Self {
        Self {
            family: style.font_family.clone(),
            weight: weight_value(&style.font_weight),
            slant: FontSlant::parse(&style.font_style),
        }
    }
}

#[derive(Clone)]
pub struct FontFace {
    data: Arc<Vec<u8>>,
    face_index: u32,
    units_per_em: u16,
    ascender: i16,
    space_advance: u16,
    family: String,
    weight: u16,
    slant: FontSlant,
}

impl FontFace {
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn weight(&self) -> u16 {
        self.weight
    }

    pub fn slant(&self) -> FontSlant {
        self.slant
    }

    fn from_data(data: Vec<u8>, face_index: u32, info: &fontdb::FaceInfo) -> Option<Self> {
        let face = Face::parse(&data, face_index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let space_advance = face
            .glyph_index(' ')
            .and_then(|id| face.glyph_hor_advance(id))
            .unwrap_or(units_per_em / 4);
        let ascender = face.ascender();
        let family = info
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| info.post_script_name.clone());
        let slant = match info.style {
            fontdb::Style::Normal => FontSlant::Normal,
            fontdb::Style::Italic => FontSlant::Italic,
            fontdb::Style::Oblique => FontSlant::Oblique,
        };
        Some(Self {
            data: Arc::new(data),
            face_index,
            units_per_em,
            ascender,
            space_advance,
            family,
            weight: info.weight.0,
            slant,
        })
    }
}

/// Lookup results keyed by family, weight and slant. Reads run concurrently;
/// a miss takes the write lock and checks again before computing.
#[derive(Default)]
pub struct FontCache {
    entries: RwLock<HashMap<FontKey, Option<Arc<FontFace>>>>,
}

impl FontCache {
    pub fn get_or_insert_with<F>(&self, key: &FontKey, load: F) -> Option<Arc<FontFace>>
    where
        F: FnOnce() -> Option<FontFace>,
    {
        if let Ok(entries) = self.entries.read() {
            if let Some(hit) = entries.get(key) {
                return hit.clone();
            }
        }
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(hit) = entries.get(key) {
            return hit.clone();
        }
        let loaded = load().map(Arc::new);
        entries.insert(key.clone(), loaded.clone());
        loaded
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct FontOptions {
    pub load_system_fonts: bool,
    pub dirs: Vec<PathBuf>,
    pub fallback: Vec<String>,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            dirs: Vec::new(),
            fallback: default_fallback_fonts()
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

#[cfg(target_os = "macos")]
pub fn default_fallback_fonts() -> &'static [&'static str] {
    &["Helvetica", "Hiragino Sans", "sans-serif"]
}

#[cfg(target_os = "windows")]
pub fn default_fallback_fonts() -> &'static [&'static str] {
    &["Arial", "Yu Gothic", "sans-serif"]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub fn default_fallback_fonts() -> &'static [&'static str] {
    &["DejaVu Sans", "Noto Sans", "sans-serif"]
}

/// Owns the font database shared with the SVG renderer and the lookup cache.
pub struct FontProvider {
    db: Arc<fontdb::Database>,
    fallback: Vec<String>,
    cache: FontCache,
}

impl FontProvider {
    pub fn new(options: &FontOptions) -> Self {
        let mut db = fontdb::Database::new();
        if options.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &options.dirs {
            db.load_fonts_dir(dir);
        }
        debug!("font database loaded with {} faces", db.len());
        Self::from_database(db, options.fallback.clone())
    }

    pub fn from_database(db: fontdb::Database, fallback: Vec<String>) -> Self {
        Self {
            db: Arc::new(db),
            fallback,
            cache: FontCache::default(),
        }
    }

    pub fn database(&self) -> Arc<fontdb::Database> {
        self.db.clone()
    }

    pub fn cache(&self) -> &FontCache {
        &self.cache
    }

    /// Requested family first, then the fallback list at the same weight and slant.
    /// A missing requested family is logged once, when its cache entry is created.
    pub fn resolve(&self, style: &TextStyle) -> Option<Arc<FontFace>> {
        let key = FontKey::for_style(style);
        let face = self.cache.get_or_insert_with(&key, || {
            let face = load_face(&self.db, &key);
            if face.is_none() {
                warn!(
                    "font '{}' (weight {}, {}) not found; using fallback",
                    key.family,
                    key.weight,
                    key.slant.as_str()
                );
            }
            face
        });
        if face.is_some() {
            return face;
        }
        for family in &self.fallback {
            let candidate = FontKey {
                family: family.clone(),
                ..key.clone()
            };
            if let Some(face) = self.lookup(&candidate) {
                return Some(face);
            }
        }
        None
    }

    fn lookup(&self, key: &FontKey) -> Option<Arc<FontFace>> {
        self.cache
            .get_or_insert_with(key, || load_face(&self.db, key))
    }
}

fn load_face(db: &fontdb::Database, key: &FontKey) -> Option<FontFace> {
    let family = key.family.trim();
    let families = match family.to_ascii_lowercase().as_str() {
        "sans-serif" => vec![fontdb::Family::SansSerif],
        "serif" => vec![fontdb::Family::Serif],
        "monospace" => vec![fontdb::Family::Monospace],
        _ => vec![fontdb::Family::Name(family)],
    };
    let query = fontdb::Query {
        families: &families,
        weight: fontdb::Weight(key.weight),
        style: key.slant.to_fontdb(),
        ..Default::default()
    };
    let id = db.query(&query)?;
    let info = db.face(id)?;
    let (data, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
    let face = FontFace::from_data(data, index, info)?;
    debug!(
        "resolved font '{}' -> '{}' (weight {})",
        key.family, face.family, face.weight
    );
    Some(face)
}

/// Measures `text` at `font_size` pixels. Without a face the size is estimated
/// from character classes.
pub fn measure_text(text: &str, font_size: u32, font: Option<&FontFace>) -> TextMetrics {
    let size = font_size as f32;
    if let Some(font) = font {
        if let Ok(face) = Face::parse(&font.data, font.face_index) {
            return measure_with_face(text, size, font, &face);
        }
    }
    estimate_metrics(text, size)
}

fn measure_with_face(text: &str, size: f32, font: &FontFace, face: &Face<'_>) -> TextMetrics {
    let scale = size / font.units_per_em as f32;
    let ascender = font.ascender as f32;
    let mut pen = 0.0f32;
    let mut left = f32::MAX;
    let mut right = f32::MIN;
    let mut top = f32::MIN;
    let mut bottom = f32::MAX;

    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            continue;
        }
        let Some(glyph) = face.glyph_index(ch) else {
            pen += font.space_advance as f32;
            continue;
        };
        if let Some(bbox) = face.glyph_bounding_box(glyph) {
            left = left.min(pen + bbox.x_min as f32);
            right = right.max(pen + bbox.x_max as f32);
            top = top.max(bbox.y_max as f32);
            bottom = bottom.min(bbox.y_min as f32);
        }
        pen += face
            .glyph_hor_advance(glyph)
            .unwrap_or(font.space_advance) as f32;
    }

    if left > right || bottom > top {
        return TextMetrics {
            width: 0,
            height: 0,
            bbox_top: 0,
            ascent: ascender * scale,
        };
    }

    let bbox_top = (ascender - top) * scale;
    let bbox_bottom = (ascender - bottom) * scale;
    TextMetrics {
        width: ((right - left) * scale).round() as i32,
        height: (bbox_bottom.round() - bbox_top.round()) as i32,
        bbox_top: bbox_top.round() as i32,
        ascent: ascender * scale,
    }
}

fn estimate_char_units(ch: char) -> f32 {
    if ch.is_whitespace() {
        0.25
    } else if ch.is_ascii_alphanumeric() {
        0.55
    } else if ch.is_ascii() {
        0.35
    } else if matches!(
        ch as u32,
        0x4E00..=0x9FFF | 0x3040..=0x30FF | 0x31F0..=0x31FF | 0xAC00..=0xD7AF
    ) {
        1.0
    } else {
        0.9
    }
}

fn estimate_metrics(text: &str, size: f32) -> TextMetrics {
    let units: f32 = text
        .chars()
        .filter(|ch| *ch != '\n' && *ch != '\r')
        .map(estimate_char_units)
        .sum();
    if units == 0.0 {
        return TextMetrics {
            width: 0,
            height: 0,
            bbox_top: 0,
            ascent: size * 0.8,
        };
    }
    TextMetrics {
        width: (units * size).round() as i32,
        height: (size * 0.75).round() as i32,
        bbox_top: (size * 0.1).round() as i32,
        ascent: size * 0.8,
    }
}
