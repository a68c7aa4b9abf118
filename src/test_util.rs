use image::{Rgba, RgbaImage};
use std::path::Path;
use usvg::fontdb;

use crate::config::{ImageStyle, TextStyle};
use crate::style::ResolvedStyle;
use crate::text::FontProvider;
use crate::themes::TextLayout;

/// Writes an opaque gray PNG, creating parent directories.
pub(crate) fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture dir");
    }
    RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]))
        .save(path)
        .expect("write fixture png");
}

/// Provider without any installed fonts, so measurements fall back to estimates.
pub(crate) fn empty_fonts() -> FontProvider {
    FontProvider::from_database(fontdb::Database::new(), Vec::new())
}

pub(crate) fn resolved_style() -> ResolvedStyle {
    ResolvedStyle {
        theme: "standard".to_string(),
        layout: TextLayout::Standard,
        text_area_height: 400,
        background_color: "#F5F5F5".to_string(),
        image_style: ImageStyle::default(),
        main: TextStyle::default(),
        sub: TextStyle::default(),
    }
}
