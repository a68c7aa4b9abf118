mod font;
mod layout;
mod render;

pub use font::{
    FontCache, FontFace, FontKey, FontOptions, FontProvider, FontSlant, default_fallback_fonts,
    measure_text, weight_value,
};
pub use layout::{DrawPass, TextMetrics, TextSlot, draw_passes, position};
pub use render::{PlacedText, build_text_svg, composite_overlay, draw_texts, layout_texts};
