use crate::compose::parse_color;
use crate::config::TextStyle;

const UPPER_ANCHOR: f64 = 0.25;
const LOWER_ANCHOR: f64 = 0.65;

/// Ink bounding box of a rendered string, relative to its left/ascender anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: i32,
    pub height: i32,
    pub bbox_top: i32,
    /// Distance from the anchor to the baseline, in pixels.
    pub ascent: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSlot {
    pub is_main: bool,
    pub has_sub_text: bool,
    pub is_inverted: bool,
}

/// Anchor position of one text element inside the text band at the top of
/// the canvas, user offset included.
pub fn position(
    metrics: &TextMetrics,
    canvas_width: u32,
    text_area_height: u32,
    slot: TextSlot,
    offset: (i32, i32),
) -> (i32, i32) {
    let band = text_area_height as i64;
    let x = (canvas_width as i64 - metrics.width as i64).div_euclid(2);
    let half_height = (metrics.height as i64).div_euclid(2);
    let anchor = |ratio: f64| (band as f64 * ratio) as i64 - half_height;

    let y = if slot.is_main && !slot.has_sub_text {
        (band - metrics.height as i64).div_euclid(2) - metrics.bbox_top as i64
    } else {
        let upper = slot.is_main != slot.is_inverted;
        if upper {
            anchor(UPPER_ANCHOR)
        } else {
            anchor(LOWER_ANCHOR)
        }
    };

    ((x + offset.0 as i64) as i32, (y + offset.1 as i64) as i32)
}

/// One glyph pass. Shadow passes come before the main pass so they sit underneath.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawPass {
    pub x: i32,
    pub y: i32,
    pub color: [u8; 4],
    pub blur: u32,
}

pub fn draw_passes(style: &TextStyle, x: i32, y: i32) -> Vec<DrawPass> {
    let mut passes = Vec::with_capacity(2);
    if style.shadow {
        passes.push(DrawPass {
            x: x + style.shadow_offset.0,
            y: y + style.shadow_offset.1,
            color: parse_color(&style.shadow_color),
            blur: style.shadow_blur,
        });
    }
    passes.push(DrawPass {
        x,
        y,
        color: parse_color(&style.color),
        blur: 0,
    });
    passes
}
