use image::{GrayImage, Luma};
use std::ops::Range;

use crate::config::CornerRadii;

const SUPERSAMPLE: u32 = 2;
/// Superellipse exponent; 4 gives the squircle corner.
const EXPONENT: i32 = 4;
/// Half-width of the anti-aliasing band in normalized distance units.
const TRANSITION: f32 = 0.015;

#[derive(Debug, Clone, Copy)]
enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

/// One corner's cut in supersampled coordinates.
struct CornerCut {
    xs: Range<u32>,
    ys: Range<u32>,
    cx: f32,
    cy: f32,
    r: f32,
}

impl CornerCut {
    fn new(corner: Corner, radius: u32, ss_width: u32, ss_height: u32) -> Self {
        let r = radius as f32;
        let span_x = radius.min(ss_width);
        let span_y = radius.min(ss_height);
        let (xs, cx) = match corner {
            Corner::TopLeft | Corner::BottomLeft => (0..span_x, r - 0.5),
            Corner::TopRight | Corner::BottomRight => {
                (ss_width - span_x..ss_width, ss_width as f32 - r + 0.5)
            }
        };
        let (ys, cy) = match corner {
            Corner::TopLeft | Corner::TopRight => (0..span_y, r - 0.5),
            Corner::BottomLeft | Corner::BottomRight => {
                (ss_height - span_y..ss_height, ss_height as f32 - r + 0.5)
            }
        };
        Self { xs, ys, cx, cy, r }
    }

    fn alpha_at(&self, x: u32, y: u32) -> Option<f32> {
        if !self.xs.contains(&x) || !self.ys.contains(&y) {
            return None;
        }
        let dx = ((x as f32 - self.cx).abs() / self.r).powi(EXPONENT);
        let dy = ((y as f32 - self.cy).abs() / self.r).powi(EXPONENT);
        Some(edge_alpha(dx + dy))
    }

    /// Output pixels covered by this corner's box.
    fn pixel_range(range: &Range<u32>) -> Range<u32> {
        range.start / SUPERSAMPLE..range.end.div_ceil(SUPERSAMPLE)
    }
}

/// Builds an alpha mask with squircle corners. All radii `<= 0` give a fully
/// opaque mask. Each corner only touches its own radius-by-radius box, and
/// only those boxes are supersampled.
pub fn rounded_mask(width: u32, height: u32, radii: CornerRadii) -> GrayImage {
    let mut mask = GrayImage::from_pixel(width, height, Luma([255]));
    if radii.is_square() || width == 0 || height == 0 {
        return mask;
    }

    let ss_width = width * SUPERSAMPLE;
    let ss_height = height * SUPERSAMPLE;
    let cuts: Vec<CornerCut> = [
        (Corner::TopLeft, radii.top_left),
        (Corner::TopRight, radii.top_right),
        (Corner::BottomRight, radii.bottom_right),
        (Corner::BottomLeft, radii.bottom_left),
    ]
    .into_iter()
    .filter(|(_, radius)| *radius > 0)
    .map(|(corner, radius)| CornerCut::new(corner, radius as u32 * SUPERSAMPLE, ss_width, ss_height))
    .collect();

    let block = (SUPERSAMPLE * SUPERSAMPLE) as f32;
    for cut in &cuts {
        for y in CornerCut::pixel_range(&cut.ys) {
            for x in CornerCut::pixel_range(&cut.xs) {
                let mut sum = 0.0;
                for sy in 0..SUPERSAMPLE {
                    for sx in 0..SUPERSAMPLE {
                        sum += sample_alpha(&cuts, x * SUPERSAMPLE + sx, y * SUPERSAMPLE + sy);
                    }
                }
                mask.put_pixel(x, y, Luma([(sum / block).clamp(0.0, 255.0) as u8]));
            }
        }
    }
    mask
}

/// Overlapping corners keep the smaller alpha.
fn sample_alpha(cuts: &[CornerCut], x: u32, y: u32) -> f32 {
    cuts.iter()
        .filter_map(|cut| cut.alpha_at(x, y))
        .fold(255.0, f32::min)
}

fn edge_alpha(distance: f32) -> f32 {
    if distance < 1.0 - TRANSITION {
        255.0
    } else if distance > 1.0 + TRANSITION {
        0.0
    } else {
        255.0 * (1.0 + TRANSITION - distance) / (2.0 * TRANSITION)
    }
}
