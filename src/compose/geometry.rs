use serde::Serialize;

use crate::config::EdgeInsets;

/// Scaled size of the source and the top-left corner it is pasted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub width: u32,
    pub height: u32,
    pub x: i64,
    pub y: i64,
}

/// Fits the source into the canvas area below the text band and inside the
/// padding, preserving aspect ratio. Upscaling is allowed. A non-positive
/// available area yields a zero-sized placement.
pub fn place_image(
    canvas_width: u32,
    canvas_height: u32,
    text_area_height: u32,
    padding: EdgeInsets,
    source_width: u32,
    source_height: u32,
) -> Placement {
    let available_w = canvas_width as i64 - padding.left as i64 - padding.right as i64;
    let available_h = canvas_height as i64
        - text_area_height as i64
        - padding.top as i64
        - padding.bottom as i64;

    let scale = if source_width == 0 || source_height == 0 || available_w <= 0 || available_h <= 0
    {
        0.0
    } else {
        let scale_w = available_w as f64 / source_width as f64;
        let scale_h = available_h as f64 / source_height as f64;
        scale_w.min(scale_h)
    };

    let width = ((source_width as f64 * scale).floor() as i64).clamp(0, available_w.max(0));
    let height = ((source_height as f64 * scale).floor() as i64).clamp(0, available_h.max(0));
    let x = padding.left as i64 + (available_w - width).div_euclid(2);
    let y = text_area_height as i64 + padding.top as i64 + (available_h - height).div_euclid(2);

    Placement {
        width: width as u32,
        height: height as u32,
        x,
        y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insets(top: i32, right: i32, bottom: i32, left: i32) -> EdgeInsets {
        EdgeInsets {
            top,
            right,
            bottom,
            left,
        }
    }

    #[test]
    fn fits_below_text_band_and_centers() {
        let placement = place_image(1320, 2868, 400, insets(50, 50, 50, 50), 750, 1334);
        // available 1220x2368; width-bound
        assert!((1219..=1220).contains(&placement.width));
        assert_eq!(placement.height, 2169);
        assert_eq!(placement.x, 50 + (1220 - placement.width as i64) / 2);
        assert_eq!(placement.y, 400 + 50 + (2368 - 2169) / 2);
    }

    #[test]
    fn preserves_aspect_ratio_and_stays_inside_box() {
        let cases = [
            (1320, 2868, 400, insets(0, 0, 0, 0), 1179, 2556),
            (2064, 2752, 300, insets(80, 120, 40, 60), 2048, 2732),
            (1000, 1000, 0, insets(10, 10, 10, 10), 300, 100),
            (640, 1136, 200, insets(0, 40, 0, 40), 64, 64),
        ];
        for (cw, ch, tah, pad, sw, sh) in cases {
            let p = place_image(cw, ch, tah, pad, sw, sh);
            let source_ratio = sw as f64 / sh as f64;
            let scaled_ratio = p.width as f64 / p.height as f64;
            let tolerance = source_ratio * (1.0 / p.width.min(p.height) as f64) * 2.0;
            assert!((source_ratio - scaled_ratio).abs() <= tolerance);
            let left = pad.left as i64;
            let top = tah as i64 + pad.top as i64;
            let right = cw as i64 - pad.right as i64;
            let bottom = ch as i64 - pad.bottom as i64;
            assert!(p.x >= left && p.x + p.width as i64 <= right);
            assert!(p.y >= top && p.y + p.height as i64 <= bottom);
        }
    }

    #[test]
    fn upscales_small_sources() {
        let p = place_image(1000, 1400, 400, insets(0, 0, 0, 0), 100, 100);
        assert_eq!((p.width, p.height), (1000, 1000));
        assert_eq!((p.x, p.y), (0, 400));
    }

    #[test]
    fn degenerate_area_yields_zero_size() {
        let p = place_image(100, 100, 400, insets(0, 0, 0, 0), 50, 50);
        assert_eq!((p.width, p.height), (0, 0));
        let p = place_image(100, 500, 100, insets(0, 60, 0, 60), 50, 50);
        assert_eq!((p.width, p.height), (0, 0));
        let p = place_image(100, 500, 100, insets(0, 0, 0, 0), 0, 50);
        assert_eq!((p.width, p.height), (0, 0));
    }
}
