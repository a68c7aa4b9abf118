mod color;
mod geometry;
mod mask;

use image::{GrayImage, Rgba, RgbaImage, RgbImage};

use crate::config::OutputSize;
use crate::style::ResolvedStyle;

pub use color::parse_color;
pub use geometry::{Placement, place_image};
pub use mask::rounded_mask;

pub fn create_canvas(width: u32, height: u32, background: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(background))
}

pub fn resize(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    image::imageops::resize(image, width, height, image::imageops::FilterType::Lanczos3)
}

/// Pastes `source` at `(x, y)`. Per-pixel alpha is the source alpha scaled by
/// `mask` when given. Pixels outside the pasted region are left as they were.
pub fn compose(
    mut canvas: RgbaImage,
    source: &RgbaImage,
    mask: Option<&GrayImage>,
    x: i64,
    y: i64,
) -> RgbaImage {
    let (canvas_w, canvas_h) = canvas.dimensions();
    for (sx, sy, pixel) in source.enumerate_pixels() {
        let cx = x + sx as i64;
        let cy = y + sy as i64;
        if cx < 0 || cy < 0 || cx >= canvas_w as i64 || cy >= canvas_h as i64 {
            continue;
        }
        let mask_alpha = mask
            .and_then(|mask| mask.get_pixel_checked(sx, sy))
            .map(|value| value[0] as u32)
            .unwrap_or(255);
        let alpha = pixel[3] as u32 * mask_alpha / 255;
        if alpha == 0 {
            continue;
        }
        let target = canvas.get_pixel_mut(cx as u32, cy as u32);
        for channel in 0..4 {
            let src = pixel[channel] as u32;
            let dst = target[channel] as u32;
            target[channel] = ((src * alpha + dst * (255 - alpha) + 127) / 255) as u8;
        }
    }
    canvas
}

/// Drops the alpha channel by blending onto white.
pub fn flatten(canvas: &RgbaImage) -> RgbImage {
    let (width, height) = canvas.dimensions();
    let mut output = RgbImage::new(width, height);
    for (x, y, pixel) in canvas.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let blend = |value: u8| (value as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        output.put_pixel(x, y, image::Rgb([blend(r), blend(g), blend(b)]));
    }
    output
}

/// Background, scaled screenshot and rounded corners for one output size.
/// Text is drawn on top by the caller.
pub fn build_canvas(
    style: &ResolvedStyle,
    size: OutputSize,
    source: &RgbaImage,
) -> (RgbaImage, Placement) {
    let (source_w, source_h) = source.dimensions();
    let placement = place_image(
        size.width,
        size.height,
        style.text_area_height,
        style.image_style.padding_values(),
        source_w,
        source_h,
    );
    let canvas = create_canvas(
        size.width,
        size.height,
        parse_color(&style.background_color),
    );
    if placement.width == 0 || placement.height == 0 {
        return (canvas, placement);
    }

    let scaled = resize(source, placement.width, placement.height);
    let radii = style.image_style.corner_radius_values();
    let mask = if radii.is_square() {
        None
    } else {
        Some(rounded_mask(placement.width, placement.height, radii))
    };
    let canvas = compose(canvas, &scaled, mask.as_ref(), placement.x, placement.y);
    (canvas, placement)
}
