use anyhow::{Context, Result, anyhow};
use image::RgbaImage;
use resvg::render;
use tiny_skia::Pixmap;
use tracing::debug;
use usvg::{Options, Tree};

use super::font::{FontProvider, FontSlant, measure_text, weight_value};
use super::layout::{DrawPass, TextSlot, draw_passes, position};
use crate::style::ResolvedStyle;

/// One piece of text ready to be turned into SVG: resolved family name plus passes.
#[derive(Debug, Clone)]
pub struct PlacedText {
    pub text: String,
    pub family: Option<String>,
    pub weight: u16,
    pub slant: &'static str,
    pub font_size: u32,
    pub ascent: f32,
    pub passes: Vec<DrawPass>,
}

/// Measures and positions the main and sub text for a canvas of `canvas_width`.
pub fn layout_texts(
    provider: &FontProvider,
    style: &ResolvedStyle,
    canvas_width: u32,
    main_text: &str,
    sub_text: Option<&str>,
) -> Vec<PlacedText> {
    let has_sub_text = sub_text.is_some_and(|text| !text.is_empty());
    let mut placed = Vec::with_capacity(2);
    let entries = [(main_text, &style.main, true)]
        .into_iter()
        .chain(sub_text.map(|text| (text, &style.sub, false)));
    for (text, text_style, is_main) in entries {
        if text.is_empty() {
            continue;
        }
        let face = provider.resolve(text_style);
        let metrics = measure_text(text, text_style.font_size, face.as_deref());
        let slot = TextSlot {
            is_main,
            has_sub_text,
            is_inverted: style.layout.is_inverted(),
        };
        let (x, y) = position(
            &metrics,
            canvas_width,
            style.text_area_height,
            slot,
            text_style.offset,
        );
        debug!(
            "{} text '{}' {}x{} at ({}, {})",
            if is_main { "main" } else { "sub" },
            text,
            metrics.width,
            metrics.height,
            x,
            y
        );
        placed.push(PlacedText {
            text: text.to_string(),
            family: face.as_ref().map(|face| face.family().to_string()),
            weight: face
                .as_ref()
                .map(|face| face.weight())
                .unwrap_or_else(|| weight_value(&text_style.font_weight)),
            slant: face
                .as_ref()
                .map(|face| face.slant().as_str())
                .unwrap_or_else(|| FontSlant::parse(&text_style.font_style).as_str()),
            font_size: text_style.font_size,
            ascent: metrics.ascent,
            passes: draw_passes(text_style, x, y),
        });
    }
    placed
}

pub fn build_text_svg(width: u32, height: u32, texts: &[PlacedText]) -> String {
    let mut defs = String::new();
    let mut body = String::new();
    let mut filter_count = 0usize;

    for text in texts {
        for pass in &text.passes {
            let filter = if pass.blur > 0 {
                let id = format!("blur-{}", filter_count);
                filter_count += 1;
                defs.push_str(&format!(
                    r#"<filter id="{id}" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur stdDeviation="{dev}"/></filter>"#,
                    id = id,
                    dev = pass.blur as f32 / 2.0
                ));
                format!(r#" filter="url(#{})""#, id)
            } else {
                String::new()
            };
            let family = text
                .family
                .as_deref()
                .map(|family| format!(r#" font-family="{}""#, escape_xml(family)))
                .unwrap_or_default();
            let [r, g, b, a] = pass.color;
            body.push_str(&format!(
                r#"<text x="{x}" y="{y}" font-size="{size}" font-weight="{weight}" font-style="{slant}"{family} fill="rgb({r},{g},{b})" fill-opacity="{opacity}" xml:space="preserve"{filter}>{content}</text>"#,
                x = pass.x,
                y = pass.y as f32 + text.ascent,
                size = text.font_size,
                weight = text.weight,
                slant = text.slant,
                family = family,
                r = r,
                g = g,
                b = b,
                opacity = a as f32 / 255.0,
                filter = filter,
                content = escape_xml(&text.text)
            ));
        }
    }

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    ));
    if !defs.is_empty() {
        svg.push_str("<defs>");
        svg.push_str(&defs);
        svg.push_str("</defs>");
    }
    svg.push_str(&body);
    svg.push_str("</svg>");
    svg
}

/// Rasterizes an SVG overlay onto a transparent premultiplied pixmap.
pub fn render_overlay(svg: &str, provider: &FontProvider) -> Result<Pixmap> {
    let options = Options {
        fontdb: provider.database(),
        ..Options::default()
    };
    let tree = Tree::from_str(svg, &options).with_context(|| "failed to parse text overlay")?;
    let size = tree.size().to_int_size();
    let mut pixmap =
        Pixmap::new(size.width(), size.height()).ok_or_else(|| anyhow!("empty overlay size"))?;
    let mut pixmap_mut = pixmap.as_mut();
    render(&tree, tiny_skia::Transform::identity(), &mut pixmap_mut);
    Ok(pixmap)
}

/// Source-over of a premultiplied overlay onto a straight-alpha canvas.
pub fn composite_overlay(mut canvas: RgbaImage, overlay: &Pixmap) -> RgbaImage {
    let width = canvas.width().min(overlay.width());
    let height = canvas.height().min(overlay.height());
    let data = overlay.data();
    let stride = overlay.width() as usize * 4;
    for y in 0..height {
        for x in 0..width {
            let offset = y as usize * stride + x as usize * 4;
            let src = &data[offset..offset + 4];
            let sa = src[3] as f32 / 255.0;
            if sa == 0.0 {
                continue;
            }
            let target = canvas.get_pixel_mut(x, y);
            let da = target[3] as f32 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            for channel in 0..3 {
                let sc = src[channel] as f32 / 255.0;
                let dc = target[channel] as f32 / 255.0;
                let value = (sc + dc * da * (1.0 - sa)) / out_a;
                target[channel] = (value * 255.0).round().clamp(0.0, 255.0) as u8;
            }
            target[3] = (out_a * 255.0).round() as u8;
        }
    }
    canvas
}

/// Draws main and sub text into the canvas's text band.
pub fn draw_texts(
    canvas: RgbaImage,
    provider: &FontProvider,
    style: &ResolvedStyle,
    main_text: &str,
    sub_text: Option<&str>,
) -> Result<RgbaImage> {
    let (width, height) = canvas.dimensions();
    let texts = layout_texts(provider, style, width, main_text, sub_text);
    if texts.is_empty() {
        return Ok(canvas);
    }
    let svg = build_text_svg(width, height, &texts);
    let overlay = render_overlay(&svg, provider)?;
    Ok(composite_overlay(canvas, &overlay))
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
