use anyhow::{Context, Result};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{OutputSize, Screenshot};

/// Replaces `{lang}`, `{size}`, `{width}` and `{height}` in a path or name template.
pub fn format_template(template: &str, language: &str, size: OutputSize) -> String {
    template
        .replace("{lang}", language)
        .replace("{size}", &size.to_string())
        .replace("{width}", &size.width.to_string())
        .replace("{height}", &size.height.to_string())
}

/// Relative paths are taken from the directory holding the config file.
pub fn resolve_input_path(
    base_dir: &Path,
    template: &str,
    language: &str,
    size: OutputSize,
) -> PathBuf {
    let path = PathBuf::from(format_template(template, language, size));
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// `output_name` with placeholders filled in, or
/// `<NN>_<stem>_with_text_<W>x<H>.png` when the screenshot has none.
/// A zero or absent index drops the `<NN>_` prefix.
pub fn output_file_name(
    screenshot: &Screenshot,
    language: &str,
    size: OutputSize,
    index: Option<usize>,
) -> String {
    if let Some(name) = screenshot
        .output_name
        .as_deref()
        .filter(|name| !name.is_empty())
    {
        let name = format_template(name, language, size);
        if name.ends_with(".png") {
            return name;
        }
        return format!("{}.png", name);
    }

    let input = format_template(&screenshot.input_image, language, size);
    let stem = Path::new(&input)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = match index {
        Some(index) if index > 0 => format!("{:02}_", index),
        _ => String::new(),
    };
    format!("{}{}_with_text_{}.png", prefix, stem, size)
}

pub fn output_path(root: &Path, language: &str, size: OutputSize, file_name: &str) -> PathBuf {
    root.join(language).join(size.to_string()).join(file_name)
}

pub fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write image: {}", path.display()))?;
    debug!("saved {}", path.display());
    Ok(())
}
