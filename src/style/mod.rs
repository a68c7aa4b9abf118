//! Style cascade: built-in defaults, then the preset theme's overrides, then
//! the screenshot's own overrides. Resolution never fails.

use serde::Serialize;

use crate::config::{
    ImageStyle, LocalizedTextStyle, Screenshot, ScreenshotConfig, StyleValue, TextRole, TextStyle,
    Theme,
};
use crate::error::GenerateError;
use crate::themes::{self, TextLayout};

pub const DEFAULT_TEXT_AREA_HEIGHT: u32 = 400;
pub const DEFAULT_BACKGROUND_COLOR: &str = "#F5F5F5";

/// One style fragment resolved for a single language. `None` means the
/// fragment did not set the field for that language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStyleOverride {
    pub font_family: Option<String>,
    pub font_style: Option<String>,
    pub font_weight: Option<String>,
    pub font_size: Option<u32>,
    pub color: Option<String>,
    pub offset: Option<(i32, i32)>,
    pub shadow: Option<bool>,
    pub shadow_color: Option<String>,
    pub shadow_offset: Option<(i32, i32)>,
    pub shadow_blur: Option<u32>,
}

fn pick<T: Clone>(
    value: &Option<StyleValue<T>>,
    language: &str,
    default_language: Option<&str>,
) -> Option<T> {
    value
        .as_ref()
        .and_then(|value| value.for_language(language, default_language))
}

impl TextStyleOverride {
    pub fn for_language(
        style: &LocalizedTextStyle,
        language: &str,
        default_language: Option<&str>,
    ) -> Self {
        Self {
            font_family: pick(&style.font_family, language, default_language),
            font_style: pick(&style.font_style, language, default_language),
            font_weight: pick(&style.font_weight, language, default_language),
            font_size: pick(&style.font_size, language, default_language),
            color: pick(&style.color, language, default_language),
            offset: pick(&style.offset, language, default_language),
            shadow: pick(&style.shadow, language, default_language),
            shadow_color: pick(&style.shadow_color, language, default_language),
            shadow_offset: pick(&style.shadow_offset, language, default_language),
            shadow_blur: pick(&style.shadow_blur, language, default_language),
        }
    }
}

/// Copies only the fields `over` sets; `false`, `0` and `""` are real values.
pub fn merge_text_styles(base: &TextStyle, over: &TextStyleOverride) -> TextStyle {
    TextStyle {
        font_family: over
            .font_family
            .clone()
            .unwrap_or_else(|| base.font_family.clone()),
        font_style: over
            .font_style
            .clone()
            .unwrap_or_else(|| base.font_style.clone()),
        font_weight: over
            .font_weight
            .clone()
            .unwrap_or_else(|| base.font_weight.clone()),
        font_size: over.font_size.unwrap_or(base.font_size),
        color: over.color.clone().unwrap_or_else(|| base.color.clone()),
        offset: over.offset.unwrap_or(base.offset),
        shadow: over.shadow.unwrap_or(base.shadow),
        shadow_color: over
            .shadow_color
            .clone()
            .unwrap_or_else(|| base.shadow_color.clone()),
        shadow_offset: over.shadow_offset.unwrap_or(base.shadow_offset),
        shadow_blur: over.shadow_blur.unwrap_or(base.shadow_blur),
    }
}

/// Resolves each field independently: the screenshot fragment wins when it
/// yields a value for `language` (exact entry or `default_language` entry),
/// then the theme fragment, then the built-in default.
pub fn resolve(
    theme_style: Option<&LocalizedTextStyle>,
    screenshot_style: Option<&LocalizedTextStyle>,
    language: &str,
    default_language: Option<&str>,
) -> TextStyle {
    let mut style = TextStyle::default();
    for fragment in [theme_style, screenshot_style].into_iter().flatten() {
        let over = TextStyleOverride::for_language(fragment, language, default_language);
        style = merge_text_styles(&style, &over);
    }
    style
}

/// Every style input needed to render one (screenshot, language) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStyle {
    pub theme: String,
    pub layout: TextLayout,
    pub text_area_height: u32,
    pub background_color: String,
    pub image_style: ImageStyle,
    pub main: TextStyle,
    pub sub: TextStyle,
}

pub struct ThemeSelection<'a> {
    pub preset: &'static themes::PresetTheme,
    pub overrides: Option<&'a Theme>,
}

pub struct StyleResolver<'a> {
    config: &'a ScreenshotConfig,
}

impl<'a> StyleResolver<'a> {
    pub fn new(config: &'a ScreenshotConfig) -> Self {
        Self { config }
    }

    pub fn theme_for(&self, screenshot: &Screenshot) -> Result<ThemeSelection<'a>, GenerateError> {
        let name = screenshot
            .theme
            .as_deref()
            .unwrap_or(&self.config.default_theme);
        let preset = themes::lookup(name)?;
        Ok(ThemeSelection {
            preset,
            overrides: self.config.theme_styles.get(preset.name),
        })
    }

    pub fn text_style(
        &self,
        selection: &ThemeSelection<'_>,
        screenshot: &Screenshot,
        role: TextRole,
        language: &str,
    ) -> TextStyle {
        resolve(
            selection.overrides.and_then(|theme| theme.text_style(role)),
            screenshot.text_style(role),
            language,
            self.config.default_language.as_deref(),
        )
    }

    pub fn resolve(
        &self,
        screenshot: &Screenshot,
        language: &str,
    ) -> Result<ResolvedStyle, GenerateError> {
        let selection = self.theme_for(screenshot)?;
        let overrides = selection.overrides;
        Ok(ResolvedStyle {
            theme: selection.preset.name.to_string(),
            layout: selection.preset.layout,
            text_area_height: overrides
                .and_then(|theme| theme.text_area_height)
                .unwrap_or(DEFAULT_TEXT_AREA_HEIGHT),
            background_color: overrides
                .and_then(|theme| theme.background_color.clone())
                .unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string()),
            image_style: overrides
                .and_then(|theme| theme.image_style.clone())
                .unwrap_or_default(),
            main: self.text_style(&selection, screenshot, TextRole::Main, language),
            sub: self.text_style(&selection, screenshot, TextRole::Sub, language),
        })
    }
}
