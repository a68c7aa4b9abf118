//! Screenshot configuration tree.
//!
//! Every style leaf is an `Option<StyleValue<T>>`: `None` means the field was
//! never written, which is distinct from any value it could hold.

mod loader;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::GenerateError;

pub use loader::{LoadedConfig, load_config, parse_config_str};

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StyleValue<T> {
    /// Applies to every language.
    Direct(T),
    PerLanguage(BTreeMap<String, T>),
}

impl<T: Clone> StyleValue<T> {
    /// Exact language first, then `default_language`; a direct value always applies.
    pub fn for_language(&self, language: &str, default_language: Option<&str>) -> Option<T> {
        match self {
            StyleValue::Direct(value) => Some(value.clone()),
            StyleValue::PerLanguage(map) => map
                .get(language)
                .or_else(|| default_language.and_then(|fallback| map.get(fallback)))
                .cloned(),
        }
    }

    /// Key-wise union when both sides are per-language maps; otherwise `other` wins.
    pub fn merged_with(&self, other: &StyleValue<T>) -> StyleValue<T> {
        match (self, other) {
            (StyleValue::PerLanguage(base), StyleValue::PerLanguage(incoming)) => {
                let mut merged = base.clone();
                for (lang, value) in incoming {
                    merged.insert(lang.clone(), value.clone());
                }
                StyleValue::PerLanguage(merged)
            }
            _ => other.clone(),
        }
    }
}

fn merge_field<T: Clone>(
    base: &Option<StyleValue<T>>,
    incoming: &Option<StyleValue<T>>,
) -> Option<StyleValue<T>> {
    match (base, incoming) {
        (Some(base), Some(incoming)) => Some(base.merged_with(incoming)),
        (None, Some(incoming)) => Some(incoming.clone()),
        (base, None) => base.clone(),
    }
}

/// Unresolved text style: one optional `StyleValue` per property.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocalizedTextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<StyleValue<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<StyleValue<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<StyleValue<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<StyleValue<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<StyleValue<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<StyleValue<(i32, i32)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<StyleValue<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<StyleValue<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset: Option<StyleValue<(i32, i32)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<StyleValue<u32>>,
}

impl LocalizedTextStyle {
    pub fn is_empty(&self) -> bool {
        self == &LocalizedTextStyle::default()
    }

    /// Field-wise merge; per-language maps on the same field are unioned with
    /// `incoming` winning on shared keys.
    pub fn merged_with(&self, incoming: &LocalizedTextStyle) -> LocalizedTextStyle {
        LocalizedTextStyle {
            font_family: merge_field(&self.font_family, &incoming.font_family),
            font_style: merge_field(&self.font_style, &incoming.font_style),
            font_weight: merge_field(&self.font_weight, &incoming.font_weight),
            font_size: merge_field(&self.font_size, &incoming.font_size),
            color: merge_field(&self.color, &incoming.color),
            offset: merge_field(&self.offset, &incoming.offset),
            shadow: merge_field(&self.shadow, &incoming.shadow),
            shadow_color: merge_field(&self.shadow_color, &incoming.shadow_color),
            shadow_offset: merge_field(&self.shadow_offset, &incoming.shadow_offset),
            shadow_blur: merge_field(&self.shadow_blur, &incoming.shadow_blur),
        }
    }
}

/// Fully resolved text style consumed by rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextStyle {
    pub font_family: String,
    pub font_style: String,
    pub font_weight: String,
    pub font_size: u32,
    pub color: String,
    pub offset: (i32, i32),
    pub shadow: bool,
    pub shadow_color: String,
    pub shadow_offset: (i32, i32),
    pub shadow_blur: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_style: "normal".to_string(),
            font_weight: "normal".to_string(),
            font_size: 96,
            color: "#FFFFFF".to_string(),
            offset: (0, 0),
            shadow: false,
            shadow_color: "#000000".to_string(),
            shadow_offset: (2, 2),
            shadow_blur: 4,
        }
    }
}

/// Single value or a CSS-like list of up to four values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Shorthand {
    Single(i32),
    List(Vec<i32>),
}

impl Default for Shorthand {
    fn default() -> Self {
        Shorthand::Single(0)
    }
}

impl Shorthand {
    /// Clockwise expansion: `[a, b]` -> `(a, b, a, b)`, `[a, b, c]` -> `(a, b, c, b)`.
    /// Empty lists expand to zeros, lists longer than four repeat the first value.
    pub fn expand(&self) -> [i32; 4] {
        match self {
            Shorthand::Single(value) => [*value; 4],
            Shorthand::List(values) => match values.as_slice() {
                [a, b] => [*a, *b, *a, *b],
                [a, b, c] => [*a, *b, *c, *b],
                [a, b, c, d] => [*a, *b, *c, *d],
                [] => [0; 4],
                [first, ..] => [*first; 4],
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EdgeInsets {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CornerRadii {
    pub top_left: i32,
    pub top_right: i32,
    pub bottom_right: i32,
    pub bottom_left: i32,
}

impl CornerRadii {
    pub fn is_square(&self) -> bool {
        self.top_left <= 0 && self.top_right <= 0 && self.bottom_right <= 0 && self.bottom_left <= 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageStyle {
    pub corner_radius: Shorthand,
    pub padding: Shorthand,
}

impl ImageStyle {
    pub fn padding_values(&self) -> EdgeInsets {
        let [top, right, bottom, left] = self.padding.expand();
        EdgeInsets {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn corner_radius_values(&self) -> CornerRadii {
        let [top_left, top_right, bottom_right, bottom_left] = self.corner_radius.expand();
        CornerRadii {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRole {
    Main,
    Sub,
}

impl TextRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextRole::Main => "main",
            TextRole::Sub => "sub",
        }
    }
}

/// Sparse overrides for one preset theme.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Theme {
    pub text_area_height: Option<u32>,
    pub background_color: Option<String>,
    pub image_style: Option<ImageStyle>,
    pub main_text_style: Option<LocalizedTextStyle>,
    pub sub_text_style: Option<LocalizedTextStyle>,
}

impl Theme {
    pub fn text_style(&self, role: TextRole) -> Option<&LocalizedTextStyle> {
        match role {
            TextRole::Main => self.main_text_style.as_ref(),
            TextRole::Sub => self.sub_text_style.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TextContent {
    pub main_text: BTreeMap<String, String>,
    #[serde(default)]
    pub sub_text: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Screenshot {
    /// Path template; supports `{lang}`, `{size}`, `{width}`, `{height}`.
    pub input_image: String,
    pub text: TextContent,
    #[serde(default)]
    pub output_name: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub main_text_style: Option<LocalizedTextStyle>,
    #[serde(default)]
    pub sub_text_style: Option<LocalizedTextStyle>,
}

impl Screenshot {
    /// `index` is 1-based and only used for error context.
    pub fn text_for_language(
        &self,
        language: &str,
        index: usize,
    ) -> Result<(&str, Option<&str>), GenerateError> {
        let main = self
            .text
            .main_text
            .get(language)
            .ok_or_else(|| GenerateError::MissingLanguageText {
                screenshot: index,
                language: language.to_string(),
            })?;
        let sub = self
            .text
            .sub_text
            .as_ref()
            .and_then(|sub| sub.get(language))
            .map(|value| value.as_str())
            .filter(|value| !value.is_empty());
        Ok((main.as_str(), sub))
    }

    pub fn text_style(&self, role: TextRole) -> Option<&LocalizedTextStyle> {
        match role {
            TextRole::Main => self.main_text_style.as_ref(),
            TextRole::Sub => self.sub_text_style.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for OutputSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl From<OutputSize> for (u32, u32) {
    fn from(size: OutputSize) -> Self {
        (size.width, size.height)
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn default_language() -> Option<String> {
    Some(DEFAULT_LANGUAGE.to_string())
}

fn default_output_sizes() -> Vec<OutputSize> {
    vec![
        OutputSize {
            width: 1320,
            height: 2868,
        },
        OutputSize {
            width: 2064,
            height: 2752,
        },
    ]
}

fn default_theme_name() -> String {
    crate::themes::STANDARD.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScreenshotConfig {
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    #[serde(default = "default_language")]
    pub default_language: Option<String>,
    #[serde(default = "default_output_sizes")]
    pub output_sizes: Vec<OutputSize>,
    #[serde(default)]
    pub theme_styles: BTreeMap<String, Theme>,
    #[serde(default = "default_theme_name")]
    pub default_theme: String,
    pub screenshots: Vec<Screenshot>,
}

impl ScreenshotConfig {
    /// Explicit language wins, then the configured list, then every language
    /// any screenshot provides main text for.
    pub fn languages_to_generate(&self, specific: Option<&str>) -> Result<Vec<String>> {
        if let Some(language) = specific {
            return Ok(vec![language.to_string()]);
        }
        if let Some(languages) = self.languages.as_ref().filter(|list| !list.is_empty()) {
            return Ok(languages.clone());
        }
        let used = self.used_languages();
        if used.is_empty() {
            return Err(anyhow!("no languages defined in configuration"));
        }
        Ok(used.into_iter().collect())
    }

    pub fn used_languages(&self) -> BTreeSet<String> {
        self.screenshots
            .iter()
            .flat_map(|shot| shot.text.main_text.keys().cloned())
            .collect()
    }

    pub fn theme_name_for<'a>(&'a self, screenshot: &'a Screenshot) -> &'a str {
        screenshot.theme.as_deref().unwrap_or(&self.default_theme)
    }
}
