use serde::Serialize;

use crate::error::GenerateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLayout {
    /// Main text above sub text.
    Standard,
    /// Sub text above main text.
    Inverted,
}

impl TextLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextLayout::Standard => "standard",
            TextLayout::Inverted => "inverted",
        }
    }

    pub fn is_inverted(&self) -> bool {
        matches!(self, TextLayout::Inverted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetTheme {
    pub name: &'static str,
    pub layout: TextLayout,
    pub description: &'static str,
}

pub const STANDARD: &str = "standard";
pub const STANDARD_INVERTED: &str = "standard_inverted";

const PRESETS: &[PresetTheme] = &[
    PresetTheme {
        name: STANDARD,
        layout: TextLayout::Standard,
        description: "Standard layout with main text on top, sub text on bottom",
    },
    PresetTheme {
        name: STANDARD_INVERTED,
        layout: TextLayout::Inverted,
        description: "Inverted layout with sub text on top, main text on bottom",
    },
];

pub fn presets() -> &'static [PresetTheme] {
    PRESETS
}

pub fn preset_names() -> Vec<String> {
    PRESETS.iter().map(|preset| preset.name.to_string()).collect()
}

pub fn is_preset(name: &str) -> bool {
    PRESETS.iter().any(|preset| preset.name == name)
}

pub fn lookup(name: &str) -> Result<&'static PresetTheme, GenerateError> {
    PRESETS
        .iter()
        .find(|preset| preset.name == name)
        .ok_or_else(|| GenerateError::UnknownTheme {
            name: name.to_string(),
            available: preset_names(),
        })
}

pub fn format_presets() -> String {
    PRESETS
        .iter()
        .map(|preset| {
            format!(
                "{}\t{}\t{}",
                preset.name,
                preset.layout.as_str(),
                preset.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
