use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

use super::ScreenshotConfig;

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ScreenshotConfig,
    /// Relative input paths are resolved against this directory.
    pub base_dir: PathBuf,
}

pub fn load_config(path: &Path) -> Result<LoadedConfig> {
    if !path.exists() {
        return Err(anyhow!("configuration file not found: {}", path.display()));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration: {}", path.display()))?;
    let config = parse_config_str(&content)
        .with_context(|| format!("failed to parse configuration: {}", path.display()))?;
    let base_dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(LoadedConfig { config, base_dir })
}

/// Anchors and aliases are expanded by the YAML parser; `<<` merge keys are
/// applied before the tree is mapped onto the config types.
pub fn parse_config_str(content: &str) -> Result<ScreenshotConfig> {
    let mut value: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(content).with_context(|| "invalid YAML")?;
    value
        .apply_merge()
        .with_context(|| "failed to apply YAML merge keys")?;
    let config: ScreenshotConfig =
        serde_yaml_ng::from_value(value).with_context(|| "invalid configuration structure")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Shorthand, StyleValue};

    #[test]
    fn defaults_fill_missing_root_fields() {
        let config = parse_config_str(
            r#"
screenshots:
  - input_image: home.png
    text:
      main_text:
        en: Welcome
"#,
        )
        .expect("parse");
        assert_eq!(config.default_language.as_deref(), Some("en"));
        assert_eq!(config.default_theme, "standard");
        assert_eq!(config.output_sizes.len(), 2);
        assert_eq!(config.output_sizes[0].to_string(), "1320x2868");
        assert!(config.theme_styles.is_empty());
    }

    #[test]
    fn style_values_accept_direct_and_per_language_forms() {
        let config = parse_config_str(
            r##"
output_sizes: [[100, 200]]
theme_styles:
  standard:
    text_area_height: 300
    image_style:
      corner_radius: [40, 20]
      padding: 24
    main_text_style:
      font_family:
        en: Helvetica
        ja: Hiragino Sans
      font_size: 120
      offset:
        en: [0, 50]
      shadow: true
screenshots:
  - input_image: "shots/{lang}/{size}/home.png"
    text:
      main_text: { en: Hello, ja: こんにちは }
"##,
        )
        .expect("parse");
        let theme = &config.theme_styles["standard"];
        let main = theme.main_text_style.as_ref().expect("main style");
        assert_eq!(main.font_size, Some(StyleValue::Direct(120)));
        assert_eq!(
            main.offset
                .as_ref()
                .and_then(|value| value.for_language("en", None)),
            Some((0, 50))
        );
        assert_eq!(main.shadow, Some(StyleValue::Direct(true)));
        assert!(main.color.is_none());
        let image = theme.image_style.as_ref().expect("image style");
        assert_eq!(image.corner_radius, Shorthand::List(vec![40, 20]));
        assert_eq!(image.padding, Shorthand::Single(24));
    }

    #[test]
    fn anchors_and_merge_keys_are_resolved() {
        let config = parse_config_str(
            r##"
_fonts: &fonts
  en: Helvetica
  ja: Hiragino Sans
_shadow: &shadow
  shadow: true
  shadow_color: "#00000080"
theme_styles:
  standard:
    main_text_style:
      font_family: *fonts
      <<: *shadow
screenshots:
  - input_image: home.png
    text:
      main_text: { en: Hello }
    sub_text_style:
      font_family: *fonts
"##,
        )
        .expect("parse");
        let main = config.theme_styles["standard"]
            .main_text_style
            .as_ref()
            .expect("main style");
        assert_eq!(main.shadow, Some(StyleValue::Direct(true)));
        assert_eq!(
            main.shadow_color,
            Some(StyleValue::Direct("#00000080".to_string()))
        );
        let sub = config.screenshots[0]
            .sub_text_style
            .as_ref()
            .expect("sub style");
        assert_eq!(
            sub.font_family
                .as_ref()
                .and_then(|value| value.for_language("ja", None))
                .as_deref(),
            Some("Hiragino Sans")
        );
    }

    #[test]
    fn missing_screenshots_is_an_error() {
        assert!(parse_config_str("languages: [en]\n").is_err());
    }

    #[test]
    fn load_config_resolves_base_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yml");
        fs::write(
            &path,
            "screenshots:\n  - input_image: a.png\n    text:\n      main_text: { en: A }\n",
        )
        .expect("write config");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded.base_dir, dir.path());
        assert!(load_config(&dir.path().join("missing.yml")).is_err());
    }
}
