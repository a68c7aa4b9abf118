use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::config::{LoadedConfig, LocalizedTextStyle, ScreenshotConfig};
use crate::output::resolve_input_path;
use crate::themes;

/// Errors block generation; warnings are only reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.errors.is_empty() {
            out.push_str("Validation errors:\n");
            for error in &self.errors {
                let _ = writeln!(out, "  - {}", error);
            }
        }
        if !self.warnings.is_empty() {
            out.push_str("Warnings:\n");
            for warning in &self.warnings {
                let _ = writeln!(out, "  - {}", warning);
            }
        }
        if !self.is_valid() {
            out.push_str("Configuration validation failed\n");
        } else if !self.warnings.is_empty() {
            out.push_str("Configuration is valid (with warnings)\n");
        } else {
            out.push_str("Configuration is valid\n");
        }
        out
    }
}

/// Checks a loaded configuration. Per-language checks cover the languages a
/// run would generate: `language` when given, otherwise the configured list
/// or every language the screenshots use.
pub fn validate(loaded: &LoadedConfig, language: Option<&str>) -> ValidationReport {
    let mut report = ValidationReport::default();
    let config = &loaded.config;
    validate_root(config, &mut report);
    validate_screenshots(loaded, language, &mut report);
    validate_theme_styles(config, &mut report);
    validate_languages(config, &mut report);
    validate_output_names(config, &mut report);
    report
}

fn validate_root(config: &ScreenshotConfig, report: &mut ValidationReport) {
    if config.screenshots.is_empty() {
        report.errors.push("no screenshots defined".to_string());
    }
    if config.output_sizes.is_empty() {
        report.errors.push("output_sizes must not be empty".to_string());
    }
    for size in &config.output_sizes {
        if size.width == 0 || size.height == 0 {
            report
                .errors
                .push(format!("output size {} has a zero dimension", size));
        }
    }
    if let Err(err) = themes::lookup(&config.default_theme) {
        report.errors.push(format!("default_theme: {}", err));
    }
}

fn validate_screenshots(loaded: &LoadedConfig, language: Option<&str>, report: &mut ValidationReport) {
    let config = &loaded.config;
    // None only when no screenshot defines any language, which is reported per screenshot below.
    let requested = config.languages_to_generate(language).ok();
    for (offset, screenshot) in config.screenshots.iter().enumerate() {
        let index = offset + 1;

        if screenshot.text.main_text.is_empty() {
            report
                .errors
                .push(format!("screenshot {}: no main_text defined", index));
        }

        if let Some(theme) = screenshot.theme.as_deref() {
            if let Err(err) = themes::lookup(theme) {
                report.errors.push(format!("screenshot {}: {}", index, err));
            }
        }

        let languages: Vec<String> = match requested.as_ref() {
            Some(requested) => {
                for lang in requested {
                    if let Err(err) = screenshot.text_for_language(lang, index) {
                        report.errors.push(err.to_string());
                    }
                }
                requested.clone()
            }
            None => screenshot.text.main_text.keys().cloned().collect(),
        };
        for lang in &languages {
            for size in &config.output_sizes {
                let path = resolve_input_path(&loaded.base_dir, &screenshot.input_image, lang, *size);
                if !path.exists() {
                    report.warnings.push(format!(
                        "screenshot {}: input image not found for lang='{}', size='{}': {}",
                        index,
                        lang,
                        size,
                        path.display()
                    ));
                }
            }
        }

        check_style_fragment(
            screenshot.main_text_style.as_ref(),
            &format!("screenshot {} main_text_style", index),
            report,
        );
        check_style_fragment(
            screenshot.sub_text_style.as_ref(),
            &format!("screenshot {} sub_text_style", index),
            report,
        );
    }
}

fn check_style_fragment(style: Option<&LocalizedTextStyle>, location: &str, report: &mut ValidationReport) {
    if style.is_some_and(LocalizedTextStyle::is_empty) {
        report
            .warnings
            .push(format!("{}: style has no properties set", location));
    }
}

fn validate_theme_styles(config: &ScreenshotConfig, report: &mut ValidationReport) {
    for (name, theme) in &config.theme_styles {
        if !themes::is_preset(name) {
            report.warnings.push(format!(
                "theme style '{}' does not match any preset theme (available: {})",
                name,
                themes::preset_names().join(", ")
            ));
        }
        check_style_fragment(
            theme.main_text_style.as_ref(),
            &format!("theme_styles.{}.main_text_style", name),
            report,
        );
        check_style_fragment(
            theme.sub_text_style.as_ref(),
            &format!("theme_styles.{}.sub_text_style", name),
            report,
        );
    }
}

fn validate_languages(config: &ScreenshotConfig, report: &mut ValidationReport) {
    let Some(configured) = config.languages.as_ref() else {
        return;
    };
    let configured: BTreeSet<String> = configured.iter().cloned().collect();
    let used = config.used_languages();
    let unused: Vec<&str> = configured.difference(&used).map(String::as_str).collect();
    if !unused.is_empty() {
        report.warnings.push(format!(
            "configured languages not used in any screenshot: {}",
            unused.join(", ")
        ));
    }
    let unconfigured: Vec<&str> = used.difference(&configured).map(String::as_str).collect();
    if !unconfigured.is_empty() {
        report.warnings.push(format!(
            "languages used in screenshots but not in 'languages': {}",
            unconfigured.join(", ")
        ));
    }
}

fn validate_output_names(config: &ScreenshotConfig, report: &mut ValidationReport) {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for (offset, screenshot) in config.screenshots.iter().enumerate() {
        let index = offset + 1;
        let Some(name) = screenshot.output_name.as_deref() else {
            continue;
        };
        if let Some(first) = seen.get(name) {
            report.warnings.push(format!(
                "screenshot {}: duplicate output_name '{}' (also used in screenshot {})",
                index, name, first
            ));
        } else {
            seen.insert(name, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config_str;
    use std::path::PathBuf;

    fn loaded(yaml: &str, base_dir: PathBuf) -> LoadedConfig {
        LoadedConfig {
            config: parse_config_str(yaml).expect("parse"),
            base_dir,
        }
    }

    #[test]
    fn valid_config_with_existing_images_has_no_findings() {
        let dir = tempfile::tempdir().expect("tempdir");
        crate::test_util::write_png(&dir.path().join("home.png"), 10, 20);
        let config = loaded(
            "output_sizes: [[100, 200]]\nscreenshots:\n  - input_image: home.png\n    text:\n      main_text: { en: Hi }\n",
            dir.path().to_path_buf(),
        );
        let report = validate(&config, None);
        assert!(report.is_valid());
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert!(report.render().ends_with("Configuration is valid\n"));
    }

    #[test]
    fn invalid_themes_and_sizes_are_errors() {
        let config = loaded(
            r#"
default_theme: neon
output_sizes: [[0, 100]]
screenshots:
  - input_image: a.png
    theme: fancy
    text:
      main_text: {}
"#,
            PathBuf::from("."),
        );
        let report = validate(&config, None);
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 4, "{:?}", report.errors);
        assert!(report.errors.iter().any(|e| e.contains("'neon'")));
        assert!(report.errors.iter().any(|e| e.starts_with("screenshot 1: unknown preset theme 'fancy'")));
        assert!(report.errors.iter().any(|e| e.contains("no main_text")));
        assert!(report.errors.iter().any(|e| e.contains("0x100")));
    }

    #[test]
    fn requested_language_must_exist() {
        let config = loaded(
            "screenshots:\n  - input_image: a.png\n    text:\n      main_text: { en: Hi }\n",
            PathBuf::from("."),
        );
        let report = validate(&config, Some("fr"));
        assert_eq!(
            report.errors,
            vec!["no main_text defined for language 'fr' in screenshot 1".to_string()]
        );
    }

    #[test]
    fn warnings_cover_languages_styles_and_duplicates() {
        let config = loaded(
            r#"
languages: [en, de]
output_sizes: [[10, 10]]
theme_styles:
  custom:
    main_text_style: {}
screenshots:
  - input_image: missing.png
    output_name: same
    text:
      main_text: { en: A, ja: B }
  - input_image: missing.png
    output_name: same
    sub_text_style: {}
    text:
      main_text: { en: C }
"#,
            PathBuf::from("/nonexistent"),
        );
        let report = validate(&config, None);
        assert_eq!(
            report.errors,
            vec![
                "no main_text defined for language 'de' in screenshot 1".to_string(),
                "no main_text defined for language 'de' in screenshot 2".to_string(),
            ]
        );
        let joined = report.warnings.join("\n");
        assert!(joined.contains("input image not found for lang='en'"));
        assert!(joined.contains("theme style 'custom' does not match"));
        assert!(joined.contains("theme_styles.custom.main_text_style: style has no properties set"));
        assert!(joined.contains("screenshot 2 sub_text_style"));
        assert!(joined.contains("not used in any screenshot: de"));
        assert!(joined.contains("not in 'languages': ja"));
        assert!(joined.contains("duplicate output_name 'same' (also used in screenshot 1)"));
    }

    #[test]
    fn configured_languages_are_required_in_every_screenshot() {
        let config = loaded(
            r#"
languages: [en, ja]
screenshots:
  - input_image: a.png
    text:
      main_text: { en: A, ja: B }
  - input_image: b.png
    text:
      main_text: { en: C }
"#,
            PathBuf::from("."),
        );
        let report = validate(&config, None);
        assert!(!report.is_valid());
        assert_eq!(
            report.errors,
            vec!["no main_text defined for language 'ja' in screenshot 2".to_string()]
        );
        assert!(report.render().ends_with("Configuration validation failed
"));
    }

    #[test]
    fn used_languages_are_required_without_a_configured_list() {
        let config = loaded(
            "screenshots:
  - input_image: a.png
    text:
      main_text: { en: A, de: B }
  - input_image: b.png
    text:
      main_text: { en: C }
",
            PathBuf::from("."),
        );
        let report = validate(&config, None);
        assert_eq!(
            report.errors,
            vec!["no main_text defined for language 'de' in screenshot 2".to_string()]
        );
    }

    #[test]
    fn empty_screenshot_list_is_an_error() {
        let config = loaded("screenshots: []\n", PathBuf::from("."));
        let report = validate(&config, None);
        assert_eq!(report.errors, vec!["no screenshots defined".to_string()]);
    }
}
