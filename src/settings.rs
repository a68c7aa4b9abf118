use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::generator::FailurePolicy;
use crate::text::FontOptions;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone)]
pub struct Settings {
    pub output_dir: PathBuf,
    /// 0 means one worker per CPU.
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
    pub fonts: FontOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            concurrency: 0,
            failure_policy: FailurePolicy::FailFast,
            fonts: FontOptions::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    output: Option<OutputSettings>,
    generation: Option<GenerationSettings>,
    fonts: Option<FontSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputSettings {
    dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerationSettings {
    concurrency: Option<usize>,
    failure_policy: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FontSettings {
    system: Option<bool>,
    dirs: Option<Vec<String>>,
    fallback: Option<Vec<String>>,
}

/// Layers `./settings.toml`, `./settings.local.toml`, the same pair under
/// `$HOME/.app-screenshots`, then `extra_path`. Later files win.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    load_settings_from(&ordered_paths)
}

/// Missing files are skipped.
pub fn load_settings_from(paths: &[PathBuf]) -> Result<Settings> {
    let mut settings = Settings::default();
    for path in paths {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings
                .merge_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
        }
    }
    Ok(settings)
}

impl Settings {
    fn merge_str(&mut self, content: &str) -> Result<()> {
        let parsed: SettingsFile = toml::from_str(content)?;
        self.merge(parsed)
    }

    fn merge(&mut self, incoming: SettingsFile) -> Result<()> {
        if let Some(output) = incoming.output {
            if let Some(dir) = output.dir {
                if !dir.trim().is_empty() {
                    self.output_dir = PathBuf::from(dir);
                }
            }
        }
        if let Some(generation) = incoming.generation {
            if let Some(concurrency) = generation.concurrency {
                self.concurrency = concurrency;
            }
            if let Some(policy) = generation.failure_policy {
                if !policy.trim().is_empty() {
                    self.failure_policy = policy.parse()?;
                }
            }
        }
        if let Some(fonts) = incoming.fonts {
            if let Some(system) = fonts.system {
                self.fonts.load_system_fonts = system;
            }
            if let Some(dirs) = fonts.dirs {
                for dir in dirs {
                    if !dir.trim().is_empty() {
                        self.fonts.dirs.push(PathBuf::from(dir));
                    }
                }
            }
            if let Some(fallback) = fonts.fallback {
                let fallback: Vec<String> = fallback
                    .into_iter()
                    .filter(|family| !family.trim().is_empty())
                    .collect();
                if !fallback.is_empty() {
                    self.fonts.fallback = fallback;
                }
            }
        }
        Ok(())
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".app-screenshots"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse_to_builtin_values() {
        let mut settings = Settings::default();
        settings.merge_str(DEFAULT_SETTINGS_TOML).expect("defaults");
        assert_eq!(settings.output_dir, PathBuf::from("./output"));
        assert_eq!(settings.concurrency, 0);
        assert_eq!(settings.failure_policy, FailurePolicy::FailFast);
        assert!(settings.fonts.load_system_fonts);
        assert!(!settings.fonts.fallback.is_empty());
    }

    #[test]
    fn later_files_override_earlier_ones() {
        let dir = tempfile::tempdir().expect("tempdir");
        let base = dir.path().join("settings.toml");
        let local = dir.path().join("settings.local.toml");
        fs::write(
            &base,
            "[output]\ndir = \"shots\"\n[generation]\nconcurrency = 4\n[fonts]\nfallback = [\"Noto Sans\"]\n",
        )
        .expect("write base");
        fs::write(
            &local,
            "[generation]\nfailure_policy = \"continue\"\n[fonts]\nsystem = false\ndirs = [\"fonts\"]\nfallback = []\n",
        )
        .expect("write local");

        let settings =
            load_settings_from(&[base, local, dir.path().join("absent.toml")]).expect("load");
        assert_eq!(settings.output_dir, PathBuf::from("shots"));
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.failure_policy, FailurePolicy::Continue);
        assert!(!settings.fonts.load_system_fonts);
        assert_eq!(settings.fonts.dirs, vec![PathBuf::from("fonts")]);
        assert_eq!(settings.fonts.fallback, vec!["Noto Sans".to_string()]);
    }

    #[test]
    fn invalid_policy_is_reported_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[generation]\nfailure_policy = \"maybe\"\n").expect("write");
        let err = load_settings_from(&[path]).expect_err("invalid policy");
        assert!(err.to_string().starts_with("failed to parse settings"));
    }
}
