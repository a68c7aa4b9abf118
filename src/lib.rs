use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub mod compose;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod output;
pub mod settings;
pub mod style;
pub mod text;
pub mod themes;
pub mod validate;

#[cfg(test)]
mod test_util;

pub use config::{LoadedConfig, ScreenshotConfig, load_config};
pub use error::GenerateError;
pub use generator::{FailurePolicy, GenerationOptions, GenerationReport, Generator};
pub use settings::Settings;
pub use validate::{ValidationReport, validate};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub config_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub language: Option<String>,
    pub validate_only: bool,
    pub show_themes: bool,
    pub keep_going: bool,
    pub jobs: Option<usize>,
    pub report_path: Option<PathBuf>,
    pub settings_path: Option<String>,
}

pub async fn run(config: Config) -> Result<String> {
    if config.show_themes {
        return Ok(themes::format_presets());
    }
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;
    run_with_settings(config, settings).await
}

/// Validates, then renders every (language, screenshot, size) image.
pub async fn run_with_settings(config: Config, settings: Settings) -> Result<String> {
    let config_path = config
        .config_path
        .as_deref()
        .ok_or_else(|| anyhow!("-c/--config is required"))?;
    let loaded = load_config(config_path)?;

    let report = validate(&loaded, config.language.as_deref());
    if !report.is_valid() {
        return Err(anyhow!("{}", report.render().trim_end()));
    }
    if config.validate_only {
        return Ok(report.render().trim_end().to_string());
    }
    for warning in &report.warnings {
        warn!("{}", warning);
    }

    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| settings.output_dir.clone());
    let failure_policy = if config.keep_going {
        FailurePolicy::Continue
    } else {
        settings.failure_policy
    };
    let fonts = Arc::new(text::FontProvider::new(&settings.fonts));
    let generator = Generator::new(
        loaded,
        fonts,
        GenerationOptions {
            output_dir: output_dir.clone(),
            language: config.language.clone(),
            concurrency: config.jobs.unwrap_or(settings.concurrency),
            failure_policy,
        },
    );
    let result = generator.run().await?;

    if let Some(path) = config.report_path.as_deref() {
        write_report(path, &result)?;
    }
    format_result(&result, &output_dir)
}

fn write_report(path: &Path, report: &GenerationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).with_context(|| "failed to encode report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report: {}", path.display()))?;
    info!("report written to {}", path.display());
    Ok(())
}

fn format_result(report: &GenerationReport, output_dir: &Path) -> Result<String> {
    let total = report.generated.len() + report.failures.len() + report.skipped;
    if !report.is_success() {
        let mut lines = vec![format!(
            "{} of {} images failed ({} skipped)",
            report.failures.len(),
            total,
            report.skipped
        )];
        for failure in &report.failures {
            lines.push(format!("  - {}", failure.error));
        }
        return Err(anyhow!(lines.join("\n")));
    }
    let mut lines: Vec<String> = report
        .generated
        .iter()
        .map(|image| image.path.display().to_string())
        .collect();
    lines.push(format!(
        "Generated {} images in {}",
        report.generated.len(),
        output_dir.display()
    ));
    Ok(lines.join("\n"))
}
