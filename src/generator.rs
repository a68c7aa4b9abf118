use anyhow::{Context, Result, anyhow};
use futures_util::stream::{self, StreamExt};
use image::{RgbImage, RgbaImage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info};

use crate::compose::{build_canvas, flatten};
use crate::config::{LoadedConfig, OutputSize, Screenshot};
use crate::error::GenerateError;
use crate::output::{output_file_name, output_path, resolve_input_path, save_png};
use crate::style::StyleResolver;
use crate::text::{FontProvider, draw_texts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop scheduling new jobs after the first failure.
    #[default]
    FailFast,
    /// Run every job and report all failures.
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" | "" => Ok(FailurePolicy::FailFast),
            "continue" | "keep_going" => Ok(FailurePolicy::Continue),
            other => Err(anyhow!("unknown failure policy '{}'", other)),
        }
    }
}

/// One output image: a screenshot rendered for a language at a size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub language: String,
    /// 1-based position in the config's screenshot list.
    pub screenshot: usize,
    pub size: OutputSize,
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "screenshot {} [{}] {}",
            self.screenshot, self.language, self.size
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedImage {
    pub language: String,
    pub screenshot: usize,
    pub size: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobFailure {
    pub language: String,
    pub screenshot: usize,
    pub size: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub generated: Vec<GeneratedImage>,
    pub failures: Vec<JobFailure>,
    /// Jobs never started because an earlier job failed.
    pub skipped: usize,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }
}

#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub output_dir: PathBuf,
    pub language: Option<String>,
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
}

struct GenerationContext {
    loaded: LoadedConfig,
    fonts: Arc<FontProvider>,
    output_dir: PathBuf,
}

pub struct Generator {
    context: Arc<GenerationContext>,
    language: Option<String>,
    concurrency: usize,
    failure_policy: FailurePolicy,
}

impl Generator {
    pub fn new(loaded: LoadedConfig, fonts: Arc<FontProvider>, options: GenerationOptions) -> Self {
        let concurrency = if options.concurrency == 0 {
            num_cpus::get()
        } else {
            options.concurrency
        };
        Self {
            context: Arc::new(GenerationContext {
                loaded,
                fonts,
                output_dir: options.output_dir,
            }),
            language: options.language,
            concurrency: concurrency.max(1),
            failure_policy: options.failure_policy,
        }
    }

    /// Jobs in (language, screenshot, size) order.
    pub fn plan(&self) -> Result<Vec<Job>> {
        let config = &self.context.loaded.config;
        let languages = config.languages_to_generate(self.language.as_deref())?;
        let mut jobs = Vec::new();
        for language in &languages {
            for index in 1..=config.screenshots.len() {
                for size in &config.output_sizes {
                    jobs.push(Job {
                        language: language.clone(),
                        screenshot: index,
                        size: *size,
                    });
                }
            }
        }
        Ok(jobs)
    }

    pub async fn run(&self) -> Result<GenerationReport> {
        let jobs = self.plan()?;
        info!(
            "generating {} images with {} workers",
            jobs.len(),
            self.concurrency
        );
        let abort = Arc::new(AtomicBool::new(false));
        let fail_fast = self.failure_policy == FailurePolicy::FailFast;

        let mut results: Vec<(usize, Job, Option<Result<PathBuf>>)> =
            stream::iter(jobs.into_iter().enumerate())
                .map(|(position, job)| {
                    let context = self.context.clone();
                    let abort = abort.clone();
                    async move {
                        if abort.load(Ordering::SeqCst) {
                            return (position, job, None);
                        }
                        let task_job = job.clone();
                        let result = tokio::task::spawn_blocking(move || {
                            render_job(&context, &task_job)
                        })
                        .await
                        .map_err(|err| anyhow!("render task failed: {}", err))
                        .and_then(|result| result);
                        if let Err(err) = &result {
                            error!("{}: {:#}", job, err);
                            if fail_fast {
                                abort.store(true, Ordering::SeqCst);
                            }
                        }
                        (position, job, Some(result))
                    }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;
        results.sort_by_key(|(position, _, _)| *position);

        let mut report = GenerationReport::default();
        for (_, job, result) in results {
            match result {
                Some(Ok(path)) => report.generated.push(GeneratedImage {
                    language: job.language,
                    screenshot: job.screenshot,
                    size: job.size.to_string(),
                    path,
                }),
                Some(Err(err)) => report.failures.push(JobFailure {
                    language: job.language,
                    screenshot: job.screenshot,
                    size: job.size.to_string(),
                    error: format!("{:#}", err),
                }),
                None => report.skipped += 1,
            }
        }
        Ok(report)
    }
}

fn render_job(context: &GenerationContext, job: &Job) -> Result<PathBuf> {
    let config = &context.loaded.config;
    let screenshot = config
        .screenshots
        .get(job.screenshot - 1)
        .ok_or_else(|| anyhow!("screenshot {} does not exist", job.screenshot))?;
    let input = resolve_input_path(
        &context.loaded.base_dir,
        &screenshot.input_image,
        &job.language,
        job.size,
    );
    let source = load_source(&input).with_context(|| job.to_string())?;
    let image = render_screenshot(
        &context.loaded,
        screenshot,
        job.screenshot,
        &job.language,
        job.size,
        &source,
        &context.fonts,
    )
    .with_context(|| job.to_string())?;

    let file_name = output_file_name(screenshot, &job.language, job.size, Some(job.screenshot));
    let path = output_path(&context.output_dir, &job.language, job.size, &file_name);
    save_png(&image, &path).with_context(|| job.to_string())?;
    debug!("{} -> {}", job, path.display());
    Ok(path)
}

fn load_source(path: &Path) -> Result<RgbaImage> {
    if !path.exists() {
        return Err(GenerateError::MissingInputImage {
            path: path.to_path_buf(),
        }
        .into());
    }
    let image = image::open(path)
        .with_context(|| format!("failed to decode image: {}", path.display()))?;
    Ok(image.to_rgba8())
}

/// Full pipeline for one image in memory: style, canvas, text, flatten.
pub fn render_screenshot(
    loaded: &LoadedConfig,
    screenshot: &Screenshot,
    index: usize,
    language: &str,
    size: OutputSize,
    source: &RgbaImage,
    fonts: &FontProvider,
) -> Result<RgbImage> {
    let (main_text, sub_text) = screenshot.text_for_language(language, index)?;
    let style = StyleResolver::new(&loaded.config).resolve(screenshot, language)?;
    let (canvas, placement) = build_canvas(&style, size, source);
    debug!(
        "screenshot {} placed {}x{} at ({}, {})",
        index, placement.width, placement.height, placement.x, placement.y
    );
    let canvas = draw_texts(canvas, fonts, &style, main_text, sub_text)?;
    Ok(flatten(&canvas))
}
