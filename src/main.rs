use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "app-screenshots",
    version,
    about = "Generate store screenshots with localized text overlays"
)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short = 'c', long = "config", required_unless_present = "show_themes")]
    config: Option<PathBuf>,

    /// Output directory (default: settings [output] dir, then ./output)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Generate only this language
    #[arg(short = 'l', long = "language")]
    language: Option<String>,

    /// Validate the configuration without generating images
    #[arg(long = "validate-only")]
    validate_only: bool,

    /// Show preset themes and exit
    #[arg(long = "show-themes")]
    show_themes: bool,

    /// Keep rendering after a failed image and report every failure
    #[arg(long = "keep-going")]
    keep_going: bool,

    /// Parallel render jobs (0 = number of CPUs)
    #[arg(short = 'j', long = "jobs")]
    jobs: Option<usize>,

    /// Write a JSON report of generated files and failures
    #[arg(long = "report")]
    report: Option<PathBuf>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    app_screenshots::logging::init(cli.verbose)?;

    let output = app_screenshots::run(app_screenshots::Config {
        config_path: cli.config,
        output_dir: cli.output,
        language: cli.language,
        validate_only: cli.validate_only,
        show_themes: cli.show_themes,
        keep_going: cli.keep_going,
        jobs: cli.jobs,
        report_path: cli.report,
        settings_path: cli.read_settings,
    })
    .await?;

    println!("{}", output);
    Ok(())
}
