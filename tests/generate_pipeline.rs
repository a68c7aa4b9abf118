use app_screenshots::settings::Settings;
use app_screenshots::text::FontOptions;
use app_screenshots::{Config, run_with_settings};
use std::fs;
use std::path::Path;

fn offline_settings() -> Settings {
    Settings {
        fonts: FontOptions {
            load_system_fonts: false,
            dirs: Vec::new(),
            fallback: Vec::new(),
        },
        ..Settings::default()
    }
}

fn write_input(path: &Path) {
    image::RgbaImage::from_pixel(30, 60, image::Rgba([128, 128, 128, 255]))
        .save(path)
        .expect("write input");
}

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("screenshots.yml");
    fs::write(&path, body).expect("write config");
    path
}

const CONFIG: &str = r##"
output_sizes: [[100, 200]]
theme_styles:
  standard:
    text_area_height: 40
    background_color: "#102030"
  standard_inverted:
    text_area_height: 40
screenshots:
  - input_image: home.png
    text:
      main_text: { en: Welcome, ja: ようこそ }
      sub_text: { en: Start here }
  - input_image: detail.png
    theme: standard_inverted
    output_name: "detail_{lang}_{size}"
    main_text_style:
      font_size: 48
    text:
      main_text: { en: Details, ja: 詳細 }
"##;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn generates_every_language_and_writes_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_input(&dir.path().join("home.png"));
    write_input(&dir.path().join("detail.png"));
    let config_path = write_config(dir.path(), CONFIG);
    let out = dir.path().join("out");
    let report_path = dir.path().join("report.json");

    let output = run_with_settings(
        Config {
            config_path: Some(config_path),
            output_dir: Some(out.clone()),
            jobs: Some(2),
            report_path: Some(report_path.clone()),
            ..Config::default()
        },
        offline_settings(),
    )
    .await
    .expect("run");

    assert!(output.ends_with(&format!("Generated 4 images in {}", out.display())));
    let expected = [
        "en/100x200/01_home_with_text_100x200.png",
        "en/100x200/detail_en_100x200.png",
        "ja/100x200/01_home_with_text_100x200.png",
        "ja/100x200/detail_ja_100x200.png",
    ];
    for relative in expected {
        let path = out.join(relative);
        let image = image::open(&path).expect("open output").to_rgb8();
        assert_eq!(image.dimensions(), (100, 200), "{}", relative);
    }

    let home = image::open(out.join(expected[0])).expect("open").to_rgb8();
    assert_eq!(home.get_pixel(0, 199).0, [16, 32, 48]);
    let inside = home.get_pixel(50, 120).0;
    assert!(inside.iter().all(|channel| channel.abs_diff(128) <= 2));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).expect("read report"))
            .expect("parse report");
    assert_eq!(report["generated"].as_array().map(Vec::len), Some(4));
    assert_eq!(report["failures"].as_array().map(Vec::len), Some(0));
    assert_eq!(report["generated"][1]["size"], "100x200");
}

#[tokio::test]
async fn single_language_run_only_writes_that_language() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_input(&dir.path().join("home.png"));
    write_input(&dir.path().join("detail.png"));
    let config_path = write_config(dir.path(), CONFIG);
    let out = dir.path().join("out");

    run_with_settings(
        Config {
            config_path: Some(config_path),
            output_dir: Some(out.clone()),
            language: Some("ja".to_string()),
            jobs: Some(1),
            ..Config::default()
        },
        offline_settings(),
    )
    .await
    .expect("run");

    assert!(out.join("ja").exists());
    assert!(!out.join("en").exists());
}

#[tokio::test]
async fn validation_errors_stop_generation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = write_config(
        dir.path(),
        "screenshots:\n  - input_image: a.png\n    theme: neon\n    text:\n      main_text: { en: A }\n",
    );
    let out = dir.path().join("out");
    let err = run_with_settings(
        Config {
            config_path: Some(config_path),
            output_dir: Some(out.clone()),
            ..Config::default()
        },
        offline_settings(),
    )
    .await
    .expect_err("invalid theme");
    let message = err.to_string();
    assert!(message.starts_with("Validation errors:"));
    assert!(message.contains("unknown preset theme 'neon'"));
    assert!(!out.exists());
}

#[tokio::test]
async fn validate_only_reports_without_rendering() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_input(&dir.path().join("home.png"));
    write_input(&dir.path().join("detail.png"));
    let config_path = write_config(dir.path(), CONFIG);
    let out = dir.path().join("out");
    let output = run_with_settings(
        Config {
            config_path: Some(config_path),
            output_dir: Some(out.clone()),
            validate_only: true,
            ..Config::default()
        },
        offline_settings(),
    )
    .await
    .expect("validate");
    assert_eq!(output, "Configuration is valid");
    assert!(!out.exists());
}

#[tokio::test]
async fn keep_going_reports_every_missing_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_input(&dir.path().join("home.png"));
    let config_path = write_config(dir.path(), CONFIG);
    let out = dir.path().join("out");
    let err = run_with_settings(
        Config {
            config_path: Some(config_path),
            output_dir: Some(out.clone()),
            keep_going: true,
            jobs: Some(1),
            ..Config::default()
        },
        offline_settings(),
    )
    .await
    .expect_err("missing detail.png");
    assert!(err.to_string().starts_with("2 of 4 images failed (0 skipped)"));
    assert!(out.join("en/100x200/01_home_with_text_100x200.png").exists());
    assert!(out.join("ja/100x200/01_home_with_text_100x200.png").exists());
}

#[tokio::test]
async fn configured_language_missing_from_a_screenshot_blocks_generation() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_input(&dir.path().join("home.png"));
    write_input(&dir.path().join("detail.png"));
    let config_path = write_config(
        dir.path(),
        "languages: [en, ja]\noutput_sizes: [[100, 200]]\nscreenshots:\n  - input_image: home.png\n    text:\n      main_text: { en: A, ja: B }\n  - input_image: detail.png\n    text:\n      main_text: { en: C }\n",
    );
    let out = dir.path().join("out");
    let err = run_with_settings(
        Config {
            config_path: Some(config_path),
            output_dir: Some(out.clone()),
            ..Config::default()
        },
        offline_settings(),
    )
    .await
    .expect_err("ja missing in screenshot 2");
    assert!(
        err.to_string()
            .contains("no main_text defined for language 'ja' in screenshot 2")
    );
    assert!(!out.exists());
}
