use std::fmt;
use std::path::PathBuf;

/// Fatal generation failures. Travels inside `anyhow::Error`; callers recover
/// the variant with `downcast_ref::<GenerateError>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    UnknownTheme {
        name: String,
        available: Vec<String>,
    },
    MissingLanguageText {
        screenshot: usize,
        language: String,
    },
    MissingInputImage {
        path: PathBuf,
    },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::UnknownTheme { name, available } => write!(
                f,
                "unknown preset theme '{}' (available: {})",
                name,
                available.join(", ")
            ),
            GenerateError::MissingLanguageText {
                screenshot,
                language,
            } => write!(
                f,
                "no main_text defined for language '{}' in screenshot {}",
                language, screenshot
            ),
            GenerateError::MissingInputImage { path } => {
                write!(f, "input image not found: {}", path.display())
            }
        }
    }
}

impl std::error::Error for GenerateError {}
