use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::normalizer::DEFAULT_MAX_REPEATS;

pub const DEFAULT_CORPUS_PATH: &str = "./terms.txt";
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. The
/// corpus files are plaintext, one term per line.
#[derive(Debug, Clone)]
pub struct Config {
    /// Offensive term corpus (SENTINEL_CORPUS_PATH, default ./terms.txt)
    pub corpus_path: PathBuf,
    /// Optional safe-word corpus (SENTINEL_SAFE_CORPUS_PATH)
    pub safe_corpus_path: Option<PathBuf>,
    /// Default verdict threshold (SENTINEL_THRESHOLD, default 0.7)
    pub threshold: f64,
    /// Repeat collapse limit (SENTINEL_MAX_REPEATS, default 2)
    pub max_repeats: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables take their defaults. Set-but-invalid values are
    /// errors rather than silently ignored.
    pub fn load() -> Result<Self> {
        let threshold = match env::var("SENTINEL_THRESHOLD") {
            Ok(raw) => parse_threshold(&raw)?,
            Err(_) => DEFAULT_THRESHOLD,
        };

        let max_repeats = match env::var("SENTINEL_MAX_REPEATS") {
            Ok(raw) => parse_max_repeats(&raw)?,
            Err(_) => DEFAULT_MAX_REPEATS,
        };

        Ok(Self {
            corpus_path: env::var("SENTINEL_CORPUS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CORPUS_PATH)),
            safe_corpus_path: env::var("SENTINEL_SAFE_CORPUS_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            threshold,
            max_repeats,
        })
    }

    /// Check that the term corpus exists.
    /// Call this before building a detector from the configured files.
    pub fn require_corpus(&self) -> Result<()> {
        if !self.corpus_path.is_file() {
            bail!(
                "Term corpus not found at {}\n\
                 Set SENTINEL_CORPUS_PATH in your .env file to a plaintext file\n\
                 with one term per line.",
                self.corpus_path.display()
            );
        }
        Ok(())
    }

    /// Read the term corpus.
    pub fn read_corpus(&self) -> Result<String> {
        read_text(&self.corpus_path)
    }

    /// Read the safe-word corpus, if one is configured.
    pub fn read_safe_corpus(&self) -> Result<Option<String>> {
        self.safe_corpus_path.as_deref().map(read_text).transpose()
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file {}", path.display()))
}

/// Parse a verdict threshold, which must lie in [0, 1].
pub fn parse_threshold(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("SENTINEL_THRESHOLD is not a number: {raw:?}"))?;
    validate_threshold(value)
}

/// Check that a verdict threshold lies in [0, 1].
pub fn validate_threshold(value: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&value) {
        bail!("Threshold must be between 0.0 and 1.0, got {value}");
    }
    Ok(value)
}

/// Parse a repeat collapse limit, which must be at least 1.
pub fn parse_max_repeats(raw: &str) -> Result<usize> {
    let value: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("SENTINEL_MAX_REPEATS is not a whole number: {raw:?}"))?;
    if value == 0 {
        bail!("SENTINEL_MAX_REPEATS must be at least 1");
    }
    Ok(value)
}
