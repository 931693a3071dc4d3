use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use sentinel::config::Config;
use sentinel::detection::Detector;
use sentinel::lexicon::soundex;
use sentinel::models::AnalyzeOptions;
use sentinel::obfuscation;
use sentinel::output::terminal::{self, TermReport};

/// Fuzzy matches shown by `inspect`.
const INSPECT_FUZZY_DISTANCE: usize = 2;
/// Prefix completions shown by `inspect`.
const INSPECT_PREFIX_LIMIT: usize = 5;

/// Sentinel: lexicon-based offensive content detection.
///
/// Classifies text against a curated term list, catching leetspeak,
/// separator tricks, sound-alikes and near-misspellings.
#[derive(Parser)]
#[command(name = "sentinel", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single text
    Check {
        /// The text to classify
        text: String,

        /// Verdict threshold (default: SENTINEL_THRESHOLD or 0.7)
        #[arg(long)]
        threshold: Option<f64>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,

        /// Omit the per-term breakdown
        #[arg(long)]
        no_details: bool,
    },

    /// Classify every line of a file
    Batch {
        /// File with one text per line
        file: PathBuf,

        /// Verdict threshold (default: SENTINEL_THRESHOLD or 0.7)
        #[arg(long)]
        threshold: Option<f64>,

        /// Print one JSON response per line instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show how a single term is normalized, coded and matched
    Inspect {
        /// The term to inspect
        term: String,
    },

    /// Generate obfuscated spellings of a term and check each is caught
    Variants {
        /// The term to vary
        term: String,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sentinel=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Check {
            text,
            threshold,
            json,
            no_details,
        } => {
            let detector = load_detector(&config)?;
            let options = AnalyzeOptions {
                confidence_threshold: resolve_threshold(threshold, &config)?,
                return_details: !no_details,
            };
            let response = detector.analyze_with(&text, &options);

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                terminal::display_response(&text, &response);
            }
        }

        Commands::Batch {
            file,
            threshold,
            json,
        } => {
            let detector = load_detector(&config)?;
            let options = AnalyzeOptions::with_threshold(resolve_threshold(threshold, &config)?);

            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read batch file {}", file.display()))?;
            let texts: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
            if texts.is_empty() {
                warn!(file = %file.display(), "Batch file has no texts");
                return Ok(());
            }
            info!(texts = texts.len(), "Classifying batch");

            let pb = ProgressBar::new(texts.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar().template("  Classifying [{bar:30}] {pos}/{len} ({eta})")?,
            );

            let mut responses = Vec::with_capacity(texts.len());
            for text in &texts {
                responses.push(detector.analyze_with(text, &options));
                pb.inc(1);
            }
            pb.finish_and_clear();

            if json {
                for response in &responses {
                    println!("{}", serde_json::to_string(response)?);
                }
            } else {
                for (text, response) in texts.iter().zip(&responses) {
                    if response.is_offensive {
                        terminal::display_response(text, response);
                    }
                }
                terminal::display_batch_summary(&responses);
            }
        }

        Commands::Inspect { term } => {
            let detector = load_detector(&config)?;
            let lexicon = detector.lexicon();

            let normalized = lexicon.canonical(&term);
            let code = soundex(&normalized);
            let exact = lexicon.contains(&normalized);
            let phonetic = lexicon.contains_phonetic(&code);
            let fuzzy = lexicon.fuzzy_search(&normalized, INSPECT_FUZZY_DISTANCE);
            let prefixed = lexicon.words_with_prefix(&normalized, INSPECT_PREFIX_LIMIT);
            let traces = detector.explain(&term);
            let token_score = detector.score_token(&term);

            terminal::display_term_report(&TermReport {
                input: &term,
                normalized: &normalized,
                phonetic_code: &code,
                exact: &exact,
                phonetic: &phonetic,
                fuzzy: &fuzzy,
                severity: lexicon.severity(&normalized),
                prefixed: &prefixed,
                traces: &traces,
                token_score: &token_score,
            });
        }

        Commands::Variants { term } => {
            let detector = load_detector(&config)?;
            let variants: Vec<(String, bool)> = obfuscation::variants(&term.to_lowercase())
                .into_iter()
                .map(|variant| {
                    let detected = detector.analyze(&variant).is_offensive;
                    (variant, detected)
                })
                .collect();

            terminal::display_variants(&term, &variants);
            let missed = variants.iter().filter(|(_, detected)| !detected).count();
            if missed > 0 {
                println!(
                    "{}",
                    format!("  {missed} variant(s) slipped through. Is the term in the corpus?")
                        .dimmed()
                );
            }
        }
    }

    Ok(())
}

/// Build a detector from the configured corpus files.
fn load_detector(config: &Config) -> Result<Detector> {
    config.require_corpus()?;
    let corpus = config.read_corpus()?;

    let mut builder = Detector::builder()
        .corpus_text(&corpus)
        .max_repeats(config.max_repeats);
    if let Some(safe) = config.read_safe_corpus()? {
        builder = builder.safe_corpus_text(&safe);
    }

    builder
        .build()
        .with_context(|| format!("Failed to load corpus {}", config.corpus_path.display()))
}

/// A --threshold flag overrides the configured default.
fn resolve_threshold(flag: Option<f64>, config: &Config) -> Result<f64> {
    match flag {
        Some(value) => sentinel::config::validate_threshold(value),
        None => Ok(config.threshold),
    }
}
