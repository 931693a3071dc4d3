// Colored terminal output for verdicts, batch summaries and term inspection.
//
// This module handles all terminal-specific formatting. The main.rs
// command handlers delegate here.

use colored::Colorize;

use crate::detection::StrategyTrace;
use crate::models::{DetectionResult, ModerationResponse};

use super::truncate_chars;

/// Longest input echo before truncation.
const ECHO_CHARS: usize = 80;

/// Display a single verdict with its per-term breakdown.
pub fn display_response(text: &str, response: &ModerationResponse) {
    println!("\n  {}", format!("\"{}\"", truncate_chars(text, ECHO_CHARS)).dimmed());
    println!(
        "  Verdict: {}  (confidence {:.2})",
        colorize_verdict(response),
        response.confidence
    );
    println!("  {}", response.message);

    if response.offensive_terms.is_empty() {
        return;
    }

    println!();
    println!("  {:<24} {:>10}", "Term".dimmed(), "Confidence".dimmed());
    println!("  {}", "-".repeat(35).dimmed());
    for (term, confidence) in &response.offensive_terms {
        println!(
            "  {:<24} {:>10}",
            term,
            colorize_confidence(*confidence)
        );
    }
}

/// Display the totals after a batch run.
pub fn display_batch_summary(responses: &[ModerationResponse]) {
    let offensive = responses.iter().filter(|r| r.is_offensive).count();
    let clean = responses.len() - offensive;

    println!(
        "\n{}",
        format!("=== Batch Summary ({} texts) ===", responses.len()).bold()
    );
    if offensive > 0 {
        println!("  {} {} offensive", "!!".red().bold(), offensive);
    }
    println!("  {} {} clean", "ok".green(), clean);

    if !responses.is_empty() {
        let mean =
            responses.iter().map(|r| r.confidence).sum::<f64>() / responses.len() as f64;
        println!("  Mean confidence: {mean:.2}");
    }
}

/// Per-term lexicon details shown by `inspect`.
pub struct TermReport<'a> {
    pub input: &'a str,
    pub normalized: &'a str,
    pub phonetic_code: &'a str,
    pub exact: &'a DetectionResult,
    pub phonetic: &'a DetectionResult,
    pub fuzzy: &'a [DetectionResult],
    pub severity: Option<f64>,
    pub prefixed: &'a [String],
    pub traces: &'a [StrategyTrace],
    pub token_score: &'a DetectionResult,
}

/// Display how the lexicon and every strategy see a single term.
pub fn display_term_report(report: &TermReport<'_>) {
    println!(
        "\n{}",
        format!("=== Inspect \"{}\" ===", truncate_chars(report.input, ECHO_CHARS)).bold()
    );
    println!("  Normalized:    {}", report.normalized);
    println!(
        "  Phonetic code: {}",
        if report.phonetic_code.is_empty() {
            "-"
        } else {
            report.phonetic_code
        }
    );
    match report.severity {
        Some(severity) => println!("  Severity:      {severity:.1}"),
        None => println!("  Severity:      {}", "not in lexicon".dimmed()),
    }

    println!("\n  Lexicon lookups:");
    println!("    Exact:    {}", describe(report.exact));
    println!("    Phonetic: {}", describe(report.phonetic));
    if report.fuzzy.is_empty() {
        println!("    Fuzzy:    {}", "no terms in range".dimmed());
    } else {
        let listed: Vec<String> = report
            .fuzzy
            .iter()
            .map(|r| format!("{} ({:.2})", r.label, r.confidence))
            .collect();
        println!("    Fuzzy:    {}", listed.join(", "));
    }
    if !report.prefixed.is_empty() {
        println!("    Prefixed: {}", report.prefixed.join(", "));
    }

    println!("\n  Strategies:");
    for trace in report.traces {
        let kind = if trace.conclusive { "" } else { " (advisory)" };
        let outcome = match &trace.result {
            Some(result) => describe(result),
            None => "-".dimmed().to_string(),
        };
        println!("    {:<12}{:<11} {}", trace.strategy, kind.dimmed(), outcome);
    }

    println!("\n  Token score: {}", describe(report.token_score));
}

/// Display the obfuscated spellings generated for a term.
pub fn display_variants(term: &str, variants: &[(String, bool)]) {
    println!(
        "\n{}",
        format!("=== Variants of \"{term}\" ({}) ===", variants.len()).bold()
    );
    for (variant, detected) in variants {
        let mark = if *detected {
            "detected".green()
        } else {
            "missed".red()
        };
        println!("  {variant:<24} {mark}");
    }
}

fn describe(result: &DetectionResult) -> String {
    if result.is_offensive {
        format!("{} {}", result.label, colorize_confidence(result.confidence))
    } else {
        result.label.dimmed().to_string()
    }
}

fn colorize_verdict(response: &ModerationResponse) -> colored::ColoredString {
    if response.is_offensive {
        "OFFENSIVE".red().bold()
    } else {
        "clean".green()
    }
}

fn colorize_confidence(confidence: f64) -> colored::ColoredString {
    let text = format!("{confidence:.2}");
    if confidence >= 0.8 {
        text.red().bold()
    } else if confidence >= 0.5 {
        text.yellow()
    } else {
        text.dimmed()
    }
}
