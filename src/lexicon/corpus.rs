// Term corpus parsing.
//
// One term per line. Blank lines and lines starting with '#' are skipped.
// A line may carry a severity weight after a tab: "term\t2.5".

/// A parsed corpus line.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEntry {
    pub term: String,
    pub severity: Option<f64>,
}

/// Parse one corpus line. Returns None for blank and comment lines.
/// An unparseable severity is dropped and the term kept.
pub fn parse_entry(line: &str) -> Option<CorpusEntry> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let (term, severity) = match line.split_once('\t') {
        Some((term, weight)) => (term.trim(), weight.trim().parse::<f64>().ok()),
        None => (trimmed, None),
    };

    if term.is_empty() {
        return None;
    }

    Some(CorpusEntry {
        term: term.to_lowercase(),
        severity: severity.filter(|s| s.is_finite()),
    })
}

/// Parse a whole corpus, skipping unusable lines.
pub fn parse_corpus(text: &str) -> Vec<CorpusEntry> {
    text.lines().filter_map(parse_entry).collect()
}
