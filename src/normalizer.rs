// Text normalizer — canonical form for input text and corpus terms.
//
// Both sides of every comparison go through the same pass: lowercase,
// compatibility decomposition with combining marks stripped, a literal
// symbol-to-letter substitution table, filler removal, and repeat
// collapsing. The pass runs to a fixed point so that normalizing twice
// gives the same result as normalizing once.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Runs longer than this are collapsed (e.g. "fuuuck" -> "fuuck").
pub const DEFAULT_MAX_REPEATS: usize = 2;

/// Upper bound on normalization passes. Every table entry maps to a letter
/// that is not itself a source, so real input converges in two or three.
const MAX_PASSES: usize = 8;

/// Characters dropped outright after substitution.
const FILLER_CHARS: [char; 2] = ['*', '_'];

/// Sentence punctuation trimmed from the end of analysis tokens.
const TRAILING_PUNCTUATION: [char; 8] = ['.', ',', '!', '?', ';', ':', '"', '\''];

/// Quotes trimmed from the start of analysis tokens.
const LEADING_PUNCTUATION: [char; 2] = ['"', '\''];

/// Symbol sequences and look-alike characters mapped to plain letters.
///
/// Matched literally, longest entry first, in a single left-to-right scan.
/// Lookups happen after lowercasing and decomposition, so accented Latin
/// letters and uppercase Greek never reach this table.
const SUBSTITUTIONS: &[(&str, char)] = &[
    ("/\\/\\", 'm'),
    ("\\/\\/", 'w'),
    ("/\\", 'a'),
    ("\\/", 'v'),
    ("^^", 'm'),
    ("()", 'o'),
    ("ph", 'f'),
    ("@", 'a'),
    ("4", 'a'),
    ("^", 'a'),
    ("δ", 'a'),
    ("α", 'a'),
    ("8", 'b'),
    ("ß", 'b'),
    ("(", 'c'),
    ("<", 'c'),
    ("{", 'c'),
    ("¢", 'c'),
    ("©", 'c'),
    ("3", 'e'),
    ("€", 'e'),
    ("£", 'e'),
    ("ƒ", 'f'),
    ("6", 'g'),
    ("9", 'g'),
    ("&", 'g'),
    ("#", 'h'),
    ("1", 'i'),
    ("!", 'i'),
    ("ʝ", 'j'),
    ("м", 'm'),
    ("0", 'o'),
    ("°", 'o'),
    ("ø", 'o'),
    ("φ", 'q'),
    ("ɋ", 'q'),
    ("$", 's'),
    ("5", 's'),
    ("§", 's'),
    ("7", 't'),
    ("+", 't'),
    ("√", 'v'),
    ("ѵ", 'v'),
    ("ш", 'w'),
    ("ω", 'w'),
    ("¥", 'y'),
    ("ʎ", 'y'),
    ("2", 'z'),
    ("ζ", 'z'),
    ("ʐ", 'z'),
];

/// A token as seen by the detection pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenForm {
    /// Lowercased with diacritics removed, no substitutions
    pub surface: String,
    /// Fully normalized form, comparable with lexicon terms
    pub normalized: String,
}

impl TokenForm {
    /// True when normalization changed more than case and diacritics,
    /// i.e. the token only looks like a term after rewriting.
    pub fn was_rewritten(&self) -> bool {
        self.surface != self.normalized
    }
}

/// Text canonicalizer. Cheap to copy; configured only by the repeat limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    max_repeats: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            max_repeats: DEFAULT_MAX_REPEATS,
        }
    }
}

impl Normalizer {
    /// Create a normalizer that collapses runs to at most `max_repeats`
    /// characters. A limit of zero is treated as one.
    pub fn new(max_repeats: usize) -> Self {
        Self {
            max_repeats: max_repeats.max(1),
        }
    }

    pub fn max_repeats(&self) -> usize {
        self.max_repeats
    }

    /// Canonicalize `text`. Empty input yields an empty string.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.pass(text);
        for _ in 1..MAX_PASSES {
            let next = self.pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Split on whitespace after turning underscores into spaces.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text)
    }

    /// Split raw text into tokens and pair each surface form with its
    /// normalized form. Trailing sentence punctuation is trimmed first so
    /// that "idiot!" is read as "idiot" rather than the leetspeak "idioti".
    /// Tokens that normalize to nothing are dropped.
    pub fn analysis_tokens(&self, text: &str) -> Vec<TokenForm> {
        text.split_whitespace()
            .map(|raw| {
                raw.trim_start_matches(LEADING_PUNCTUATION)
                    .trim_end_matches(TRAILING_PUNCTUATION)
            })
            .filter(|raw| !raw.is_empty())
            .filter_map(|raw| {
                let normalized: String = self
                    .normalize(raw)
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                if normalized.is_empty() {
                    return None;
                }
                Some(TokenForm {
                    surface: surface_form(raw),
                    normalized,
                })
            })
            .collect()
    }

    fn pass(&self, text: &str) -> String {
        let decomposed: Vec<char> = strip_marks(&text.to_lowercase()).chars().collect();
        let substituted: String = substitute(&decomposed)
            .into_iter()
            .filter(|c| !FILLER_CHARS.contains(c))
            .collect();
        collapse_repeats(&substituted, self.max_repeats)
    }
}

/// Normalize with the default settings.
pub fn normalize(text: &str) -> String {
    Normalizer::default().normalize(text)
}

/// Split on whitespace after turning underscores into spaces.
pub fn tokenize(text: &str) -> Vec<String> {
    text.replace('_', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Lowercase and strip diacritics without any other rewriting.
pub fn surface_form(text: &str) -> String {
    strip_marks(&text.to_lowercase())
}

/// NFKD decomposition with combining marks removed.
pub fn strip_marks(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Shorten every run of identical characters to at most `max` characters.
pub fn collapse_repeats(text: &str, max: usize) -> String {
    let max = max.max(1);
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut run = 0;
    for c in text.chars() {
        if Some(c) == prev {
            run += 1;
        } else {
            prev = Some(c);
            run = 1;
        }
        if run <= max {
            out.push(c);
        }
    }
    out
}

fn substitute(chars: &[char]) -> Vec<char> {
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    'scan: while i < chars.len() {
        for (pattern, replacement) in SUBSTITUTIONS {
            let len = pattern.chars().count();
            if i + len <= chars.len() && pattern.chars().eq(chars[i..i + len].iter().copied()) {
                out.push(*replacement);
                i += len;
                continue 'scan;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_diacritics() {
        assert_eq!(normalize("Crème Brûlée"), "creme brulee");
    }

    #[test]
    fn test_single_symbol_substitutions() {
        assert_eq!(normalize("h@t"), "hat");
        assert_eq!(normalize("f00l"), "fool");
        assert_eq!(normalize("$tupid"), "stupid");
        assert_eq!(normalize("1d10t"), "idiot");
    }

    #[test]
    fn test_multi_char_sequences_are_literal() {
        assert_eq!(normalize("/\\/\\e"), "me");
        assert_eq!(normalize("\\/\\/ow"), "wow");
        assert_eq!(normalize("/\\ss"), "ass");
        assert_eq!(normalize("phat"), "fat");
        assert_eq!(normalize("g()d"), "god");
    }

    #[test]
    fn test_fillers_removed() {
        assert_eq!(normalize("s*h*i*t"), "shit");
        assert_eq!(normalize("a_b"), "ab");
    }

    #[test]
    fn test_repeats_collapse_to_limit() {
        assert_eq!(normalize("fuuuuuck"), "fuuck");
        assert_eq!(Normalizer::new(1).normalize("fuuuuuck"), "fuck");
        assert_eq!(normalize("ass"), "ass");
    }

    #[test]
    fn test_zero_repeat_limit_treated_as_one() {
        assert_eq!(Normalizer::new(0).max_repeats(), 1);
    }

    #[test]
    fn test_fixed_point_reached() {
        // '#' becomes 'h' in the first pass, which then forms "ph"
        let once = normalize("p#at");
        assert_eq!(once, "fat");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert!(tokenize("").is_empty());
        assert!(Normalizer::default().analysis_tokens("   ").is_empty());
    }

    #[test]
    fn test_tokenize_splits_underscores() {
        assert_eq!(tokenize("foo_bar  baz"), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_analysis_tokens_trim_sentence_punctuation() {
        let tokens = Normalizer::default().analysis_tokens("You idiot! \"Really?\"");
        let normalized: Vec<&str> = tokens.iter().map(|t| t.normalized.as_str()).collect();
        assert_eq!(normalized, vec!["you", "idiot", "really"]);
        assert!(!tokens[1].was_rewritten());
    }

    #[test]
    fn test_analysis_tokens_mark_rewritten() {
        let tokens = Normalizer::default().analysis_tokens("1d10t");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].surface, "1d10t");
        assert_eq!(tokens[0].normalized, "idiot");
        assert!(tokens[0].was_rewritten());
    }

    #[test]
    fn test_punctuation_only_tokens_dropped() {
        let tokens = Normalizer::default().analysis_tokens("... ?? hello");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].normalized, "hello");
    }

    #[test]
    fn test_collapse_repeats_helper() {
        assert_eq!(collapse_repeats("aaabbbbcc", 2), "aabbcc");
        assert_eq!(collapse_repeats("aaabbbbcc", 1), "abc");
        assert_eq!(collapse_repeats("", 2), "");
    }
}
