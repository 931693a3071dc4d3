// Lexicon store — the curated term set and every lookup over it.
//
// A Lexicon combines the concurrent trie, the phonetic index, and a cache
// of exact-lookup outcomes. It is built once from a corpus and afterwards
// only grows through `add_term`, which may run while other threads read.

pub mod cache;
pub mod corpus;
pub mod phonetic;
pub mod trie;

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use tracing::debug;

use crate::models::DetectionResult;
use crate::normalizer::{surface_form, Normalizer};

pub use cache::{CacheStats, MatchCache};
pub use corpus::{parse_corpus, parse_entry, CorpusEntry};
pub use phonetic::{soundex, PhoneticIndex};
pub use trie::{FuzzyHit, Trie, TrieNode};

pub const LABEL_EXACT: &str = "Exact match";
pub const LABEL_NO_MATCH: &str = "No match";

/// Cap on fuzzy search results.
pub const MAX_FUZZY_RESULTS: usize = 10;

/// Base confidence of any exact hit.
const BASE_CONFIDENCE: f64 = 0.8;
/// Per-insert frequency bonus and its cap.
const FREQUENCY_BONUS: f64 = 0.01;
const MAX_FREQUENCY_BONUS: f64 = 0.2;
/// Penalty for one- and two-letter terms.
const SHORT_TERM_PENALTY: f64 = 0.1;
const SHORT_TERM_LEN: usize = 3;
/// Phonetic hits are discounted against the word's own confidence.
const PHONETIC_FACTOR: f64 = 0.85;

/// Term list captured at one cache generation.
type TermSnapshot = (u64, Arc<BTreeSet<String>>);

/// Trie + phonetic index + exact-lookup cache.
#[derive(Default)]
pub struct Lexicon {
    trie: Trie,
    phonetic: PhoneticIndex,
    cache: MatchCache,
    normalizer: Normalizer,
    /// Corpus spelling (lowercased, marks stripped) -> stored term
    surfaces: DashMap<String, String>,
    snapshot: RwLock<Option<TermSnapshot>>,
}

impl Lexicon {
    /// An empty lexicon that canonicalizes terms with `normalizer`.
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            ..Self::default()
        }
    }

    /// Build from parsed corpus entries. Entries that normalize to nothing
    /// are skipped.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = &'a CorpusEntry>,
        normalizer: Normalizer,
    ) -> Self {
        let lexicon = Self::new(normalizer);
        let mut skipped = 0usize;
        for entry in entries {
            match lexicon.add_term(&entry.term) {
                Some(term) => {
                    if let Some(severity) = entry.severity {
                        lexicon.set_severity(&term, severity);
                    }
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(skipped, "Skipped corpus entries with no usable characters");
        }
        lexicon
    }

    /// Build from plain terms.
    pub fn from_terms<S: AsRef<str>>(
        terms: impl IntoIterator<Item = S>,
        normalizer: Normalizer,
    ) -> Self {
        let entries: Vec<CorpusEntry> = terms
            .into_iter()
            .filter_map(|t| parse_entry(t.as_ref()))
            .collect();
        Self::from_entries(&entries, normalizer)
    }

    /// Canonical form a term is stored under.
    pub fn canonical(&self, term: &str) -> String {
        self.normalizer
            .normalize(term)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    /// Insert an already-canonical term under the given phonetic code.
    /// Returns false for an empty term.
    pub fn insert(&self, term: &str, phonetic_code: &str) -> bool {
        if self.trie.insert(term, phonetic_code).is_none() {
            return false;
        }
        self.phonetic.insert(phonetic_code, term);
        true
    }

    /// Canonicalize and insert `term`, then invalidate cached lookups.
    /// Returns the stored form, or None when nothing usable remains.
    pub fn add_term(&self, term: &str) -> Option<String> {
        let canonical = self.canonical(term);
        if canonical.is_empty() {
            return None;
        }
        let code = soundex(&canonical);
        self.insert(&canonical, &code);
        self.surfaces.insert(corpus_surface(term), canonical.clone());
        self.cache.clear();
        Some(canonical)
    }

    /// Stored term whose corpus spelling is exactly `surface`, so that
    /// terms such as "nympho" or "1488" still match when written as listed.
    pub fn term_for_surface(&self, surface: &str) -> Option<String> {
        self.surfaces.get(surface).map(|term| term.value().clone())
    }

    /// Exact lookup of an already-normalized token.
    pub fn contains(&self, token: &str) -> DetectionResult {
        if token.is_empty() {
            return DetectionResult::miss(LABEL_NO_MATCH);
        }

        let generation = self.cache.generation();
        if let Some(cached) = self.cache.get(token) {
            return cached;
        }

        let result = match self.trie.find_word(token) {
            Some(node) => DetectionResult::matched(confidence_for(token, &node), LABEL_EXACT),
            None => DetectionResult::miss(LABEL_NO_MATCH),
        };
        self.cache.insert(token, result.clone(), generation);
        result
    }

    /// Best term sharing `code`: highest frequency, then lexicographically
    /// smallest. The label is the matched term.
    pub fn contains_phonetic(&self, code: &str) -> DetectionResult {
        let best = self
            .phonetic
            .group(code)
            .into_iter()
            .filter_map(|term| {
                let node = self.trie.find_word(&term)?;
                Some((node.frequency(), term))
            })
            // Group is sorted, so the first term wins a frequency tie
            .fold(None::<(u32, String)>, |best, candidate| match best {
                Some(current) if current.0 >= candidate.0 => Some(current),
                _ => Some(candidate),
            });

        match best {
            Some((_, term)) => DetectionResult::matched(self.phonetic_confidence(&term), term),
            None => DetectionResult::miss(LABEL_NO_MATCH),
        }
    }

    /// Terms sharing a phonetic code, in lexicographic order.
    pub fn phonetic_group(&self, code: &str) -> Vec<String> {
        self.phonetic.group(code)
    }

    /// Terms within `max_distance` edits of `query`, most similar first.
    pub fn fuzzy_search(&self, query: &str, max_distance: usize) -> Vec<DetectionResult> {
        if query.is_empty() {
            return Vec::new();
        }
        let query_len = query.chars().count();

        let mut scored: Vec<(f64, String)> = self
            .trie
            .fuzzy(query, max_distance)
            .into_iter()
            .map(|hit| {
                let longest = query_len.max(hit.term.chars().count()).max(1);
                let confidence = 1.0 - hit.distance as f64 / longest as f64;
                (confidence, hit.term)
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.truncate(MAX_FUZZY_RESULTS);

        scored
            .into_iter()
            .map(|(confidence, term)| DetectionResult::new(confidence > 0.0, confidence, term))
            .collect()
    }

    /// Confidence of a sound-alike hit on `term`, 0.0 if absent.
    pub fn phonetic_confidence(&self, term: &str) -> f64 {
        PHONETIC_FACTOR * self.word_confidence(term)
    }

    /// Confidence of an exact hit on `term`, 0.0 if absent.
    pub fn word_confidence(&self, term: &str) -> f64 {
        self.trie
            .find_word(term)
            .map_or(0.0, |node| confidence_for(term, &node))
    }

    pub fn all_terms(&self) -> BTreeSet<String> {
        self.trie.all_words()
    }

    /// Shared copy of every stored term, rebuilt only after `add_term`.
    pub fn term_snapshot(&self) -> Arc<BTreeSet<String>> {
        let generation = self.cache.generation();
        if let Ok(guard) = self.snapshot.read() {
            if let Some((built, terms)) = guard.as_ref() {
                if *built == generation {
                    return Arc::clone(terms);
                }
            }
        }

        let terms = Arc::new(self.trie.all_words());
        if let Ok(mut guard) = self.snapshot.write() {
            let newer = guard.as_ref().is_some_and(|(built, _)| *built > generation);
            if !newer {
                *guard = Some((generation, Arc::clone(&terms)));
            }
        }
        terms
    }

    pub fn words_with_prefix(&self, prefix: &str, max: usize) -> Vec<String> {
        self.trie.words_with_prefix(prefix, max)
    }

    /// Times `term` was inserted, 0 if absent.
    pub fn frequency(&self, term: &str) -> u32 {
        self.trie.find_word(term).map_or(0, |node| node.frequency())
    }

    pub fn severity(&self, term: &str) -> Option<f64> {
        self.trie.find_word(term).map(|node| node.severity())
    }

    /// Set the severity of a stored term. Returns false if it is absent.
    pub fn set_severity(&self, term: &str, severity: f64) -> bool {
        match self.trie.find_word(term) {
            Some(node) => {
                node.set_severity(severity);
                true
            }
            None => false,
        }
    }

    pub fn is_high_severity(&self, term: &str) -> bool {
        self.trie
            .find_word(term)
            .is_some_and(|node| node.is_high_severity())
    }

    /// Phonetic code stored for `term`, if present.
    pub fn phonetic_code(&self, term: &str) -> Option<String> {
        self.trie
            .find_word(term)
            .map(|node| node.phonetic_code().to_string())
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Corpus spelling of `term` as it would appear as an analysis token.
fn corpus_surface(term: &str) -> String {
    surface_form(term)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Exact-hit confidence: 0.8 base, up to +0.2 for repeated inserts,
/// -0.1 for terms shorter than three characters.
fn confidence_for(term: &str, node: &TrieNode) -> f64 {
    let bonus = (FREQUENCY_BONUS * f64::from(node.frequency())).min(MAX_FREQUENCY_BONUS);
    let penalty = if term.chars().count() < SHORT_TERM_LEN {
        SHORT_TERM_PENALTY
    } else {
        0.0
    };
    (BASE_CONFIDENCE + bonus - penalty).min(1.0)
}
