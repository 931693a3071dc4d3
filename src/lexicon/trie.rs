// Concurrent character trie.
//
// Child maps are DashMaps and node scalars are atomics, so a term can be
// appended while other threads read. Children are held by Arc; traversals
// clone the child handle and release the shard guard before descending,
// which keeps every walk iterative and guard-free across frames.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

pub const DEFAULT_SEVERITY: f64 = 1.0;
pub const MIN_SEVERITY: f64 = 0.1;
pub const MAX_SEVERITY: f64 = 10.0;
pub const HIGH_SEVERITY: f64 = 2.0;

/// A single trie node.
pub struct TrieNode {
    children: DashMap<char, Arc<TrieNode>>,
    end_of_word: AtomicBool,
    frequency: AtomicU32,
    severity_bits: AtomicU64,
    phonetic_code: OnceLock<String>,
}

impl Default for TrieNode {
    fn default() -> Self {
        Self {
            children: DashMap::new(),
            end_of_word: AtomicBool::new(false),
            frequency: AtomicU32::new(0),
            severity_bits: AtomicU64::new(DEFAULT_SEVERITY.to_bits()),
            phonetic_code: OnceLock::new(),
        }
    }
}

impl TrieNode {
    pub fn is_end_of_word(&self) -> bool {
        self.end_of_word.load(Ordering::Acquire)
    }

    pub fn frequency(&self) -> u32 {
        self.frequency.load(Ordering::Acquire)
    }

    pub fn phonetic_code(&self) -> &str {
        self.phonetic_code.get().map(String::as_str).unwrap_or("")
    }

    pub fn severity(&self) -> f64 {
        f64::from_bits(self.severity_bits.load(Ordering::Acquire))
    }

    /// Set the severity weight, clamped to [0.1, 10.0].
    pub fn set_severity(&self, severity: f64) {
        let clamped = if severity.is_nan() {
            DEFAULT_SEVERITY
        } else {
            severity.clamp(MIN_SEVERITY, MAX_SEVERITY)
        };
        self.severity_bits.store(clamped.to_bits(), Ordering::Release);
    }

    pub fn is_high_severity(&self) -> bool {
        self.severity() >= HIGH_SEVERITY
    }

    fn child(&self, c: char) -> Option<Arc<TrieNode>> {
        self.children.get(&c).map(|child| Arc::clone(child.value()))
    }

    fn child_or_insert(&self, c: char) -> Arc<TrieNode> {
        let entry = self.children.entry(c).or_default();
        Arc::clone(entry.value())
    }

    /// Children in character order, so traversals are deterministic.
    fn sorted_children(&self) -> Vec<(char, Arc<TrieNode>)> {
        let mut children: Vec<(char, Arc<TrieNode>)> = self
            .children
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        children.sort_unstable_by_key(|(c, _)| *c);
        children
    }
}

/// A term within reach of a fuzzy query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyHit {
    pub term: String,
    pub distance: usize,
}

/// Rooted character trie.
#[derive(Default)]
pub struct Trie {
    root: Arc<TrieNode>,
    words: AtomicUsize,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `term`, creating nodes as needed, and return its terminal
    /// node. Repeated inserts bump the frequency. The phonetic code of the
    /// first insert is kept. Returns None for an empty term.
    pub fn insert(&self, term: &str, phonetic_code: &str) -> Option<Arc<TrieNode>> {
        if term.is_empty() {
            return None;
        }

        let mut current = Arc::clone(&self.root);
        for c in term.chars() {
            let next = current.child_or_insert(c);
            current = next;
        }

        let _ = current.phonetic_code.set(phonetic_code.to_string());
        // Frequency first: readers that observe end_of_word must see >= 1
        if current.frequency.fetch_add(1, Ordering::AcqRel) == 0 {
            self.words.fetch_add(1, Ordering::Relaxed);
        }
        current.end_of_word.store(true, Ordering::Release);
        Some(current)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.words.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Node reached by following `path`, if any.
    pub fn find(&self, path: &str) -> Option<Arc<TrieNode>> {
        let mut current = Arc::clone(&self.root);
        for c in path.chars() {
            current = current.child(c)?;
        }
        Some(current)
    }

    /// Terminal node for `term`, if it was inserted.
    pub fn find_word(&self, term: &str) -> Option<Arc<TrieNode>> {
        if term.is_empty() {
            return None;
        }
        self.find(term).filter(|node| node.is_end_of_word())
    }

    /// Every inserted term.
    pub fn all_words(&self) -> BTreeSet<String> {
        let mut words = BTreeSet::new();
        let mut stack = vec![(Arc::clone(&self.root), String::new())];
        while let Some((node, word)) = stack.pop() {
            if node.is_end_of_word() {
                words.insert(word.clone());
            }
            for (c, child) in node.sorted_children() {
                let mut next = word.clone();
                next.push(c);
                stack.push((child, next));
            }
        }
        words
    }

    /// Up to `max` terms starting with `prefix`, in lexicographic order.
    pub fn words_with_prefix(&self, prefix: &str, max: usize) -> Vec<String> {
        let mut results = Vec::new();
        let Some(start) = self.find(prefix) else {
            return results;
        };

        let mut stack = vec![(start, prefix.to_string())];
        while let Some((node, word)) = stack.pop() {
            if results.len() >= max {
                break;
            }
            if node.is_end_of_word() {
                results.push(word.clone());
            }
            // Reverse so the smallest character is popped first
            for (c, child) in node.sorted_children().into_iter().rev() {
                let mut next = word.clone();
                next.push(c);
                stack.push((child, next));
            }
        }
        results
    }

    /// Terms within `max_distance` edits of `query`.
    ///
    /// Depth-first walk carrying one Levenshtein row per frame. The row
    /// minimum is the best distance any extension of the current prefix can
    /// reach, so a branch is dropped as soon as it exceeds the bound.
    pub fn fuzzy(&self, query: &str, max_distance: usize) -> Vec<FuzzyHit> {
        let query: Vec<char> = query.chars().collect();
        let first_row: Vec<usize> = (0..=query.len()).collect();

        let mut hits = Vec::new();
        let mut stack = vec![(Arc::clone(&self.root), String::new(), first_row)];

        while let Some((node, word, row)) = stack.pop() {
            let distance = row[query.len()];
            if node.is_end_of_word() && distance <= max_distance {
                hits.push(FuzzyHit {
                    term: word.clone(),
                    distance,
                });
            }

            for (c, child) in node.sorted_children() {
                let mut next_row = Vec::with_capacity(row.len());
                next_row.push(row[0] + 1);
                for j in 1..=query.len() {
                    let cost = usize::from(query[j - 1] != c);
                    let value = (next_row[j - 1] + 1)
                        .min(row[j] + 1)
                        .min(row[j - 1] + cost);
                    next_row.push(value);
                }

                let running = next_row.iter().copied().min().unwrap_or(usize::MAX);
                if running <= max_distance {
                    let mut next_word = word.clone();
                    next_word.push(c);
                    stack.push((child, next_word, next_row));
                }
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie_with(words: &[&str]) -> Trie {
        let trie = Trie::new();
        for w in words {
            trie.insert(w, "");
        }
        trie
    }

    #[test]
    fn test_insert_marks_end_and_frequency() {
        let trie = trie_with(&["cat", "cat", "car"]);
        let cat = trie.find_word("cat").unwrap();
        assert_eq!(cat.frequency(), 2);
        assert_eq!(trie.find_word("car").unwrap().frequency(), 1);
        // Interior node is not a word
        assert!(trie.find_word("ca").is_none());
        assert!(trie.find("ca").is_some());
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn test_empty_term_rejected() {
        let trie = Trie::new();
        assert!(trie.insert("", "").is_none());
        assert!(trie.all_words().is_empty());
        assert!(trie.find_word("").is_none());
    }

    #[test]
    fn test_phonetic_code_kept_from_first_insert() {
        let trie = Trie::new();
        trie.insert("robert", "R163");
        trie.insert("robert", "XXXX");
        assert_eq!(trie.find_word("robert").unwrap().phonetic_code(), "R163");
    }

    #[test]
    fn test_severity_clamped() {
        let trie = trie_with(&["slur"]);
        let node = trie.find_word("slur").unwrap();
        assert_eq!(node.severity(), DEFAULT_SEVERITY);
        node.set_severity(50.0);
        assert_eq!(node.severity(), MAX_SEVERITY);
        assert!(node.is_high_severity());
        node.set_severity(0.0);
        assert_eq!(node.severity(), MIN_SEVERITY);
    }

    #[test]
    fn test_all_words() {
        let trie = trie_with(&["b", "ab", "abc", "abd"]);
        let words: Vec<String> = trie.all_words().into_iter().collect();
        assert_eq!(words, vec!["ab", "abc", "abd", "b"]);
    }

    #[test]
    fn test_words_with_prefix_ordered_and_capped() {
        let trie = trie_with(&["dumb", "dumbass", "dummy", "dull", "stupid"]);
        assert_eq!(trie.words_with_prefix("dum", 10), vec!["dumb", "dumbass", "dummy"]);
        assert_eq!(trie.words_with_prefix("du", 2), vec!["dull", "dumb"]);
        assert!(trie.words_with_prefix("x", 5).is_empty());
    }

    #[test]
    fn test_fuzzy_finds_within_bound() {
        let trie = trie_with(&["idiot", "idiom", "stupid"]);
        let mut hits = trie.fuzzy("idiat", 1);
        hits.sort_by(|a, b| a.term.cmp(&b.term));
        assert_eq!(
            hits,
            vec![FuzzyHit {
                term: "idiot".to_string(),
                distance: 1
            }]
        );
    }

    #[test]
    fn test_fuzzy_long_query_not_pruned_at_root() {
        // A long query is far from every short prefix in absolute terms;
        // row-minimum pruning must still reach the matching word.
        let trie = trie_with(&["abcdefgh"]);
        let hits = trie.fuzzy("abcdefgx", 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance, 1);
    }

    #[test]
    fn test_fuzzy_exact_is_distance_zero() {
        let trie = trie_with(&["jerk"]);
        let hits = trie.fuzzy("jerk", 0);
        assert_eq!(hits[0].distance, 0);
    }
}
