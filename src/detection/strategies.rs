// Built-in detection strategies, in chain order.
//
// Positive results are labelled "<strategy>:<term>". Confidences are the
// lexicon confidence of the matched term discounted by the strategy weight.

use std::sync::Arc;

use crate::lexicon::{soundex, Lexicon};
use crate::models::DetectionResult;
use crate::normalizer::TokenForm;
use crate::obfuscation;
use crate::similarity::{edit_distance, rank_similar, similarity};

use super::scoring::DetectionWeights;
use super::strategy::{DetectionStrategy, TokenContext};

fn label(strategy: &str, term: &str) -> String {
    format!("{strategy}:{term}")
}

/// Clears any token with a safe-listed word in its context window.
pub struct SafeWordBypass {
    safe: Arc<Lexicon>,
    radius: usize,
}

impl SafeWordBypass {
    pub fn new(safe: Arc<Lexicon>, radius: usize) -> Self {
        Self { safe, radius }
    }
}

impl DetectionStrategy for SafeWordBypass {
    fn name(&self) -> &'static str {
        "safe"
    }

    fn attempt(&self, _token: &TokenForm, context: &TokenContext<'_>) -> Option<DetectionResult> {
        if self.safe.is_empty() {
            return None;
        }
        context
            .window(self.radius)
            .iter()
            .find(|t| self.safe.contains(&t.normalized).is_offensive)
            .map(|t| DetectionResult::miss(label(self.name(), &t.normalized)))
    }
}

/// Verbatim lexicon hit.
///
/// Declines tokens the normalizer rewrote, so "1d10t" is scored by the
/// obfuscation strategy rather than at full exact confidence. A rewritten
/// token still matches when it is spelled exactly as its corpus entry.
pub struct ExactMatch {
    lexicon: Arc<Lexicon>,
    weight: f64,
}

impl ExactMatch {
    pub fn new(lexicon: Arc<Lexicon>, weights: &DetectionWeights) -> Self {
        Self {
            lexicon,
            weight: weights.exact,
        }
    }
}

impl DetectionStrategy for ExactMatch {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn attempt(&self, token: &TokenForm, _context: &TokenContext<'_>) -> Option<DetectionResult> {
        if token.was_rewritten()
            && self.lexicon.term_for_surface(&token.surface).as_deref()
                != Some(token.normalized.as_str())
        {
            return None;
        }
        let hit = self.lexicon.contains(&token.normalized);
        hit.is_offensive.then(|| {
            DetectionResult::matched(
                self.weight * hit.confidence,
                label(self.name(), &token.normalized),
            )
        })
    }
}

/// Sound-alike hit on the most similarly spelled member of the token's
/// phonetic group, gated on that similarity. Advisory.
pub struct PhoneticMatch {
    lexicon: Arc<Lexicon>,
    weight: f64,
    min_similarity: f64,
    min_len: usize,
}

impl PhoneticMatch {
    pub fn new(lexicon: Arc<Lexicon>, weights: &DetectionWeights) -> Self {
        Self {
            lexicon,
            weight: weights.phonetic,
            min_similarity: weights.phonetic_min_similarity,
            min_len: weights.min_phonetic_len,
        }
    }
}

impl DetectionStrategy for PhoneticMatch {
    fn name(&self) -> &'static str {
        "phonetic"
    }

    fn attempt(&self, token: &TokenForm, _context: &TokenContext<'_>) -> Option<DetectionResult> {
        let word = &token.normalized;
        if word.chars().count() < self.min_len {
            return None;
        }
        let code = soundex(word);
        if code.is_empty() {
            return None;
        }

        // Group is sorted, so the first term wins a similarity tie
        let (score, term) = self
            .lexicon
            .phonetic_group(&code)
            .into_iter()
            .map(|term| (similarity(word, &term), term))
            .fold(None::<(f64, String)>, |best, candidate| match best {
                Some(current) if current.0 >= candidate.0 => Some(current),
                _ => Some(candidate),
            })?;
        if score < self.min_similarity {
            return None;
        }
        let confidence = self.lexicon.phonetic_confidence(&term);
        (confidence > 0.0).then(|| {
            DetectionResult::matched(self.weight * confidence, label(self.name(), &term))
        })
    }

    fn is_conclusive(&self) -> bool {
        false
    }
}

/// Hit found after undoing separators, leetspeak and interleaving.
pub struct ObfuscationMatch {
    lexicon: Arc<Lexicon>,
    weight: f64,
    penalty: f64,
}

impl ObfuscationMatch {
    pub fn new(lexicon: Arc<Lexicon>, weights: &DetectionWeights) -> Self {
        Self {
            lexicon,
            weight: weights.obfuscation,
            penalty: weights.obfuscation_penalty,
        }
    }

    fn candidates(token: &TokenForm) -> Vec<String> {
        let mut out = Vec::new();
        if token.was_rewritten() {
            out.push(token.normalized.clone());
        }
        for candidate in obfuscation::candidates(&token.normalized) {
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        }
        out
    }
}

impl DetectionStrategy for ObfuscationMatch {
    fn name(&self) -> &'static str {
        "obfuscation"
    }

    fn attempt(&self, token: &TokenForm, _context: &TokenContext<'_>) -> Option<DetectionResult> {
        Self::candidates(token).into_iter().find_map(|candidate| {
            if candidate == token.surface {
                return None;
            }
            let hit = self.lexicon.contains(&candidate);
            if !hit.is_offensive {
                return None;
            }
            let score = obfuscation::obfuscation_score(&token.surface, &candidate);
            let confidence = self.weight * hit.confidence * (1.0 - self.penalty * score);
            Some(DetectionResult::matched(
                confidence,
                label(self.name(), &candidate),
            ))
        })
    }
}

/// Near-spelling of a term, confirmed by a bounded edit distance.
pub struct LevenshteinMatch {
    lexicon: Arc<Lexicon>,
    weight: f64,
    threshold: f64,
    max_distance: usize,
}

impl LevenshteinMatch {
    pub fn new(lexicon: Arc<Lexicon>, weights: &DetectionWeights) -> Self {
        Self {
            lexicon,
            weight: weights.levenshtein,
            threshold: weights.similarity_threshold,
            max_distance: weights.max_levenshtein_distance,
        }
    }
}

impl DetectionStrategy for LevenshteinMatch {
    fn name(&self) -> &'static str {
        "levenshtein"
    }

    fn attempt(&self, token: &TokenForm, _context: &TokenContext<'_>) -> Option<DetectionResult> {
        let word = &token.normalized;
        rank_similar(word, self.lexicon.term_snapshot().iter(), self.threshold)
            .into_iter()
            .find(|(term, _)| edit_distance(word, term, self.max_distance) <= self.max_distance)
            .map(|(term, score)| {
                DetectionResult::matched(self.weight * score, label(self.name(), &term))
            })
    }
}

/// Closest term reachable within the fuzzy edit bound.
pub struct FuzzyMatch {
    lexicon: Arc<Lexicon>,
    weight: f64,
    max_distance: usize,
}

impl FuzzyMatch {
    pub fn new(lexicon: Arc<Lexicon>, weights: &DetectionWeights) -> Self {
        Self {
            lexicon,
            weight: weights.fuzzy,
            max_distance: weights.fuzzy_max_distance,
        }
    }
}

impl DetectionStrategy for FuzzyMatch {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn attempt(&self, token: &TokenForm, _context: &TokenContext<'_>) -> Option<DetectionResult> {
        self.lexicon
            .fuzzy_search(&token.normalized, self.max_distance)
            .into_iter()
            .next()
            .filter(|best| best.is_offensive)
            .map(|best| {
                DetectionResult::matched(
                    self.weight * best.confidence,
                    label(self.name(), &best.label),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::Normalizer;

    fn lexicon(terms: &[&str]) -> Arc<Lexicon> {
        Arc::new(Lexicon::from_terms(terms.iter().copied(), Normalizer::default()))
    }

    fn token(raw: &str) -> TokenForm {
        Normalizer::default()
            .analysis_tokens(raw)
            .into_iter()
            .next()
            .unwrap()
    }

    fn run(strategy: &dyn DetectionStrategy, raw: &str) -> Option<DetectionResult> {
        let t = token(raw);
        strategy.attempt(&t, &TokenContext::single(&t))
    }

    #[test]
    fn test_exact_match() {
        let s = ExactMatch::new(lexicon(&["idiot"]), &DetectionWeights::default());
        let hit = run(&s, "Idiot").unwrap();
        assert_eq!(hit.label, "exact:idiot");
        assert!((hit.confidence - 0.81).abs() < 1e-9);
        assert!(run(&s, "friend").is_none());
    }

    #[test]
    fn test_exact_declines_rewritten_token() {
        let s = ExactMatch::new(lexicon(&["idiot"]), &DetectionWeights::default());
        assert!(run(&s, "1d10t").is_none());
    }

    #[test]
    fn test_exact_accepts_term_spelled_as_listed() {
        let s = ExactMatch::new(lexicon(&["nympho", "1488"]), &DetectionWeights::default());
        let hit = run(&s, "Nympho").unwrap();
        assert_eq!(hit.label, "exact:nymfo");
        assert!((hit.confidence - 0.81).abs() < 1e-9);
        assert!(run(&s, "1488").unwrap().confidence >= 0.8);
        // A different disguise of the same term is still not exact
        assert!(run(&s, "nymph0").is_none());
    }

    #[test]
    fn test_phonetic_prefers_closest_spelling() {
        let s = PhoneticMatch::new(
            lexicon(&["robert", "robert", "rupert"]),
            &DetectionWeights::default(),
        );
        let hit = run(&s, "rupert").unwrap();
        assert_eq!(hit.label, "phonetic:rupert");
    }

    #[test]
    fn test_phonetic_match_is_advisory() {
        let s = PhoneticMatch::new(lexicon(&["robert"]), &DetectionWeights::default());
        assert!(!s.is_conclusive());
        let hit = run(&s, "rupert").unwrap();
        assert_eq!(hit.label, "phonetic:robert");
        assert!((hit.confidence - 0.85 * 0.85 * 0.81).abs() < 1e-9);
    }

    #[test]
    fn test_phonetic_gated_by_similarity_and_length() {
        let s = PhoneticMatch::new(lexicon(&["stupid"]), &DetectionWeights::default());
        // Same code S313, but spelled too differently
        assert_eq!(soundex("stopped"), soundex("stupid"));
        assert!(run(&s, "stopped").is_none());

        let short = PhoneticMatch::new(lexicon(&["ab"]), &DetectionWeights::default());
        assert!(run(&short, "ap").is_none());
    }

    #[test]
    fn test_obfuscation_leet_scores_below_exact() {
        let lex = lexicon(&["idiot"]);
        let s = ObfuscationMatch::new(Arc::clone(&lex), &DetectionWeights::default());
        let hit = run(&s, "1d10t").unwrap();
        assert_eq!(hit.label, "obfuscation:idiot");
        assert!(hit.confidence < lex.contains("idiot").confidence);
    }

    #[test]
    fn test_obfuscation_separators_and_interleave() {
        let s = ObfuscationMatch::new(lexicon(&["jerk"]), &DetectionWeights::default());
        let spaced = run(&s, "j.e.r.k").unwrap();
        assert_eq!(spaced.label, "obfuscation:jerk");
        // 3 separators of 7, length 4 of 7 retained
        let score = (3.0 / 7.0 + 3.0 / 7.0) / 3.0;
        let expected = 0.9 * 0.81 * (1.0 - 0.3 * score);
        assert!((spaced.confidence - expected).abs() < 1e-9);

        let interleaved = run(&s, "jxexrxk").unwrap();
        assert_eq!(interleaved.label, "obfuscation:jerk");
    }

    #[test]
    fn test_obfuscation_ignores_plain_tokens() {
        let s = ObfuscationMatch::new(lexicon(&["jerk"]), &DetectionWeights::default());
        assert!(run(&s, "jerk").is_none());
    }

    #[test]
    fn test_levenshtein_confirmed() {
        let s = LevenshteinMatch::new(lexicon(&["idiot", "moron"]), &DetectionWeights::default());
        let hit = run(&s, "idiots").unwrap();
        assert_eq!(hit.label, "levenshtein:idiot");
        assert!((hit.confidence - 0.75 * (1.0 - 1.0 / 6.0)).abs() < 1e-9);
        assert!(run(&s, "banana").is_none());
    }

    #[test]
    fn test_fuzzy_best_result() {
        let s = FuzzyMatch::new(lexicon(&["stupid"]), &DetectionWeights::default());
        let hit = run(&s, "stoopid").unwrap();
        assert_eq!(hit.label, "fuzzy:stupid");
        assert!(run(&s, "hello").is_none());
    }

    #[test]
    fn test_safe_word_window() {
        let safe = lexicon(&["scunthorpe"]);
        let guard = SafeWordBypass::new(safe, 2);
        let tokens = Normalizer::default().analysis_tokens("visiting scunthorpe town hall today");
        let hit = guard.attempt(&tokens[2], &TokenContext::new(&tokens, 2)).unwrap();
        assert!(!hit.is_offensive);
        assert_eq!(hit.label, "safe:scunthorpe");
        assert!(guard.attempt(&tokens[4], &TokenContext::new(&tokens, 4)).is_none());
    }

    #[test]
    fn test_safe_word_empty_lexicon() {
        let guard = SafeWordBypass::new(Arc::new(Lexicon::default()), 2);
        assert!(run(&guard, "anything").is_none());
    }
}
