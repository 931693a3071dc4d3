// Detector — runs the strategy chain over every token and aggregates a
// document verdict.
//
// Per token: guards first (context-aware, never cached), then the matcher
// chain (context-free, cached by surface token), then the negation
// penalty. Flagged tokens feed the document score.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::lexicon::{parse_corpus, parse_entry, CacheStats, CorpusEntry, Lexicon, MatchCache};
use crate::models::{
    AnalyzeOptions, DetectionResult, ModerationResponse, MESSAGE_CLEAN, MESSAGE_OFFENSIVE,
};
use crate::normalizer::{Normalizer, TokenForm, DEFAULT_MAX_REPEATS};

use super::context::has_negation_nearby;
use super::scoring::{aggregate, DetectionWeights};
use super::strategies::SafeWordBypass;
use super::strategy::{DetectionStrategy, TokenContext};
use super::default_matchers;

pub const LABEL_NO_MATCH: &str = "No match";

type MatcherFactory =
    Box<dyn FnOnce(&Arc<Lexicon>, &DetectionWeights) -> Vec<Box<dyn DetectionStrategy>>>;

/// Outcome of one strategy for one token, for inspection.
#[derive(Debug, Clone)]
pub struct StrategyTrace {
    pub strategy: &'static str,
    pub conclusive: bool,
    pub result: Option<DetectionResult>,
}

/// Builder for [`Detector`].
#[derive(Default)]
pub struct DetectorBuilder {
    entries: Vec<CorpusEntry>,
    safe_entries: Vec<CorpusEntry>,
    max_repeats: Option<usize>,
    weights: DetectionWeights,
    matchers: Option<MatcherFactory>,
}

impl DetectorBuilder {
    /// Add offensive terms.
    pub fn terms<S: AsRef<str>>(mut self, terms: impl IntoIterator<Item = S>) -> Self {
        self.entries
            .extend(terms.into_iter().filter_map(|t| parse_entry(t.as_ref())));
        self
    }

    /// Add offensive terms from corpus text (one per line, optional
    /// tab-separated severity).
    pub fn corpus_text(mut self, text: &str) -> Self {
        self.entries.extend(parse_corpus(text));
        self
    }

    /// Add safe-listed terms.
    pub fn safe_terms<S: AsRef<str>>(mut self, terms: impl IntoIterator<Item = S>) -> Self {
        self.safe_entries
            .extend(terms.into_iter().filter_map(|t| parse_entry(t.as_ref())));
        self
    }

    pub fn safe_corpus_text(mut self, text: &str) -> Self {
        self.safe_entries.extend(parse_corpus(text));
        self
    }

    pub fn max_repeats(mut self, max_repeats: usize) -> Self {
        self.max_repeats = Some(max_repeats);
        self
    }

    pub fn weights(mut self, weights: DetectionWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Replace the default matcher chain. The factory receives the built
    /// lexicon and the configured weights.
    pub fn matchers<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&Arc<Lexicon>, &DetectionWeights) -> Vec<Box<dyn DetectionStrategy>> + 'static,
    {
        self.matchers = Some(Box::new(factory));
        self
    }

    /// Build the detector. Fails when the corpus has no usable terms.
    pub fn build(self) -> Result<Detector> {
        let normalizer = Normalizer::new(self.max_repeats.unwrap_or(DEFAULT_MAX_REPEATS));

        let lexicon = Arc::new(Lexicon::from_entries(&self.entries, normalizer));
        if lexicon.is_empty() {
            bail!(
                "Term corpus contains no usable terms ({} entries read).\n\
                 Add one term per line; blank lines and '#' comments are ignored.",
                self.entries.len()
            );
        }
        let safe_lexicon = Arc::new(Lexicon::from_entries(&self.safe_entries, normalizer));

        let guards: Vec<Box<dyn DetectionStrategy>> = vec![Box::new(SafeWordBypass::new(
            Arc::clone(&safe_lexicon),
            self.weights.context_window,
        ))];
        let matchers = match self.matchers {
            Some(factory) => factory(&lexicon, &self.weights),
            None => default_matchers(&lexicon, &self.weights),
        };

        info!(
            terms = lexicon.len(),
            safe_terms = safe_lexicon.len(),
            strategies = matchers.len(),
            max_repeats = normalizer.max_repeats(),
            "Built detector"
        );

        Ok(Detector {
            lexicon,
            safe_lexicon,
            normalizer,
            guards,
            matchers,
            weights: self.weights,
            token_cache: MatchCache::new(),
        })
    }
}

/// Offensive-text classifier. Share it across threads with `Arc`.
pub struct Detector {
    lexicon: Arc<Lexicon>,
    safe_lexicon: Arc<Lexicon>,
    normalizer: Normalizer,
    guards: Vec<Box<dyn DetectionStrategy>>,
    matchers: Vec<Box<dyn DetectionStrategy>>,
    weights: DetectionWeights,
    token_cache: MatchCache,
}

impl Detector {
    pub fn builder() -> DetectorBuilder {
        DetectorBuilder::default()
    }

    /// Detector over `terms` with default settings.
    pub fn from_terms<S: AsRef<str>>(terms: impl IntoIterator<Item = S>) -> Result<Self> {
        Self::builder().terms(terms).build()
    }

    /// Classify `text` with the default options.
    pub fn analyze(&self, text: &str) -> ModerationResponse {
        self.analyze_with(text, &AnalyzeOptions::default())
    }

    /// Classify `text`.
    pub fn analyze_with(&self, text: &str, options: &AnalyzeOptions) -> ModerationResponse {
        let tokens = self.normalizer.analysis_tokens(text);
        if tokens.is_empty() {
            return ModerationResponse::empty();
        }

        let mut flagged = Vec::new();
        let mut terms: BTreeMap<String, f64> = BTreeMap::new();
        for (index, token) in tokens.iter().enumerate() {
            let result = self.score_in_context(&TokenContext::new(&tokens, index));
            if result.is_offensive && self.weights.is_flagged(result.confidence) {
                flagged.push(result.confidence);
                let entry = terms.entry(self.report_form(token)).or_insert(0.0);
                *entry = entry.max(result.confidence);
            }
        }

        let confidence = aggregate(&flagged, tokens.len(), &self.weights);
        let is_offensive = !flagged.is_empty() && confidence >= options.confidence_threshold;
        let message = if is_offensive {
            MESSAGE_OFFENSIVE
        } else {
            MESSAGE_CLEAN
        };
        if !options.return_details {
            terms.clear();
        }

        debug!(
            tokens = tokens.len(),
            flagged = flagged.len(),
            confidence,
            is_offensive,
            "Analyzed text"
        );

        ModerationResponse::new(is_offensive, confidence, message, terms)
    }

    /// Classify each text in order.
    pub fn analyze_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        options: &AnalyzeOptions,
    ) -> Vec<ModerationResponse> {
        texts
            .iter()
            .map(|text| self.analyze_with(text.as_ref(), options))
            .collect()
    }

    /// Score a single word with no surrounding context.
    pub fn score_token(&self, word: &str) -> DetectionResult {
        match self.normalizer.analysis_tokens(word).first() {
            Some(token) => self.score_in_context(&TokenContext::single(token)),
            None => DetectionResult::miss(LABEL_NO_MATCH),
        }
    }

    /// Add an offensive term while the detector is in use. Returns false
    /// when the term has no usable characters.
    pub fn add_term(&self, term: &str) -> bool {
        let Some(stored) = self.lexicon.add_term(term) else {
            return false;
        };
        self.token_cache.clear();
        info!(term = %stored, terms = self.lexicon.len(), "Added term");
        true
    }

    /// Run every guard and matcher on `word` without caching or
    /// short-circuiting, in chain order.
    pub fn explain(&self, word: &str) -> Vec<StrategyTrace> {
        let Some(token) = self.normalizer.analysis_tokens(word).into_iter().next() else {
            return Vec::new();
        };
        let context = TokenContext::single(&token);
        self.guards
            .iter()
            .chain(self.matchers.iter())
            .map(|strategy| StrategyTrace {
                strategy: strategy.name(),
                conclusive: strategy.is_conclusive(),
                result: strategy.attempt(&token, &context),
            })
            .collect()
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn safe_lexicon(&self) -> &Lexicon {
        &self.safe_lexicon
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn weights(&self) -> &DetectionWeights {
        &self.weights
    }

    /// Names of the guards and matchers, in chain order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.guards
            .iter()
            .chain(self.matchers.iter())
            .map(|s| s.name())
            .collect()
    }

    /// Token cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.token_cache.stats()
    }

    /// Key under which a flagged token is reported: its own spelling when
    /// that is how the term is listed, otherwise the normalized form.
    fn report_form(&self, token: &TokenForm) -> String {
        if self.lexicon.term_for_surface(&token.surface).is_some() {
            token.surface.clone()
        } else {
            token.normalized.clone()
        }
    }

    fn score_in_context(&self, context: &TokenContext<'_>) -> DetectionResult {
        let token = &context.tokens[context.index];

        for guard in &self.guards {
            if let Some(result) = guard.attempt(token, context) {
                return result;
            }
        }

        let result = self.match_token(token, context);
        if result.is_offensive && has_negation_nearby(context, self.weights.context_window) {
            return result.scaled(1.0 - self.weights.negation_penalty);
        }
        result
    }

    fn match_token(&self, token: &TokenForm, context: &TokenContext<'_>) -> DetectionResult {
        let generation = self.token_cache.generation();
        if let Some(cached) = self.token_cache.get(&token.surface) {
            return cached;
        }

        let result = self.run_matchers(token, context);
        self.token_cache
            .insert(&token.surface, result.clone(), generation);
        result
    }

    fn run_matchers(&self, token: &TokenForm, context: &TokenContext<'_>) -> DetectionResult {
        let mut best: Option<DetectionResult> = None;
        for matcher in &self.matchers {
            let Some(result) = matcher.attempt(token, context) else {
                continue;
            };
            if !result.is_offensive {
                continue;
            }
            let stronger = best
                .as_ref()
                .map_or(true, |current| result.confidence > current.confidence);
            if stronger {
                best = Some(result);
            }
            if matcher.is_conclusive() {
                break;
            }
        }
        best.unwrap_or_else(|| DetectionResult::miss(LABEL_NO_MATCH))
    }
}
