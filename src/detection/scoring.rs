// Detection weights and document-level aggregation.
//
// Each strategy discounts the lexicon's confidence by its own weight, so a
// verbatim hit always outranks the same term found through rewriting or
// approximate matching. The document score is the mean flagged-token
// confidence, amplified by how much of the text was flagged.

use crate::models::clamp_unit;

/// Configurable weights and thresholds for the detection pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionWeights {
    /// Multiplier on exact lexicon hits (default 1.0)
    pub exact: f64,
    /// Multiplier on phonetic hits (default 0.85)
    pub phonetic: f64,
    /// Multiplier on hits found after deobfuscation (default 0.90)
    pub obfuscation: f64,
    /// How strongly the obfuscation score discounts a hit (default 0.3).
    /// A fully disguised token keeps 70% of its confidence.
    pub obfuscation_penalty: f64,
    /// Multiplier on edit-distance confirmed hits (default 0.75)
    pub levenshtein: f64,
    /// Multiplier on fuzzy trie hits (default 0.70)
    pub fuzzy: f64,
    /// Confidence reduction when a negation word is nearby (default 0.3)
    pub negation_penalty: f64,
    /// Largest edit distance accepted by the Levenshtein strategy (default 2)
    pub max_levenshtein_distance: usize,
    /// Edit bound for fuzzy trie search (default 3)
    pub fuzzy_max_distance: usize,
    /// Minimum similarity for Levenshtein candidates (default 0.7)
    pub similarity_threshold: f64,
    /// Minimum similarity between a token and its phonetic match (default 0.6)
    pub phonetic_min_similarity: f64,
    /// Shortest token considered for phonetic matching (default 3)
    pub min_phonetic_len: usize,
    /// Tokens below this confidence are not flagged (default 0.5)
    pub min_token_confidence: f64,
    /// Radius for safe-word and negation context (default 2)
    pub context_window: usize,
    /// Cap on the flagged-density amplifier (default 1.5)
    pub max_density_multiplier: f64,
}

impl Default for DetectionWeights {
    fn default() -> Self {
        Self {
            exact: 1.0,
            phonetic: 0.85,
            obfuscation: 0.90,
            obfuscation_penalty: 0.3,
            levenshtein: 0.75,
            fuzzy: 0.70,
            negation_penalty: 0.3,
            max_levenshtein_distance: 2,
            fuzzy_max_distance: 3,
            similarity_threshold: 0.7,
            phonetic_min_similarity: 0.6,
            min_phonetic_len: 3,
            min_token_confidence: 0.5,
            context_window: 2,
            max_density_multiplier: 1.5,
        }
    }
}

impl DetectionWeights {
    /// Whether a token at `confidence` counts as flagged.
    pub fn is_flagged(&self, confidence: f64) -> bool {
        confidence > 0.0 && confidence >= self.min_token_confidence
    }
}

/// Combine flagged token confidences into a document confidence.
///
/// `mean(flagged) * min(max_density_multiplier, 1 + flagged / total)`,
/// clamped to [0, 1]. No flagged tokens means 0.0.
pub fn aggregate(flagged: &[f64], total_tokens: usize, weights: &DetectionWeights) -> f64 {
    if flagged.is_empty() || total_tokens == 0 {
        return 0.0;
    }
    let mean = flagged.iter().sum::<f64>() / flagged.len() as f64;
    let density = flagged.len() as f64 / total_tokens as f64;
    let multiplier = (1.0 + density).min(weights.max_density_multiplier);
    clamp_unit(mean * multiplier)
}
