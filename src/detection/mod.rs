// Detection pipeline — ordered strategies, context heuristics and scoring.
//
// The default chain, strongest evidence first: exact, phonetic (advisory),
// obfuscation, Levenshtein, fuzzy. The safe-word guard always runs ahead
// of it.

pub mod context;
pub mod detector;
pub mod scoring;
pub mod strategies;
pub mod strategy;

use std::sync::Arc;

use crate::lexicon::Lexicon;

pub use detector::{Detector, DetectorBuilder, StrategyTrace};
pub use scoring::DetectionWeights;
pub use strategy::{DetectionStrategy, TokenContext};

use strategies::{ExactMatch, FuzzyMatch, LevenshteinMatch, ObfuscationMatch, PhoneticMatch};

/// The standard matcher chain over `lexicon`.
pub fn default_matchers(
    lexicon: &Arc<Lexicon>,
    weights: &DetectionWeights,
) -> Vec<Box<dyn DetectionStrategy>> {
    vec![
        Box::new(ExactMatch::new(Arc::clone(lexicon), weights)),
        Box::new(PhoneticMatch::new(Arc::clone(lexicon), weights)),
        Box::new(ObfuscationMatch::new(Arc::clone(lexicon), weights)),
        Box::new(LevenshteinMatch::new(Arc::clone(lexicon), weights)),
        Box::new(FuzzyMatch::new(Arc::clone(lexicon), weights)),
    ]
}
