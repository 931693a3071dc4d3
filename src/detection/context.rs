// Context heuristics — signals from the tokens around a match.

use super::strategy::TokenContext;

/// Words that soften or negate a nearby term ("not an idiot").
pub const NEGATION_WORDS: &[&str] = &[
    "not", "never", "without", "except", "but", "neither", "nor", "hardly", "barely",
];

pub fn is_negation(word: &str) -> bool {
    NEGATION_WORDS.contains(&word)
}

/// True when a negation word appears within `radius` tokens of the current
/// one, on either side. Compared on surface forms so that symbol rewriting
/// cannot turn an ordinary word into a negation.
pub fn has_negation_nearby(context: &TokenContext<'_>, radius: usize) -> bool {
    context
        .neighbours(radius)
        .any(|token| is_negation(&token.surface))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::Normalizer;

    #[test]
    fn test_negation_before_within_window() {
        let tokens = Normalizer::default().analysis_tokens("you are not an idiot");
        assert!(has_negation_nearby(&TokenContext::new(&tokens, 4), 2));
    }

    #[test]
    fn test_negation_too_far() {
        let tokens = Normalizer::default().analysis_tokens("not you are an idiot");
        assert!(!has_negation_nearby(&TokenContext::new(&tokens, 4), 2));
    }

    #[test]
    fn test_token_itself_is_not_its_own_context() {
        let tokens = Normalizer::default().analysis_tokens("never");
        assert!(!has_negation_nearby(&TokenContext::new(&tokens, 0), 2));
    }
}
