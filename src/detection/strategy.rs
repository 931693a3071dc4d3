// Strategy interface — one detection technique per implementation.
//
// The detector holds strategies in an ordered list. Guards run first and
// see the whole token sequence; matchers run after them and must depend
// only on the token itself, because their combined outcome is cached by
// token.

use crate::models::DetectionResult;
use crate::normalizer::TokenForm;

/// A token's position within the analyzed text.
#[derive(Debug, Clone, Copy)]
pub struct TokenContext<'a> {
    pub tokens: &'a [TokenForm],
    pub index: usize,
}

impl<'a> TokenContext<'a> {
    pub fn new(tokens: &'a [TokenForm], index: usize) -> Self {
        Self { tokens, index }
    }

    /// Context for a token analyzed on its own.
    pub fn single(token: &'a TokenForm) -> Self {
        Self {
            tokens: std::slice::from_ref(token),
            index: 0,
        }
    }

    /// Tokens within `radius` positions, including this one.
    pub fn window(&self, radius: usize) -> &'a [TokenForm] {
        let start = self.index.saturating_sub(radius);
        let end = self
            .index
            .saturating_add(radius)
            .saturating_add(1)
            .min(self.tokens.len());
        &self.tokens[start.min(end)..end]
    }

    /// Tokens within `radius` positions, excluding this one.
    pub fn neighbours(&self, radius: usize) -> impl Iterator<Item = &'a TokenForm> + 'a {
        let start = self.index.saturating_sub(radius);
        let index = self.index;
        self.window(radius)
            .iter()
            .enumerate()
            .filter(move |(offset, _)| start + offset != index)
            .map(|(_, token)| token)
    }
}

/// A single detection technique.
pub trait DetectionStrategy: Send + Sync {
    /// Short identifier, used as the label prefix of positive results.
    fn name(&self) -> &'static str;

    /// Try to classify `token`. None means the strategy has nothing to say.
    fn attempt(&self, token: &TokenForm, context: &TokenContext<'_>) -> Option<DetectionResult>;

    /// Whether a positive result ends the chain. Advisory strategies return
    /// false: their match is kept only until something stronger is found.
    fn is_conclusive(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<TokenForm> {
        words
            .iter()
            .map(|w| TokenForm {
                surface: w.to_string(),
                normalized: w.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_window_clamped_at_edges() {
        let toks = tokens(&["a", "b", "c", "d", "e"]);
        let first = TokenContext::new(&toks, 0);
        assert_eq!(first.window(2).len(), 3);
        let middle = TokenContext::new(&toks, 2);
        assert_eq!(middle.window(2).len(), 5);
        let last = TokenContext::new(&toks, 4);
        assert_eq!(last.window(1).len(), 2);
    }

    #[test]
    fn test_neighbours_exclude_self() {
        let toks = tokens(&["a", "b", "c"]);
        let ctx = TokenContext::new(&toks, 1);
        let words: Vec<&str> = ctx.neighbours(2).map(|t| t.surface.as_str()).collect();
        assert_eq!(words, vec!["a", "c"]);
    }

    #[test]
    fn test_single_context() {
        let toks = tokens(&["solo"]);
        let ctx = TokenContext::single(&toks[0]);
        assert_eq!(ctx.window(2).len(), 1);
        assert_eq!(ctx.neighbours(2).count(), 0);
    }
}
