// Data models — the values that flow between the lexicon, the detection
// strategies and the caller.
//
// Every confidence stored in these types is clamped to [0, 1] at
// construction, so downstream code never has to re-check the range.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outcome of a single lookup or detection strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub is_offensive: bool,
    /// Certainty of the outcome, 0.0 to 1.0
    pub confidence: f64,
    /// What produced the result (e.g. "exact:idiot", "No match")
    pub label: String,
}

impl DetectionResult {
    pub fn new(is_offensive: bool, confidence: f64, label: impl Into<String>) -> Self {
        Self {
            is_offensive,
            confidence: clamp_unit(confidence),
            label: label.into(),
        }
    }

    /// A positive result at the given confidence.
    pub fn matched(confidence: f64, label: impl Into<String>) -> Self {
        Self::new(true, confidence, label)
    }

    /// A negative, zero-confidence result.
    pub fn miss(label: impl Into<String>) -> Self {
        Self::new(false, 0.0, label)
    }

    /// Multiply the confidence by `factor`, keeping it in range.
    pub fn scaled(mut self, factor: f64) -> Self {
        self.confidence = clamp_unit(self.confidence * factor);
        self
    }
}

/// Per-call analysis options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeOptions {
    /// Minimum aggregated confidence for an offensive verdict (default 0.7)
    pub confidence_threshold: f64,
    /// Include the per-term breakdown in the response (default true)
    pub return_details: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            return_details: true,
        }
    }
}

impl AnalyzeOptions {
    pub fn with_threshold(confidence_threshold: f64) -> Self {
        Self {
            confidence_threshold,
            ..Self::default()
        }
    }
}

pub const MESSAGE_EMPTY: &str = "Empty input";
pub const MESSAGE_OFFENSIVE: &str = "Offensive terms found";
pub const MESSAGE_CLEAN: &str = "Clean";

/// The externally visible classification of one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResponse {
    pub is_offensive: bool,
    pub confidence: f64,
    pub message: String,
    /// Flagged tokens and their confidences, ordered by token
    pub offensive_terms: BTreeMap<String, f64>,
}

impl ModerationResponse {
    pub fn new(
        is_offensive: bool,
        confidence: f64,
        message: impl Into<String>,
        offensive_terms: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            is_offensive,
            confidence: clamp_unit(confidence),
            message: message.into(),
            offensive_terms,
        }
    }

    /// Response for blank input.
    pub fn empty() -> Self {
        Self::new(false, 0.0, MESSAGE_EMPTY, BTreeMap::new())
    }
}

/// Clamp to [0, 1]. NaN maps to 0.0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(DetectionResult::matched(1.7, "x").confidence, 1.0);
        assert_eq!(DetectionResult::matched(-0.2, "x").confidence, 0.0);
        assert_eq!(DetectionResult::matched(f64::NAN, "x").confidence, 0.0);
    }

    #[test]
    fn test_scaled_stays_in_range() {
        let r = DetectionResult::matched(0.8, "exact").scaled(0.5);
        assert!((r.confidence - 0.4).abs() < 1e-9);
        let r = DetectionResult::matched(0.8, "exact").scaled(3.0);
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn test_empty_response() {
        let resp = ModerationResponse::empty();
        assert!(!resp.is_offensive);
        assert_eq!(resp.confidence, 0.0);
        assert_eq!(resp.message, MESSAGE_EMPTY);
        assert!(resp.offensive_terms.is_empty());
    }

    #[test]
    fn test_response_serializes_terms_in_key_order() {
        let mut terms = BTreeMap::new();
        terms.insert("zeta".to_string(), 0.9);
        terms.insert("alpha".to_string(), 0.8);
        let resp = ModerationResponse::new(true, 0.85, MESSAGE_OFFENSIVE, terms);
        let json = serde_json::to_string(&resp).unwrap();
        let alpha = json.find("alpha").unwrap();
        let zeta = json.find("zeta").unwrap();
        assert!(alpha < zeta, "terms should serialize in key order: {json}");
    }
}
