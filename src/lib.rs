// Sentinel: lexicon-based offensive content detection
//
// This is the library root. Each module corresponds to a stage of the
// detection pipeline; `detection::Detector` ties them together.

pub mod config;
pub mod detection;
pub mod lexicon;
pub mod models;
pub mod normalizer;
pub mod obfuscation;
pub mod output;
pub mod similarity;

pub use detection::{DetectionWeights, Detector, DetectorBuilder};
pub use models::{AnalyzeOptions, DetectionResult, ModerationResponse};
