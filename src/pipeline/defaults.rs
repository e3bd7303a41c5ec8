use crate::alignment::scoring::{composite_segment_score, word_window_score};
use crate::pipeline::traits::ScoreFunction;

/// Partial/full/token-set blend used by the coarse segment pass.
pub struct CompositeSegmentScore;

impl ScoreFunction for CompositeSegmentScore {
    fn score(&self, a: &str, b: &str) -> f64 {
        composite_segment_score(a, b)
    }
}

/// Full-string similarity used for short word windows.
pub struct WordWindowScore;

impl ScoreFunction for WordWindowScore {
    fn score(&self, a: &str, b: &str) -> f64 {
        word_window_score(a, b)
    }
}
