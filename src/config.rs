use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AlignmentError;

/// What to do when the refined end lands before the refined start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvertedSpanPolicy {
    /// Collapse the span to its start.
    #[default]
    Clamp,
    /// Report the paragraph as failed.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// Leading/trailing paragraph words compared against segments.
    pub segment_search_words: usize,
    /// Same as `segment_search_words`, for subtitle-sourced segments.
    pub subtitle_search_words: usize,
    /// Consecutive words joined into one fine-pass candidate.
    pub word_window_size: usize,
    /// Leading/trailing paragraph words compared against word windows.
    pub word_search_words: usize,
    /// A fine-pass match replaces the coarse one only above this score.
    pub confidence_threshold: f64,
    pub lookback_segments: usize,
    pub lookahead_segments: usize,
    pub inverted_span_policy: InvertedSpanPolicy,
}

impl AlignerConfig {
    pub const DEFAULT_SEGMENT_SEARCH_WORDS: usize = 8;
    pub const DEFAULT_SUBTITLE_SEARCH_WORDS: usize = 5;
    pub const DEFAULT_WORD_WINDOW_SIZE: usize = 3;
    pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;
    pub const DEFAULT_NEIGHBOR_SEGMENTS: usize = 2;

    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read aligner config", e))?;
        serde_json::from_str(&data).map_err(|e| AlignmentError::json("parse aligner config", e))
    }

    pub fn validate(&self) -> Result<(), AlignmentError> {
        let windows = [
            ("segment_search_words", self.segment_search_words),
            ("subtitle_search_words", self.subtitle_search_words),
            ("word_window_size", self.word_window_size),
            ("word_search_words", self.word_search_words),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(AlignmentError::invalid_input(format!(
                    "{name} must be >= 1"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(AlignmentError::invalid_input(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        Ok(())
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            segment_search_words: Self::DEFAULT_SEGMENT_SEARCH_WORDS,
            subtitle_search_words: Self::DEFAULT_SUBTITLE_SEARCH_WORDS,
            word_window_size: Self::DEFAULT_WORD_WINDOW_SIZE,
            word_search_words: Self::DEFAULT_WORD_WINDOW_SIZE,
            confidence_threshold: Self::DEFAULT_CONFIDENCE_THRESHOLD,
            lookback_segments: Self::DEFAULT_NEIGHBOR_SEGMENTS,
            lookahead_segments: Self::DEFAULT_NEIGHBOR_SEGMENTS,
            inverted_span_policy: InvertedSpanPolicy::Clamp,
        }
    }
}
