use crate::alignment::segment::SegmentAligner;
use crate::alignment::word::WordAligner;
use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::pipeline::defaults::{CompositeSegmentScore, WordWindowScore};
use crate::pipeline::runtime::{ParagraphAligner, ParagraphAlignerParts};
use crate::pipeline::traits::ScoreFunction;

pub struct ParagraphAlignerBuilder {
    config: AlignerConfig,
    segment_scorer: Option<Box<dyn ScoreFunction>>,
    word_scorer: Option<Box<dyn ScoreFunction>>,
}

impl ParagraphAlignerBuilder {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            segment_scorer: None,
            word_scorer: None,
        }
    }

    pub fn with_segment_scorer(mut self, segment_scorer: Box<dyn ScoreFunction>) -> Self {
        self.segment_scorer = Some(segment_scorer);
        self
    }

    pub fn with_word_scorer(mut self, word_scorer: Box<dyn ScoreFunction>) -> Self {
        self.word_scorer = Some(word_scorer);
        self
    }

    pub fn build(self) -> Result<ParagraphAligner, AlignmentError> {
        self.config.validate()?;

        let segment_scorer = self
            .segment_scorer
            .unwrap_or_else(|| Box::new(CompositeSegmentScore));
        let word_scorer = self
            .word_scorer
            .unwrap_or_else(|| Box::new(WordWindowScore));
        let word_window_size = self.config.word_window_size;

        Ok(ParagraphAligner::from_parts(ParagraphAlignerParts {
            config: self.config,
            segment_aligner: SegmentAligner::new(segment_scorer),
            word_aligner: WordAligner::new(word_scorer, word_window_size),
        }))
    }
}

impl Default for ParagraphAlignerBuilder {
    fn default() -> Self {
        Self::new(AlignerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_fuzzy_scorers() {
        let builder = ParagraphAlignerBuilder::default();
        assert!(builder.segment_scorer.is_none());
        assert!(builder.word_scorer.is_none());
        let aligner = builder.build().expect("default config is valid");
        assert_eq!(aligner.config(), &AlignerConfig::default());
    }

    #[test]
    fn build_fails_on_invalid_config() {
        let config = AlignerConfig {
            segment_search_words: 0,
            ..AlignerConfig::default()
        };
        let result = ParagraphAlignerBuilder::new(config).build();
        assert!(matches!(result, Err(AlignmentError::InvalidInput { .. })));
    }

    #[test]
    fn custom_scorers_are_accepted() {
        struct Zero;
        impl ScoreFunction for Zero {
            fn score(&self, _a: &str, _b: &str) -> f64 {
                0.0
            }
        }
        let builder = ParagraphAlignerBuilder::default()
            .with_segment_scorer(Box::new(Zero))
            .with_word_scorer(Box::new(Zero));
        assert!(builder.segment_scorer.is_some());
        assert!(builder.word_scorer.is_some());
        assert!(builder.build().is_ok());
    }
}
