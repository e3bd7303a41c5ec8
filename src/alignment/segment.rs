use super::selection::{select_best, to_match};
use crate::pipeline::traits::ScoreFunction;
use crate::types::{MatchChunk, TimedChunk};

/// Coarse pass result: independent best matches for the paragraph's leading
/// and trailing words, plus the provisional span they imply.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentAlignment {
    pub start_match: Option<MatchChunk>,
    pub end_match: Option<MatchChunk>,
    pub start: f64,
    pub end: f64,
}

impl SegmentAlignment {
    pub fn is_matched(&self) -> bool {
        self.start_match.is_some() || self.end_match.is_some()
    }
}

pub struct SegmentAligner {
    scorer: Box<dyn ScoreFunction>,
}

impl SegmentAligner {
    pub fn new(scorer: Box<dyn ScoreFunction>) -> Self {
        Self { scorer }
    }

    /// Best matching chunk for `search_text`, or `None` when the search text
    /// is blank or no candidate has text and a usable score.
    pub fn find_best_segment<C: TimedChunk>(
        &self,
        search_text: &str,
        candidates: &[C],
    ) -> Option<MatchChunk> {
        if candidates.is_empty() || search_text.trim().is_empty() {
            return None;
        }
        let (idx, score) = select_best(search_text, candidates, self.scorer.as_ref())?;
        Some(to_match(&candidates[idx], score, idx))
    }

    pub fn align<C: TimedChunk>(
        &self,
        paragraph: &str,
        candidates: &[C],
        search_words: usize,
    ) -> Option<SegmentAlignment> {
        if candidates.is_empty() || paragraph.trim().is_empty() {
            return None;
        }

        let head = leading_words(paragraph, search_words);
        let tail = trailing_words(paragraph, search_words);
        let start_match = self.find_best_segment(&head, candidates);
        let end_match = self.find_best_segment(&tail, candidates);

        tracing::debug!(
            start_id = ?start_match.as_ref().map(|m| m.id.to_string()),
            start_score = ?start_match.as_ref().map(|m| m.score),
            end_id = ?end_match.as_ref().map(|m| m.id.to_string()),
            end_score = ?end_match.as_ref().map(|m| m.score),
            "segments: coarse match"
        );

        Some(SegmentAlignment {
            start: start_match.as_ref().map_or(0.0, |m| m.start),
            end: end_match.as_ref().map_or(0.0, |m| m.end),
            start_match,
            end_match,
        })
    }
}

/// First `n` whitespace separated words, joined by single spaces.
pub fn leading_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

/// Last `n` whitespace separated words, joined by single spaces.
pub fn trailing_words(text: &str, n: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    words[words.len().saturating_sub(n)..].join(" ")
}
