use crate::pipeline::traits::ScoreFunction;
use crate::types::{MatchChunk, TimedChunk};

/// Index and score of the best scoring non-blank candidate.
///
/// A later candidate replaces the current best only with a strictly higher
/// score, so the first of several equal scores wins. NaN scores never win.
pub(crate) fn select_best<C: TimedChunk>(
    search_text: &str,
    candidates: &[C],
    scorer: &dyn ScoreFunction,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        if candidate.text().trim().is_empty() {
            continue;
        }
        let score = scorer.score(search_text, candidate.text());
        if score.is_nan() {
            tracing::warn!(candidate = idx, "selection: scorer returned NaN, skipping");
            continue;
        }
        match best {
            None => best = Some((idx, score)),
            Some((_, best_score)) if score > best_score => best = Some((idx, score)),
            Some(_) => {}
        }
    }
    best
}

pub(crate) fn to_match<C: TimedChunk>(
    chunk: &C,
    score: f64,
    candidate_index: usize,
) -> MatchChunk {
    MatchChunk {
        id: chunk.id().clone(),
        text: chunk.text().to_string(),
        start: chunk.start(),
        end: chunk.end(),
        score,
        candidate_index,
    }
}
