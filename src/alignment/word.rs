use super::segment::{leading_words, trailing_words};
use super::selection::{select_best, to_match};
use crate::pipeline::traits::ScoreFunction;
use crate::types::{ChunkId, MatchChunk, TimedChunk, WordChunk};

/// Consecutive words merged into one searchable chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct WordWindow {
    pub id: ChunkId,
    pub text: String,
    pub start: f64,
    pub end: f64,
    /// Index of the window's first word in the source word list.
    pub first_word: usize,
}

impl TimedChunk for WordWindow {
    fn id(&self) -> &ChunkId {
        &self.id
    }
    fn text(&self) -> &str {
        &self.text
    }
    fn start(&self) -> f64 {
        self.start
    }
    fn end(&self) -> f64 {
        self.end
    }
}

/// All stride-1 windows of `size` words. Windows touching a blank word are
/// skipped.
pub fn build_windows(words: &[WordChunk], size: usize) -> Vec<WordWindow> {
    if size == 0 {
        return Vec::new();
    }
    words
        .windows(size)
        .enumerate()
        .filter(|(_, window)| window.iter().all(|w| !w.text.trim().is_empty()))
        .map(|(first_word, window)| {
            let text = window
                .iter()
                .map(|w| w.text.trim())
                .collect::<Vec<_>>()
                .join(" ");
            let id = window
                .iter()
                .map(|w| w.id.to_string())
                .collect::<Vec<_>>()
                .join("+");
            WordWindow {
                id: ChunkId::Key(id),
                text,
                start: window[0].start,
                end: window[window.len() - 1].end,
                first_word,
            }
        })
        .collect()
}

pub struct WordAligner {
    scorer: Box<dyn ScoreFunction>,
    window_size: usize,
}

impl WordAligner {
    pub fn new(scorer: Box<dyn ScoreFunction>, window_size: usize) -> Self {
        Self {
            scorer,
            window_size,
        }
    }

    /// Best matching word window for `search_text`. The returned match's
    /// `candidate_index` is the window's first word in `candidates`.
    pub fn find_best_word_window(
        &self,
        search_text: &str,
        candidates: &[WordChunk],
    ) -> Option<MatchChunk> {
        if search_text.trim().is_empty() {
            return None;
        }
        let windows = build_windows(candidates, self.window_size);
        let (idx, score) = select_best(search_text, &windows, self.scorer.as_ref())?;
        let window = &windows[idx];
        Some(to_match(window, score, window.first_word))
    }

    pub fn refine_start(
        &self,
        paragraph: &str,
        candidates: &[WordChunk],
        search_words: usize,
    ) -> Option<MatchChunk> {
        self.find_best_word_window(&leading_words(paragraph, search_words), candidates)
    }

    pub fn refine_end(
        &self,
        paragraph: &str,
        candidates: &[WordChunk],
        search_words: usize,
    ) -> Option<MatchChunk> {
        self.find_best_word_window(&trailing_words(paragraph, search_words), candidates)
    }
}
