use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::scoring::composite_segment_score;
use super::segment::{leading_words, trailing_words, SegmentAligner};
use super::selection::select_best;
use super::word::{build_windows, WordAligner};
use crate::pipeline::defaults::{CompositeSegmentScore, WordWindowScore};
use crate::pipeline::traits::ScoreFunction;
use crate::types::{ChunkId, SegmentChunk, WordChunk};

fn segment(id: u64, text: &str, start: f64, end: f64) -> SegmentChunk {
    SegmentChunk {
        id: ChunkId::Index(id),
        text: text.to_string(),
        start,
        end,
    }
}

fn words(texts: &[&str]) -> Vec<WordChunk> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| WordChunk {
            id: ChunkId::Index(i as u64),
            segment_id: ChunkId::Index(0),
            text: text.to_string(),
            start: i as f64,
            end: i as f64 + 0.5,
        })
        .collect()
}

fn segment_aligner() -> SegmentAligner {
    SegmentAligner::new(Box::new(CompositeSegmentScore))
}

fn word_aligner() -> WordAligner {
    WordAligner::new(Box::new(WordWindowScore), 3)
}

struct ConstScore(f64);

impl ScoreFunction for ConstScore {
    fn score(&self, _a: &str, _b: &str) -> f64 {
        self.0
    }
}

#[test]
fn leading_and_trailing_words_clip_to_paragraph_length() {
    let text = "one  two\tthree four";
    assert_eq!(leading_words(text, 2), "one two");
    assert_eq!(trailing_words(text, 2), "three four");
    assert_eq!(leading_words(text, 10), "one two three four");
    assert_eq!(trailing_words(text, 10), "one two three four");
    assert_eq!(leading_words("", 3), "");
}

#[test]
fn best_segment_is_the_closest_text() {
    let candidates = vec![
        segment(0, "weather report for the coast", 0.0, 4.0),
        segment(1, "the quick brown fox jumps", 4.0, 8.0),
        segment(2, "over the lazy dog", 8.0, 12.0),
    ];
    let best = segment_aligner()
        .find_best_segment("quick brown fox", &candidates)
        .expect("a match");
    assert_eq!(best.id, ChunkId::Index(1));
    assert_eq!(best.candidate_index, 1);
    assert!((best.start - 4.0).abs() < 1e-9);
    assert!(best.score > 0.5);
}

#[test]
fn blank_search_text_has_no_match() {
    let candidates = vec![segment(0, "anything", 0.0, 1.0)];
    assert!(segment_aligner()
        .find_best_segment("   ", &candidates)
        .is_none());
    assert!(segment_aligner()
        .find_best_segment("anything", &Vec::<SegmentChunk>::new())
        .is_none());
}

#[test]
fn blank_candidates_are_never_selected() {
    let candidates = vec![
        segment(0, "   ", 0.0, 1.0),
        segment(1, "", 1.0, 2.0),
        segment(2, "completely different", 2.0, 3.0),
    ];
    let best = segment_aligner()
        .find_best_segment("hello", &candidates)
        .expect("non-blank candidate exists");
    assert_eq!(best.id, ChunkId::Index(2));

    let only_blank = vec![segment(0, " ", 0.0, 1.0)];
    assert!(segment_aligner()
        .find_best_segment("hello", &only_blank)
        .is_none());
}

#[test]
fn unrelated_text_still_returns_the_argmax() {
    let candidates = vec![
        segment(0, "alpha beta gamma", 0.0, 1.0),
        segment(1, "delta epsilon", 1.0, 2.0),
    ];
    let search = "zzzz qqqq";
    let best = segment_aligner()
        .find_best_segment(search, &candidates)
        .expect("argmax over non-blank candidates");
    for candidate in &candidates {
        assert!(best.score >= composite_segment_score(search, &candidate.text));
    }
    assert!(best.score < 0.5);
}

#[test]
fn equal_scores_keep_the_first_candidate() {
    let aligner = SegmentAligner::new(Box::new(ConstScore(0.7)));
    let candidates = vec![
        segment(7, "a", 0.0, 1.0),
        segment(3, "b", 1.0, 2.0),
        segment(5, "c", 2.0, 3.0),
    ];
    let best = aligner
        .find_best_segment("anything", &candidates)
        .expect("a match");
    assert_eq!(best.id, ChunkId::Index(7));
    assert_eq!(best.candidate_index, 0);
}

/// Scores each candidate by its text: "nan" yields NaN, anything else 0.9.
struct NanForText;

impl ScoreFunction for NanForText {
    fn score(&self, _a: &str, b: &str) -> f64 {
        if b == "nan" {
            f64::NAN
        } else {
            0.9
        }
    }
}

#[test]
fn nan_score_does_not_displace_the_first_tied_candidate() {
    let aligner = SegmentAligner::new(Box::new(NanForText));
    let candidates = vec![
        segment(0, "first", 0.0, 1.0),
        segment(1, "nan", 1.0, 2.0),
        segment(2, "third", 2.0, 3.0),
    ];
    let best = aligner
        .find_best_segment("anything", &candidates)
        .expect("a match");
    assert_eq!(best.id, ChunkId::Index(0));
    assert!((best.score - 0.9).abs() < 1e-12);
}

#[test]
fn leading_nan_score_is_skipped() {
    let aligner = SegmentAligner::new(Box::new(NanForText));
    let candidates = vec![
        segment(0, "nan", 0.0, 1.0),
        segment(1, "second", 1.0, 2.0),
    ];
    let best = aligner
        .find_best_segment("anything", &candidates)
        .expect("a match");
    assert_eq!(best.id, ChunkId::Index(1));

    let only_nan = vec![segment(0, "nan", 0.0, 1.0)];
    assert!(aligner.find_best_segment("anything", &only_nan).is_none());
}

#[test]
fn duplicate_texts_resolve_to_first_occurrence() {
    let candidates = vec![
        segment(0, "intro music", 0.0, 1.0),
        segment(1, "and now the news", 1.0, 2.0),
        segment(2, "and now the news", 2.0, 3.0),
    ];
    let best = segment_aligner()
        .find_best_segment("and now the news", &candidates)
        .expect("a match");
    assert_eq!(best.candidate_index, 1);
}

#[test]
fn selection_matches_brute_force_argmax() {
    const VOCAB: &[&str] = &[
        "river", "stone", "market", "winter", "signal", "harbor", "garden", "engine", "paper",
        "lantern",
    ];
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let scorer = CompositeSegmentScore;

    for _ in 0..200 {
        let sentence = |rng: &mut StdRng| {
            let len = rng.gen_range(1..6);
            (0..len)
                .map(|_| *VOCAB.choose(rng).unwrap_or(&"river"))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let count = rng.gen_range(1..8);
        let candidates: Vec<SegmentChunk> = (0..count)
            .map(|i| segment(i as u64, &sentence(&mut rng), i as f64, i as f64 + 1.0))
            .collect();
        let search = sentence(&mut rng);

        let (idx, score) = select_best(&search, &candidates, &scorer).expect("non-empty");
        let scores: Vec<f64> = candidates
            .iter()
            .map(|c| scorer.score(&search, &c.text))
            .collect();
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let first_max = scores.iter().position(|s| *s == max).expect("max exists");

        assert_eq!(score, max);
        assert_eq!(idx, first_max, "search={search:?} scores={scores:?}");
    }
}

#[test]
fn segment_align_reports_both_ends() {
    let candidates = vec![
        segment(0, "good evening and welcome to the program", 0.0, 5.0),
        segment(1, "tonight we look at rivers", 5.0, 9.0),
        segment(2, "that is all for this week goodnight", 9.0, 14.0),
    ];
    let paragraph = "Good evening and welcome. Tonight we look at rivers. \
                     That is all for this week, goodnight.";
    let coarse = segment_aligner()
        .align(paragraph, &candidates, 5)
        .expect("coarse alignment");
    assert!(coarse.is_matched());
    assert_eq!(coarse.start_match.as_ref().map(|m| m.candidate_index), Some(0));
    assert_eq!(coarse.end_match.as_ref().map(|m| m.candidate_index), Some(2));
    assert!((coarse.start - 0.0).abs() < 1e-9);
    assert!((coarse.end - 14.0).abs() < 1e-9);
}

#[test]
fn segment_align_skips_blank_paragraph_and_empty_candidates() {
    let candidates = vec![segment(0, "text", 0.0, 1.0)];
    assert!(segment_aligner().align("  \n ", &candidates, 8).is_none());
    assert!(segment_aligner()
        .align("text", &Vec::<SegmentChunk>::new(), 8)
        .is_none());
}

#[test]
fn windows_join_three_consecutive_words() {
    let windows = build_windows(&words(&["the", "lazy", "dog", "sleeps"]), 3);
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].text, "the lazy dog");
    assert_eq!(windows[0].id, ChunkId::Key("0+1+2".to_string()));
    assert!((windows[0].start - 0.0).abs() < 1e-9);
    assert!((windows[0].end - 2.5).abs() < 1e-9);
    assert_eq!(windows[1].first_word, 1);
    assert_eq!(windows[1].text, "lazy dog sleeps");
}

#[test]
fn windows_skip_blank_words() {
    let windows = build_windows(&words(&["one", "two", " ", "three", "four", "five"]), 3);
    let ids: Vec<String> = windows.iter().map(|w| w.id.to_string()).collect();
    assert_eq!(ids, vec!["3+4+5".to_string()]);
}

#[test]
fn too_few_words_build_no_window() {
    assert!(build_windows(&words(&["only", "two"]), 3).is_empty());
    assert!(word_aligner()
        .find_best_word_window("only two", &words(&["only", "two"]))
        .is_none());
}

#[test]
fn word_window_refines_start_and_end() {
    let candidates = words(&[
        "welcome", "back", "today", "we", "visit", "the", "old", "harbor", "at", "dawn",
    ]);
    let paragraph = "Today we visit the old harbor";

    let start = word_aligner()
        .refine_start(paragraph, &candidates, 3)
        .expect("start window");
    assert_eq!(start.text, "today we visit");
    assert_eq!(start.candidate_index, 2);
    assert!((start.score - 1.0).abs() < 1e-9);

    let end = word_aligner()
        .refine_end(paragraph, &candidates, 3)
        .expect("end window");
    assert_eq!(end.text, "the old harbor");
    assert_eq!(end.candidate_index, 5);
    assert!((end.end - 7.5).abs() < 1e-9);
}

#[test]
fn word_window_keeps_first_of_tied_windows() {
    let aligner = WordAligner::new(Box::new(ConstScore(0.9)), 3);
    let best = aligner
        .find_best_word_window("x", &words(&["a", "b", "c", "d", "e"]))
        .expect("window");
    assert_eq!(best.candidate_index, 0);
    assert_eq!(best.id.to_string(), "0+1+2");
}
