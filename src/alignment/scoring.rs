//! Text similarity metrics used by the segment and word aligners.
//!
//! All metrics take already-normalized text and return a value in [0, 100];
//! the composite scores divide by 100 so callers work in [0, 1].

use std::collections::BTreeSet;

use rapidfuzz::distance::indel;

const WEIGHT_PARTIAL: f64 = 0.5;
const WEIGHT_FULL: f64 = 0.3;
const WEIGHT_TOKEN_SET: f64 = 0.2;

/// Lowercase, drop punctuation and collapse whitespace runs.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        let cleaned: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        if cleaned.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&cleaned);
    }
    out
}

/// Indel similarity of the whole strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    indel::normalized_similarity(a.chars(), b.chars()) * 100.0
}

/// Best [`ratio`] of the shorter string against every equally long
/// window of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0.0;
    }
    if short.len() == long.len() {
        return indel::normalized_similarity(short.iter().copied(), long.iter().copied()) * 100.0;
    }

    let mut best = 0.0f64;
    for window in long.windows(short.len()) {
        let score = indel::normalized_similarity(short.iter().copied(), window.iter().copied());
        if score > best {
            best = score;
            if best >= 1.0 {
                break;
            }
        }
    }
    best * 100.0
}

/// Order and duplicate insensitive similarity over whitespace tokens.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = join_tokens(tokens_a.intersection(&tokens_b));
    let only_a = join_tokens(tokens_a.difference(&tokens_b));
    let only_b = join_tokens(tokens_b.difference(&tokens_a));

    let combined_a = join_pair(&intersection, &only_a);
    let combined_b = join_pair(&intersection, &only_b);

    ratio(&intersection, &combined_a)
        .max(ratio(&intersection, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

fn join_tokens<'s, 't: 's>(tokens: impl Iterator<Item = &'s &'t str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

fn join_pair(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ => format!("{left} {right}"),
    }
}

/// Weighted blend of partial, full and token-set similarity, in [0, 1].
pub fn composite_segment_score(a: &str, b: &str) -> f64 {
    let a = normalize_text(a);
    let b = normalize_text(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let blended = partial_ratio(&a, &b) * WEIGHT_PARTIAL
        + ratio(&a, &b) * WEIGHT_FULL
        + token_set_ratio(&a, &b) * WEIGHT_TOKEN_SET;
    (blended / 100.0).clamp(0.0, 1.0)
}

/// Plain full-string similarity, in [0, 1].
pub fn word_window_score(a: &str, b: &str) -> f64 {
    let a = normalize_text(a);
    let b = normalize_text(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    (ratio(&a, &b) / 100.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn normalize_text_folds_case_and_strips_punctuation() {
        assert_eq!(normalize_text("  Hello,   World! "), "hello world");
        assert_eq!(normalize_text("Don't -- stop."), "dont stop");
        assert_eq!(normalize_text("?!"), "");
    }

    #[test]
    fn ratio_is_indel_similarity() {
        assert!(approx(ratio("abc", "abc"), 100.0));
        // lcs("abcd", "abef") = 2 -> 2 * 2 / 8
        assert!(approx(ratio("abcd", "abef"), 50.0));
    }

    #[test]
    fn partial_ratio_finds_substring() {
        assert!(approx(partial_ratio("quick brown", "the quick brown fox"), 100.0));
        assert!(approx(partial_ratio("the quick brown fox", "quick brown"), 100.0));
        assert!(approx(partial_ratio("", "anything"), 0.0));
    }

    #[test]
    fn token_set_ratio_ignores_order_and_duplicates() {
        assert!(approx(token_set_ratio("fox brown the", "the the brown fox"), 100.0));
        assert!(approx(token_set_ratio("", "fox"), 0.0));
    }

    #[test]
    fn token_set_ratio_rewards_subset() {
        assert!(approx(token_set_ratio("brown fox", "the quick brown fox"), 100.0));
    }

    #[test]
    fn composite_score_weights_metrics() {
        let a = "the quick brown fox";
        let b = "Jumps over the lazy dog";
        let na = normalize_text(a);
        let nb = normalize_text(b);
        let expected = (partial_ratio(&na, &nb) * 0.5
            + ratio(&na, &nb) * 0.3
            + token_set_ratio(&na, &nb) * 0.2)
            / 100.0;
        assert!(approx(composite_segment_score(a, b), expected));
        assert!(approx(composite_segment_score("Same text.", "same text"), 1.0));
    }

    #[test]
    fn scores_are_bounded_and_zero_for_blank_input() {
        for (a, b) in [("", "x"), ("x", ""), ("...", "x")] {
            assert!(approx(composite_segment_score(a, b), 0.0));
            assert!(approx(word_window_score(a, b), 0.0));
        }
        let s = composite_segment_score("alpha beta", "gamma delta epsilon");
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn word_window_score_is_plain_ratio() {
        assert!(approx(word_window_score("The lazy dog.", "the lazy dog"), 1.0));
        assert!(word_window_score("lazy dog", "the lazy dog") < 1.0);
    }
}
