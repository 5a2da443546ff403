// src/matching/similarity.rs
//
// 0-100 string similarity in the style of a weighted ratio: the best of a
// plain ratio, token-sort and token-set ratios, switching to best-window
// (partial) variants when the two strings differ a lot in length.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use strsim::normalized_levenshtein;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("static regex is valid"));

const UNBASE_SCALE: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.90;
const LONG_PARTIAL_SCALE: f64 = 0.60;
const PARTIAL_LENGTH_RATIO: f64 = 1.5;
const LONG_LENGTH_RATIO: f64 = 8.0;

/// Replaces runs of non-alphanumeric characters with a single space,
/// lowercases and trims.
pub fn process(text: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(text, " ")
        .to_lowercase()
        .trim()
        .to_string()
}

/// Normalized Levenshtein similarity scaled to 0-100. Empty input scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    to_score(normalized_levenshtein(a, b) * 100.0)
}

/// Best ratio between the shorter string and every same-length window of
/// the longer one.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    if shorter.is_empty() {
        return 0;
    }

    let longer_chars: Vec<char> = longer.chars().collect();
    let window = shorter.chars().count();
    let mut best = 0;
    for start in 0..=(longer_chars.len() - window) {
        let candidate: String = longer_chars[start..start + window].iter().collect();
        best = best.max(ratio(shorter, &candidate));
        if best == 100 {
            break;
        }
    }
    best
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

pub fn token_sort_ratio(a: &str, b: &str, partial: bool) -> u8 {
    let (a, b) = (sorted_tokens(a), sorted_tokens(b));
    if partial {
        partial_ratio(&a, &b)
    } else {
        ratio(&a, &b)
    }
}

/// Compares the shared tokens against each side's full token set, so a name
/// that is a token subset of the other scores 100.
pub fn token_set_ratio(a: &str, b: &str, partial: bool) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let shared = join_tokens(tokens_a.intersection(&tokens_b));
    let only_a = join_tokens(tokens_a.difference(&tokens_b));
    let only_b = join_tokens(tokens_b.difference(&tokens_a));

    let combined_a = format!("{} {}", shared, only_a).trim().to_string();
    let combined_b = format!("{} {}", shared, only_b).trim().to_string();

    let score = |x: &str, y: &str| if partial { partial_ratio(x, y) } else { ratio(x, y) };
    score(&shared, &combined_a)
        .max(score(&shared, &combined_b))
        .max(score(&combined_a, &combined_b))
}

fn join_tokens<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<&str>>().join(" ")
}

/// Similarity of two identifying fields on a 0-100 scale.
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let (a, b) = (process(a), process(b));
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let base = f64::from(ratio(&a, &b));
    let (len_a, len_b) = (a.chars().count() as f64, b.chars().count() as f64);
    let length_ratio = len_a.max(len_b) / len_a.min(len_b);

    if length_ratio < PARTIAL_LENGTH_RATIO {
        let sort = f64::from(token_sort_ratio(&a, &b, false)) * UNBASE_SCALE;
        let set = f64::from(token_set_ratio(&a, &b, false)) * UNBASE_SCALE;
        return to_score(base.max(sort).max(set));
    }

    let partial_scale = if length_ratio > LONG_LENGTH_RATIO {
        LONG_PARTIAL_SCALE
    } else {
        PARTIAL_SCALE
    };
    let partial = f64::from(partial_ratio(&a, &b)) * partial_scale;
    let sort = f64::from(token_sort_ratio(&a, &b, true)) * UNBASE_SCALE * partial_scale;
    let set = f64::from(token_set_ratio(&a, &b, true)) * UNBASE_SCALE * partial_scale;
    to_score(base.max(partial).max(sort).max(set))
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
