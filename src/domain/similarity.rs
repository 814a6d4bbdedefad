//! Carry explicit selections across registry reloads.
//!
//! When a previously chosen value disappears from a slot, the closest remaining
//! value by edit distance takes its place; if nothing is close enough the
//! selection degrades to random.

use crate::domain::Selection;

/// Candidates must be strictly more similar than this to be kept.
pub const SIMILARITY_THRESHOLD: f64 = 0.3;

/// Pick the closest still-valid value for `old_value`.
pub fn find_similar_value<S: AsRef<str>>(old_value: Option<&str>, candidates: &[S]) -> Selection {
    let Some(old_value) = old_value else {
        return Selection::Random;
    };
    if let Some(exact) = candidates.iter().find(|c| c.as_ref() == old_value) {
        return Selection::Value(exact.as_ref().to_string());
    }

    let old_lower: Vec<char> = old_value.to_lowercase().chars().collect();
    let mut best: Option<(usize, &str)> = None;

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let candidate_lower: Vec<char> = candidate.to_lowercase().chars().collect();
        let distance = levenshtein(&old_lower, &candidate_lower);
        let longest = old_lower.len().max(candidate_lower.len());
        if longest == 0 {
            continue;
        }
        let similarity = 1.0 - distance as f64 / longest as f64;
        if similarity <= SIMILARITY_THRESHOLD {
            continue;
        }
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, candidate));
        }
    }

    best.map_or(Selection::Random, |(_, value)| Selection::Value(value.to_string()))
}

/// Edit distance with unit cost for insertion, deletion, and substitution.
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
