//! Effective weights and cumulative weighted choice.

/// Total probability mass shared by a slot's eligible entries.
pub const TOTAL_WEIGHT: f64 = 100.0;

/// Normalize explicit/auto weights so they sum to 100.
///
/// Explicit weights are kept; auto entries split whatever the explicit ones
/// leave (never below zero). The result is then scaled to sum to 100, so an
/// explicit sum above 100 is used proportionally. When every weight is zero
/// the entries share the mass uniformly.
pub fn effective_weights(weights: &[Option<f64>]) -> Vec<f64> {
    if weights.is_empty() {
        return Vec::new();
    }

    let explicit: f64 = weights.iter().flatten().map(|w| w.max(0.0)).sum();
    let auto_count = weights.iter().filter(|w| w.is_none()).count();
    let share = if auto_count > 0 {
        (TOTAL_WEIGHT - explicit).max(0.0) / auto_count as f64
    } else {
        0.0
    };

    let raw: Vec<f64> = weights.iter().map(|w| w.unwrap_or(share).max(0.0)).collect();
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return vec![TOTAL_WEIGHT / weights.len() as f64; weights.len()];
    }
    raw.iter().map(|w| w * TOTAL_WEIGHT / total).collect()
}

/// Index of the first entry whose cumulative range `[lo, hi)` contains `draw`.
///
/// Zero-width ranges are never chosen. A draw past the final boundary (float
/// rounding) lands on the last entry with positive weight.
pub fn pick_index(weights: &[f64], draw: f64) -> usize {
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (index, weight) in weights.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        last_positive = index;
        if draw < cumulative + weight {
            return index;
        }
        cumulative += weight;
    }
    last_positive
}
