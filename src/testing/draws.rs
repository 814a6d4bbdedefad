//! Deterministic `Draw` sources for tests.

use crate::ports::Draw;

/// Replays a fixed list of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct FixedDraw {
    values: Vec<f64>,
    next: usize,
}

impl FixedDraw {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<f64> = values.into_iter().collect();
        assert!(!values.is_empty(), "FixedDraw needs at least one value");
        Self { values, next: 0 }
    }
}

impl Draw for FixedDraw {
    fn percent(&mut self) -> f64 {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}

/// Always draws zero and counts how often it was asked.
#[derive(Debug, Clone, Default)]
pub struct CountingDraw {
    pub calls: usize,
}

impl Draw for CountingDraw {
    fn percent(&mut self) -> f64 {
        self.calls += 1;
        0.0
    }
}
