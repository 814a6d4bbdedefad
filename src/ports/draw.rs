use crate::domain::resolver::TOTAL_WEIGHT;

/// Port for the random source behind weighted choices.
pub trait Draw {
    /// Uniform sample in `[0, 100)`.
    fn percent(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        let scaled = (self.percent() / TOTAL_WEIGHT * len as f64) as usize;
        scaled.min(len.saturating_sub(1))
    }
}
