use log::debug;

use crate::history::{BoundedHistory, rounded_div};

/// Level-2 aggregator: moving average of Level-1 averages and the sample
/// standard deviation around it.
///
/// Until the history has been filled once the aggregator is warming up and
/// [`mean`](Self::mean) divides by `written + 1`. That denominator runs one
/// ahead of the populated slot count and is kept as is, since the anomaly
/// threshold during warm-up is derived from it.
#[derive(Debug, Clone)]
pub struct MeanAggregator<const MEANS: usize> {
    history: BoundedHistory<MEANS>,
    std_dev: u16,
    warming_up: bool,
}

impl<const MEANS: usize> MeanAggregator<MEANS> {
    pub const fn new() -> Self {
        const { assert!(MEANS > 1, "sample standard deviation needs at least two means") };
        Self {
            history: BoundedHistory::new(),
            std_dev: 0,
            warming_up: true,
        }
    }

    /// Record one Level-1 average.
    ///
    /// When this completes a pass over the history, warm-up ends (for good) and
    /// the standard deviation is recomputed.
    pub fn ingest(&mut self, level_one_average: u16) {
        if self.history.push(level_one_average) {
            if self.warming_up {
                debug!("Mean history filled, warm-up complete");
                self.warming_up = false;
            }
            self.recompute_std_dev();
        }
    }

    /// Long-term mean of the recorded Level-1 averages
    pub fn mean(&self) -> u16 {
        let divisor = if self.warming_up {
            // The cursor has not wrapped yet, so it equals the number written
            self.history.write_index() as i64 + 1
        } else {
            MEANS as i64
        };
        rounded_div(self.history.sum(), divisor) as u16
    }

    /// Standard deviation as of the last completed cycle
    pub const fn std_dev(&self) -> u16 {
        self.std_dev
    }

    pub const fn is_warming_up(&self) -> bool {
        self.warming_up
    }

    /// Slot the next average goes into
    pub fn cursor(&self) -> usize {
        self.history.write_index()
    }

    /// The most recently recorded Level-1 average
    pub fn latest(&self) -> u16 {
        self.history.latest()
    }

    pub fn history(&self) -> &BoundedHistory<MEANS> {
        &self.history
    }

    // The one O(MEANS) step per tick. If the sample interval shrinks, profile
    // this first.
    fn recompute_std_dev(&mut self) {
        let mean = i64::from(self.mean());
        let sum_of_squares: u64 = self
            .history
            .values()
            .iter()
            .map(|&v| (i64::from(v) - mean).unsigned_abs().pow(2))
            .sum();
        let variance = sum_of_squares / (MEANS as u64 - 1);
        self.std_dev = u16::try_from(variance.isqrt()).unwrap_or(u16::MAX);
    }
}

impl<const MEANS: usize> Default for MeanAggregator<MEANS> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warm_up_denominator_runs_one_ahead() {
        let mut level2 = MeanAggregator::<5>::new();
        assert_eq!(level2.mean(), 0);

        level2.ingest(100);
        // 100 / (1 + 1)
        assert_eq!(level2.mean(), 50);

        level2.ingest(100);
        // 200 / 3 = 66.67
        assert_eq!(level2.mean(), 67);
        assert!(level2.is_warming_up());
    }

    #[test]
    fn test_warm_up_ends_exactly_once() {
        let mut level2 = MeanAggregator::<5>::new();
        for i in 1..=4 {
            level2.ingest(100);
            assert!(level2.is_warming_up(), "still warming after {} means", i);
        }
        level2.ingest(100);
        assert!(!level2.is_warming_up());
        assert_eq!(level2.mean(), 100);

        for _ in 0..12 {
            level2.ingest(100);
            assert!(!level2.is_warming_up());
        }
    }

    #[test]
    fn test_constant_means_have_zero_std_dev() {
        let mut level2 = MeanAggregator::<50>::new();
        for _ in 0..50 {
            level2.ingest(100);
        }
        assert_eq!(level2.mean(), 100);
        assert_eq!(level2.std_dev(), 0);
    }

    #[test]
    fn test_std_dev_matches_sample_formula() {
        let mut level2 = MeanAggregator::<4>::new();
        for value in [2, 4, 4, 6] {
            level2.ingest(value);
        }
        // mean 4, squares 4 + 0 + 0 + 4 = 8, 8 / 3 = 2, isqrt(2) = 1
        assert_eq!(level2.mean(), 4);
        assert_eq!(level2.std_dev(), 1);

        let mut wide = MeanAggregator::<4>::new();
        for value in [0, 100, 0, 100] {
            wide.ingest(value);
        }
        // mean 50, squares 4 * 2500 = 10000, 10000 / 3 = 3333, isqrt = 57
        assert_eq!(wide.std_dev(), 57);
    }

    #[test]
    fn test_std_dev_only_updates_on_wrap() {
        let mut level2 = MeanAggregator::<4>::new();
        for value in [0, 100, 0, 100] {
            level2.ingest(value);
        }
        let after_cycle = level2.std_dev();

        level2.ingest(50);
        level2.ingest(50);
        level2.ingest(50);
        assert_eq!(level2.std_dev(), after_cycle);

        level2.ingest(50);
        assert_eq!(level2.std_dev(), 0);
    }

    #[test]
    fn test_std_dev_decays_as_means_settle() {
        let mut level2 = MeanAggregator::<10>::new();
        for i in 0..10 {
            level2.ingest(if i % 2 == 0 { 80 } else { 120 });
        }
        let noisy = level2.std_dev();
        assert!(noisy > 0);

        for _ in 0..10 {
            level2.ingest(100);
        }
        assert_eq!(level2.mean(), 100);
        assert_eq!(level2.std_dev(), 0);
    }
}
