use crate::history::{BoundedHistory, rounded_div};

/// Level-1 aggregator: a simple moving average over raw readings.
///
/// Readings above the amplitude ceiling are clamped to it on the way in, so a
/// single extreme outlier cannot drag the average past the physical range.
#[derive(Debug, Clone)]
pub struct SampleAggregator<const SAMPLES: usize> {
    history: BoundedHistory<SAMPLES>,
    ceiling: u16,
}

impl<const SAMPLES: usize> SampleAggregator<SAMPLES> {
    pub const fn new(ceiling: u16) -> Self {
        Self {
            history: BoundedHistory::new(),
            ceiling,
        }
    }

    /// Ingest one raw reading.
    ///
    /// Returns `true` when this reading completed a cycle of `SAMPLES` readings,
    /// which is the cue to hand [`average`](Self::average) to Level-2.
    pub fn ingest(&mut self, raw_reading: u16) -> bool {
        self.history.push(raw_reading.min(self.ceiling))
    }

    /// `round(sum / SAMPLES)` over the last `SAMPLES` readings
    pub fn average(&self) -> u16 {
        rounded_div(self.history.sum(), SAMPLES as i64) as u16
    }

    /// Slot the next reading goes into
    pub fn cursor(&self) -> usize {
        self.history.write_index()
    }

    pub fn history(&self) -> &BoundedHistory<SAMPLES> {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_input_converges_exactly() {
        let mut level1 = SampleAggregator::<20>::new(720);
        for _ in 0..20 {
            level1.ingest(100);
        }
        assert_eq!(level1.average(), 100);

        for _ in 0..57 {
            level1.ingest(100);
        }
        assert_eq!(level1.average(), 100);
    }

    #[test]
    fn test_partial_window_counts_empty_slots_as_zero() {
        let mut level1 = SampleAggregator::<4>::new(720);
        level1.ingest(100);
        // 100 / 4
        assert_eq!(level1.average(), 25);
        assert_eq!(level1.history().sum(), 100);
    }

    #[test]
    fn test_clamps_to_ceiling() {
        let mut level1 = SampleAggregator::<2>::new(720);
        level1.ingest(5000);
        assert_eq!(level1.history().sum(), 720);
        assert_eq!(level1.history().values(), &[720, 0]);

        level1.ingest(720);
        assert_eq!(level1.average(), 720);
    }

    #[test]
    fn test_cycle_boundary_every_window() {
        let mut level1 = SampleAggregator::<5>::new(720);
        let boundaries: usize = (1..=23).filter(|_| level1.ingest(10)).count();
        assert_eq!(boundaries, 4);
        assert_eq!(level1.cursor(), 3);
    }

    #[test]
    fn test_single_spike_shifts_average() {
        let mut level1 = SampleAggregator::<20>::new(720);
        for _ in 0..20 {
            level1.ingest(100);
        }
        level1.ingest(720);
        assert_eq!(level1.average(), 131);
    }
}
