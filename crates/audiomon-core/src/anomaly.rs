//! Debounced loudness anomaly detection.
//!
//! A Level-1 average more than `k` standard deviations above the long-term
//! mean is rare under a normal-distribution assumption (about 0.1% of ticks
//! for `k = 3`), so it is reported as a loudness spike. After a report the
//! detector stays quiet for a refractory window measured in sample ticks, so a
//! single sustained noise does not fire on every tick.

use log::debug;

#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    multiplier: u16,
    refractory_ticks: u32,
    refractory_counter: u32,
}

impl AnomalyDetector {
    pub const fn new(multiplier: u16, refractory_ticks: u32) -> Self {
        Self {
            multiplier,
            refractory_ticks,
            refractory_counter: 0,
        }
    }

    /// Decide whether `current` is anomalously loud relative to `mean` and
    /// `std_dev`.
    ///
    /// Always `false` while warming up or inside the refractory window. A
    /// positive result re-arms the refractory window.
    pub fn evaluate(&mut self, current: u16, mean: u16, std_dev: u16, warming_up: bool) -> bool {
        if warming_up || self.refractory_counter > 0 {
            return false;
        }

        let threshold = u32::from(mean) + u32::from(self.multiplier) * u32::from(std_dev);
        let loud = u32::from(current) > threshold;
        if loud {
            debug!(
                "Anomaly: {} > {} + {} * {}, quiet for {} ticks",
                current, mean, self.multiplier, std_dev, self.refractory_ticks
            );
            self.refractory_counter = self.refractory_ticks;
        }
        loud
    }

    /// Advance the refractory countdown by one sample tick.
    pub fn tick(&mut self) {
        self.refractory_counter = self.refractory_counter.saturating_sub(1);
    }

    /// Ticks left before another anomaly can be reported
    pub const fn refractory_counter(&self) -> u32 {
        self.refractory_counter
    }
}
