//! Loudness statistics state machine.
//!
//! [`AudioMonitor`] owns both aggregation levels and the anomaly detector and
//! runs the per-tick cascade: ingest a reading, feed Level-2 on a Level-1
//! cycle boundary (which may recompute the standard deviation), then advance
//! the refractory countdown. It is plain `&mut self` state; the interrupt
//! guard and sharing live in [`crate::shared`].

use crate::aggregator::{MeanAggregator, SampleAggregator};
use crate::anomaly::AnomalyDetector;
use crate::config::MonitorConfig;
use crate::diagnostics::MonitorStatus;
use crate::error::MonitorError;

#[derive(Debug, Clone)]
pub struct AudioMonitor<const SAMPLES: usize, const MEANS: usize> {
    config: MonitorConfig,
    level1: SampleAggregator<SAMPLES>,
    level2: MeanAggregator<MEANS>,
    detector: AnomalyDetector,
    samples_ingested: u32,
}

impl<const SAMPLES: usize, const MEANS: usize> AudioMonitor<SAMPLES, MEANS> {
    /// Create a monitor with zeroed histories, warming up, no refractory
    /// window pending.
    pub const fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            level1: SampleAggregator::new(config.max_amplitude),
            level2: MeanAggregator::new(),
            detector: AnomalyDetector::new(config.anomaly_multiplier, config.refractory_ticks()),
            samples_ingested: 0,
        }
    }

    /// Process one sample tick.
    pub fn on_sample_tick(&mut self, raw_reading: u16) {
        if self.level1.ingest(raw_reading) {
            self.level2.ingest(self.level1.average());
        }
        self.detector.tick();
        self.samples_ingested = self.samples_ingested.wrapping_add(1);
    }

    /// Level-1 average of the most recent raw readings
    pub fn current_amplitude(&self) -> u16 {
        self.level1.average()
    }

    /// [`current_amplitude`](Self::current_amplitude) scaled into `[0, 1]`.
    /// A zero ceiling clamps every reading to zero, so this is zero too.
    pub fn current_amplitude_normalized(&self) -> f32 {
        match self.config.max_amplitude {
            0 => 0.0,
            ceiling => f32::from(self.current_amplitude()) / f32::from(ceiling),
        }
    }

    /// Level-2 mean; best effort while warming up
    pub fn recent_mean(&self) -> u16 {
        self.level2.mean()
    }

    pub fn std_dev(&self) -> u16 {
        self.level2.std_dev()
    }

    /// `true` until the mean history has been filled once
    pub fn is_warming_up(&self) -> bool {
        self.level2.is_warming_up()
    }

    pub fn refractory_counter(&self) -> u32 {
        self.detector.refractory_counter()
    }

    /// Splits `[0, max_amplitude]` into `bins` equal bins and returns the one
    /// the current amplitude falls in. Amplitudes at the ceiling land in the
    /// top bin. Fails for zero bins or a zero ceiling.
    pub fn amplitude_level(&self, bins: u16) -> Result<u16, MonitorError> {
        if bins == 0 {
            return Err(MonitorError::InvalidBinCount { bins });
        }
        if self.config.max_amplitude == 0 {
            return Err(MonitorError::InvalidConfig {
                field: "max_amplitude",
                details: "amplitude ceiling must be non-zero",
            });
        }
        let top = u32::from(bins - 1);
        let ceiling = u32::from(self.config.max_amplitude);
        let amplitude = u32::from(self.current_amplitude()).min(ceiling);
        Ok((amplitude * top / ceiling) as u16)
    }

    /// Whether it is anomalously loud right now. A `true` result starts the
    /// refractory window.
    pub fn is_anomalously_loud(&mut self) -> bool {
        let current = self.current_amplitude();
        let mean = self.recent_mean();
        let std_dev = self.std_dev();
        let warming_up = self.is_warming_up();
        self.detector.evaluate(current, mean, std_dev, warming_up)
    }

    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Capture every statistic at once. `dropped_samples` is owned by the
    /// interrupt guard, so the caller supplies it.
    pub fn status(&self, dropped_samples: u32) -> MonitorStatus {
        MonitorStatus {
            current_amplitude: self.current_amplitude(),
            recent_mean: self.recent_mean(),
            std_dev: self.std_dev(),
            sample_cursor: self.level1.cursor() as u16,
            mean_cursor: self.level2.cursor() as u16,
            latest_mean: self.level2.latest(),
            warming_up: self.is_warming_up(),
            refractory_counter: self.refractory_counter(),
            samples_ingested: self.samples_ingested,
            dropped_samples,
        }
    }
}
