//! Build-time tuning for the monitor.
//!
//! Window sizes are const generics so the histories are sized at compile time;
//! everything else lives in [`MonitorConfig`], which is `Copy` and `const`
//! constructible so it can sit in a `static` next to the monitor.

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Raw readings averaged into one Level-1 average
pub const SAMPLES: usize = 20;

/// Level-1 averages kept for the long-term mean and standard deviation
pub const SAMPLE_MEANS: usize = 50;

/// Empirically measured maximum microphone reading
pub const MAX_AMPLITUDE: u16 = 720;

/// Milliseconds between sample ticks
pub const SAMPLE_INTERVAL_MS: u32 = 30;

/// Minimum milliseconds between two positive anomaly reports.
/// Should be a multiple of [`SAMPLE_INTERVAL_MS`].
pub const DEBOUNCE_INTERVAL_MS: u32 = 1000;

/// Standard deviations above the mean that count as anomalously loud
pub const ANOMALY_MULTIPLIER: u16 = 2;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    /// Readings above this are ingested as this value
    pub max_amplitude: u16,
    /// Raw readings are multiplied by this before they reach the monitor
    pub sensitivity: f32,
    pub sample_interval_ms: u32,
    pub debounce_interval_ms: u32,
    /// `k` in `mean + k * stddev`
    pub anomaly_multiplier: u16,
}

impl MonitorConfig {
    pub const DEFAULT: Self = Self {
        max_amplitude: MAX_AMPLITUDE,
        sensitivity: 1.0,
        sample_interval_ms: SAMPLE_INTERVAL_MS,
        debounce_interval_ms: DEBOUNCE_INTERVAL_MS,
        anomaly_multiplier: ANOMALY_MULTIPLIER,
    };

    pub const fn with_max_amplitude(mut self, max_amplitude: u16) -> Self {
        self.max_amplitude = max_amplitude;
        self
    }

    pub const fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub const fn with_sample_interval_ms(mut self, interval_ms: u32) -> Self {
        self.sample_interval_ms = interval_ms;
        self
    }

    pub const fn with_debounce_interval_ms(mut self, interval_ms: u32) -> Self {
        self.debounce_interval_ms = interval_ms;
        self
    }

    pub const fn with_anomaly_multiplier(mut self, k: u16) -> Self {
        self.anomaly_multiplier = k;
        self
    }

    /// Number of sample ticks a positive anomaly report suppresses further
    /// reports for.
    pub const fn refractory_ticks(&self) -> u32 {
        if self.sample_interval_ms == 0 {
            return 0;
        }
        self.debounce_interval_ms / self.sample_interval_ms
    }

    /// Reject values that would make the statistics meaningless.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.max_amplitude == 0 {
            return Err(MonitorError::InvalidConfig {
                field: "max_amplitude",
                details: "amplitude ceiling must be non-zero",
            });
        }
        if self.sample_interval_ms == 0 {
            return Err(MonitorError::InvalidConfig {
                field: "sample_interval_ms",
                details: "sample interval must be non-zero",
            });
        }
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(MonitorError::InvalidConfig {
                field: "sensitivity",
                details: "sensitivity must be a finite, non-negative multiplier",
            });
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MonitorConfig::DEFAULT.validate().is_ok());
        assert_eq!(MonitorConfig::default(), MonitorConfig::DEFAULT);
    }

    #[test]
    fn test_refractory_ticks() {
        assert_eq!(MonitorConfig::DEFAULT.refractory_ticks(), 33);

        let config = MonitorConfig::DEFAULT
            .with_sample_interval_ms(10)
            .with_debounce_interval_ms(250);
        assert_eq!(config.refractory_ticks(), 25);

        let short = MonitorConfig::DEFAULT.with_debounce_interval_ms(10);
        assert_eq!(short.refractory_ticks(), 0);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = MonitorConfig::DEFAULT.with_sample_interval_ms(0);
        assert!(matches!(
            config.validate(),
            Err(MonitorError::InvalidConfig {
                field: "sample_interval_ms",
                ..
            })
        ));
        assert_eq!(config.refractory_ticks(), 0);
    }

    #[test]
    fn test_validate_rejects_zero_ceiling() {
        let config = MonitorConfig::DEFAULT.with_max_amplitude(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_sensitivity() {
        assert!(MonitorConfig::DEFAULT.with_sensitivity(-1.0).validate().is_err());
        assert!(MonitorConfig::DEFAULT.with_sensitivity(f32::NAN).validate().is_err());
        assert!(MonitorConfig::DEFAULT.with_sensitivity(2.5).validate().is_ok());
    }
}
