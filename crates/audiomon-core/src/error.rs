//! Error type for the monitor's fallible entry points.
//!
//! Overruns are deliberately absent: the tick handler runs in interrupt
//! context with no error channel, so a dropped sample is counted and logged
//! rather than returned.

use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("Invalid configuration for {field}: {details}")]
    InvalidConfig {
        field: &'static str,
        details: &'static str,
    },
    #[error("Amplitude level needs at least one bin, got {bins}")]
    InvalidBinCount { bins: u16 },
    #[error("A monitor instance has already been installed")]
    AlreadyInstalled,
    #[error("Sample timer failed to start")]
    TimerUnavailable,
    #[error("Status frame encoding failed: {0:?}")]
    Encode(postcard::Error),
    #[error("Status frame decoding failed: {0:?}")]
    Decode(postcard::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_errors_clone_and_compare() {
        let err = MonitorError::Encode(postcard::Error::SerializeBufferFull);
        assert_eq!(err.clone(), err);
        assert_ne!(err, MonitorError::Decode(postcard::Error::SerializeBufferFull));
    }
}
