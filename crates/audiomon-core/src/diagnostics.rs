//! Observability hooks for a serial console or any other diagnostic sink.
//!
//! Nothing here affects monitor state. [`MonitorStatus`] is a plain snapshot
//! that can be rendered as a text line or packed into a compact postcard frame.

use core::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Capacity of a rendered status line
pub const STATUS_LINE_CAPACITY: usize = 160;

/// Upper bound on an encoded status frame (varint-encoded fields)
pub const STATUS_FRAME_CAPACITY: usize = 40;

/// How much the diagnostic report says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Only the anomaly marker
    #[default]
    Quiet,
    /// Status lines for both aggregation levels
    Verbose,
    /// Status lines plus a warning for every dropped sample
    Trace,
}

/// Point-in-time copy of every monitor statistic.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorStatus {
    /// Level-1 average
    pub current_amplitude: u16,
    /// Level-2 mean
    pub recent_mean: u16,
    pub std_dev: u16,
    /// Next Level-1 slot
    pub sample_cursor: u16,
    /// Next Level-2 slot
    pub mean_cursor: u16,
    /// Most recent Level-1 average recorded in Level-2
    pub latest_mean: u16,
    pub warming_up: bool,
    pub refractory_counter: u32,
    /// Ticks processed since start (wraps)
    pub samples_ingested: u32,
    /// Ticks dropped by the overrun guard
    pub dropped_samples: u32,
}

impl MonitorStatus {
    /// Render the snapshot as a single human-readable line.
    pub fn to_line(&self) -> heapless::String<STATUS_LINE_CAPACITY> {
        let mut line = heapless::String::new();
        // Every field is bounded, so the line always fits
        let _ = write!(line, "{}", self);
        line
    }

    /// Pack the snapshot into `buf`, returning the written prefix.
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], MonitorError> {
        postcard::to_slice(self, buf).map_err(MonitorError::Encode)
    }

    /// Unpack a snapshot produced by [`encode`](Self::encode).
    pub fn decode(bytes: &[u8]) -> Result<Self, MonitorError> {
        postcard::from_bytes(bytes).map_err(MonitorError::Decode)
    }
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "amp={} cnt={} mean={} last={} stdev={} mean_cnt={} warming={} refractory={} ticks={} dropped={}",
            self.current_amplitude,
            self.sample_cursor,
            self.recent_mean,
            self.latest_mean,
            self.std_dev,
            self.mean_cursor,
            self.warming_up,
            self.refractory_counter,
            self.samples_ingested,
            self.dropped_samples,
        )
    }
}
