//! Interrupt-safe facade around [`AudioMonitor`].
//!
//! The sample timer calls [`SharedMonitor::on_sample_tick`] from interrupt
//! context while the main flow queries statistics. Ticks are serialized with an
//! atomic try-lock: a tick that arrives while the previous one is still running
//! is dropped and counted, never queued and never waited on. The statistics
//! themselves sit behind a critical-section mutex so reads see a whole update.
//!
//! ```rust,ignore
//! static MONITOR: StaticCell<DeviceMonitor> = StaticCell::new();
//!
//! let armed = audiomon_core::install(&MONITOR, MonitorConfig::DEFAULT, timer)?;
//!
//! loop {
//!     let level = armed.amplitude_level(8)?;
//!     if armed.is_anomalously_loud() {
//!         // flash the display
//!     }
//! }
//! ```

use core::cell::RefCell;
use core::ops::Deref;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::CriticalSectionMutex;
use log::{error, info, warn};
use static_cell::StaticCell;

use crate::config::{MonitorConfig, SAMPLE_MEANS, SAMPLES};
use crate::diagnostics::{MonitorStatus, Verbosity};
use crate::error::MonitorError;
use crate::monitor::AudioMonitor;
use crate::tick::{SampleTimer, TickHandler};

/// The monitor with the device's window sizes
pub type DeviceMonitor = SharedMonitor<SAMPLES, SAMPLE_MEANS>;

pub struct SharedMonitor<const SAMPLES: usize, const MEANS: usize> {
    state: CriticalSectionMutex<RefCell<AudioMonitor<SAMPLES, MEANS>>>,
    /// Set for the duration of one tick
    busy: AtomicBool,
    dropped: AtomicU32,
    trace_overruns: AtomicBool,
}

impl<const SAMPLES: usize, const MEANS: usize> SharedMonitor<SAMPLES, MEANS> {
    pub const fn new(config: MonitorConfig) -> Self {
        Self {
            state: CriticalSectionMutex::new(RefCell::new(AudioMonitor::new(config))),
            busy: AtomicBool::new(false),
            dropped: AtomicU32::new(0),
            trace_overruns: AtomicBool::new(false),
        }
    }

    /// Tick callback. Never blocks: if a previous tick is still in flight the
    /// reading is dropped.
    pub fn on_sample_tick(&self, raw_reading: u16) {
        if self.busy.swap(true, Ordering::Acquire) {
            self.record_overrun();
            return;
        }

        let processed = self.state.lock(|cell| match cell.try_borrow_mut() {
            Ok(mut monitor) => {
                monitor.on_sample_tick(raw_reading);
                true
            }
            Err(_) => false,
        });

        self.busy.store(false, Ordering::Release);

        if !processed {
            self.record_overrun();
        }
    }

    fn record_overrun(&self) {
        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        if self.trace_overruns.load(Ordering::Relaxed) {
            warn!("Missed a sample, previous tick still running ({} dropped)", dropped);
        }
    }

    /// Run `f` against a consistent view of the statistics. The state stays
    /// borrowed while `f` runs, so `f` must not call back into `self`.
    fn with<R>(&self, f: impl FnOnce(&AudioMonitor<SAMPLES, MEANS>) -> R) -> R {
        self.state.lock(|cell| f(&*cell.borrow()))
    }

    pub fn current_amplitude(&self) -> u16 {
        self.with(|monitor| monitor.current_amplitude())
    }

    pub fn current_amplitude_normalized(&self) -> f32 {
        self.with(|monitor| monitor.current_amplitude_normalized())
    }

    pub fn recent_mean(&self) -> u16 {
        self.with(|monitor| monitor.recent_mean())
    }

    pub fn std_dev(&self) -> u16 {
        self.with(|monitor| monitor.std_dev())
    }

    pub fn is_warming_up(&self) -> bool {
        self.with(|monitor| monitor.is_warming_up())
    }

    pub fn amplitude_level(&self, bins: u16) -> Result<u16, MonitorError> {
        self.with(|monitor| monitor.amplitude_level(bins))
    }

    /// See [`AudioMonitor::is_anomalously_loud`].
    pub fn is_anomalously_loud(&self) -> bool {
        self.state.lock(|cell| cell.borrow_mut().is_anomalously_loud())
    }

    /// Ticks discarded because the previous one was still running
    pub fn dropped_samples(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> MonitorStatus {
        let dropped = self.dropped_samples();
        self.with(|monitor| monitor.status(dropped))
    }

    /// Log the current statistics at the requested verbosity, then check for an
    /// anomaly and log a marker if there is one.
    ///
    /// [`Verbosity::Trace`] also turns on a warning for every dropped sample;
    /// any other level turns it off again.
    pub fn report(&self, verbosity: Verbosity) -> bool {
        self.trace_overruns
            .store(verbosity == Verbosity::Trace, Ordering::Relaxed);

        if verbosity != Verbosity::Quiet {
            let status = self.status();
            if status.samples_ingested > 0 {
                info!(
                    "Most recent average amplitude: {}, cnt={}",
                    status.current_amplitude, status.sample_cursor
                );
            }
            if status.mean_cursor > 0 || !status.warming_up {
                info!(
                    "Most recent mean amplitude: {}, avg={}, stdev={}, cnt={}",
                    status.latest_mean, status.recent_mean, status.std_dev, status.mean_cursor
                );
            }
        }

        let loud = self.is_anomalously_loud();
        if loud {
            warn!(
                "Anomalously loud: amplitude {} against mean {}",
                self.current_amplitude(),
                self.recent_mean()
            );
        }
        loud
    }
}

impl<const SAMPLES: usize, const MEANS: usize> TickHandler for SharedMonitor<SAMPLES, MEANS> {
    fn on_tick(&self, raw_reading: u16) {
        self.on_sample_tick(raw_reading);
    }
}

/// A monitor whose sample timer is running. Dropping it stops the timer.
pub struct ArmedMonitor<const SAMPLES: usize, const MEANS: usize, T: SampleTimer> {
    monitor: &'static SharedMonitor<SAMPLES, MEANS>,
    timer: T,
}

impl<const SAMPLES: usize, const MEANS: usize, T: SampleTimer> ArmedMonitor<SAMPLES, MEANS, T> {
    pub fn monitor(&self) -> &'static SharedMonitor<SAMPLES, MEANS> {
        self.monitor
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}

impl<const SAMPLES: usize, const MEANS: usize, T: SampleTimer> Deref
    for ArmedMonitor<SAMPLES, MEANS, T>
{
    type Target = SharedMonitor<SAMPLES, MEANS>;

    fn deref(&self) -> &Self::Target {
        self.monitor
    }
}

impl<const SAMPLES: usize, const MEANS: usize, T: SampleTimer> Drop
    for ArmedMonitor<SAMPLES, MEANS, T>
{
    fn drop(&mut self) {
        self.timer.stop();
        info!("Sample timer stopped");
    }
}

/// Construct the one monitor into `cell` and start `timer` with it as the tick
/// handler.
///
/// The cell can only be filled once; a second call fails with
/// [`MonitorError::AlreadyInstalled`]. If the timer refuses to start, the
/// monitor stays constructed but unarmed.
pub fn install<const SAMPLES: usize, const MEANS: usize, T: SampleTimer>(
    cell: &'static StaticCell<SharedMonitor<SAMPLES, MEANS>>,
    config: MonitorConfig,
    mut timer: T,
) -> Result<ArmedMonitor<SAMPLES, MEANS, T>, MonitorError> {
    config.validate()?;

    let monitor: &'static SharedMonitor<SAMPLES, MEANS> = cell
        .try_init(SharedMonitor::new(config))
        .ok_or(MonitorError::AlreadyInstalled)?;

    timer
        .start(config.sample_interval_ms, monitor)
        .map_err(|e| {
            error!("Failed to start sample timer: {:?}", e);
            MonitorError::TimerUnavailable
        })?;

    info!(
        "Audio monitor armed: {} ms ticks, {}x{} window, ceiling {}, k={}",
        config.sample_interval_ms, SAMPLES, MEANS, config.max_amplitude, config.anomaly_multiplier
    );

    Ok(ArmedMonitor { monitor, timer })
}
