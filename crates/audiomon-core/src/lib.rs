//! Hardware-independent core library for audiomon
//!
//! This crate contains all platform-agnostic logic for the audiomon loudness
//! monitor: the fixed-window sample and mean aggregators, the running standard
//! deviation, the debounced anomaly detector, and the interrupt-safe facade
//! that a periodic timer drives.
//!
//! It is `#![no_std]` and never allocates, so the tick handler is safe to run
//! from an interrupt on the device while the same code is exercised on
//! desktop hosts (for the simulator and tests).

#![no_std]

pub mod aggregator;
pub mod anomaly;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod history;
pub mod monitor;
pub mod shared;
pub mod tick;

pub use config::{MonitorConfig, SAMPLE_MEANS, SAMPLES};
pub use diagnostics::{MonitorStatus, Verbosity};
pub use error::MonitorError;
pub use monitor::AudioMonitor;
pub use shared::{ArmedMonitor, DeviceMonitor, SharedMonitor, install};
pub use tick::{Microphone, SampleTimer, ScaledMicrophone, TickHandler};
