//! Desktop simulator for the audiomon loudness monitor.
//!
//! Drives audiomon-core from a thread-backed periodic timer and a synthetic
//! microphone, so the statistics and anomaly detection can be exercised
//! without hardware. The VU meter the display driver would light is rendered
//! as a text bar in the log.
//!
//! ```text
//! RUST_LOG=info cargo run -p audiomon-simulator -- --seconds 60 --seed 7
//! ```
//!
//! The synthetic signal is room noise with a slow swell, plus a short clap
//! every few seconds once the monitor has warmed up.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use audiomon_core::{
    DeviceMonitor, Microphone, MonitorConfig, SAMPLE_MEANS, SAMPLES, SampleTimer,
    ScaledMicrophone, TickHandler, Verbosity, install,
};
use clap::Parser;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use static_cell::StaticCell;

// ---------------------------------------------------------------------------
// Simulation constants
// ---------------------------------------------------------------------------

/// Ticks run six times faster than on the device so warm-up takes seconds.
const SIM_CONFIG: MonitorConfig = MonitorConfig::DEFAULT
    .with_sample_interval_ms(5)
    .with_debounce_interval_ms(500);

/// Segments on the simulated VU display.
const VU_SEGMENTS: u16 = 16;

/// Interval between display refreshes.
const FRAME_DURATION: Duration = Duration::from_millis(100);

/// Interval between diagnostic reports.
const REPORT_INTERVAL: Duration = Duration::from_secs(2);

const DEFAULT_RUN_SECS: u64 = 30;

const DEFAULT_SEED: u64 = 0x5eed;

/// Ticks between claps in the synthetic signal.
const CLAP_PERIOD_TICKS: u64 = 1_400;

/// Ticks a clap lasts.
const CLAP_LENGTH_TICKS: u64 = 12;

static MONITOR: StaticCell<DeviceMonitor> = StaticCell::new();

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// How long to run, in seconds
    #[arg(short, long, default_value_t = DEFAULT_RUN_SECS)]
    seconds: u64,

    /// Seed for the synthetic signal's noise
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

// ---------------------------------------------------------------------------
// Synthetic microphone
// ---------------------------------------------------------------------------

/// Room noise around a slowly swelling baseline, with periodic claps.
struct SyntheticMicrophone {
    ticks: u64,
    rng: StdRng,
}

impl SyntheticMicrophone {
    fn new(seed: u64) -> Self {
        Self {
            ticks: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Microphone for SyntheticMicrophone {
    fn read_raw(&mut self) -> u16 {
        self.ticks += 1;
        let t = self.ticks as f64;

        let warmed_up = self.ticks > (SAMPLES * SAMPLE_MEANS) as u64;
        if warmed_up && self.ticks % CLAP_PERIOD_TICKS < CLAP_LENGTH_TICKS {
            return 680 + self.rng.random_range(0..120u16);
        }

        let swell = 110.0 + 20.0 * (t / 4_000.0).sin();
        let noise = self.rng.random_range(-20.0..=20.0_f64);
        (swell + noise).max(0.0) as u16
    }
}

// ---------------------------------------------------------------------------
// Thread-backed sample timer
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum TimerError {
    AlreadyRunning,
    Spawn(std::io::Error),
}

/// Periodic timer that reads the microphone on its own thread and hands each
/// reading to the registered handler.
struct ThreadTimer<M> {
    microphone: Option<M>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<M>>,
}

impl<M: Microphone + Send + 'static> ThreadTimer<M> {
    fn new(microphone: M) -> Self {
        Self {
            microphone: Some(microphone),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

impl<M: Microphone + Send + 'static> SampleTimer for ThreadTimer<M> {
    type Error = TimerError;

    fn start(
        &mut self,
        interval_ms: u32,
        handler: &'static dyn TickHandler,
    ) -> Result<(), Self::Error> {
        let mut microphone = self.microphone.take().ok_or(TimerError::AlreadyRunning)?;
        let period = Duration::from_millis(u64::from(interval_ms));
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);

        let worker = std::thread::Builder::new()
            .name("sample-timer".into())
            .spawn(move || {
                let mut next = Instant::now() + period;
                while running.load(Ordering::SeqCst) {
                    handler.on_tick(microphone.read_raw());

                    let now = Instant::now();
                    if next > now {
                        std::thread::sleep(next - now);
                    }
                    next += period;
                }
                microphone
            })
            .map_err(TimerError::Spawn)?;

        self.worker = Some(worker);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            match worker.join() {
                Ok(microphone) => self.microphone = Some(microphone),
                Err(_) => error!("Sample timer thread panicked"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Text rendering of the VU segments the display driver would light.
fn vu_bar(level: u16) -> String {
    (0..VU_SEGMENTS)
        .map(|segment| if segment <= level { '#' } else { '.' })
        .collect()
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();

    let args = Args::parse();
    let run_for = Duration::from_secs(args.seconds);

    info!("Starting audiomon simulator for {:?}", run_for);
    info!(
        "Window: {} samples x {} means, {} ms ticks, k={}",
        SAMPLES, SAMPLE_MEANS, SIM_CONFIG.sample_interval_ms, SIM_CONFIG.anomaly_multiplier
    );

    let microphone = ScaledMicrophone::new(SyntheticMicrophone::new(args.seed), SIM_CONFIG.sensitivity);
    let armed = match install(&MONITOR, SIM_CONFIG, ThreadTimer::new(microphone)) {
        Ok(armed) => armed,
        Err(e) => {
            error!("Could not start the monitor: {}", e);
            std::process::exit(1);
        }
    };

    let started = Instant::now();
    let mut last_report = Instant::now();
    let mut was_warming_up = true;

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    while started.elapsed() < run_for {
        let frame_start = Instant::now();

        // --- Display ------------------------------------------------------
        match armed.amplitude_level(VU_SEGMENTS) {
            Ok(level) => info!(
                "[{}] amp={:>3} ({:.2})",
                vu_bar(level),
                armed.current_amplitude(),
                armed.current_amplitude_normalized()
            ),
            Err(e) => error!("Display level unavailable: {}", e),
        }

        if was_warming_up && !armed.is_warming_up() {
            info!("Warm-up complete, baseline mean {}", armed.recent_mean());
            was_warming_up = false;
        }

        // --- Diagnostics --------------------------------------------------
        if last_report.elapsed() >= REPORT_INTERVAL {
            if armed.report(Verbosity::Verbose) {
                warn!("EEK! (reported)");
            }
            debug!("{}", armed.status().to_line());
            last_report = Instant::now();
        } else if armed.is_anomalously_loud() {
            warn!(
                "EEK! amplitude {} vs mean {} stdev {}",
                armed.current_amplitude(),
                armed.recent_mean(),
                armed.std_dev()
            );
        }

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    let status = armed.status();
    drop(armed);

    info!(
        "Simulator exiting after {} ticks, {} dropped",
        status.samples_ingested, status.dropped_samples
    );
}
