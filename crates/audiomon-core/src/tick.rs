//! Seams to the platform: the periodic timer that drives sampling and the
//! microphone it reads from.
//!
//! The timer owns the microphone. On every period it takes one reading and
//! hands it to the registered [`TickHandler`]; the monitor never configures
//! the hardware timer itself.

/// Callback invoked once per sample period, possibly from interrupt context.
///
/// Implementations must not block or allocate.
pub trait TickHandler: Sync {
    fn on_tick(&self, raw_reading: u16);
}

/// Periodic timer collaborator.
pub trait SampleTimer {
    type Error: core::fmt::Debug;

    /// Start calling `handler` every `interval_ms` milliseconds.
    fn start(
        &mut self,
        interval_ms: u32,
        handler: &'static dyn TickHandler,
    ) -> Result<(), Self::Error>;

    /// Stop calling the handler. Idempotent.
    fn stop(&mut self);
}

/// Source of raw microphone amplitude readings.
pub trait Microphone {
    fn read_raw(&mut self) -> u16;
}

/// Applies the configured sensitivity multiplier to every reading.
///
/// The product saturates to the `u16` range; clamping to the amplitude ceiling
/// happens later, inside the monitor.
pub struct ScaledMicrophone<M> {
    inner: M,
    sensitivity: f32,
}

impl<M: Microphone> ScaledMicrophone<M> {
    pub const fn new(inner: M, sensitivity: f32) -> Self {
        Self { inner, sensitivity }
    }
}

impl<M: Microphone> Microphone for ScaledMicrophone<M> {
    fn read_raw(&mut self) -> u16 {
        let raw = self.inner.read_raw();
        if self.sensitivity == 1.0 {
            return raw;
        }
        // `as` saturates and maps NaN to zero
        (f32::from(raw) * self.sensitivity) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u16);

    impl Microphone for Fixed {
        fn read_raw(&mut self) -> u16 {
            self.0
        }
    }

    #[test]
    fn test_unity_sensitivity_passes_through() {
        let mut mic = ScaledMicrophone::new(Fixed(321), 1.0);
        assert_eq!(mic.read_raw(), 321);
    }

    #[test]
    fn test_sensitivity_scales() {
        let mut mic = ScaledMicrophone::new(Fixed(200), 1.5);
        assert_eq!(mic.read_raw(), 300);

        let mut quiet = ScaledMicrophone::new(Fixed(200), 0.25);
        assert_eq!(quiet.read_raw(), 50);
    }

    #[test]
    fn test_scaled_reading_saturates() {
        let mut mic = ScaledMicrophone::new(Fixed(60000), 4.0);
        assert_eq!(mic.read_raw(), u16::MAX);
    }
}
