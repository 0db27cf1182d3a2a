/// Receives the results of interrupt-driven conversions.
///
/// Each method is called at most once per completed temperature/pressure
/// cycle, from whatever context drives [`crate::Bmp085::on_end_of_conversion`].
/// Implementations should not block.
pub trait Listener {
    fn on_temperature(&mut self, _raw: i16, _celsius: f64, _fahrenheit: f64) {}

    fn on_pressure(&mut self, _raw: i32, _hpa: f64) {}

    fn on_altitude(&mut self, _meters: f64, _feet: f64) {}
}

/// Discards every result.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoListener;

impl Listener for NoListener {}

pub type TemperatureCallback = fn(raw: i16, celsius: f64, fahrenheit: f64);
pub type PressureCallback = fn(raw: i32, hpa: f64);
pub type AltitudeCallback = fn(meters: f64, feet: f64);

/// Three independently registered callback slots. Empty slots are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct Callbacks {
    pub temperature: Option<TemperatureCallback>,
    pub pressure: Option<PressureCallback>,
    pub altitude: Option<AltitudeCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Listener for Callbacks {
    fn on_temperature(&mut self, raw: i16, celsius: f64, fahrenheit: f64) {
        if let Some(cb) = self.temperature {
            cb(raw, celsius, fahrenheit);
        }
    }

    fn on_pressure(&mut self, raw: i32, hpa: f64) {
        if let Some(cb) = self.pressure {
            cb(raw, hpa);
        }
    }

    fn on_altitude(&mut self, meters: f64, feet: f64) {
        if let Some(cb) = self.altitude {
            cb(meters, feet);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    static PRESSURE_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn count_pressure(_raw: i32, _hpa: f64) {
        PRESSURE_CALLS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn empty_slots_are_skipped() {
        let mut callbacks = Callbacks::new();
        callbacks.on_temperature(1, 0.1, 32.18);
        callbacks.on_pressure(1, 1.0);
        callbacks.on_altitude(1.0, 3.28);

        callbacks.pressure = Some(count_pressure);
        callbacks.on_temperature(1, 0.1, 32.18);
        callbacks.on_pressure(1, 1.0);
        callbacks.on_altitude(1.0, 3.28);
        assert_eq!(PRESSURE_CALLS.load(Ordering::SeqCst), 1);
    }
}
