//! Driver for the BMP085 barometric pressure and temperature sensor.
//!
//! Conversions can be run in one of two modes:
//!
//! - blocking, where [`Bmp085::read_raw_temperature`], [`Bmp085::read_raw_pressure`]
//!   and [`Bmp085::read`] start a conversion, wait the datasheet's maximum
//!   conversion time and read the result back;
//! - interrupt driven, entered with [`Bmp085::init_async`]. The application wires
//!   the sensor's end-of-conversion pin (rising edge) to
//!   [`Bmp085::on_end_of_conversion`], and results are handed to a [`Listener`].
#![cfg_attr(not(test), no_std)]

// must stay first, the other modules use its macros
mod fmt;

pub mod calibration;
pub mod command;
pub mod error;
pub mod listener;

pub use calibration::{
    altitude_from_pressure, Calibration, Compensated, Oversampling, SEA_LEVEL_HPA,
};
pub use error::DeviceError;
pub use listener::{Callbacks, Listener, NoListener};

use calibration::meters_to_feet;
use command::{
    Command, ADDRESS, CALIBRATION_REGS, CTRL_REG, VALUE_LSB_REG, VALUE_MSB_REG, VALUE_XLSB_REG,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use listener::{AltitudeCallback, PressureCallback, TemperatureCallback};

/// Maximum temperature conversion time in microseconds.
const TEMPERATURE_CONVERSION_US: u32 = 4_500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Reads start a conversion and wait for it.
    Blocking,
    /// Conversions are advanced by [`Bmp085::on_end_of_conversion`].
    Interrupt,
}

/// Position of the interrupt-driven temperature/pressure cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionState {
    AwaitingTemperature,
    AwaitingPressure {
        raw_temperature: i16,
        oversampling: Oversampling,
    },
    /// A bus error interrupted the cycle, the next step restarts it.
    Unknown,
}

/// A fully compensated temperature and pressure reading.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    pub raw_temperature: i16,
    pub raw_pressure: i32,
    pub celsius: f64,
    pub fahrenheit: f64,
    /// Pressure in Pa
    pub pressure: i32,
    pub hpa: f64,
    pub altitude_m: f64,
    pub altitude_ft: f64,
}

impl Measurement {
    fn new(raw_temperature: i16, raw_pressure: i32, compensated: Compensated) -> Self {
        let hpa = compensated.hpa();
        let altitude_m = altitude_from_pressure(hpa);
        Self {
            raw_temperature,
            raw_pressure,
            celsius: compensated.celsius(),
            fahrenheit: compensated.fahrenheit(),
            pressure: compensated.pressure,
            hpa,
            altitude_m,
            altitude_ft: meters_to_feet(altitude_m),
        }
    }
}

pub struct Bmp085<I2C, D, L = NoListener> {
    i2c: I2C,
    delay: D,
    listener: L,
    calibration: Option<Calibration>,
    oversampling: Oversampling,
    mode: Mode,
    state: ConversionState,
}

impl<I2C, D> Bmp085<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create a new instance in blocking mode with standard oversampling.
    /// Call [`Bmp085::init`] before reading compensated values.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_listener(i2c, delay, NoListener)
    }
}

impl<I2C, D, L> Bmp085<I2C, D, L>
where
    I2C: I2c,
    D: DelayNs,
    L: Listener,
{
    /// Create a new instance whose interrupt-driven results go to `listener`.
    pub fn with_listener(i2c: I2C, delay: D, listener: L) -> Self {
        Self {
            i2c,
            delay,
            listener,
            calibration: None,
            oversampling: Oversampling::default(),
            mode: Mode::Blocking,
            state: ConversionState::AwaitingTemperature,
        }
    }

    /// Reads the 11 factory calibration coefficients, one register at a time.
    /// Only the first successful call touches the bus.
    pub fn init(&mut self) -> Result<(), DeviceError<I2C::Error>> {
        if self.calibration.is_some() {
            trace!("calibration already loaded");
            return Ok(());
        }

        let mut words = [0u16; 11];
        for (word, (msb, lsb)) in words.iter_mut().zip(CALIBRATION_REGS) {
            let high = self.read_reg(msb)?;
            let low = self.read_reg(lsb)?;
            *word = u16::from_be_bytes([high, low]);
        }
        let calibration = Calibration::new(&words);
        debug!(
            "calibration: ac1={} ac2={} ac3={} ac4={} ac5={} ac6={} b1={} b2={} mb={} mc={} md={}",
            calibration.ac1,
            calibration.ac2,
            calibration.ac3,
            calibration.ac4,
            calibration.ac5,
            calibration.ac6,
            calibration.b1,
            calibration.b2,
            calibration.mb,
            calibration.mc,
            calibration.md,
        );
        self.calibration = Some(calibration);
        Ok(())
    }

    /// Loads calibration, switches to interrupt mode for the lifetime of the
    /// device and starts the first temperature conversion.
    ///
    /// The caller attaches [`Bmp085::on_end_of_conversion`] to the rising edge
    /// of the end-of-conversion pin.
    pub fn init_async(&mut self) -> Result<(), DeviceError<I2C::Error>> {
        self.init()?;
        self.mode = Mode::Interrupt;
        info!("entering interrupt mode");
        self.restart()
    }

    /// Step function for the end-of-conversion interrupt.
    ///
    /// A finished temperature conversion is stored and a pressure conversion
    /// started. A finished pressure conversion is compensated, delivered to the
    /// listener, and a new temperature conversion started. Never blocks.
    pub fn on_end_of_conversion(&mut self) -> Result<(), DeviceError<I2C::Error>> {
        if self.mode != Mode::Interrupt {
            return Err(DeviceError::WrongMode);
        }

        let result = match self.state {
            ConversionState::AwaitingTemperature => self.temperature_ready(),
            ConversionState::AwaitingPressure {
                raw_temperature,
                oversampling,
            } => self.pressure_ready(raw_temperature, oversampling),
            ConversionState::Unknown => {
                warn!("invalid conversion state, returning to safe state");
                self.restart()
            }
        };

        if let Err(DeviceError::Io(_)) = result {
            error!("bus error during conversion cycle");
            self.state = ConversionState::Unknown;
        }
        result
    }

    /// Starts a temperature conversion, waits for it and returns the raw code.
    pub fn read_raw_temperature(&mut self) -> Result<i16, DeviceError<I2C::Error>> {
        self.ensure_blocking()?;
        self.start(Command::StartTemperature)?;
        self.delay.delay_us(TEMPERATURE_CONVERSION_US);
        Ok(self.read_temperature_value()?)
    }

    /// Starts a pressure conversion at the configured oversampling, waits for
    /// it and returns the raw code.
    pub fn read_raw_pressure(&mut self) -> Result<i32, DeviceError<I2C::Error>> {
        self.ensure_blocking()?;
        let oversampling = self.oversampling;
        self.start(Command::StartPressure(oversampling))?;
        self.delay.delay_us(oversampling.conversion_time_us());
        Ok(self.read_pressure_value(oversampling)?)
    }

    /// Runs a temperature then a pressure conversion and compensates both.
    pub fn read(&mut self) -> Result<Measurement, DeviceError<I2C::Error>> {
        self.ensure_blocking()?;
        if self.calibration.is_none() {
            return Err(DeviceError::Uncalibrated);
        }
        let raw_temperature = self.read_raw_temperature()?;
        let raw_pressure = self.read_raw_pressure()?;
        self.measure(raw_temperature, raw_pressure, self.oversampling)
    }

    /// Compensates raw codes against the loaded calibration and the configured
    /// oversampling. Does not touch the bus.
    pub fn compensate(
        &self,
        raw_temperature: i16,
        raw_pressure: i32,
    ) -> Result<Compensated, DeviceError<I2C::Error>> {
        self.compensate_with(raw_temperature, raw_pressure, self.oversampling)
    }

    /// Changes the pressure oversampling. Rejected while an interrupt-driven
    /// pressure conversion is pending.
    pub fn set_oversampling(
        &mut self,
        oversampling: Oversampling,
    ) -> Result<(), DeviceError<I2C::Error>> {
        if let ConversionState::AwaitingPressure { .. } = self.state {
            return Err(DeviceError::ConversionInProgress);
        }
        self.oversampling = oversampling;
        Ok(())
    }

    fn temperature_ready(&mut self) -> Result<(), DeviceError<I2C::Error>> {
        let raw_temperature = self.read_temperature_value()?;
        let oversampling = self.oversampling;
        self.start(Command::StartPressure(oversampling))?;
        self.state = ConversionState::AwaitingPressure {
            raw_temperature,
            oversampling,
        };
        Ok(())
    }

    fn pressure_ready(
        &mut self,
        raw_temperature: i16,
        oversampling: Oversampling,
    ) -> Result<(), DeviceError<I2C::Error>> {
        let raw_pressure = self.read_pressure_value(oversampling)?;
        match self.measure(raw_temperature, raw_pressure, oversampling) {
            Ok(measurement) => {
                self.listener.on_temperature(
                    measurement.raw_temperature,
                    measurement.celsius,
                    measurement.fahrenheit,
                );
                self.listener
                    .on_pressure(measurement.raw_pressure, measurement.hpa);
                self.listener
                    .on_altitude(measurement.altitude_m, measurement.altitude_ft);
                self.restart()
            }
            Err(e) => {
                self.restart()?;
                Err(e)
            }
        }
    }

    /// Starts a temperature conversion and resets the cycle.
    fn restart(&mut self) -> Result<(), DeviceError<I2C::Error>> {
        if let Err(e) = self.start(Command::StartTemperature) {
            self.state = ConversionState::Unknown;
            return Err(e.into());
        }
        self.state = ConversionState::AwaitingTemperature;
        Ok(())
    }

    fn measure(
        &self,
        raw_temperature: i16,
        raw_pressure: i32,
        oversampling: Oversampling,
    ) -> Result<Measurement, DeviceError<I2C::Error>> {
        let compensated = self.compensate_with(raw_temperature, raw_pressure, oversampling)?;
        Ok(Measurement::new(raw_temperature, raw_pressure, compensated))
    }

    fn compensate_with(
        &self,
        raw_temperature: i16,
        raw_pressure: i32,
        oversampling: Oversampling,
    ) -> Result<Compensated, DeviceError<I2C::Error>> {
        let calibration = self.calibration.as_ref().ok_or(DeviceError::Uncalibrated)?;
        calibration
            .compensate(raw_temperature, raw_pressure, oversampling)
            .ok_or_else(|| {
                error!("calibration yields a zero divisor, raw_temperature={}", raw_temperature);
                DeviceError::InvalidCalibration
            })
    }

    fn ensure_blocking(&self) -> Result<(), DeviceError<I2C::Error>> {
        match self.mode {
            Mode::Blocking => Ok(()),
            Mode::Interrupt => Err(DeviceError::WrongMode),
        }
    }

    fn start(&mut self, command: Command) -> Result<(), I2C::Error> {
        self.write_reg(CTRL_REG, command.value())
    }

    fn read_temperature_value(&mut self) -> Result<i16, I2C::Error> {
        let msb = self.read_reg(VALUE_MSB_REG)?;
        let lsb = self.read_reg(VALUE_LSB_REG)?;
        Ok(i16::from_be_bytes([msb, lsb]))
    }

    fn read_pressure_value(&mut self, oversampling: Oversampling) -> Result<i32, I2C::Error> {
        let msb = self.read_reg(VALUE_MSB_REG)?;
        let lsb = self.read_reg(VALUE_LSB_REG)?;
        let xlsb = self.read_reg(VALUE_XLSB_REG)?;
        Ok(oversampling.raw_pressure(msb, lsb, xlsb))
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(ADDRESS, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(ADDRESS, &[reg, value])
    }
}

impl<I2C, D, L> Bmp085<I2C, D, L> {
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    pub fn oversampling(&self) -> Oversampling {
        self.oversampling
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> ConversionState {
        self.state
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Releases the bus and delay, consuming the driver.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C, D> Bmp085<I2C, D, Callbacks> {
    pub fn register_temperature_callback(&mut self, cb: TemperatureCallback) {
        self.listener.temperature = Some(cb);
    }

    pub fn register_pressure_callback(&mut self, cb: PressureCallback) {
        self.listener.pressure = Some(cb);
    }

    pub fn register_altitude_callback(&mut self, cb: AltitudeCallback) {
        self.listener.altitude = Some(cb);
    }
}
