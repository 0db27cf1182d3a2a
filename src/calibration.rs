/// Reference pressure at sea level in hPa.
pub const SEA_LEVEL_HPA: f64 = 1013.25;

const FEET_PER_METER: f64 = 3.2808;

/// Oversampling setting for pressure conversions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    UltraLowPower,
    #[default]
    Standard,
    HighResolution,
    UltraHighResolution,
}

impl Oversampling {
    /// The `oss` value, placed in bits 7:6 of the pressure command and used
    /// as a shift amount during compensation.
    pub fn bits(&self) -> u8 {
        match *self {
            Oversampling::UltraLowPower => 0,
            Oversampling::Standard => 1,
            Oversampling::HighResolution => 2,
            Oversampling::UltraHighResolution => 3,
        }
    }

    /// Gets the maximum pressure conversion time in MICROSECONDS.
    pub fn conversion_time_us(&self) -> u32 {
        // 4.5 / 7.5 / 13.5 / 25.5 ms
        match *self {
            Oversampling::UltraLowPower => 4_500,
            Oversampling::Standard => 7_500,
            Oversampling::HighResolution => 13_500,
            Oversampling::UltraHighResolution => 25_500,
        }
    }

    /// Assembles the MSB, LSB and XLSB result registers into a raw pressure
    /// code, dropping the bits this setting leaves unused.
    pub fn raw_pressure(&self, msb: u8, lsb: u8, xlsb: u8) -> i32 {
        let value = ((msb as i32) << 16) | ((lsb as i32) << 8) | xlsb as i32;
        value >> (8 - self.bits())
    }
}

/// Factory calibration data read from EEPROM
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    /// Read for completeness, the compensation does not use it.
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
}

impl Calibration {
    /// Builds the coefficients from the 11 big-endian EEPROM words in
    /// register order.
    pub fn new(words: &[u16; 11]) -> Calibration {
        Calibration {
            ac1: words[0] as i16,
            ac2: words[1] as i16,
            ac3: words[2] as i16,
            ac4: words[3],
            ac5: words[4],
            ac6: words[5],
            b1: words[6] as i16,
            b2: words[7] as i16,
            mb: words[8] as i16,
            mc: words[9] as i16,
            md: words[10] as i16,
        }
    }

    /// Converts raw temperature and pressure codes into true temperature and
    /// pressure.
    ///
    /// The integer steps follow the datasheet reference implementation and
    /// use wrapping 32-bit arithmetic throughout, so results match it bit for
    /// bit even where intermediates overflow. Returns `None` when one of the
    /// divisors (`X1 + MD` or `B4`) is zero.
    pub fn compensate(
        &self,
        raw_temperature: i16,
        raw_pressure: i32,
        oversampling: Oversampling,
    ) -> Option<Compensated> {
        let oss = oversampling.bits() as u32;
        let ac1 = self.ac1 as i32;
        let ac2 = self.ac2 as i32;
        let ac3 = self.ac3 as i32;
        let ac4 = self.ac4 as u32;
        let ac5 = self.ac5 as i32;
        let ac6 = self.ac6 as i32;
        let b1 = self.b1 as i32;
        let b2 = self.b2 as i32;
        let mc = self.mc as i32;
        let md = self.md as i32;

        // true temperature
        let x1 = (raw_temperature as i32).wrapping_sub(ac6).wrapping_mul(ac5) >> 15;
        let divisor = x1.wrapping_add(md);
        if divisor == 0 {
            return None;
        }
        let x2 = (mc << 11).wrapping_div(divisor);
        let b5 = x1.wrapping_add(x2);
        let temperature = b5.wrapping_add(8) >> 4;

        // true pressure
        let b6 = b5.wrapping_sub(4000);
        let b6_squared = b6.wrapping_mul(b6) >> 12;
        let x1 = b2.wrapping_mul(b6_squared) >> 11;
        let x2 = ac2.wrapping_mul(b6) >> 11;
        let x3 = x1.wrapping_add(x2);
        let b3 = ac1.wrapping_mul(4).wrapping_add(x3).wrapping_shl(oss).wrapping_add(2) >> 2;
        let x1 = ac3.wrapping_mul(b6) >> 13;
        let x2 = b1.wrapping_mul(b6_squared) >> 16;
        let x3 = x1.wrapping_add(x2).wrapping_add(2) >> 2;
        let b4 = ac4.wrapping_mul(x3.wrapping_add(32768) as u32) >> 15;
        if b4 == 0 {
            return None;
        }
        let b7 = (raw_pressure.wrapping_sub(b3) as u32).wrapping_mul(50000 >> oss);
        // the comparison is unsigned, B7 above 2^31 would overflow the shift
        let p = (if b7 < 0x8000_0000 {
            (b7 << 1) / b4
        } else {
            (b7 / b4) << 1
        }) as i32;
        let x1 = (p >> 8).wrapping_mul(p >> 8);
        let x1 = x1.wrapping_mul(3038) >> 16;
        let x2 = (-7357i32).wrapping_mul(p) >> 16;
        let pressure = p.wrapping_add(x1.wrapping_add(x2).wrapping_add(3791) >> 4);

        Some(Compensated {
            temperature,
            pressure,
        })
    }
}

/// Output of [`Calibration::compensate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Compensated {
    /// Temperature in 0.1 °C
    pub temperature: i32,
    /// Pressure in Pa
    pub pressure: i32,
}

impl Compensated {
    pub fn celsius(&self) -> f64 {
        self.temperature as f64 * 0.1
    }

    pub fn fahrenheit(&self) -> f64 {
        celsius_to_fahrenheit(self.celsius())
    }

    pub fn hpa(&self) -> f64 {
        self.pressure as f64 / 100.0
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    (celsius * 9.0 / 5.0) + 32.0
}

/// Approximate altitude in meters for a pressure in hPa, using the
/// international barometric formula against [`SEA_LEVEL_HPA`].
pub fn altitude_from_pressure(pressure_hpa: f64) -> f64 {
    44330.0 * (1.0 - libm::pow(pressure_hpa / SEA_LEVEL_HPA, 1.0 / 5.255))
}

pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}
