use crate::calibration::Oversampling;

/// 7-bit bus address of the sensor.
pub const ADDRESS: u8 = 0x77;

/// Control register, conversions are started by writing a [`Command`] here.
pub const CTRL_REG: u8 = 0xF4;
pub const VALUE_MSB_REG: u8 = 0xF6;
pub const VALUE_LSB_REG: u8 = 0xF7;
pub const VALUE_XLSB_REG: u8 = 0xF8;

/// Calibration EEPROM, one (MSB, LSB) register pair per coefficient in
/// AC1, AC2, AC3, AC4, AC5, AC6, B1, B2, MB, MC, MD order.
pub const CALIBRATION_REGS: [(u8, u8); 11] = [
    (0xAA, 0xAB),
    (0xAC, 0xAD),
    (0xAE, 0xAF),
    (0xB0, 0xB1),
    (0xB2, 0xB3),
    (0xB4, 0xB5),
    (0xB6, 0xB7),
    (0xB8, 0xB9),
    (0xBA, 0xBB),
    (0xBC, 0xBD),
    (0xBE, 0xBF),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    StartTemperature,
    StartPressure(Oversampling),
}

impl Command {
    pub fn value(&self) -> u8 {
        match self {
            Command::StartTemperature => 0x2E,
            Command::StartPressure(oss) => 0x34 | (oss.bits() << 6),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_start_temperature() {
        assert_eq!(Command::StartTemperature.value(), 0x2E);
    }

    #[test]
    fn check_start_pressure() {
        let mut command = Command::StartPressure(Oversampling::UltraLowPower);
        assert_eq!(command.value(), 0x34);
        command = Command::StartPressure(Oversampling::Standard);
        assert_eq!(command.value(), 0x74);
        command = Command::StartPressure(Oversampling::HighResolution);
        assert_eq!(command.value(), 0xB4);
        command = Command::StartPressure(Oversampling::UltraHighResolution);
        assert_eq!(command.value(), 0xF4);
    }

    #[test]
    fn calibration_registers_are_contiguous() {
        for (i, (msb, lsb)) in CALIBRATION_REGS.iter().enumerate() {
            assert_eq!(*msb, 0xAA + 2 * i as u8);
            assert_eq!(*lsb, msb + 1);
        }
    }
}
