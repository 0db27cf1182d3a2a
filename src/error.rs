#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<E> {
    /// Bus transaction failed.
    Io(E),
    /// Blocking read while in interrupt mode, or interrupt step while in
    /// blocking mode.
    WrongMode,
    /// Calibration coefficients have not been loaded yet.
    Uncalibrated,
    /// A compensation divisor evaluated to zero.
    InvalidCalibration,
    /// An interrupt-driven pressure conversion is pending.
    ConversionInProgress,
}

impl<E> From<E> for DeviceError<E> {
    fn from(e: E) -> DeviceError<E> {
        DeviceError::Io(e)
    }
}
