//! Driver error types.

use core::fmt;

/// Errors reported by the watchdog driver.
///
/// Register accesses never fail; errors only come from raw values that do not
/// map to one of the hardware overflow periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Raw WDTCSR encoding is not one of the overflow periods.
    InvalidArgument(u8),
    /// Duration in milliseconds is not one of the overflow periods.
    InvalidMillis(u16),
    /// WDTCSR currently holds an encoding the driver does not know.
    InvalidConfiguration(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(bits) => {
                write!(f, "invalid overflow period encoding {bits:#04x}")
            }
            Error::InvalidMillis(ms) => write!(f, "no overflow period of {ms}ms"),
            Error::InvalidConfiguration(bits) => {
                write!(f, "watchdog programmed with unknown encoding {bits:#04x}")
            }
        }
    }
}

impl core::error::Error for Error {}
